use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Aggregation bucket duration understood by the query backend.
///
/// The core only orders and compares bucket sizes; the token (`"5m"`, `"1d"`, ...)
/// is passed through to the backend untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketSize {
    millis: i64,
}

impl BucketSize {
    pub const ONE_MINUTE: BucketSize = BucketSize::from_millis(MINUTE_MS);
    pub const FIVE_MINUTES: BucketSize = BucketSize::from_millis(5 * MINUTE_MS);
    pub const FIFTEEN_MINUTES: BucketSize = BucketSize::from_millis(15 * MINUTE_MS);
    pub const THIRTY_MINUTES: BucketSize = BucketSize::from_millis(30 * MINUTE_MS);
    pub const ONE_HOUR: BucketSize = BucketSize::from_millis(HOUR_MS);
    pub const THREE_HOURS: BucketSize = BucketSize::from_millis(3 * HOUR_MS);
    pub const SIX_HOURS: BucketSize = BucketSize::from_millis(6 * HOUR_MS);
    pub const TWELVE_HOURS: BucketSize = BucketSize::from_millis(12 * HOUR_MS);
    pub const ONE_DAY: BucketSize = BucketSize::from_millis(DAY_MS);
    pub const SEVEN_DAYS: BucketSize = BucketSize::from_millis(7 * DAY_MS);
    pub const THIRTY_DAYS: BucketSize = BucketSize::from_millis(30 * DAY_MS);

    const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.millis)
    }

    /// Bucket covering `factor` consecutive buckets of this size.
    pub fn scaled(&self, factor: usize) -> BucketSize {
        let factor = i64::try_from(factor.max(1)).unwrap_or(i64::MAX);
        Self::from_millis(self.millis.saturating_mul(factor))
    }

    pub fn token(&self) -> String {
        if self.millis % DAY_MS == 0 {
            format!("{}d", self.millis / DAY_MS)
        } else if self.millis % HOUR_MS == 0 {
            format!("{}h", self.millis / HOUR_MS)
        } else if self.millis % MINUTE_MS == 0 {
            format!("{}m", self.millis / MINUTE_MS)
        } else {
            format!("{}ms", self.millis)
        }
    }

    /// Parses `"<n>ms|m|h|d"`; anything else, or a non-positive amount, is `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let split = token.find(|c: char| !c.is_ascii_digit())?;
        let (amount, unit) = token.split_at(split);
        let amount: i64 = amount.parse().ok()?;
        if amount <= 0 {
            return None;
        }
        let unit_ms = match unit {
            "ms" => 1,
            "m" => MINUTE_MS,
            "h" => HOUR_MS,
            "d" => DAY_MS,
            _ => return None,
        };
        amount.checked_mul(unit_ms).map(Self::from_millis)
    }
}

impl fmt::Display for BucketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl Serialize for BucketSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for BucketSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        BucketSize::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid bucket size: {raw}")))
    }
}
