use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const HOUR_MS: i64 = 3_600_000;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;
pub const MONTH_MS: i64 = 30 * DAY_MS;
pub const YEAR_MS: i64 = 365 * DAY_MS;

/// Chart time unit. Each variant maps to exactly one millisecond constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
    ];

    pub const fn as_millis(self) -> i64 {
        match self {
            Granularity::Hour => HOUR_MS,
            Granularity::Day => DAY_MS,
            Granularity::Week => WEEK_MS,
            Granularity::Month => MONTH_MS,
            Granularity::Year => YEAR_MS,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::milliseconds(self.as_millis())
    }

    pub fn from_millis(ms: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_millis() == ms)
    }

    /// Unknown millisecond values degrade to `Day`.
    pub fn from_millis_or_default(ms: i64) -> Self {
        Self::from_millis(ms).unwrap_or_else(|| {
            warn!("Unknown granularity {}ms, falling back to day", ms);
            Self::default()
        })
    }

    /// Unknown names degrade to `Day`.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hour" | "h" => Granularity::Hour,
            "day" | "d" => Granularity::Day,
            "week" | "w" => Granularity::Week,
            "month" | "m" => Granularity::Month,
            "year" | "y" => Granularity::Year,
            other => {
                if let Ok(ms) = other.parse::<i64>() {
                    return Self::from_millis_or_default(ms);
                }
                warn!("Unknown granularity {:?}, falling back to day", raw);
                Self::default()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// HOUR and DAY views render the day/night split.
    pub fn is_diurnal(self) -> bool {
        matches!(self, Granularity::Hour | Granularity::Day)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
