use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};

/// `[start, end]` instant range currently displayed or queried.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub start: DateTime<Utc>,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.start < self.end && self.end <= now
    }
}
