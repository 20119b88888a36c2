//! Paging through history one granularity at a time.
//!
//! Stepping backward is always allowed. Stepping forward must never show a window
//! that has not started (DAY) or not fully elapsed (every other granularity).
//! Both the step itself and the "next disabled" flag are decided by [`can_advance`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_with::{serde_as, TimestampMilliSeconds};
use tracing::debug;

use crate::domain::chart::model::Granularity;
use crate::domain::chart::model::granularity::DAY_MS;

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Window start after the step (unchanged if the step was refused).
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub start: DateTime<Utc>,
    pub applied: bool,
    pub next_disabled: bool,
}

/// Whether a forward step of `|delta|` from `from` is allowed at `now`.
///
/// DAY: the next day must have begun (`from + delta < now`), so a partial "today" is
/// reachable. Other sizes: the next window must have fully elapsed
/// (`from + 2 * delta < now`). A target beyond the representable range never advances.
pub fn can_advance(from: DateTime<Utc>, delta: Duration, now: DateTime<Utc>) -> bool {
    let delta = delta.abs();
    if delta.is_zero() {
        return false;
    }
    let threshold = if delta.num_milliseconds() == DAY_MS {
        from.checked_add_signed(delta)
    } else {
        from.checked_add_signed(delta)
            .and_then(|t| t.checked_add_signed(delta))
    };
    threshold.is_some_and(|t| t < now)
}

/// Applies a signed step to `current_start`. Never fails; refused steps (including
/// ones that would leave the representable time range) keep the start.
pub fn step(current_start: DateTime<Utc>, delta: Duration, now: DateTime<Utc>) -> StepOutcome {
    let target = if delta < Duration::zero() || can_advance(current_start, delta, now) {
        current_start.checked_add_signed(delta)
    } else {
        None
    };
    let applied = target.is_some();

    let start = if let Some(target) = target {
        target
    } else {
        debug!(
            "Refused step of {}ms from {} at {}",
            delta.num_milliseconds(),
            current_start,
            now
        );
        current_start
    };

    StepOutcome {
        start,
        applied,
        next_disabled: !can_advance(start, delta, now),
    }
}

pub fn step_forward(start: DateTime<Utc>, granularity: Granularity, now: DateTime<Utc>) -> StepOutcome {
    step(start, granularity.duration(), now)
}

pub fn step_backward(start: DateTime<Utc>, granularity: Granularity, now: DateTime<Utc>) -> StepOutcome {
    step(start, -granularity.duration(), now)
}

/// "Next" state for a window that was not produced by a step (initial render).
pub fn is_next_disabled(start: DateTime<Utc>, granularity: Granularity, now: DateTime<Utc>) -> bool {
    !can_advance(start, granularity.duration(), now)
}
