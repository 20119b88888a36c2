//! Calendar-aligned window boundaries in the dashboard's local time zone.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::core::util::clock::Clock;
use crate::domain::chart::model::{Granularity, TimeWindow};

/// First instant of `date` in `tz` (normally 00:00:00.000).
pub fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    // Midnight skipped by a DST jump: the day starts at the first valid local minute.
    (1..=180)
        .find_map(|m| {
            tz.from_local_datetime(&(naive + Duration::minutes(m)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Last millisecond of `date` in `tz` (normally 23:59:59.999).
pub fn end_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let next = date.succ_opt().unwrap_or(date);
    local_midnight(tz, next) - Duration::milliseconds(1)
}

/// Local midnight of today, minus `offset`.
///
/// Whole days are subtracted on the calendar so the result stays on midnight across
/// DST changes; a sub-day remainder is subtracted as a fixed duration.
pub fn start_of_current_day(clock: &dyn Clock, tz: &Tz, offset: Duration) -> DateTime<Utc> {
    let today = clock.now().with_timezone(tz).date_naive();
    let whole_days = offset.num_days();
    let remainder = offset - Duration::days(whole_days);

    let date = if whole_days >= 0 {
        today.checked_sub_days(Days::new(whole_days as u64))
    } else {
        today.checked_add_days(Days::new(whole_days.unsigned_abs()))
    }
    .unwrap_or(today);

    local_midnight(tz, date) - remainder
}

pub fn end_of_current_day(clock: &dyn Clock, tz: &Tz) -> DateTime<Utc> {
    let today = clock.now().with_timezone(tz).date_naive();
    end_of_day(tz, today)
}

/// Default window start: a rolling hour for HOUR, day-aligned for everything else.
pub fn window_start_for_granularity(
    clock: &dyn Clock,
    tz: &Tz,
    granularity: Granularity,
) -> DateTime<Utc> {
    match granularity {
        Granularity::Hour => clock.now() - granularity.duration(),
        other => start_of_current_day(clock, tz, other.duration()),
    }
}

/// Same as [`window_start_for_granularity`] for a raw millisecond constant; unknown
/// values are treated as DAY.
pub fn window_start_for_millis(clock: &dyn Clock, tz: &Tz, granularity_ms: i64) -> DateTime<Utc> {
    window_start_for_granularity(clock, tz, Granularity::from_millis_or_default(granularity_ms))
}

/// Query bounds for the window starting at `start`.
///
/// A nominal end that lands exactly on a local day boundary is pulled back to the
/// previous day's last millisecond; the end is then clamped to now. An end past the
/// representable range saturates to now.
pub fn window_bounds(
    clock: &dyn Clock,
    tz: &Tz,
    start: DateTime<Utc>,
    granularity: Granularity,
) -> TimeWindow {
    let now = clock.now();
    let end = match start.checked_add_signed(granularity.duration()) {
        Some(nominal_end) => {
            let local_end = nominal_end.with_timezone(tz);
            if local_end.time() == NaiveTime::MIN {
                let day_before = local_end.date_naive().pred_opt().unwrap_or(local_end.date_naive());
                end_of_day(tz, day_before)
            } else {
                nominal_end
            }
        }
        None => now,
    };

    let window = TimeWindow {
        start,
        end: end.min(now),
    };
    if !window.is_valid_at(now) {
        debug!(
            "Window {} - {} is empty at {}",
            window.start, window.end, now
        );
    }
    window
}
