use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::core::util::clock::Clock;
use crate::domain::chart::model::Granularity;

fn format_for(granularity: Granularity) -> &'static str {
    if granularity.is_diurnal() {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    }
}

/// `"{start} - {end}"` in local time, with `end = min(start + granularity, now)`.
pub fn label(start: DateTime<Utc>, granularity: Granularity, clock: &dyn Clock, tz: &Tz) -> String {
    let now = clock.now();
    let end = start
        .checked_add_signed(granularity.duration())
        .map_or(now, |end| end.min(now));
    let fmt = format_for(granularity);
    format!(
        "{} - {}",
        start.with_timezone(tz).format(fmt),
        end.with_timezone(tz).format(fmt)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::util::clock::FixedClock;
    use chrono::TimeZone;

    #[test]
    fn current_window_ends_now() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 0).unwrap());
        let start = Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(
            label(start, Granularity::Day, &clock, &Tz::UTC),
            "2023-12-25 00:00 - 2023-12-25 15:30"
        );
    }

    #[test]
    fn elapsed_window_shows_nominal_end() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 0).unwrap());
        let start = Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap();
        assert_eq!(
            label(start, Granularity::Week, &clock, &Tz::UTC),
            "2023-11-01 - 2023-11-08"
        );
    }

    #[test]
    fn end_never_exceeds_now() {
        let now = Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 0).unwrap();
        let clock = FixedClock::new(now);
        for g in Granularity::ALL {
            let start = now - chrono::Duration::minutes(10);
            let text = label(start, g, &clock, &Tz::UTC);
            let end_part = text.rsplit(" - ").next().unwrap();
            let expected = now.format(format_for(g)).to_string();
            assert_eq!(end_part, expected, "{g}");
        }
    }

    #[test]
    fn start_at_end_of_time_ends_now() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 0).unwrap());
        let text = label(DateTime::<Utc>::MAX_UTC, Granularity::Year, &clock, &Tz::UTC);
        assert!(text.ends_with(" - 2023-12-25"));
    }

    #[test]
    fn formats_in_local_time() {
        let tz: Tz = "Europe/Prague".parse().unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 0).unwrap());
        let start = Utc.with_ymd_and_hms(2023, 12, 24, 23, 0, 0).unwrap();
        assert!(label(start, Granularity::Day, &clock, &tz).starts_with("2023-12-25 00:00"));
    }
}
