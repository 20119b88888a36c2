use chrono::Duration;

use crate::domain::chart::model::{BucketSize, ChartMode, Granularity};

/// Upper bound of points returned for a line chart.
pub const MAX_LINE_POINTS: i64 = 400;

/// Bars get far fewer, wider buckets.
pub const MAX_BAR_POINTS: i64 = 40;

/// Candidate bucket sizes, finest first.
pub const BUCKET_LADDER: [BucketSize; 11] = [
    BucketSize::ONE_MINUTE,
    BucketSize::FIVE_MINUTES,
    BucketSize::FIFTEEN_MINUTES,
    BucketSize::THIRTY_MINUTES,
    BucketSize::ONE_HOUR,
    BucketSize::THREE_HOURS,
    BucketSize::SIX_HOURS,
    BucketSize::TWELVE_HOURS,
    BucketSize::ONE_DAY,
    BucketSize::SEVEN_DAYS,
    BucketSize::THIRTY_DAYS,
];

fn max_points(mode: ChartMode) -> i64 {
    match mode {
        ChartMode::Line => MAX_LINE_POINTS,
        ChartMode::Bar => MAX_BAR_POINTS,
    }
}

/// Finest bucket keeping `window_length / bucket` within the mode's point budget.
///
/// Monotonic in `window_length` for a fixed mode; non-positive lengths get the finest
/// bucket and lengths beyond the ladder get the coarsest.
pub fn select_bucket_size(window_length: Duration, mode: ChartMode) -> BucketSize {
    let length_ms = window_length.num_milliseconds();
    if length_ms <= 0 {
        return BUCKET_LADDER[0];
    }

    let budget = max_points(mode);
    BUCKET_LADDER
        .iter()
        .copied()
        .find(|bucket| {
            let bucket_ms = bucket.as_millis();
            // ceil(length / bucket) <= budget, without overflowing near i64::MAX
            let points = length_ms / bucket_ms + i64::from(length_ms % bucket_ms != 0);
            points <= budget
        })
        .unwrap_or(BUCKET_LADDER[BUCKET_LADDER.len() - 1])
}

pub fn bucket_size_for_granularity(granularity: Granularity, mode: ChartMode) -> BucketSize {
    select_bucket_size(granularity.duration(), mode)
}

/// Unknown granularity constants are treated as DAY.
pub fn bucket_size_for_millis(granularity_ms: i64, mode: ChartMode) -> BucketSize {
    bucket_size_for_granularity(Granularity::from_millis_or_default(granularity_ms), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_lengths_get_the_coarsest_bucket() {
        let longest = Duration::milliseconds(i64::MAX);
        assert_eq!(select_bucket_size(longest, ChartMode::Line), BucketSize::THIRTY_DAYS);
        assert_eq!(select_bucket_size(longest, ChartMode::Bar), BucketSize::THIRTY_DAYS);
    }

    #[test]
    fn line_buckets_per_granularity() {
        let picks: Vec<_> = Granularity::ALL
            .iter()
            .map(|g| bucket_size_for_granularity(*g, ChartMode::Line).token())
            .collect();
        assert_eq!(picks, vec!["1m", "5m", "30m", "3h", "1d"]);
    }

    #[test]
    fn bar_mode_is_coarser() {
        let picks: Vec<_> = Granularity::ALL
            .iter()
            .map(|g| bucket_size_for_granularity(*g, ChartMode::Bar).token())
            .collect();
        assert_eq!(picks, vec!["5m", "1h", "6h", "1d", "30d"]);

        for g in Granularity::ALL {
            assert!(
                bucket_size_for_granularity(g, ChartMode::Bar)
                    >= bucket_size_for_granularity(g, ChartMode::Line)
            );
        }
    }

    #[test]
    fn monotonic_in_window_length() {
        for mode in [ChartMode::Line, ChartMode::Bar] {
            let mut previous = select_bucket_size(Duration::zero(), mode);
            let mut length = Duration::minutes(1);
            while length < Duration::days(2000) {
                let current = select_bucket_size(length, mode);
                assert!(current >= previous, "{mode:?} not monotonic at {length}");
                previous = current;
                length = length + Duration::minutes(37) + length / 9;
            }
        }
    }

    #[test]
    fn point_count_stays_bounded_inside_ladder() {
        for days in [1, 7, 30, 365] {
            let length = Duration::days(days);
            let bucket = select_bucket_size(length, ChartMode::Line);
            assert!(length.num_milliseconds() / bucket.as_millis() <= MAX_LINE_POINTS);
        }
    }

    #[test]
    fn degenerate_lengths() {
        assert_eq!(
            select_bucket_size(Duration::milliseconds(-5), ChartMode::Line),
            BucketSize::ONE_MINUTE
        );
        assert_eq!(
            select_bucket_size(Duration::days(100_000), ChartMode::Line),
            BucketSize::THIRTY_DAYS
        );
    }

    #[test]
    fn unknown_granularity_uses_day_bucket() {
        assert_eq!(
            bucket_size_for_millis(1, ChartMode::Line),
            bucket_size_for_granularity(Granularity::Day, ChartMode::Line)
        );
    }

    #[test]
    fn deterministic() {
        let a = select_bucket_size(Duration::hours(50), ChartMode::Bar);
        let b = select_bucket_size(Duration::hours(50), ChartMode::Bar);
        assert_eq!(a, b);
    }
}
