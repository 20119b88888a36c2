use chrono::Timelike;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::chart::model::Series;

pub const DAY_SERIES_NAME: &str = "day";
pub const NIGHT_SERIES_NAME: &str = "night";

/// Fixed local-hour heuristic for daylight; sunrise/sunset are not consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_boundary_order"))]
pub struct DiurnalBoundary {
    /// First local hour counted as day.
    #[validate(range(max = 23))]
    pub day_start_hour: u32,
    /// First local hour counted as night again.
    #[validate(range(min = 1, max = 24))]
    pub night_start_hour: u32,
}

impl Default for DiurnalBoundary {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            night_start_hour: 20,
        }
    }
}

fn validate_boundary_order(boundary: &DiurnalBoundary) -> Result<(), ValidationError> {
    if boundary.day_start_hour >= boundary.night_start_hour {
        return Err(ValidationError::new("day_must_start_before_night"));
    }
    Ok(())
}

impl DiurnalBoundary {
    pub fn is_day_hour(&self, hour: u32) -> bool {
        hour >= self.day_start_hour && hour < self.night_start_hour
    }
}

/// Partitions `series` into `(day, night)`; every point lands in exactly one side and
/// order is preserved on both.
pub fn split_day_night(series: &Series, tz: &Tz, boundary: &DiurnalBoundary) -> (Series, Series) {
    let (day, night): (Vec<_>, Vec<_>) = series
        .points
        .iter()
        .cloned()
        .partition(|p| boundary.is_day_hour(p.date.with_timezone(tz).hour()));

    (
        Series::named(DAY_SERIES_NAME, day),
        Series::named(NIGHT_SERIES_NAME, night),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::model::DataPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn hourly(count: i64) -> Series {
        let start = Utc.with_ymd_and_hms(2023, 6, 21, 0, 0, 0).unwrap();
        Series::new(
            (0..count)
                .map(|h| {
                    let value = if h % 5 == 0 { None } else { Some(h as f64) };
                    DataPoint::new(start + Duration::hours(h), value)
                })
                .collect(),
        )
    }

    #[test]
    fn one_day_of_hourly_points_is_partitioned() {
        let series = hourly(24);
        let (day, night) = split_day_night(&series, &Tz::UTC, &DiurnalBoundary::default());

        assert_eq!(day.len() + night.len(), 24);
        assert_eq!(day.len(), 14);
        assert!(day.points.iter().all(|p| !night.points.contains(p)));
        for p in &series.points {
            let hits = day.points.iter().filter(|d| *d == p).count()
                + night.points.iter().filter(|n| *n == p).count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn empty_series_gives_two_empty_sides() {
        let (day, night) =
            split_day_night(&Series::default(), &Tz::UTC, &DiurnalBoundary::default());
        assert!(day.is_empty());
        assert!(night.is_empty());
    }

    #[test]
    fn single_point_goes_to_exactly_one_side() {
        let (day, night) = split_day_night(&hourly(1), &Tz::UTC, &DiurnalBoundary::default());
        assert_eq!((day.len(), night.len()), (0, 1));
    }

    #[test]
    fn uses_local_hours() {
        // 04:00 UTC is 06:00 in Prague during summer time.
        let tz: Tz = "Europe/Prague".parse().unwrap();
        let point = DataPoint::new(Utc.with_ymd_and_hms(2023, 6, 21, 4, 0, 0).unwrap(), Some(1.0));
        let (day, _) = split_day_night(&Series::new(vec![point]), &tz, &DiurnalBoundary::default());
        assert_eq!(day.len(), 1);
    }

    #[test]
    fn boundary_validation() {
        assert!(DiurnalBoundary::default().validate().is_ok());
        let bad = DiurnalBoundary {
            day_start_hour: 30,
            night_start_hour: 20,
        };
        assert!(bad.validate().is_err());

        let inverted = DiurnalBoundary {
            day_start_hour: 20,
            night_start_hour: 6,
        };
        assert!(inverted.validate().is_err());
    }
}
