pub struct NumericUtil;

impl NumericUtil {
    /// `numerator / denominator`, or 0.0 when the result would be NaN or infinite.
    #[inline]
    pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
        if denominator == 0.0 {
            return 0.0;
        }
        let ratio = numerator / denominator;
        if ratio.is_finite() {
            ratio
        } else {
            0.0
        }
    }

    /// Arithmetic mean of the finite values, `None` when there are none.
    pub fn safe_mean<I>(values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let (sum, count) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            None
        } else {
            Some(Self::safe_ratio(sum, count as f64))
        }
    }

    #[inline]
    pub fn round_to(value: f64, decimals: u32) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        let factor = 10f64.powi(decimals as i32);
        let rounded = (value * factor).round() / factor;
        if rounded.is_finite() {
            rounded
        } else {
            0.0
        }
    }
}
