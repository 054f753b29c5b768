/// The percentile points reported throughout the indicator reports.
pub const REPORT_POINTS: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of commonly used percentile points.
///
/// # Examples
///
/// ```
/// use pede_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(5.5));
/// assert_eq!(percentiles.get(25.0), Some(3.25));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// Percentile-value pairs in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values.
    ///
    /// This method will sort the values internally before computing percentiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use pede_stats::percentiles::Percentiles;
    ///
    /// let values = vec![5.0, 2.0, 8.0, 1.0, 9.0];
    /// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(5.0));
    /// ```
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    ///
    /// ```
    /// use pede_stats::percentiles::Percentiles;
    ///
    /// let percentiles = Percentiles::new(&[1.0, 2.0, 3.0, 4.0, 5.0], &[50.0, 90.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(3.0));
    /// assert_eq!(percentiles.get(25.0), None); // Not precomputed
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }

    /// Returns all percentile-value pairs as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.values
    }
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two nearest order statistics: for
/// `n` values the rank is `(n - 1) * p / 100` and the fractional part weights
/// the neighbouring values. This matches the default quantile definition of
/// the common dataframe libraries.
///
/// Returns `f64::NAN` if the input is empty. `percentile` is clamped to
/// `0.0..=100.0`.
///
/// # Examples
///
/// ```
/// use pede_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// assert!(compute_percentile(&[], 50.0).is_nan());
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    let rank = (n - 1) as f64 * percentile.clamp(0.0, 100.0) / 100.0;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let weight = rank - rank.floor();
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_points_are_monotonic() {
        let values = [7.3, 1.0, 4.4, 9.9, 2.2, 2.2, 8.0, 5.5, 3.1];
        let percentiles = Percentiles::new(&values, &REPORT_POINTS);
        let computed = percentiles.iter().map(|(_, v)| v).collect::<Vec<_>>();
        assert!(computed.is_sorted_by(|a, b| a <= b), "{computed:?}");
    }

    #[test]
    fn test_interpolates_between_order_statistics() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((compute_percentile(&values, 10.0) - 14.0).abs() < 1e-12);
        assert!((compute_percentile(&values, 90.0) - 46.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(compute_percentile(&[3.5], 25.0), 3.5);
        assert_eq!(compute_percentile(&[3.5], 75.0), 3.5);
    }

    #[test]
    fn test_preserves_requested_order() {
        let percentiles = Percentiles::new(&[1.0, 2.0, 3.0], &[75.0, 25.0]);
        assert_eq!(percentiles.as_slice(), &[(75.0, 2.5), (25.0, 1.5)]);
    }
}
