use crate::{descriptive::DescriptiveStats, histogram::Histogram, percentiles::Percentiles};

/// Comprehensive statistical analysis combining multiple measures.
///
/// This structure provides a complete statistical overview of a dataset by combining:
/// - Basic descriptive statistics (count, mean, median, standard deviation, min/max)
/// - Percentile values for quantile analysis
/// - Histogram for distribution visualization
///
/// All three share one sort of the input.
///
/// # Examples
///
/// ```
/// use pede_stats::comprehensive::ComprehensiveStats;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let stats = ComprehensiveStats::new(
///     values,
///     &[25.0, 50.0, 75.0], // Percentiles to compute
///     5,                   // Number of histogram bins
/// ).unwrap();
///
/// assert_eq!(stats.stats.mean, 5.5);
/// assert_eq!(stats.percentiles.get(50.0), Some(5.5));
/// assert_eq!(stats.histogram.bins.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ComprehensiveStats {
    /// Basic descriptive statistics for the dataset.
    pub stats: DescriptiveStats,
    /// Precomputed percentile values for quick lookup.
    pub percentiles: Percentiles,
    /// Histogram showing the distribution of values across bins.
    pub histogram: Histogram,
}

impl ComprehensiveStats {
    /// Computes comprehensive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(ComprehensiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    #[must_use]
    pub fn new<I>(values: I, percentile_points: &[f64], hist_num_bins: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points, hist_num_bins)
    }

    /// Computes comprehensive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pede_stats::comprehensive::ComprehensiveStats;
    ///
    /// let mut values = [5.0, 2.0, 8.0, 1.0, 9.0];
    /// values.sort_by(f64::total_cmp);
    ///
    /// let stats = ComprehensiveStats::from_sorted(&values, &[25.0, 50.0, 75.0], 5).unwrap();
    ///
    /// assert_eq!(stats.stats.min, 1.0);
    /// assert_eq!(stats.stats.max, 9.0);
    /// ```
    #[must_use]
    pub fn from_sorted(
        sorted_values: &[f64],
        percentile_points: &[f64],
        hist_num_bins: usize,
    ) -> Option<Self> {
        let stats = DescriptiveStats::from_sorted(sorted_values)?;
        let percentiles = Percentiles::from_sorted(sorted_values, percentile_points);
        let histogram = Histogram::from_sorted(sorted_values, hist_num_bins);

        Some(Self {
            stats,
            percentiles,
            histogram,
        })
    }
}
