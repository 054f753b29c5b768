use std::ops::Range;

/// A histogram representation of a dataset's distribution.
///
/// The data range `[min, max]` is split into equally wide bins. Every bin is
/// half-open except the last one, which also includes `max`, so every input
/// value lands in exactly one bin.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram from unsorted values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pede_stats::histogram::Histogram;
    /// let values = [5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 6.0, 10.0];
    /// let histogram = Histogram::new(values, 3);
    /// assert_eq!(histogram.bins.len(), 3);
    /// assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 10);
    /// ```
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, num_bins)
    }

    /// Creates a histogram from pre-sorted values.
    ///
    /// When all values are equal, the bins span `value - 0.5 .. value + 0.5`
    /// so the single value still has a visible bar.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], num_bins: usize) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let (Some(&first), Some(&last)) = (sorted_values.first(), sorted_values.last()) else {
            return Self { bins: vec![] };
        };
        if num_bins == 0 {
            return Self { bins: vec![] };
        }

        let (lo, hi) = if last - first < f64::EPSILON {
            (first - 0.5, last + 0.5)
        } else {
            (first, last)
        };
        let width = (hi - lo) / num_bins as f64;

        // Recompute bin boundaries from the index to avoid accumulated error
        let mut bins = (0..num_bins)
            .map(|idx| {
                let start = lo + width * idx as f64;
                let end = if idx + 1 == num_bins {
                    hi
                } else {
                    lo + width * (idx + 1) as f64
                };
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for &val in sorted_values {
            let idx = (((val - lo) / width).floor().max(0.0) as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// The largest bin count, used to scale chart axes.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}
