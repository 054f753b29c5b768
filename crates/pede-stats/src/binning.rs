//! Quantile banding for continuous indicators
//!
//! Continuous scores are easier to read as a handful of bands than as raw
//! values. This module builds band edges from quantiles of the data itself,
//! so the bands follow the distribution instead of fixed intervals.
//!
//! # Band Construction
//!
//! 1. Compute the requested quantiles of the sorted values (linear interpolation)
//! 2. Round each edge to a fixed number of decimals (ties to even)
//! 3. Drop duplicate edges
//! 4. If fewer than [`MIN_QUANTILE_EDGES`] edges remain, fall back to
//!    [`FALLBACK_BANDS`] equally wide bands between min and max
//!
//! Intervals are closed on the right. The first interval is closed on both
//! sides so the minimum is counted. Values outside the outer edges (possible
//! after rounding) do not fall in any band.
//!
//! # Examples
//!
//! ```
//! use pede_stats::binning::{Bands, DECILE_QUARTILE_EDGES};
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
//! let bands = Bands::from_quantiles(&values, &DECILE_QUARTILE_EDGES, 4).unwrap();
//!
//! assert_eq!(bands.len(), 6);
//! assert_eq!(bands.label(0), "[1, 1.9]");
//! assert_eq!(bands.assign(1.0), Some(0));
//! assert_eq!(bands.assign(10.0), Some(5));
//! ```

use crate::percentiles;

/// Quantile levels (0.0-1.0) used to build the indicator bands.
pub const DECILE_QUARTILE_EDGES: [f64; 7] = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];

/// Minimum number of distinct quantile edges before falling back to equal widths.
pub const MIN_QUANTILE_EDGES: usize = 4;

/// Number of equally wide bands used by the fallback.
pub const FALLBACK_BANDS: usize = 5;

/// Interval bands described by their ascending edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    edges: Vec<f64>,
}

/// The number of values that fell into one band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandCount {
    /// Human-readable interval label, e.g. `(2.5, 5]`.
    pub label: String,
    /// Values falling in the band.
    pub count: usize,
}

impl Bands {
    /// Builds bands from quantile levels of the values.
    ///
    /// `levels` are fractions in `0.0..=1.0`. Returns `None` if `values` is empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_quantiles(values: &[f64], levels: &[f64], decimals: i32) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        let mut edges = levels
            .iter()
            .map(|level| round_to(percentiles::compute_percentile(&sorted, level * 100.0), decimals))
            .collect::<Vec<_>>();
        edges.sort_by(f64::total_cmp);
        edges.dedup();

        if edges.len() < MIN_QUANTILE_EDGES {
            let step = (max - min) / FALLBACK_BANDS as f64;
            edges = (0..=FALLBACK_BANDS)
                .map(|i| if i == FALLBACK_BANDS { max } else { min + step * i as f64 })
                .collect();
            edges.dedup();
        }

        if edges.len() == 1 {
            // Every value is identical: a single degenerate band
            edges.push(edges[0]);
        }

        Some(Self { edges })
    }

    /// Number of bands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    /// Always false: bands are only built from non-empty data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ascending band edges.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Index of the band containing `value`, if any.
    #[must_use]
    pub fn assign(&self, value: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        if value < first {
            return None;
        }
        self.edges
            .windows(2)
            .position(|w| (value > w[0] || value == first) && value <= w[1])
    }

    /// Interval label of band `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn label(&self, idx: usize) -> String {
        let (lower, upper) = (self.edges[idx], self.edges[idx + 1]);
        if idx == 0 {
            format!("[{lower}, {upper}]")
        } else {
            format!("({lower}, {upper}]")
        }
    }

    /// Counts the values per band, in ascending band order.
    #[must_use]
    pub fn count<I>(&self, values: I) -> Vec<BandCount>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts = vec![0; self.len()];
        for value in values {
            if let Some(idx) = self.assign(value) {
                counts[idx] += 1;
            }
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(idx, count)| BandCount {
                label: self.label(idx),
                count,
            })
            .collect()
    }
}

/// Rounds to `decimals` places with ties going to the even neighbour.
///
/// ```
/// # use pede_stats::binning::round_to;
/// assert_eq!(round_to(2.675_01, 2), 2.68);
/// assert_eq!(round_to(0.125, 2), 0.12);
/// ```
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(Bands::from_quantiles(&[], &DECILE_QUARTILE_EDGES, 4).is_none());
    }

    #[test]
    fn test_falls_back_to_equal_width() {
        // Quantile edges collapse to {1, 1.1, 2}, fewer than the minimum
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0];
        let bands = Bands::from_quantiles(&values, &DECILE_QUARTILE_EDGES, 4).unwrap();
        assert_eq!(bands.len(), FALLBACK_BANDS);
        assert_eq!(bands.edges().first(), Some(&1.0));
        assert_eq!(bands.edges().last(), Some(&2.0));
        let counts = bands.count(values);
        assert_eq!(counts[0].count, 9);
        assert_eq!(counts[4].count, 1);
    }

    #[test]
    fn test_constant_values_form_single_band() {
        let bands = Bands::from_quantiles(&[3.0, 3.0, 3.0], &DECILE_QUARTILE_EDGES, 4).unwrap();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands.assign(3.0), Some(0));
        assert_eq!(bands.count([3.0, 3.0, 3.0])[0].count, 3);
    }

    #[test]
    fn test_right_closed_intervals() {
        let bands = Bands { edges: vec![0.0, 1.0, 2.0] };
        assert_eq!(bands.assign(0.0), Some(0));
        assert_eq!(bands.assign(1.0), Some(0));
        assert_eq!(bands.assign(1.5), Some(1));
        assert_eq!(bands.assign(2.0), Some(1));
        assert_eq!(bands.assign(2.1), None);
        assert_eq!(bands.assign(-0.1), None);
        assert_eq!(bands.label(1), "(1, 2]");
    }

    #[test]
    fn test_band_counts_carry_labels() {
        let bands = Bands { edges: vec![0.0, 1.0, 2.0] };
        assert_eq!(
            bands.count([0.0, 0.5, 2.0]),
            vec![
                BandCount { label: "[0, 1]".to_owned(), count: 2 },
                BandCount { label: "(1, 2]".to_owned(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_counts_cover_all_values() {
        let values = (1..=50).map(f64::from).collect::<Vec<_>>();
        let bands = Bands::from_quantiles(&values, &DECILE_QUARTILE_EDGES, 4).unwrap();
        let total = bands.count(values.iter().copied()).iter().map(|b| b.count).sum::<usize>();
        assert_eq!(total, 50);
    }
}
