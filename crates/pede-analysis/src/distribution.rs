//! Distribution summary and frequency tables of an indicator
//!
//! Missing cells never enter a statistic; they are counted separately so that
//! `present + missing == total` always holds. An all-missing indicator yields
//! a summary whose statistics are NaN.
//!
//! # Frequency Percentages
//!
//! Each frequency table picks its own percentage denominator with
//! [`Denominator`]: every row of the dataset, or only rows where the indicator
//! is present. With total rows as the denominator the percentages of a table
//! with missing cells do not sum to 100.
//!
//! # Examples
//!
//! ```
//! use pede_analysis::distribution::{Denominator, FrequencyTable};
//!
//! let ian = [Some(2.5), Some(5.0), Some(5.0), Some(10.0), None];
//! let table = FrequencyTable::by_value(&ian, Denominator::TotalRows);
//!
//! let percents = table.rows.iter().map(|r| r.percent).collect::<Vec<_>>();
//! assert_eq!(percents, vec![20.0, 40.0, 20.0]);
//! ```

use pede_stats::{
    binning::{BandCount, Bands},
    comprehensive::ComprehensiveStats,
    frequency,
    percentiles::REPORT_POINTS,
};

/// Count, missing count and distribution statistics of one indicator.
#[derive(Debug, Clone)]
pub struct DistributionSummary {
    pub total: usize,
    pub present: usize,
    pub missing: usize,
    /// `None` when every cell is missing
    pub stats: Option<ComprehensiveStats>,
}

impl DistributionSummary {
    /// Summarizes an indicator with the report percentiles (P10, P25, P50, P75, P90).
    #[must_use]
    pub fn new(values: &[Option<f64>], hist_num_bins: usize) -> Self {
        Self::with_percentiles(values, &REPORT_POINTS, hist_num_bins)
    }

    /// Summarizes an indicator with the given percentile points (0-100).
    #[must_use]
    pub fn with_percentiles(
        values: &[Option<f64>],
        percentile_points: &[f64],
        hist_num_bins: usize,
    ) -> Self {
        let present_values = present(values);
        let stats = ComprehensiveStats::new(
            present_values.iter().copied(),
            percentile_points,
            hist_num_bins,
        );
        Self {
            total: values.len(),
            present: present_values.len(),
            missing: values.len() - present_values.len(),
            stats,
        }
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.stats.as_ref().map_or(f64::NAN, |s| s.stats.mean)
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.stats.as_ref().map_or(f64::NAN, |s| s.stats.median)
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.stats.as_ref().map_or(f64::NAN, |s| s.stats.std_dev)
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.stats.as_ref().map_or(f64::NAN, |s| s.stats.min)
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.stats.as_ref().map_or(f64::NAN, |s| s.stats.max)
    }

    /// Value at a precomputed percentile, NaN if unavailable.
    #[must_use]
    pub fn percentile(&self, percentile: f64) -> f64 {
        self.stats
            .as_ref()
            .and_then(|s| s.percentiles.get(percentile))
            .unwrap_or(f64::NAN)
    }

    /// Rows of a `describe`-style table.
    ///
    /// Statistic names are `count`, `mean`, `std`, `min`, one `P<n>` per
    /// percentile, `max` and `missing`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn describe(&self) -> Vec<(String, f64)> {
        let mut rows = vec![
            ("count".to_owned(), self.present as f64),
            ("mean".to_owned(), self.mean()),
            ("std".to_owned(), self.std_dev()),
            ("min".to_owned(), self.min()),
        ];
        if let Some(stats) = &self.stats {
            rows.extend(stats.percentiles.iter().map(|(p, v)| (format!("P{p}"), v)));
        } else {
            rows.extend(REPORT_POINTS.iter().map(|p| (format!("P{p}"), f64::NAN)));
        }
        rows.push(("max".to_owned(), self.max()));
        rows.push(("missing".to_owned(), self.missing as f64));
        rows
    }
}

/// Denominator of frequency percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denominator {
    /// Every row of the dataset, including rows with a missing indicator
    TotalRows,
    /// Rows with a present indicator
    Present,
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    /// Distinct value or band label
    pub label: String,
    pub count: usize,
    /// Percentage of the table's denominator, NaN when the denominator is 0
    pub percent: f64,
}

/// Counts and percentages of an indicator, per distinct value or per band.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    pub denominator: Denominator,
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    /// Counts each distinct present value, in ascending value order.
    #[must_use]
    pub fn by_value(values: &[Option<f64>], denominator: Denominator) -> Self {
        let base = denominator_of(values, denominator);
        let rows = frequency::value_counts(values.iter().flatten().copied())
            .into_iter()
            .map(|vc| FrequencyRow {
                label: vc.value.to_string(),
                count: vc.count,
                percent: percent(vc.count, base),
            })
            .collect();
        Self { denominator, rows }
    }

    /// Counts present values per band, in ascending band order.
    #[must_use]
    pub fn by_band(values: &[Option<f64>], bands: &Bands, denominator: Denominator) -> Self {
        let base = denominator_of(values, denominator);
        let rows = bands
            .count(values.iter().flatten().copied())
            .into_iter()
            .map(|BandCount { label, count, .. }| FrequencyRow {
                label,
                count,
                percent: percent(count, base),
            })
            .collect();
        Self { denominator, rows }
    }

    /// Band counts over quantile edges of the present values.
    ///
    /// Returns an empty table when every value is missing.
    #[must_use]
    pub fn by_quantile_bands(
        values: &[Option<f64>],
        levels: &[f64],
        decimals: i32,
        denominator: Denominator,
    ) -> Self {
        match Bands::from_quantiles(&present(values), levels, decimals) {
            Some(bands) => Self::by_band(values, &bands, denominator),
            None => Self {
                denominator,
                rows: vec![],
            },
        }
    }
}

/// The present values, in row order.
#[must_use]
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

fn denominator_of(values: &[Option<f64>], denominator: Denominator) -> usize {
    match denominator {
        Denominator::TotalRows => values.len(),
        Denominator::Present => values.iter().flatten().count(),
    }
}

#[expect(clippy::cast_precision_loss)]
fn percent(count: usize, base: usize) -> f64 {
    if base == 0 {
        f64::NAN
    } else {
        count as f64 * 100.0 / base as f64
    }
}
