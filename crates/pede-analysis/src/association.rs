//! Association between indicators
//!
//! Correlations use only pairwise-complete rows: rows where both indicators
//! are present. Below [`MIN_PAIRED_OBSERVATIONS`] such rows both coefficients
//! are NaN.
//!
//! The low/high comparison contrasts the mean of other indicators between two
//! buckets of the primary indicator. Its delta is always `high - low`.

use pede_stats::{correlation, descriptive};

/// Fewest complete pairs for which a correlation is reported.
pub const MIN_PAIRED_OBSERVATIONS: usize = 5;

/// Linear and rank correlation between two indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Association {
    /// Pairwise-complete rows
    pub pairs: usize,
    pub pearson: f64,
    pub spearman: f64,
}

impl Association {
    /// Correlates two indicators over their pairwise-complete rows.
    ///
    /// # Panics
    ///
    /// Panics if `x` and `y` differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use pede_analysis::association::Association;
    ///
    /// let ieg = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(5.0)];
    /// let ida = [Some(2.0), Some(4.0), Some(1.0), Some(6.0), Some(8.0), Some(10.0)];
    ///
    /// let assoc = Association::between(&ieg, &ida);
    /// assert_eq!(assoc.pairs, 5);
    /// assert!((assoc.pearson - 1.0).abs() < 1e-12);
    ///
    /// let short = Association::between(&ieg[..4], &ida[..4]);
    /// assert!(short.pearson.is_nan() && short.spearman.is_nan());
    /// ```
    #[must_use]
    pub fn between(x: &[Option<f64>], y: &[Option<f64>]) -> Self {
        let (xs, ys) = complete_pairs(x, y);
        let pairs = xs.len();
        if pairs < MIN_PAIRED_OBSERVATIONS {
            return Self {
                pairs,
                pearson: f64::NAN,
                spearman: f64::NAN,
            };
        }
        Self {
            pairs,
            pearson: correlation::pearson(&xs, &ys),
            spearman: correlation::spearman(&xs, &ys),
        }
    }
}

/// Paired values of the rows where both indicators are present.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
#[must_use]
pub fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    assert_eq!(x.len(), y.len(), "indicators must have equal length");
    x.iter()
        .zip(y)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

/// Number of rows where every given indicator is present.
#[must_use]
pub fn complete_rows(columns: &[&[Option<f64>]]) -> usize {
    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    (0..rows)
        .filter(|&row| columns.iter().all(|c| c[row].is_some()))
        .count()
}

/// Means of the compared indicators within one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketMeans {
    pub label: String,
    /// Rows in the bucket
    pub rows: usize,
    /// One mean per compared indicator, over its present values in the bucket
    pub means: Vec<f64>,
}

impl BucketMeans {
    fn compute(label: &str, members: &[bool], indicators: &[&[Option<f64>]]) -> Self {
        let means = indicators
            .iter()
            .map(|values| {
                descriptive::mean(
                    values
                        .iter()
                        .zip(members)
                        .filter_map(|(v, &member)| if member { *v } else { None }),
                )
            })
            .collect();
        Self {
            label: label.to_owned(),
            rows: members.iter().filter(|m| **m).count(),
            means,
        }
    }
}

/// Mean of other indicators in the low and high buckets of a primary one.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanComparison {
    /// Names of the compared indicators, in the order of `means`
    pub indicators: Vec<String>,
    pub low: BucketMeans,
    pub high: BucketMeans,
}

impl MeanComparison {
    /// Compares bucket means of every named indicator.
    ///
    /// `low` and `high` are per-row bucket memberships.
    ///
    /// # Panics
    ///
    /// Panics if any column length differs from the membership length.
    #[must_use]
    pub fn compute(low: &[bool], high: &[bool], indicators: &[(&str, &[Option<f64>])]) -> Self {
        assert_eq!(low.len(), high.len(), "memberships must have equal length");
        assert!(
            indicators.iter().all(|(_, values)| values.len() == low.len()),
            "indicators must have one value per row"
        );

        let columns = indicators.iter().map(|(_, v)| *v).collect::<Vec<_>>();
        Self {
            indicators: indicators.iter().map(|(name, _)| (*name).to_owned()).collect(),
            low: BucketMeans::compute("low", low, &columns),
            high: BucketMeans::compute("high", high, &columns),
        }
    }

    /// Signed difference `high - low` per indicator.
    #[must_use]
    pub fn delta(&self) -> Vec<f64> {
        self.high
            .means
            .iter()
            .zip(&self.low.means)
            .map(|(high, low)| high - low)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let x = column(&[6.1, 7.3, 5.0, 8.8, 9.2, 4.4, 7.0]);
        let y = column(&[5.5, 6.0, 6.1, 8.0, 7.9, 3.0, 7.2]);
        let xy = Association::between(&x, &y);
        let yx = Association::between(&y, &x);
        assert!((xy.pearson - yx.pearson).abs() < 1e-12);
        assert!((xy.spearman - yx.spearman).abs() < 1e-12);
        for r in [xy.pearson, xy.spearman] {
            assert!((-1.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn test_fewer_than_five_pairs_is_nan() {
        let x = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), None, Some(6.0)];
        let y = [Some(1.0), None, Some(3.0), Some(4.0), Some(5.0), Some(6.0)];
        let assoc = Association::between(&x, &y);
        assert_eq!(assoc.pairs, 4);
        assert!(assoc.pearson.is_nan());
        assert!(assoc.spearman.is_nan());
    }

    #[test]
    fn test_complete_rows() {
        let a = [Some(1.0), None, Some(3.0)];
        let b = [Some(1.0), Some(2.0), Some(3.0)];
        let c = [None, Some(2.0), Some(3.0)];
        assert_eq!(complete_rows(&[&a[..], &b[..]]), 2);
        assert_eq!(complete_rows(&[&a[..], &b[..], &c[..]]), 1);
    }

    #[test]
    fn test_delta_is_high_minus_low() {
        let low = [true, true, false, false];
        let high = [false, false, true, true];
        let ida = [Some(4.0), Some(6.0), Some(7.0), Some(9.0)];
        let ipv = [Some(1.0), None, Some(2.0), Some(2.0)];

        let cmp = MeanComparison::compute(
            &low,
            &high,
            &[("IDA", ida.as_slice()), ("IPV", ipv.as_slice())],
        );
        assert_eq!(cmp.low.rows, 2);
        assert_eq!(cmp.low.means, vec![5.0, 1.0]);
        assert_eq!(cmp.high.means, vec![8.0, 2.0]);
        assert_eq!(cmp.delta(), vec![3.0, 1.0]);
    }

    #[test]
    fn test_empty_bucket_mean_is_nan() {
        let ida = [Some(4.0), Some(6.0)];
        let cmp =
            MeanComparison::compute(&[false, false], &[true, true], &[("IDA", ida.as_slice())]);
        assert_eq!(cmp.low.rows, 0);
        assert!(cmp.low.means[0].is_nan());
        assert!(cmp.delta()[0].is_nan());
    }
}
