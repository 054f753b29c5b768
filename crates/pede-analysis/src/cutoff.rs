//! Cutoffs and bucket rates of an indicator
//!
//! A [`Rule`] compares an indicator value against a threshold. Thresholds come
//! in two kinds that are deliberately distinct:
//!
//! - [`Threshold::Fixed`]: a domain constant (e.g. an exact deficit level)
//! - [`Threshold::Percentile`]: a percentile of the indicator, resolved anew
//!   from every dataset it is applied to
//!
//! Resolving a rule against an indicator yields a [`Cutoff`], a comparison
//! with a concrete value.
//!
//! # Rates
//!
//! The rate of a bucket is its count over the number of **present** indicator
//! values. Rows with a missing indicator belong to no bucket and do not enter
//! the denominator.
//!
//! ```
//! use pede_analysis::cutoff::{Criterion, RateTable, Rule};
//!
//! let values = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
//! let table = RateTable::compute(&values, &[Criterion::new("low", Rule::at_most_fixed(2.0))]);
//!
//! assert_eq!(table.rows[0].count, 2);
//! assert_eq!(table.rows[0].percent(), 50.0);
//! ```

use pede_stats::percentiles::compute_percentile;

use crate::distribution::present;

/// How a value is compared against its cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    AtMost,
    AtLeast,
}

impl Comparison {
    /// Comparisons against NaN never hold.
    #[must_use]
    pub fn holds(self, value: f64, cutoff: f64) -> bool {
        match self {
            Comparison::Equal => value == cutoff,
            Comparison::AtMost => value <= cutoff,
            Comparison::AtLeast => value >= cutoff,
        }
    }
}

/// Threshold of a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// A literal domain constant
    Fixed(f64),
    /// Percentile (0-100) of the present values, linear interpolation
    Percentile(f64),
}

impl Threshold {
    /// Concrete threshold value for the given indicator.
    ///
    /// A percentile of an all-missing indicator is NaN.
    #[must_use]
    pub fn resolve(self, values: &[Option<f64>]) -> f64 {
        match self {
            Threshold::Fixed(value) => value,
            Threshold::Percentile(p) => {
                let mut sorted = present(values);
                sorted.sort_by(f64::total_cmp);
                compute_percentile(&sorted, p)
            }
        }
    }
}

/// A comparison against a threshold that is not yet resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub comparison: Comparison,
    pub threshold: Threshold,
}

impl Rule {
    #[must_use]
    pub fn equal_fixed(value: f64) -> Self {
        Self {
            comparison: Comparison::Equal,
            threshold: Threshold::Fixed(value),
        }
    }

    #[must_use]
    pub fn at_most_fixed(value: f64) -> Self {
        Self {
            comparison: Comparison::AtMost,
            threshold: Threshold::Fixed(value),
        }
    }

    #[must_use]
    pub fn at_most_percentile(percentile: f64) -> Self {
        Self {
            comparison: Comparison::AtMost,
            threshold: Threshold::Percentile(percentile),
        }
    }

    #[must_use]
    pub fn at_least_percentile(percentile: f64) -> Self {
        Self {
            comparison: Comparison::AtLeast,
            threshold: Threshold::Percentile(percentile),
        }
    }

    #[must_use]
    pub fn resolve(&self, values: &[Option<f64>]) -> Cutoff {
        Cutoff {
            comparison: self.comparison,
            value: self.threshold.resolve(values),
        }
    }
}

/// A comparison with a concrete threshold value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoff {
    pub comparison: Comparison,
    pub value: f64,
}

impl Cutoff {
    #[must_use]
    pub fn matches(&self, value: f64) -> bool {
        self.comparison.holds(value, self.value)
    }

    /// Per-row membership; rows with a missing indicator are never members.
    #[must_use]
    pub fn flags(&self, values: &[Option<f64>]) -> Vec<bool> {
        values
            .iter()
            .map(|v| v.is_some_and(|v| self.matches(v)))
            .collect()
    }
}

/// A named bucket rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub name: String,
    pub rule: Rule,
}

impl Criterion {
    #[must_use]
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Count and rate of one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub name: String,
    pub cutoff: Cutoff,
    pub count: usize,
    /// Present indicator values, the rate's denominator
    pub present: usize,
    /// `count / present`, NaN when nothing is present
    pub rate: f64,
}

impl RateRow {
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Rates of independently evaluated buckets.
///
/// Buckets of a rate table may overlap (a severe deficit is also a moderate
/// one); each row stands on its own.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub rows: Vec<RateRow>,
}

impl RateTable {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(values: &[Option<f64>], criteria: &[Criterion]) -> Self {
        let present = values.iter().flatten().count();
        let rows = criteria
            .iter()
            .map(|criterion| {
                let cutoff = criterion.rule.resolve(values);
                let count = values.iter().flatten().filter(|&&v| cutoff.matches(v)).count();
                let rate = if present == 0 {
                    f64::NAN
                } else {
                    count as f64 / present as f64
                };
                RateRow {
                    name: criterion.name.clone(),
                    cutoff,
                    count,
                    present,
                    rate,
                }
            })
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RateRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

/// Assigns every present value to exactly one named bucket.
///
/// Buckets are tried in order and the first match wins; a value matching none
/// of them falls into the fallback bucket.
///
/// ```
/// use pede_analysis::cutoff::{Classifier, Rule};
///
/// let ieg = [Some(2.0), Some(5.0), Some(9.0), None, Some(6.0)];
/// let classifier = Classifier::new(&ieg, &[("low", Rule::at_most_fixed(3.0))], "other");
///
/// assert_eq!(classifier.classify(Some(2.0)), Some("low"));
/// assert_eq!(classifier.classify(Some(5.0)), Some("other"));
/// assert_eq!(classifier.classify(None), None);
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    buckets: Vec<(String, Cutoff)>,
    fallback: String,
}

impl Classifier {
    /// Resolves the bucket rules against `values`.
    #[must_use]
    pub fn new<S>(values: &[Option<f64>], buckets: &[(S, Rule)], fallback: &str) -> Self
    where
        S: AsRef<str>,
    {
        let buckets = buckets
            .iter()
            .map(|(name, rule)| (name.as_ref().to_owned(), rule.resolve(values)))
            .collect();
        Self {
            buckets,
            fallback: fallback.to_owned(),
        }
    }

    /// Bucket names in evaluation order, followed by the fallback.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .iter()
            .map(|(name, _)| name.as_str())
            .chain([self.fallback.as_str()])
    }

    #[must_use]
    pub fn cutoff(&self, name: &str) -> Option<Cutoff> {
        self.buckets
            .iter()
            .find_map(|(bucket, cutoff)| (bucket == name).then_some(*cutoff))
    }

    #[must_use]
    pub fn classify(&self, value: Option<f64>) -> Option<&str> {
        let value = value?;
        let bucket = self
            .buckets
            .iter()
            .find(|(_, cutoff)| cutoff.matches(value))
            .map_or(self.fallback.as_str(), |(name, _)| name.as_str());
        Some(bucket)
    }

    #[must_use]
    pub fn classify_all(&self, values: &[Option<f64>]) -> Vec<Option<&str>> {
        values.iter().map(|v| self.classify(*v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_denominator_is_present_count() {
        let values = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
        let table = RateTable::compute(&values, &[Criterion::new("low", Rule::at_most_fixed(2.0))]);
        let row = &table.rows[0];
        assert_eq!(row.present, 4);
        assert_eq!(row.rate, 0.5);
    }

    #[test]
    fn test_overlapping_fixed_rates() {
        let defas = [Some(0.0), Some(-1.0), Some(-2.0), Some(-3.0), Some(-4.0), None, Some(1.0)];
        let table = RateTable::compute(
            &defas,
            &[
                Criterion::new("none", Rule::equal_fixed(0.0)),
                Criterion::new("mild", Rule::equal_fixed(-1.0)),
                Criterion::new("moderate", Rule::at_most_fixed(-2.0)),
                Criterion::new("severe", Rule::at_most_fixed(-3.0)),
            ],
        );
        let counts = table.rows.iter().map(|r| r.count).collect::<Vec<_>>();
        assert_eq!(counts, vec![1, 1, 3, 2]);
        assert!(table.rows.iter().all(|r| r.present == 6));
        assert_eq!(table.get("severe").unwrap().rate, 2.0 / 6.0);
    }

    #[test]
    fn test_percentile_cutoffs_follow_the_dataset() {
        let rule = Rule::at_most_percentile(25.0);
        let a = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let b = [Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(50.0), None];
        assert_eq!(rule.resolve(&a).value, 2.0);
        assert_eq!(rule.resolve(&b).value, 20.0);
        assert_eq!(Threshold::Fixed(2.0).resolve(&b), 2.0);
    }

    #[test]
    fn test_percentile_bounds_are_inclusive() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0].map(Some);
        let table = RateTable::compute(
            &values,
            &[
                Criterion::new("low", Rule::at_most_percentile(25.0)),
                Criterion::new("high", Rule::at_least_percentile(75.0)),
            ],
        );
        assert_eq!(table.rows[0].count, 2);
        assert_eq!(table.rows[1].count, 2);
    }

    #[test]
    fn test_all_missing_has_nan_rate() {
        let table = RateTable::compute(
            &[None, None],
            &[Criterion::new("low", Rule::at_most_percentile(25.0))],
        );
        assert_eq!(table.rows[0].count, 0);
        assert!(table.rows[0].cutoff.value.is_nan());
        assert!(table.rows[0].rate.is_nan());
    }

    #[test]
    fn test_flags_exclude_missing() {
        let cutoff = Cutoff {
            comparison: Comparison::AtMost,
            value: f64::INFINITY,
        };
        assert_eq!(cutoff.flags(&[Some(1.0), None]), vec![true, false]);
    }

    #[test]
    fn test_classifier_is_exclusive() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0].map(Some);
        let classifier = Classifier::new(
            &values,
            &[
                ("low", Rule::at_most_percentile(25.0)),
                ("high", Rule::at_least_percentile(75.0)),
            ],
            "intermediate",
        );
        assert_eq!(classifier.cutoff("low").unwrap().value, 3.0);
        assert_eq!(classifier.cutoff("high").unwrap().value, 7.0);

        let labels = classifier.classify_all(&values);
        let count = |name: &str| labels.iter().filter(|l| **l == Some(name)).count();
        assert_eq!(count("low"), 3);
        assert_eq!(count("intermediate"), 3);
        assert_eq!(count("high"), 3);
        assert_eq!(
            classifier.labels().collect::<Vec<_>>(),
            vec!["low", "high", "intermediate"]
        );
    }
}
