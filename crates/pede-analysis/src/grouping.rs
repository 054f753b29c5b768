//! Per-group aggregation of an indicator
//!
//! Rows are partitioned by the distinct observed values of a group key
//! column (entry cohort, age, phase, tier label). Rows with a missing key
//! belong to no group; there is no predefined group universe.
//!
//! # Ordering
//!
//! - [`GroupOrder::Natural`]: ascending key (numeric keys compare numerically)
//! - [`GroupOrder::ByMean`]: ascending group mean, groups without values last.
//!   Tier labels progress in an order that is not lexicographic, and the mean
//!   of the indicator recovers it.
//!
//! # Examples
//!
//! ```
//! use pede_analysis::grouping::{GroupKey, GroupOrder, GroupedStats};
//!
//! let keys = [
//!     Some(GroupKey::from("A")),
//!     Some(GroupKey::from("A")),
//!     Some(GroupKey::from("B")),
//! ];
//! let values = [Some(10.0), None, Some(20.0)];
//!
//! let grouped = GroupedStats::collect(&keys, &values, GroupOrder::Natural);
//! assert_eq!(grouped.rows[0].count, 1);
//! assert_eq!(grouped.rows[0].mean, 10.0);
//! assert_eq!(grouped.rows[1].count, 1);
//! assert_eq!(grouped.rows[1].mean, 20.0);
//! ```

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use pede_stats::descriptive::DescriptiveStats;

/// A distinct value of a group key column.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Number(f64),
    Label(String),
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Number(a), GroupKey::Number(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
            (GroupKey::Label(a), GroupKey::Label(b)) => a.cmp(b),
            (GroupKey::Number(_), GroupKey::Label(_)) => Ordering::Less,
            (GroupKey::Label(_), GroupKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Number(n) => fmt::Display::fmt(n, f),
            GroupKey::Label(s) => fmt::Display::fmt(s, f),
        }
    }
}

impl From<f64> for GroupKey {
    fn from(value: f64) -> Self {
        GroupKey::Number(value)
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::Label(value.to_owned())
    }
}

/// How grouped rows are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    Natural,
    ByMean,
}

/// Count, mean and median of the indicator within one group.
#[derive(Debug, Clone)]
pub struct GroupStats {
    pub key: GroupKey,
    /// Rows in the group with a present indicator value
    pub count: usize,
    /// NaN when `count` is 0
    pub mean: f64,
    /// NaN when `count` is 0
    pub median: f64,
}

/// Indicator statistics for every observed group.
#[derive(Debug, Clone)]
pub struct GroupedStats {
    pub rows: Vec<GroupStats>,
}

impl GroupedStats {
    /// Aggregates `values` by `keys`.
    ///
    /// A group exists for every distinct present key, even when none of its
    /// rows has an indicator value.
    ///
    /// # Panics
    ///
    /// Panics if `keys` and `values` differ in length.
    #[must_use]
    pub fn collect(keys: &[Option<GroupKey>], values: &[Option<f64>], order: GroupOrder) -> Self {
        assert_eq!(keys.len(), values.len(), "columns must have equal length");

        let data_map = collect_by_group(keys, |idx| values[idx]);
        let mut rows = data_map
            .into_iter()
            .map(|(key, data)| {
                let present = data.into_iter().flatten();
                match DescriptiveStats::new(present) {
                    Some(stats) => GroupStats {
                        key,
                        count: stats.count,
                        mean: stats.mean,
                        median: stats.median,
                    },
                    None => GroupStats {
                        key,
                        count: 0,
                        mean: f64::NAN,
                        median: f64::NAN,
                    },
                }
            })
            .collect::<Vec<_>>();

        if order == GroupOrder::ByMean {
            rows.sort_by(|a, b| cmp_nan_last(a.mean, b.mean).then_with(|| a.key.cmp(&b.key)));
        }

        Self { rows }
    }

    /// Returns the group with the given key.
    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&GroupStats> {
        self.rows.iter().find(|row| row.key == *key)
    }
}

/// Share of each group's rows that carry a binary flag.
#[derive(Debug, Clone)]
pub struct GroupRate {
    pub key: GroupKey,
    /// All rows in the group, including rows whose indicator is missing
    pub rows: usize,
    /// Rows with the flag set
    pub flagged: usize,
    /// `flagged / rows`, the mean of the 0/1 flag
    pub rate: f64,
}

impl GroupRate {
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Mean of a 0/1 flag per group, in ascending key order.
///
/// Rows whose indicator is missing carry an unset flag, so they count
/// towards the group size but never towards the flagged rows.
///
/// # Panics
///
/// Panics if `keys` and `flags` differ in length.
///
/// # Examples
///
/// ```
/// use pede_analysis::grouping::{GroupKey, rate_by_group};
///
/// let keys = [Some(GroupKey::from(1.0)), Some(GroupKey::from(1.0)), None, Some(GroupKey::from(2.0))];
/// let flags = [true, false, true, false];
///
/// let rates = rate_by_group(&keys, &flags);
/// assert_eq!(rates.len(), 2);
/// assert_eq!(rates[0].rate, 0.5);
/// assert_eq!(rates[1].rate, 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn rate_by_group(keys: &[Option<GroupKey>], flags: &[bool]) -> Vec<GroupRate> {
    assert_eq!(keys.len(), flags.len(), "columns must have equal length");

    collect_by_group(keys, |idx| flags[idx])
        .into_iter()
        .map(|(key, data)| {
            let rows = data.len();
            let flagged = data.iter().filter(|f| **f).count();
            GroupRate {
                key,
                rows,
                flagged,
                rate: flagged as f64 / rows as f64,
            }
        })
        .collect()
}

/// Collects per-row data grouped by key, skipping rows whose key is missing.
fn collect_by_group<T, F>(keys: &[Option<GroupKey>], mut data: F) -> BTreeMap<GroupKey, Vec<T>>
where
    F: FnMut(usize) -> T,
{
    let mut data_map: BTreeMap<GroupKey, Vec<T>> = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            data_map.entry(key.clone()).or_default().push(data(idx));
        }
    }
    data_map
}

fn cmp_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[Option<&str>]) -> Vec<Option<GroupKey>> {
        names.iter().map(|n| n.map(GroupKey::from)).collect()
    }

    #[test]
    fn test_numeric_keys_sort_numerically() {
        let keys = [9.0, 10.0, 2.0, 10.0]
            .into_iter()
            .map(|k| Some(GroupKey::from(k)))
            .collect::<Vec<_>>();
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let grouped = GroupedStats::collect(&keys, &values, GroupOrder::Natural);
        let order = grouped.rows.iter().map(|r| r.key.to_string()).collect::<Vec<_>>();
        assert_eq!(order, vec!["2", "9", "10"]);
        assert_eq!(grouped.rows[2].count, 2);
        assert_eq!(grouped.rows[2].mean, 3.0);
        assert_eq!(grouped.rows[2].median, 3.0);
    }

    #[test]
    fn test_tiers_sort_by_mean() {
        let keys = labels(&[
            Some("Topázio"),
            Some("Quartzo"),
            Some("Ágata"),
            Some("Ametista"),
            Some("Quartzo"),
            None,
        ]);
        let values = [Some(9.0), Some(4.0), Some(6.0), Some(7.5), Some(5.0), Some(100.0)];
        let grouped = GroupedStats::collect(&keys, &values, GroupOrder::ByMean);
        let order = grouped.rows.iter().map(|r| r.key.to_string()).collect::<Vec<_>>();
        assert_eq!(order, vec!["Quartzo", "Ágata", "Ametista", "Topázio"]);
        assert_eq!(grouped.get(&GroupKey::from("Quartzo")).unwrap().mean, 4.5);
    }

    #[test]
    fn test_group_without_values_is_kept_and_sorted_last() {
        let keys = labels(&[Some("A"), Some("B"), Some("C")]);
        let values = [Some(5.0), None, Some(1.0)];
        let grouped = GroupedStats::collect(&keys, &values, GroupOrder::ByMean);
        let order = grouped.rows.iter().map(|r| r.key.to_string()).collect::<Vec<_>>();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(grouped.rows[2].count, 0);
        assert!(grouped.rows[2].mean.is_nan());
    }

    #[test]
    fn test_rate_denominator_is_group_rows() {
        let keys = labels(&[Some("A"), Some("A"), Some("A"), Some("A")]);
        // Second row had a missing indicator and therefore an unset flag
        let flags = [true, false, false, true];
        let rates = rate_by_group(&keys, &flags);
        assert_eq!(rates[0].rows, 4);
        assert_eq!(rates[0].flagged, 2);
        assert_eq!(rates[0].percent(), 50.0);
    }
}
