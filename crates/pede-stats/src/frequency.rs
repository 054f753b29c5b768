/// Occurrences of one distinct value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueCount {
    pub value: f64,
    pub count: usize,
}

/// Counts each distinct value, in ascending value order.
///
/// `-0.0` and `0.0` are treated as the same value.
///
/// # Examples
///
/// ```
/// use pede_stats::frequency::{ValueCount, value_counts};
///
/// let counts = value_counts([5.0, 2.5, 10.0, 5.0]);
/// assert_eq!(
///     counts,
///     vec![
///         ValueCount { value: 2.5, count: 1 },
///         ValueCount { value: 5.0, count: 2 },
///         ValueCount { value: 10.0, count: 1 },
///     ]
/// );
/// ```
#[must_use]
pub fn value_counts<I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted = values.into_iter().map(|v| v + 0.0).collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);

    let mut counts: Vec<ValueCount> = Vec::new();
    for value in sorted {
        match counts.last_mut() {
            Some(last) if last.value.total_cmp(&value).is_eq() => last.count += 1,
            _ => counts.push(ValueCount { value, count: 1 }),
        }
    }
    counts
}

/// Number of distinct values.
#[must_use]
pub fn distinct_count<I>(values: I) -> usize
where
    I: IntoIterator<Item = f64>,
{
    value_counts(values).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_zero_merges_with_zero() {
        let counts = value_counts([0.0, -0.0, -1.0]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[1].count, 2);
    }

    #[test]
    fn test_distinct_count() {
        assert_eq!(distinct_count([1.0, 1.0, 2.0, 3.0, 3.0]), 3);
        assert_eq!(distinct_count(Vec::<f64>::new()), 0);
    }
}
