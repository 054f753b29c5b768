//! Correlation between two paired samples
//!
//! Both measures take two slices of equal length holding paired observations
//! (`x[i]` and `y[i]` come from the same row). The caller is responsible for
//! dropping incomplete pairs.
//!
//! - [`pearson`]: linear association, covariance over the product of standard deviations
//! - [`spearman`]: Pearson coefficient of the ranks, ties receive their average rank
//!
//! Both are symmetric in their arguments and return a value in `[-1, 1]`, or
//! NaN when undefined (fewer than two pairs, or a constant sample).

/// Pearson product-moment correlation coefficient.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
///
/// # Examples
///
/// ```
/// use pede_stats::correlation::pearson;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [4.0, 3.0, 2.0, 1.0];
/// assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
/// assert!(pearson(&x, &[2.0, 2.0, 2.0, 2.0]).is_nan());
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "paired samples must have equal length");
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let (dx, dy) = (xi - mean_x, yi - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Spearman rank correlation coefficient.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
///
/// # Examples
///
/// ```
/// use pede_stats::correlation::spearman;
///
/// // Monotonic but not linear
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [1.0, 4.0, 9.0, 16.0, 100.0];
/// assert!((spearman(&x, &y) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "paired samples must have equal length");
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Ranks starting at 1; tied values share the mean of the ranks they span.
///
/// ```
/// use pede_stats::correlation::average_ranks;
///
/// assert_eq!(average_ranks(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: [f64; 8] = [3.1, 4.7, 1.2, 8.8, 5.0, 5.0, 2.4, 7.3];
    const Y: [f64; 8] = [2.0, 6.1, 1.9, 7.7, 4.4, 6.0, 3.3, 9.2];

    #[test]
    fn test_symmetric() {
        assert!((pearson(&X, &Y) - pearson(&Y, &X)).abs() < 1e-12);
        assert!((spearman(&X, &Y) - spearman(&Y, &X)).abs() < 1e-12);
    }

    #[test]
    fn test_bounded() {
        for r in [pearson(&X, &Y), spearman(&X, &Y)] {
            assert!((-1.0..=1.0).contains(&r), "{r}");
        }
    }

    #[test]
    fn test_self_correlation_is_one() {
        assert!((pearson(&X, &X) - 1.0).abs() < 1e-12);
        assert!((spearman(&X, &X) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_pairs() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(spearman(&[], &[]).is_nan());
    }

    #[test]
    fn test_known_value() {
        // Hand-computed: cov = 8, var_x = 10, var_y = 10 -> r = 0.8
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert!((pearson(&x, &y) - 0.8).abs() < 1e-12);
        assert!((spearman(&x, &y) - 0.8).abs() < 1e-12);
    }
}
