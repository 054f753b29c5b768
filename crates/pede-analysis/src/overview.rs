//! Per-column overview of a dataset
//!
//! One row per column with its storage kind, share of missing cells and
//! number of distinct present values. Rows are ordered by missing share
//! (highest first), then by column name.

use pede_stats::binning::round_to;

use crate::dataset::{ColumnKind, Dataset};

/// Overview row of a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOverview {
    pub name: String,
    pub kind: ColumnKind,
    /// Percentage of missing cells, rounded to 2 decimals
    pub missing_percent: f64,
    pub distinct: usize,
}

/// Builds the overview of every column.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn column_overview(dataset: &Dataset) -> Vec<ColumnOverview> {
    let rows = dataset.row_count();
    let mut overview = dataset
        .columns()
        .iter()
        .map(|column| {
            let missing_percent = if rows == 0 {
                0.0
            } else {
                round_to(column.missing_count() as f64 / rows as f64 * 100.0, 2)
            };
            ColumnOverview {
                name: column.name.clone(),
                kind: column.kind(),
                missing_percent,
                distinct: column.distinct_count(),
            }
        })
        .collect::<Vec<_>>();

    overview.sort_by(|a, b| {
        b.missing_percent
            .total_cmp(&a.missing_percent)
            .then_with(|| a.name.cmp(&b.name))
    });
    overview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_missing_then_name() {
        let csv = "\
b,a,c,d
1,x,,
2,,,1
3,y,5,
";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        let overview = column_overview(&dataset);
        let names = overview.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["c", "d", "a", "b"]);

        assert_eq!(overview[0].missing_percent, 66.67);
        assert_eq!(overview[2].kind, ColumnKind::Text);
        assert_eq!(overview[2].distinct, 2);
        assert_eq!(overview[3].missing_percent, 0.0);
    }
}
