//! Standard profile of one indicator
//!
//! Bundles the distribution summary with the four standard groupings:
//! entry cohort, age and phase in ascending key order, and tier labels in
//! ascending order of the indicator mean.

use crate::{
    dataset::{Dataset, LoadError},
    distribution::DistributionSummary,
    grouping::{self, GroupOrder, GroupRate, GroupedStats},
};

/// Names of the group key columns.
#[derive(Debug, Clone, Copy)]
pub struct ProfileColumns<'a> {
    pub cohort: &'a str,
    pub age: &'a str,
    pub phase: &'a str,
    pub tier: &'a str,
}

impl ProfileColumns<'_> {
    /// Columns every profile needs.
    #[must_use]
    pub fn required(&self) -> [&str; 4] {
        [self.cohort, self.age, self.phase, self.tier]
    }
}

/// Distribution and grouped statistics of one indicator.
#[derive(Debug, Clone)]
pub struct IndicatorProfile {
    pub indicator: String,
    pub summary: DistributionSummary,
    pub by_cohort: GroupedStats,
    pub by_age: GroupedStats,
    pub by_phase: GroupedStats,
    pub by_tier: GroupedStats,
}

impl IndicatorProfile {
    pub fn build(
        dataset: &Dataset,
        indicator: &str,
        columns: &ProfileColumns<'_>,
        hist_num_bins: usize,
    ) -> Result<Self, LoadError> {
        let values = dataset.numeric(indicator)?;
        let summary = DistributionSummary::new(values, hist_num_bins);
        if summary.present == 0 {
            log::warn!("indicator '{indicator}' has no present values; its statistics are NaN");
        }

        let grouped = |column: &str, order: GroupOrder| -> Result<GroupedStats, LoadError> {
            Ok(GroupedStats::collect(
                &dataset.group_keys(column)?,
                values,
                order,
            ))
        };

        let profile = Self {
            indicator: indicator.to_owned(),
            summary,
            by_cohort: grouped(columns.cohort, GroupOrder::Natural)?,
            by_age: grouped(columns.age, GroupOrder::Natural)?,
            by_phase: grouped(columns.phase, GroupOrder::Natural)?,
            by_tier: grouped(columns.tier, GroupOrder::ByMean)?,
        };
        log::debug!(
            "profiled '{indicator}': {} present, {} missing, {} tiers",
            profile.summary.present,
            profile.summary.missing,
            profile.by_tier.rows.len()
        );
        Ok(profile)
    }
}

/// Per-group rate of a row flag, grouped by `key_column`.
pub fn rate_by(
    dataset: &Dataset,
    key_column: &str,
    flags: &[bool],
) -> Result<Vec<GroupRate>, LoadError> {
    Ok(grouping::rate_by_group(
        &dataset.group_keys(key_column)?,
        flags,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: ProfileColumns<'static> = ProfileColumns {
        cohort: "Ano ingresso",
        age: "Idade 22",
        phase: "Fase",
        tier: "Pedra 22",
    };

    #[test]
    fn test_missing_group_column_fails() {
        let csv = "IAN,Ano ingresso\n5,2020\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        let err = IndicatorProfile::build(&dataset, "IAN", &COLUMNS, 10).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns { .. }));
    }

    #[test]
    fn test_all_missing_indicator_degrades() {
        let csv = "IAN,Ano ingresso,Idade 22,Fase,Pedra 22\n,2020,10,1,Quartzo\n,2021,11,2,Ágata\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes())
            .unwrap()
            .coerce_numeric(&["IAN"]);
        let profile = IndicatorProfile::build(&dataset, "IAN", &COLUMNS, 10).unwrap();
        assert_eq!(profile.summary.missing, 2);
        assert!(profile.summary.mean().is_nan());
        assert_eq!(profile.by_cohort.rows.len(), 2);
        assert!(profile.by_cohort.rows.iter().all(|r| r.count == 0));
    }
}
