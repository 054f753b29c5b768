//! CSV tables shared by every analysis

use pede_analysis::{
    cutoff::RateTable,
    dataset::Dataset,
    distribution::{Denominator, DistributionSummary, FrequencyTable},
    grouping::{GroupRate, GroupedStats},
    overview::column_overview,
    profile::{IndicatorProfile, ProfileColumns},
};
use pede_stats::binning::round_to;
use serde::Serialize;

use super::{ReportDir, cell};
use crate::util::round1;

#[derive(Debug, Serialize)]
struct OverviewRow<'a> {
    #[serde(rename = "coluna")]
    column: &'a str,
    dtype: String,
    #[serde(rename = "missing_%")]
    missing_percent: f64,
    #[serde(rename = "n_unicos")]
    distinct: usize,
}

pub fn write_overview(report: &mut ReportDir, dataset: &Dataset) -> anyhow::Result<()> {
    let overview = column_overview(dataset);
    let rows = overview.iter().map(|row| OverviewRow {
        column: &row.name,
        dtype: row.kind.to_string(),
        missing_percent: row.missing_percent,
        distinct: row.distinct,
    });
    report.write_rows("overview.csv", rows)
}

pub fn write_describe(
    report: &mut ReportDir,
    file_name: &str,
    indicator: &str,
    summary: &DistributionSummary,
) -> anyhow::Result<()> {
    let rows = summary
        .describe()
        .into_iter()
        .map(|(stat, value)| vec![stat, cell(value)]);
    report.write_records(file_name, &["", indicator], rows)
}

fn percent_header(denominator: Denominator) -> &'static str {
    match denominator {
        Denominator::TotalRows => "%_total",
        Denominator::Present => "%_nao_nulo",
    }
}

/// Value or band frequencies; percentages rounded to one decimal.
pub fn write_frequency(
    report: &mut ReportDir,
    file_name: &str,
    label_header: &str,
    table: &FrequencyTable,
) -> anyhow::Result<()> {
    let rows = table.rows.iter().map(|row| {
        vec![
            row.label.clone(),
            row.count.to_string(),
            cell(round1(row.percent)),
        ]
    });
    report.write_records(
        file_name,
        &[label_header, "qtd", percent_header(table.denominator)],
        rows,
    )
}

pub fn write_grouped(
    report: &mut ReportDir,
    file_name: &str,
    key_header: &str,
    grouped: &GroupedStats,
) -> anyhow::Result<()> {
    let rows = grouped.rows.iter().map(|row| {
        vec![
            row.key.to_string(),
            row.count.to_string(),
            cell(row.mean),
            cell(row.median),
        ]
    });
    report.write_records(file_name, &[key_header, "count", "mean", "median"], rows)
}

/// The four grouped tables of a profile, named `<stem>_por_<grouping>.csv`.
pub fn write_profile_groups(
    report: &mut ReportDir,
    stem: &str,
    profile: &IndicatorProfile,
    columns: &ProfileColumns<'_>,
) -> anyhow::Result<()> {
    let groupings = [
        ("coorte", columns.cohort, &profile.by_cohort),
        ("idade", columns.age, &profile.by_age),
        ("fase", columns.phase, &profile.by_phase),
        ("pedra", columns.tier, &profile.by_tier),
    ];
    for (grouping, key_header, grouped) in groupings {
        write_grouped(report, &format!("{stem}_por_{grouping}.csv"), key_header, grouped)?;
    }
    Ok(())
}

/// Bucket rates; `cutoff_decimals` adds the rounded cutoff column.
pub fn write_rates(
    report: &mut ReportDir,
    file_name: &str,
    table: &RateTable,
    cutoff_decimals: Option<i32>,
) -> anyhow::Result<()> {
    let header: &[&str] = match cutoff_decimals {
        Some(_) => &["criterio", "corte", "qtd", "%"],
        None => &["grupo", "qtd", "%"],
    };
    let rows = table.rows.iter().map(|row| {
        let mut record = vec![row.name.clone()];
        if let Some(decimals) = cutoff_decimals {
            record.push(cell(round_to(row.cutoff.value, decimals)));
        }
        record.push(row.count.to_string());
        record.push(cell(round1(row.percent())));
        record
    });
    report.write_records(file_name, header, rows)
}

pub fn write_group_rates(
    report: &mut ReportDir,
    file_name: &str,
    key_header: &str,
    rate_header: &str,
    rates: &[GroupRate],
) -> anyhow::Result<()> {
    let rows = rates.iter().map(|row| {
        vec![
            row.key.to_string(),
            cell(row.rate),
            cell(round1(row.percent())),
        ]
    });
    report.write_records(file_name, &[key_header, rate_header, "%"], rows)
}
