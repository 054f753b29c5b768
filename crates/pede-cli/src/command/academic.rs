//! Academic performance analysis (IDA)
//!
//! Low performance is relative: the cutoffs are percentiles of the current
//! dataset, not an official passing grade.

use anyhow::Context;
use pede_analysis::{
    cutoff::{Criterion, RateTable, Rule},
    distribution::{Denominator, FrequencyTable},
    profile::{self, IndicatorProfile},
};
use pede_stats::binning::DECILE_QUARTILE_EDGES;

use super::AnalysisArg;
use crate::{
    config::Config,
    report::tables,
    util::{fmt_num, fmt_rounded, round1},
};

const LOW: &str = "Baixo desempenho (IDA <= P25)";
const CRITICAL: &str = "Crítico (IDA <= P10)";
const BAND_DECIMALS: i32 = 4;

#[expect(clippy::too_many_lines)]
pub(crate) fn run(arg: &AnalysisArg) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?;
    let columns = &config.columns;
    let groups = columns.profile();
    let mut required = vec![columns.ida.as_str()];
    required.extend(groups.required());
    let (dataset, mut report) = super::open(arg, &config, "q2", &required)?;

    log::info!("profiling {}", columns.ida);
    let ida_name = columns.ida.as_str();
    let ida = dataset.numeric(ida_name)?;
    let profile = IndicatorProfile::build(
        &dataset,
        ida_name,
        &groups,
        config.histogram_bins.academic,
    )?;

    super::distribution_charts(
        &mut report,
        ["01_hist_ida.svg", "02_boxplot_ida.svg"],
        ida,
        &profile,
        "academic performance",
    );
    let bands = FrequencyTable::by_quantile_bands(
        ida,
        &DECILE_QUARTILE_EDGES,
        BAND_DECIMALS,
        Denominator::TotalRows,
    );
    tables::write_frequency(&mut report, "freq_ida_por_faixa.csv", "faixa_ida", &bands)?;
    tables::write_describe(&mut report, "descritivos_ida.csv", ida_name, &profile.summary)?;

    tables::write_profile_groups(&mut report, "ida", &profile, &groups)?;
    super::mean_line(
        &mut report,
        "03_ida_por_coorte.svg",
        &format!("Mean {ida_name} by entry cohort"),
        "entry year",
        &profile.by_cohort,
    );
    super::mean_line(
        &mut report,
        "04_ida_por_idade.svg",
        &format!("Mean {ida_name} by age"),
        groups.age,
        &profile.by_age,
    );
    super::mean_bars(
        &mut report,
        "05_ida_por_pedra.svg",
        &format!("Mean {ida_name} by tier"),
        groups.tier,
        &profile.by_tier,
    );

    log::info!("computing low performance rates");
    let rates = RateTable::compute(
        ida,
        &[
            Criterion::new(LOW, Rule::at_most_percentile(25.0)),
            Criterion::new(CRITICAL, Rule::at_most_percentile(10.0)),
        ],
    );
    tables::write_rates(
        &mut report,
        "taxa_baixo_desempenho.csv",
        &rates,
        Some(BAND_DECIMALS),
    )?;
    super::criteria_bars(
        &mut report,
        "06_taxa_baixo_desempenho.svg",
        &format!("Low academic performance ({ida_name}), percentile cutoffs"),
        &rates,
    );

    super::mean_bars(
        &mut report,
        "07_ida_por_fase.svg",
        &format!("Mean {ida_name} by phase"),
        groups.phase,
        &profile.by_phase,
    );
    let low = rates.get(LOW).context("low performance rate not computed")?.cutoff;
    let low_by_phase = profile::rate_by(&dataset, groups.phase, &low.flags(ida))?;
    tables::write_group_rates(
        &mut report,
        "taxa_baixo_desempenho_por_fase.csv",
        groups.phase,
        "taxa",
        &low_by_phase,
    )?;
    super::group_rate_bars(
        &mut report,
        "08_taxa_baixo_desempenho_por_fase.svg",
        &format!("Low performance ({ida_name} <= P25) by phase"),
        groups.phase,
        &low_by_phase,
    );

    let cut = |p: f64| fmt_rounded(profile.summary.percentile(p), BAND_DECIMALS);
    let rate_percent = |name: &str| rates.get(name).map_or(f64::NAN, |row| round1(row.percent()));
    let summary = format!(
        "\
# Question 2: Academic performance ({ida_name})

## Steps
1. Load the data
2. Distribution of {ida_name}
3. Descriptive statistics
4. Change over time (proxy)
5. Low performance rates
6. Analysis by phase

## Method note
The dataset has a single `{ida_name}` column with no year suffix, so whether
performance improves, stalls or drops over time is read through proxies:
- **entry cohort** (`{cohort}`)
- **age** (`{age}`) as a complementary view
- **progression in the program** (`{tier}` and `{phase}`), the strongest proxy

## Main results
- Descriptive statistics (full table in `descritivos_ida.csv`, {present} present values):
  - P10 = **{p10}**
  - P25 = **{p25}**
  - Median (P50) = **{p50}**
- Percentile-based rates (percent of present values):
  - **low performance ({ida_name} <= P25): {low_pct}%**
  - **critical ({ida_name} <= P10): {critical_pct}%**
- Mean {ida_name} by tier (`{tier}`), ascending: {tiers}

## Answer
Students at or below P25 form the priority group for pedagogical support.
Since the file has no {ida_name} per year, change over time is inferred from the
cohort, phase and tier tables; compare `ida_por_fase.csv` and
`ida_por_pedra.csv` to see whether more advanced students perform better.
",
        cohort = groups.cohort,
        age = groups.age,
        tier = groups.tier,
        phase = groups.phase,
        present = profile.summary.present,
        p10 = cut(10.0),
        p25 = cut(25.0),
        p50 = cut(50.0),
        low_pct = fmt_num(rate_percent(LOW), 1),
        critical_pct = fmt_num(rate_percent(CRITICAL), 1),
        tiers = super::describe_means(&profile.by_tier),
    );
    report.write_text("README_q2.md", &summary)?;

    super::finish(&report, "Q2 academic performance");
    Ok(())
}
