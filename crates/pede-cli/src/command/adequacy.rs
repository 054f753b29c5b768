//! Level adequacy analysis (IAN) with the level gap (Defas)
//!
//! IAN takes a handful of literal scores, so its frequency table counts each
//! value over every row of the dataset. The level gap rates use fixed domain
//! cutoffs.

use anyhow::Context;
use pede_analysis::{
    cutoff::{Criterion, RateTable, Rule},
    distribution::{Denominator, FrequencyTable},
    profile::{self, IndicatorProfile},
};

use super::AnalysisArg;
use crate::{
    config::Config,
    report::{chart, tables},
    util::{fmt_num, round1},
};

const MODERATE_GAP: &str = "Defasagem moderada+ (Defas<=-2)";
const SEVERE_GAP: &str = "Defasagem severa (Defas<=-3)";

fn gap_criteria() -> [Criterion; 4] {
    [
        Criterion::new("Sem defasagem (Defas=0)", Rule::equal_fixed(0.0)),
        Criterion::new("Defasagem leve (Defas=-1)", Rule::equal_fixed(-1.0)),
        Criterion::new(MODERATE_GAP, Rule::at_most_fixed(-2.0)),
        Criterion::new(SEVERE_GAP, Rule::at_most_fixed(-3.0)),
    ]
}

#[expect(clippy::too_many_lines)]
pub(crate) fn run(arg: &AnalysisArg) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?;
    let columns = &config.columns;
    let groups = columns.profile();
    let mut required = vec![columns.ian.as_str(), columns.defas.as_str()];
    required.extend(groups.required());
    let (dataset, mut report) = super::open(arg, &config, "q1", &required)?;

    log::info!("profiling {}", columns.ian);
    let ian_name = columns.ian.as_str();
    let ian = dataset.numeric(ian_name)?;
    let profile = IndicatorProfile::build(
        &dataset,
        ian_name,
        &groups,
        config.histogram_bins.adequacy,
    )?;

    super::distribution_charts(
        &mut report,
        ["01_hist_ian.svg", "02_boxplot_ian.svg"],
        ian,
        &profile,
        "level adequacy",
    );
    let freq = FrequencyTable::by_value(ian, Denominator::TotalRows);
    tables::write_frequency(&mut report, "freq_ian.csv", ian_name, &freq)?;
    tables::write_describe(&mut report, "descritivos_ian.csv", ian_name, &profile.summary)?;

    tables::write_profile_groups(&mut report, "ian", &profile, &groups)?;
    super::mean_line(
        &mut report,
        "03_ian_por_coorte.svg",
        &format!("Mean {ian_name} by entry cohort"),
        "entry year",
        &profile.by_cohort,
    );
    super::mean_line(
        &mut report,
        "04_ian_por_idade.svg",
        &format!("Mean {ian_name} by age"),
        groups.age,
        &profile.by_age,
    );

    log::info!("computing level gap rates from {}", columns.defas);
    let defas = dataset.numeric(&columns.defas)?;
    let rates = RateTable::compute(defas, &gap_criteria());
    tables::write_rates(&mut report, "taxas_defasagem.csv", &rates, None)?;
    super::criteria_bars(&mut report, "05_taxa_defasagem.svg", "Level gap rates", &rates);

    let defas_counts = FrequencyTable::by_value(defas, Denominator::Present);
    report.write_records(
        "distribuicao_defas.csv",
        &[columns.defas.as_str(), "qtd"],
        defas_counts
            .rows
            .iter()
            .map(|row| vec![row.label.clone(), row.count.to_string()]),
    )?;
    #[expect(clippy::cast_precision_loss)]
    let count_bars = defas_counts
        .rows
        .iter()
        .map(|row| (row.label.clone(), row.count as f64))
        .collect::<Vec<_>>();
    report.chart("06_distribuicao_defas.svg", |path| {
        chart::bar_chart(
            path,
            &format!("Distribution of {}", columns.defas),
            &columns.defas,
            "Students",
            &count_bars,
        )
    });

    super::mean_bars(
        &mut report,
        "07_ian_por_fase.svg",
        &format!("Mean {ian_name} by phase"),
        groups.phase,
        &profile.by_phase,
    );
    super::mean_bars(
        &mut report,
        "08_ian_por_pedra.svg",
        &format!("Mean {ian_name} by tier"),
        groups.tier,
        &profile.by_tier,
    );

    let moderate = rates
        .get(MODERATE_GAP)
        .context("moderate gap rate not computed")?
        .cutoff;
    let moderate_by_phase = profile::rate_by(&dataset, groups.phase, &moderate.flags(defas))?;
    tables::write_group_rates(
        &mut report,
        "taxa_defas_moderada_por_fase.csv",
        groups.phase,
        "defas_moderada_mais",
        &moderate_by_phase,
    )?;
    super::group_rate_bars(
        &mut report,
        "09_defas_moderada_por_fase.svg",
        "Moderate or worse level gap by phase",
        groups.phase,
        &moderate_by_phase,
    );

    let value_percent = |value: f64| {
        let label = value.to_string();
        freq.rows
            .iter()
            .find(|row| row.label == label)
            .map_or(f64::NAN, |row| round1(row.percent))
    };
    let rate_percent = |name: &str| rates.get(name).map_or(f64::NAN, |row| round1(row.percent()));
    let moderate_pct = fmt_num(rate_percent(MODERATE_GAP), 1);
    let severe_pct = fmt_num(rate_percent(SEVERE_GAP), 1);

    let summary = format!(
        "\
# Question 1: Level adequacy ({ian_name})

## Steps
1. Load the data
2. Distribution of {ian_name}
3. Descriptive statistics
4. Change over time (proxy)
5. Level gap rates
6. Analysis by phase

## Method note
The dataset has a single `{ian_name}` column with no year suffix, so change over
time is read through proxies:
- **entry cohort** (`{cohort}`), i.e. time in the program
- **age** (`{age}`) as a complementary view

## Main results
- Distribution of {ian_name} ({present} present, {missing} missing; percent of all rows):
  - {ian_name} = 2.5: **{p_low}%**
  - {ian_name} = 5: **{p_mid}%**
  - {ian_name} = 10: **{p_high}%**
- Level gap (`{defas}`, percent of present values):
  - **moderate or worse ({defas} <= -2): {moderate_pct}%**
  - **severe ({defas} <= -3): {severe_pct}%**
- Mean {ian_name} by tier (`{tier}`), ascending: {tiers}

## Answer
Around **{moderate_pct}%** of the students have a moderate or worse level gap
and **{severe_pct}%** a severe one. Tables `ian_por_fase.csv` and
`taxa_defas_moderada_por_fase.csv` break both views down by phase.
",
        cohort = groups.cohort,
        age = groups.age,
        tier = groups.tier,
        defas = columns.defas,
        present = profile.summary.present,
        missing = profile.summary.missing,
        p_low = fmt_num(value_percent(2.5), 1),
        p_mid = fmt_num(value_percent(5.0), 1),
        p_high = fmt_num(value_percent(10.0), 1),
        tiers = super::describe_means(&profile.by_tier),
    );
    report.write_text("README_q1.md", &summary)?;

    super::finish(&report, "Q1 level adequacy");
    Ok(())
}
