//! Engagement analysis (IEG) and its relation to IDA and IPV
//!
//! Low and high engagement are the P25 and P75 tails of IEG. Both buckets are
//! compared on academic performance and on the turning-point indicator.

use anyhow::Context;
use pede_analysis::{
    association::{self, Association, MeanComparison},
    cutoff::{Classifier, Criterion, RateTable, Rule},
    distribution::{Denominator, FrequencyTable},
    profile::{self, IndicatorProfile},
};
use pede_stats::binning::DECILE_QUARTILE_EDGES;

use super::AnalysisArg;
use crate::{
    config::Config,
    report::{ReportDir, cell, chart, tables},
    util::{fmt_num, fmt_rounded, round1},
};

const LOW: &str = "Baixo engajamento (IEG <= P25)";
const HIGH: &str = "Alto engajamento (IEG >= P75)";
const BAND_DECIMALS: i32 = 6;
/// Fewest rows with IEG, IDA and IPV all present for the scatter plots
const MIN_SCATTER_ROWS: usize = 10;

#[expect(clippy::too_many_lines)]
pub(crate) fn run(arg: &AnalysisArg) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?;
    let columns = &config.columns;
    let groups = columns.profile();
    let mut required = vec![
        columns.ieg.as_str(),
        columns.ida.as_str(),
        columns.ipv.as_str(),
    ];
    required.extend(groups.required());
    let (dataset, mut report) = super::open(arg, &config, "q3", &required)?;

    log::info!("profiling {}", columns.ieg);
    let (ieg_name, ida_name, ipv_name) = (
        columns.ieg.as_str(),
        columns.ida.as_str(),
        columns.ipv.as_str(),
    );
    let ieg = dataset.numeric(ieg_name)?;
    let ida = dataset.numeric(ida_name)?;
    let ipv = dataset.numeric(ipv_name)?;
    let profile = IndicatorProfile::build(
        &dataset,
        ieg_name,
        &groups,
        config.histogram_bins.engagement,
    )?;

    super::distribution_charts(
        &mut report,
        ["01_hist_ieg.svg", "02_boxplot_ieg.svg"],
        ieg,
        &profile,
        "engagement",
    );
    let bands = FrequencyTable::by_quantile_bands(
        ieg,
        &DECILE_QUARTILE_EDGES,
        BAND_DECIMALS,
        Denominator::Present,
    );
    tables::write_frequency(&mut report, "freq_ieg_por_faixa.csv", "faixa_ieg", &bands)?;
    tables::write_describe(&mut report, "descritivos_ieg.csv", ieg_name, &profile.summary)?;

    tables::write_profile_groups(&mut report, "ieg", &profile, &groups)?;
    super::mean_line(
        &mut report,
        "03_ieg_por_coorte.svg",
        &format!("Mean {ieg_name} by entry cohort"),
        "entry year",
        &profile.by_cohort,
    );
    super::mean_line(
        &mut report,
        "04_ieg_por_idade.svg",
        &format!("Mean {ieg_name} by age"),
        groups.age,
        &profile.by_age,
    );

    log::info!("computing engagement rates");
    let rates = RateTable::compute(
        ieg,
        &[
            Criterion::new(LOW, Rule::at_most_percentile(25.0)),
            Criterion::new(HIGH, Rule::at_least_percentile(75.0)),
        ],
    );
    tables::write_rates(
        &mut report,
        "taxa_baixo_alto_engajamento.csv",
        &rates,
        Some(BAND_DECIMALS),
    )?;
    super::criteria_bars(
        &mut report,
        "05_taxa_baixo_alto_engajamento.svg",
        "Low vs high engagement, percentile cutoffs",
        &rates,
    );

    log::info!("relating {ieg_name} to {ida_name} and {ipv_name}");
    let with_ida = Association::between(ieg, ida);
    let with_ipv = Association::between(ieg, ipv);
    for (other, assoc) in [(ida_name, &with_ida), (ipv_name, &with_ipv)] {
        if assoc.pearson.is_nan() {
            log::warn!(
                "only {} complete {ieg_name}/{other} pairs; correlation left undefined",
                assoc.pairs
            );
        }
    }
    report.write_records(
        "correlacoes_ieg_ida_ipv.csv",
        &["par", "pearson", "spearman"],
        [(ida_name, &with_ida), (ipv_name, &with_ipv)]
            .into_iter()
            .map(|(other, assoc)| {
                vec![
                    format!("{ieg_name} x {other}"),
                    cell(assoc.pearson),
                    cell(assoc.spearman),
                ]
            }),
    )?;
    scatter_plots(&mut report, [ieg_name, ida_name, ipv_name], [ieg, ida, ipv]);

    let low = rates.get(LOW).context("low engagement rate not computed")?.cutoff;
    let high = rates.get(HIGH).context("high engagement rate not computed")?.cutoff;
    let comparison = MeanComparison::compute(
        &low.flags(ieg),
        &high.flags(ieg),
        &[(ida_name, ida), (ipv_name, ipv)],
    );
    let delta = comparison.delta();
    let ida_header = format!("{ida_name}_medio");
    let ipv_header = format!("{ipv_name}_medio");
    let delta_ida_header = format!("delta_{ida_name}");
    let delta_ipv_header = format!("delta_{ipv_name}");
    report.write_records(
        "comparacao_alto_vs_baixo_engajamento.csv",
        &[
            "grupo",
            "n",
            ida_header.as_str(),
            ipv_header.as_str(),
            delta_ida_header.as_str(),
            delta_ipv_header.as_str(),
        ],
        [
            ("Baixo engajamento (<=P25)", &comparison.low),
            ("Alto engajamento (>=P75)", &comparison.high),
        ]
        .into_iter()
        .map(|(label, bucket)| {
            let mut record = vec![label.to_owned(), bucket.rows.to_string()];
            record.extend(bucket.means.iter().map(|m| cell(*m)));
            record.extend(delta.iter().map(|d| cell(*d)));
            record
        }),
    )?;

    let classifier = Classifier::new(
        ieg,
        &[
            ("low", Rule::at_most_percentile(25.0)),
            ("high", Rule::at_least_percentile(75.0)),
        ],
        "intermediate",
    );
    let buckets = classifier.classify_all(ieg);
    for (file, name, values) in [
        ("08_box_ida_baixo_vs_alto_ieg.svg", ida_name, ida),
        ("09_box_ipv_baixo_vs_alto_ieg.svg", ipv_name, ipv),
    ] {
        let in_bucket = |bucket: &str| {
            values
                .iter()
                .zip(&buckets)
                .filter_map(|(v, b)| if *b == Some(bucket) { *v } else { None })
                .collect::<Vec<_>>()
        };
        let boxes = [
            (format!("Low {ieg_name}"), in_bucket("low")),
            (format!("High {ieg_name}"), in_bucket("high")),
        ];
        report.chart(file, |path| {
            chart::box_plot(
                path,
                &format!("{name} by engagement group"),
                name,
                &boxes,
            )
        });
    }

    super::mean_bars(
        &mut report,
        "10_ieg_por_fase.svg",
        &format!("Mean {ieg_name} by phase"),
        groups.phase,
        &profile.by_phase,
    );
    super::mean_bars(
        &mut report,
        "11_ieg_por_pedra.svg",
        &format!("Mean {ieg_name} by tier"),
        groups.tier,
        &profile.by_tier,
    );
    let low_by_phase = profile::rate_by(&dataset, groups.phase, &low.flags(ieg))?;
    tables::write_group_rates(
        &mut report,
        "taxa_baixo_engajamento_por_fase.csv",
        groups.phase,
        "taxa",
        &low_by_phase,
    )?;
    super::group_rate_bars(
        &mut report,
        "12_taxa_baixo_engajamento_por_fase.svg",
        &format!("Low engagement ({ieg_name} <= P25) by phase"),
        groups.phase,
        &low_by_phase,
    );

    let cut = |p: f64| fmt_rounded(profile.summary.percentile(p), BAND_DECIMALS);
    let rate_percent = |name: &str| rates.get(name).map_or(f64::NAN, |row| round1(row.percent()));
    let delta_of = |idx: usize| fmt_num(delta.get(idx).copied().unwrap_or(f64::NAN), 4);
    let summary = format!(
        "\
# Question 3: Engagement ({ieg_name})

## Steps
1. Load the data
2. Distribution of {ieg_name}
3. Descriptive statistics
4. Change over time (proxy)
5. Rates and relation to {ida_name} and {ipv_name}
6. Analysis by phase and tier

## Method note
The dataset has a single `{ieg_name}` column with no year suffix. Change over time
is read through proxies: entry cohort, age, phase and tier.

## Descriptive statistics and percentile cutoffs
- P10 = **{p10}**
- P25 = **{p25}**
- Median (P50) = **{p50}**
- P75 = **{p75}**

## Engagement rates (percent of present values)
- Low engagement ({ieg_name} <= P25): **{low_pct}%**
- High engagement ({ieg_name} >= P75): **{high_pct}%**

## Relation of {ieg_name} to {ida_name} and {ipv_name}
**Correlations (full table in `correlacoes_ieg_ida_ipv.csv`):**
- {ieg_name} x {ida_name}: Pearson **{ida_pearson}** | Spearman **{ida_spearman}** ({ida_pairs} pairs)
- {ieg_name} x {ipv_name}: Pearson **{ipv_pearson}** | Spearman **{ipv_spearman}** ({ipv_pairs} pairs)

**High vs low engagement (table in `comparacao_alto_vs_baixo_engajamento.csv`):**
- mean {ida_name} (high {ieg_name}) - (low {ieg_name}) = **{delta_ida}**
- mean {ipv_name} (high {ieg_name}) - (low {ieg_name}) = **{delta_ipv}**

## Answer
The P25/P75 cutoffs split the students into low and high engagement. Positive
correlations together with higher mean {ida_name} and {ipv_name} in the high
engagement group support engagement as a lever for student progress.
",
        p10 = cut(10.0),
        p25 = cut(25.0),
        p50 = cut(50.0),
        p75 = cut(75.0),
        low_pct = fmt_num(rate_percent(LOW), 1),
        high_pct = fmt_num(rate_percent(HIGH), 1),
        ida_pearson = fmt_num(with_ida.pearson, 4),
        ida_spearman = fmt_num(with_ida.spearman, 4),
        ida_pairs = with_ida.pairs,
        ipv_pearson = fmt_num(with_ipv.pearson, 4),
        ipv_spearman = fmt_num(with_ipv.spearman, 4),
        ipv_pairs = with_ipv.pairs,
        delta_ida = delta_of(0),
        delta_ipv = delta_of(1),
    );
    report.write_text("README_q3.md", &summary)?;

    super::finish(&report, "Q3 engagement");
    Ok(())
}

/// Engagement against each other indicator, over rows where all three are
/// present; skipped when there are too few of them.
fn scatter_plots(report: &mut ReportDir, names: [&str; 3], columns: [&[Option<f64>]; 3]) {
    let complete = association::complete_rows(&columns);
    if complete < MIN_SCATTER_ROWS {
        log::warn!(
            "only {complete} rows with {}, {} and {} present; scatter plots skipped",
            names[0],
            names[1],
            names[2]
        );
        return;
    }
    let [ieg, ida, ipv] = columns;
    let (ida_points, ipv_points): (Vec<_>, Vec<_>) = (0..ieg.len())
        .filter_map(|i| Some(((ieg[i]?, ida[i]?), (ieg[i]?, ipv[i]?))))
        .unzip();
    let plots = [
        ("06_scatter_ieg_vs_ida.svg", names[1], ida_points),
        ("07_scatter_ieg_vs_ipv.svg", names[2], ipv_points),
    ];
    for (file, other, points) in plots {
        report.chart(file, |path| {
            chart::scatter(
                path,
                &format!("{} vs {other}", names[0]),
                names[0],
                other,
                &points,
            )
        });
    }
}
