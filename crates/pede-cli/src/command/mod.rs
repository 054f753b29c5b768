use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pede_analysis::{
    cutoff::RateTable,
    dataset::Dataset,
    distribution::present,
    grouping::{GroupKey, GroupRate, GroupedStats},
    profile::IndicatorProfile,
};

use crate::{
    config::Config,
    report::{ReportDir, chart, tables},
    util::{fmt_num, round1},
};

mod academic;
mod adequacy;
mod engagement;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Which analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Level adequacy (IAN) and level gap (Defas)
    Adequacy(#[clap(flatten)] AnalysisArg),
    /// Academic performance (IDA)
    Academic(#[clap(flatten)] AnalysisArg),
    /// Engagement (IEG) and its relation to IDA and IPV
    Engagement(#[clap(flatten)] AnalysisArg),
    /// Run every analysis
    All(#[clap(flatten)] AnalysisArg),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalysisArg {
    /// Path to the dataset (.csv or .json)
    #[arg(long, default_value = "data/raw/pede_2024.csv")]
    pub data: PathBuf,

    /// Directory receiving one subdirectory per analysis
    #[arg(long, default_value = "reports")]
    pub output_dir: PathBuf,

    /// JSON file overriding column names and histogram bins
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Adequacy(arg) => adequacy::run(&arg)?,
        Mode::Academic(arg) => academic::run(&arg)?,
        Mode::Engagement(arg) => engagement::run(&arg)?,
        Mode::All(arg) => {
            adequacy::run(&arg)?;
            academic::run(&arg)?;
            engagement::run(&arg)?;
        }
    }
    Ok(())
}

/// Loads and validates the dataset, then opens the output directory and
/// writes the column overview into it.
fn open(
    arg: &AnalysisArg,
    config: &Config,
    name: &str,
    required: &[&str],
) -> anyhow::Result<(Dataset, ReportDir)> {
    let dataset = Dataset::load(&arg.data, &config.columns.numeric_candidates(), required)
        .with_context(|| format!("Failed to load dataset for {name}"))?;
    let mut report = ReportDir::create(&arg.output_dir, name)?;
    tables::write_overview(&mut report, &dataset)?;
    Ok((dataset, report))
}

fn finish(report: &ReportDir, title: &str) {
    println!(
        "{title}: {} files written to {}",
        report.written(),
        report.dir().display()
    );
}

/// Histogram and box plot of an indicator.
fn distribution_charts(
    report: &mut ReportDir,
    files: [&str; 2],
    values: &[Option<f64>],
    profile: &IndicatorProfile,
    title: &str,
) {
    let name = profile.indicator.as_str();
    let histogram = profile.summary.stats.as_ref().map(|s| &s.histogram);
    report.chart(files[0], |path| {
        let histogram = histogram.context("no values to plot")?;
        chart::histogram(path, &format!("Distribution of {name} ({title})"), name, histogram)
    });
    let groups = [(name.to_owned(), present(values))];
    report.chart(files[1], |path| {
        chart::box_plot(path, &format!("Box plot of {name}"), name, &groups)
    });
}

/// Line of group means over numeric group keys.
fn mean_line(
    report: &mut ReportDir,
    file: &str,
    title: &str,
    x_desc: &str,
    grouped: &GroupedStats,
) {
    let points = grouped
        .rows
        .iter()
        .filter_map(|row| match row.key {
            GroupKey::Number(key) => Some((key, row.mean)),
            GroupKey::Label(_) => None,
        })
        .collect::<Vec<_>>();
    report.chart(file, |path| chart::line_chart(path, title, x_desc, "mean", &points));
}

/// One bar per group mean, in table order.
fn mean_bars(
    report: &mut ReportDir,
    file: &str,
    title: &str,
    x_desc: &str,
    grouped: &GroupedStats,
) {
    let bars = grouped
        .rows
        .iter()
        .map(|row| (row.key.to_string(), row.mean))
        .collect::<Vec<_>>();
    report.chart(file, |path| chart::bar_chart(path, title, x_desc, "mean", &bars));
}

/// One bar per group rate, in percent.
fn group_rate_bars(
    report: &mut ReportDir,
    file: &str,
    title: &str,
    x_desc: &str,
    rates: &[GroupRate],
) {
    let bars = rates
        .iter()
        .map(|row| (row.key.to_string(), round1(row.percent())))
        .collect::<Vec<_>>();
    report.chart(file, |path| {
        chart::bar_chart(path, title, x_desc, "% of students", &bars)
    });
}

/// One bar per bucket of a rate table, in percent of present values.
fn criteria_bars(report: &mut ReportDir, file: &str, title: &str, table: &RateTable) {
    let bars = table
        .rows
        .iter()
        .map(|row| (row.name.clone(), round1(row.percent())))
        .collect::<Vec<_>>();
    report.chart(file, |path| chart::bar_chart(path, title, "", "% of students", &bars));
}

/// Means of a grouping as `label (mean)`, in table order.
fn describe_means(grouped: &GroupedStats) -> String {
    grouped
        .rows
        .iter()
        .map(|row| format!("{} ({})", row.key, fmt_num(row.mean, 2)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use super::*;

    const CSV: &str = "\
Nome,IAN,IDA,IEG,IPV,Defas,Ano ingresso,Idade 22,Fase,Pedra 22,INDE 22
A1,5,6.3,8.0,7.1,0,2019,11,1,Ametista,7.2
A2,10,8.1,9.5,8.3,0,2018,12,2,Topázio,8.4
A3,2.5,3.2,4.1,5.9,-2,2021,13,2,Quartzo,5.1
A4,5,5.0,6.6,6.8,-1,2020,11,1,Ágata,6.3
A5,5,4.4,5.2,6.1,-1,2021,14,3,Quartzo,5.5
A6,10,9.0,9.1,8.8,0,2017,15,3,Topázio,8.9
A7,,7.7,8.4,7.5,,2019,12,2,Ametista,
A8,2.5,2.9,n/a,5.0,-3,2022,16,4,Quartzo,4.8
A9,2.5,6.8,7.2,7.4,-1,2020,13,ALFA,Ágata,6.6
A10,10,8.4,9.9,8.9,0,2018,14,4,Topázio,8.7
A11,5,7.1,7.9,7.3,-1,2019,12,1,Ametista,7.0
A12,5,5.6,6.0,6.5,-2,2020,13,3,Ágata,6.1
";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pede-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn arg_for(dir: &Path) -> AnalysisArg {
        let data = dir.join("pede.csv");
        fs::write(&data, CSV).unwrap();
        AnalysisArg {
            data,
            output_dir: dir.join("reports"),
            config: None,
        }
    }

    fn read(dir: &Path, file: &str) -> String {
        fs::read_to_string(dir.join(file)).unwrap_or_else(|e| panic!("{file}: {e}"))
    }

    #[test]
    fn test_adequacy_artifacts() {
        let dir = scratch_dir("q1");
        let arg = arg_for(&dir);
        adequacy::run(&arg).unwrap();

        let out = arg.output_dir.join("q1");
        let freq = read(&out, "freq_ian.csv");
        assert_eq!(
            freq.lines().collect::<Vec<_>>(),
            ["IAN,qtd,%_total", "2.5,3,25", "5,5,41.7", "10,3,25"]
        );
        let rates = read(&out, "taxas_defasagem.csv");
        assert!(rates.contains("Defasagem moderada+ (Defas<=-2),3,27.3"), "{rates}");
        assert!(rates.contains("Defasagem severa (Defas<=-3),1,9.1"), "{rates}");
        assert!(read(&out, "overview.csv").starts_with("coluna,dtype,missing_%,n_unicos"));
        assert!(read(&out, "README_q1.md").contains("27.3%"));
        for file in ["ian_por_coorte.csv", "ian_por_pedra.csv", "01_hist_ian.svg"] {
            assert!(out.join(file).exists(), "{file}");
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_engagement_artifacts() {
        let dir = scratch_dir("q3");
        let arg = arg_for(&dir);
        engagement::run(&arg).unwrap();

        let out = arg.output_dir.join("q3");
        let corr = read(&out, "correlacoes_ieg_ida_ipv.csv");
        assert!(corr.starts_with("par,pearson,spearman"));
        assert_eq!(corr.lines().count(), 3);
        let comparison = read(&out, "comparacao_alto_vs_baixo_engajamento.csv");
        assert!(comparison.starts_with("grupo,n,IDA_medio,IPV_medio,delta_IDA,delta_IPV"));
        for file in ["06_scatter_ieg_vs_ida.svg", "08_box_ida_baixo_vs_alto_ieg.svg", "README_q3.md"] {
            assert!(out.join(file).exists(), "{file}");
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_column_aborts() {
        let dir = scratch_dir("missing");
        let data = dir.join("pede.csv");
        fs::write(&data, "IDA,Fase\n5,1\n").unwrap();
        let arg = AnalysisArg {
            data,
            output_dir: dir.join("reports"),
            config: None,
        };
        let err = academic::run(&arg).unwrap_err();
        assert!(format!("{err:#}").contains("Ano ingresso"), "{err:#}");
        assert!(!arg.output_dir.join("q2").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
