//! SVG charts
//!
//! Presentation only: every chart is drawn from values already computed by
//! the analysis, never from the raw table.

use std::{ops::Range, path::Path};

use pede_stats::percentiles::compute_percentile;
use plotters::prelude::*;

const SIZE: (u32, u32) = (1000, 500);

/// Bars over the bins of a value histogram.
#[expect(clippy::cast_precision_loss)]
pub fn histogram(
    path: &Path,
    title: &str,
    x_desc: &str,
    histogram: &pede_stats::histogram::Histogram,
) -> anyhow::Result<()> {
    let (Some(first), Some(last)) = (histogram.bins.first(), histogram.bins.last()) else {
        anyhow::bail!("no values to plot");
    };
    let y_max = histogram.max_count() as f64 * 1.1;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first.range.start..last.range.end, 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Students")
        .draw()?;
    chart.draw_series(histogram.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.range.start, 0.0), (bin.range.end, bin.count as f64)],
            BLUE.mix(0.6).filled(),
        )
    }))?;
    root.present()?;
    Ok(())
}

/// Five-number summary behind one box of a box plot.
#[derive(Debug, Clone, PartialEq)]
struct BoxSummary {
    q1: f64,
    median: f64,
    q3: f64,
    /// Most extreme values within 1.5 IQR of the box
    whiskers: (f64, f64),
    outliers: Vec<f64>,
}

impl BoxSummary {
    fn new(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        if sorted.is_empty() {
            return None;
        }
        let q1 = compute_percentile(&sorted, 25.0);
        let median = compute_percentile(&sorted, 50.0);
        let q3 = compute_percentile(&sorted, 75.0);
        let fence = 1.5 * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - fence, q3 + fence);

        let inside = sorted
            .iter()
            .copied()
            .filter(|v| (lo_fence..=hi_fence).contains(v));
        let whiskers = inside.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(lo_fence..=hi_fence).contains(v))
            .collect();
        Some(Self {
            q1,
            median,
            q3,
            whiskers,
            outliers,
        })
    }
}

/// Horizontal box plot with one box per group, first group at the bottom.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn box_plot(
    path: &Path,
    title: &str,
    x_desc: &str,
    groups: &[(String, Vec<f64>)],
) -> anyhow::Result<()> {
    let boxes = groups
        .iter()
        .enumerate()
        .filter_map(|(idx, (_, values))| Some((idx as f64, BoxSummary::new(values)?)))
        .collect::<Vec<_>>();
    if boxes.is_empty() {
        anyhow::bail!("no values to plot");
    }
    let all_values = groups.iter().flat_map(|(_, values)| values.iter().copied());
    let x_range = padded_range(all_values)?;
    let y_range = -0.5..(groups.len() as f64 - 0.5);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range, y_range)?;

    let label_at = |y: &f64| {
        let idx = y.round();
        if (y - idx).abs() > 1e-9 || idx < 0.0 {
            return String::new();
        }
        groups
            .get(idx as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(x_desc)
        .y_label_formatter(&label_at)
        .draw()?;

    let half = 0.25;
    chart.draw_series(boxes.iter().map(|(y, b)| {
        Rectangle::new([(b.q1, y - half), (b.q3, y + half)], BLUE.mix(0.3).filled())
    }))?;
    chart.draw_series(boxes.iter().map(|(y, b)| {
        Rectangle::new([(b.q1, y - half), (b.q3, y + half)], BLUE.stroke_width(1))
    }))?;

    let mut segments = Vec::new();
    for (y, b) in &boxes {
        let (lo, hi) = b.whiskers;
        segments.push(vec![(lo, *y), (b.q1, *y)]);
        segments.push(vec![(b.q3, *y), (hi, *y)]);
        segments.push(vec![(lo, y - half / 2.0), (lo, y + half / 2.0)]);
        segments.push(vec![(hi, y - half / 2.0), (hi, y + half / 2.0)]);
    }
    chart.draw_series(segments.into_iter().map(|points| PathElement::new(points, BLACK)))?;
    chart.draw_series(boxes.iter().map(|(y, b)| {
        PathElement::new(
            vec![(b.median, y - half), (b.median, y + half)],
            RED.stroke_width(2),
        )
    }))?;
    chart.draw_series(boxes.iter().flat_map(|(y, b)| {
        b.outliers
            .iter()
            .map(move |v| Circle::new((*v, *y), 3, BLACK.stroke_width(1)))
    }))?;

    root.present()?;
    Ok(())
}

/// Mean per numeric group key, connected in key order.
pub fn line_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
) -> anyhow::Result<()> {
    let points = points
        .iter()
        .copied()
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect::<Vec<_>>();
    let x_range = padded_range(points.iter().map(|(x, _)| *x))?;
    let y_range = padded_range(points.iter().map(|(_, y)| *y))?;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;
    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
    )?;
    root.present()?;
    Ok(())
}

/// One labeled bar per category; NaN values leave an empty slot.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    bars: &[(String, f64)],
) -> anyhow::Result<()> {
    if bars.iter().all(|(_, v)| v.is_nan()) {
        anyhow::bail!("no values to plot");
    }
    let max = bars
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| !v.is_nan())
        .fold(0.0, f64::max);
    let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };
    let slots = bars.len() as i32;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..slots).into_segmented(), 0f64..y_max)?;

    let label_at = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(idx) => usize::try_from(*idx)
            .ok()
            .and_then(|idx| bars.get(idx))
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&label_at)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(10)
            .data(
                bars.iter()
                    .enumerate()
                    .filter(|(_, (_, v))| !v.is_nan())
                    .map(|(idx, (_, v))| (idx as i32, *v)),
            ),
    )?;
    root.present()?;
    Ok(())
}

/// Paired observations of two indicators.
pub fn scatter(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
) -> anyhow::Result<()> {
    let x_range = padded_range(points.iter().map(|(x, _)| *x))?;
    let y_range = padded_range(points.iter().map(|(_, y)| *y))?;

    let root = SVGBackend::new(path, (700, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.6).filled())),
    )?;
    root.present()?;
    Ok(())
}

/// Value range widened by 5% on each side (0.5 for a single value).
fn padded_range<I>(values: I) -> anyhow::Result<Range<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        anyhow::bail!("no values to plot");
    }
    let pad = if max - min < f64::EPSILON {
        0.5
    } else {
        (max - min) * 0.05
    };
    Ok(min - pad..max + pad)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_box_summary_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = BoxSummary::new(&values).unwrap();
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.whiskers, (1.0, 5.0));
        assert_eq!(summary.outliers, vec![100.0]);
        assert!(BoxSummary::new(&[]).is_none());
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([2.0, 2.0]).unwrap(), 1.5..2.5);
        assert_eq!(padded_range([0.0, 10.0, f64::NAN]).unwrap(), -0.5..10.5);
        assert!(padded_range([f64::NAN]).is_err());
    }

    #[test]
    fn test_renders_svg_files() {
        let dir = std::env::temp_dir().join(format!("pede-chart-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let values = [2.5, 5.0, 5.0, 10.0, 5.0, 2.5];
        let hist = pede_stats::histogram::Histogram::new(values, 4);
        let hist_path = dir.join("hist.svg");
        histogram(&hist_path, "IAN", "IAN", &hist).unwrap();

        let bars_path = dir.join("bars.svg");
        let bars = [("Quartzo".to_owned(), 4.2), ("Ágata".to_owned(), f64::NAN)];
        bar_chart(&bars_path, "Mean by tier", "tier", "mean", &bars).unwrap();

        let box_path = dir.join("box.svg");
        box_plot(&box_path, "IAN", "IAN", &[("IAN".to_owned(), values.to_vec())]).unwrap();

        for path in [hist_path, bars_path, box_path] {
            let svg = fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"), "{}", path.display());
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let path = std::env::temp_dir().join("pede-chart-empty.svg");
        assert!(scatter(&path, "empty", "x", "y", &[]).is_err());
        assert!(bar_chart(&path, "empty", "x", "y", &[("a".to_owned(), f64::NAN)]).is_err());
    }
}
