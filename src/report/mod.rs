// src/report/mod.rs

//! SVG line charts of sweep results.

use crate::core::CollapseError;
use crate::experiments::{SearchGridResult, SweepResult};
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 640);

/// One labelled polyline.
struct Series {
    label: String,
    points: Vec<(f64, f64)>,
}

fn report_err<E: Display>(e: E) -> CollapseError {
    CollapseError::Report { message: e.to_string() }
}

/// Plots the mass-dependent and baseline series of a sweep against the swept value.
pub fn plot_sweep(
    result: &SweepResult,
    path: &Path,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<(), CollapseError> {
    let xs: Vec<f64> = result.values().into_iter().map(|v| v as f64).collect();
    let series = vec![
        Series {
            label: "mass-dependent".to_string(),
            points: xs.iter().copied().zip(result.mass_series()).collect(),
        },
        Series {
            label: "constant baseline".to_string(),
            points: xs.iter().copied().zip(result.baseline_series()).collect(),
        },
    ];
    render_lines(path, caption, x_desc, y_desc, &series)
}

/// Plots search success against iterations, two lines per register size.
pub fn plot_search_grid(grid: &SearchGridResult, path: &Path, caption: &str) -> Result<(), CollapseError> {
    let xs: Vec<f64> = grid.iterations.iter().map(|i| *i as f64).collect();
    let mut series = Vec::new();
    for (n, values) in &grid.mass_dependent {
        series.push(Series {
            label: format!("n={} mass-dependent", n),
            points: xs.iter().copied().zip(values.iter().copied()).collect(),
        });
        if let Some(baseline) = grid.baseline.get(n) {
            series.push(Series {
                label: format!("n={} baseline", n),
                points: xs.iter().copied().zip(baseline.iter().copied()).collect(),
            });
        }
    }
    render_lines(path, caption, "Grover iterations", "success probability", &series)
}

fn axis_range(values: impl Iterator<Item = f64>, min_span: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.1).max(min_span);
    (lo - pad, hi + pad)
}

fn render_lines(
    path: &Path,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[Series],
) -> Result<(), CollapseError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let all_points = || series.iter().flat_map(|s| s.points.iter().copied());
    let (x_lo, x_hi) = axis_range(all_points().map(|(x, _)| x), 0.5);
    let (y_lo, y_hi) = axis_range(all_points().map(|(_, y)| y), 0.05);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(report_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(report_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(report_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), &color))
            .map_err(report_err)?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart
            .draw_series(s.points.iter().map(|&p| Circle::new(p, 3, color.filled())))
            .map_err(report_err)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(report_err)?;

    root.present().map_err(report_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn range_pads_flat_series() {
        let (lo, hi) = axis_range([1.0, 1.0].into_iter(), 0.05);
        assert!(lo < 1.0 && hi > 1.0);
        assert_eq!(axis_range(std::iter::empty(), 0.05), (0.0, 1.0));
    }

    #[test]
    fn writes_svg() -> Result<(), CollapseError> {
        let mut mass = BTreeMap::new();
        mass.insert(3, vec![0.8, 0.6]);
        let mut baseline = BTreeMap::new();
        baseline.insert(3, vec![0.9, 0.85]);
        let grid = SearchGridResult { iterations: vec![1, 2], mass_dependent: mass, baseline };

        let path = std::env::temp_dir().join(format!("collapse_report_{}.svg", std::process::id()));
        plot_search_grid(&grid, &path, "search test")?;
        let svg = fs::read_to_string(&path)?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("search test"));
        fs::remove_file(&path)?;
        Ok(())
    }
}
