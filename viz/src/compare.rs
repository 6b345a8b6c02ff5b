//! Charts comparing two catalogs
//!
//! [`catalog_scatter`] plots one parameter, ours on x and Hunt on y, over
//! every cluster both catalogs list. [`parameter_bars`] shows the selected
//! cluster's parameters side by side, one panel per parameter since the
//! scales differ.

use plotters::prelude::*;

use crate::{padded_range, ChartConfig, Result};

/// Bar color for our catalog
pub const OURS_COLOR: RGBColor = RGBColor(31, 119, 180);
/// Bar color for the Hunt catalog
pub const HUNT_COLOR: RGBColor = RGBColor(255, 127, 14);

/// One parameter of the selected cluster in both catalogs
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBar {
    pub label: String,
    pub ours: Option<f64>,
    pub hunt: Option<f64>,
}

impl ParameterBar {
    pub fn new(label: impl Into<String>, ours: Option<f64>, hunt: Option<f64>) -> Self {
        Self {
            label: label.into(),
            ours,
            hunt,
        }
    }
}

/// Scatter of (ours, hunt) pairs; non-finite pairs are skipped
pub fn catalog_scatter(pairs: &[(f64, f64)], config: &ChartConfig) -> Result<String> {
    let points: Vec<(f64, f64)> = pairs
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    // shared range so the 1:1 line is the diagonal
    let (lo, hi) = padded_range(points.iter().flat_map(|&(x, y)| [x, y]), (0.0, 1.0));

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&config.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, lo..hi)?;

        chart
            .configure_mesh()
            .x_desc("Our")
            .y_desc("Hunt")
            .light_line_style(BLACK.mix(0.05))
            .draw()?;

        chart.draw_series(LineSeries::new([(lo, lo), (hi, hi)], BLACK.mix(0.3).stroke_width(1)))?;
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 3, OURS_COLOR.mix(0.3).filled())),
        )?;

        root.present()?;
    }
    tracing::debug!("Rendered catalog scatter '{}' with {} clusters", config.title, points.len());
    Ok(svg)
}

/// Grouped bars, one panel per parameter; a missing value leaves its bar out
pub fn parameter_bars(bars: &[ParameterBar], config: &ChartConfig) -> Result<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(&config.title, ("sans-serif", 20))?;
        let panels = root.split_evenly((1, bars.len().max(1)));

        for (index, (bar, panel)) in bars.iter().zip(panels.iter()).enumerate() {
            let values = [bar.ours, bar.hunt];
            let top = values
                .iter()
                .flatten()
                .copied()
                .filter(|v| v.is_finite())
                .fold(0.0f64, f64::max);
            let bottom = values
                .iter()
                .flatten()
                .copied()
                .filter(|v| v.is_finite())
                .fold(0.0f64, f64::min);
            let top = if top > bottom { top * 1.15 } else { 1.0 };

            let mut chart = ChartBuilder::on(panel)
                .margin(10)
                .x_label_area_size(30)
                .y_label_area_size(45)
                .build_cartesian_2d(0.0..1.0, bottom..top)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(0)
                .x_desc(bar.label.as_str())
                .light_line_style(BLACK.mix(0.05))
                .draw()?;

            for (value, (x0, x1), color, name) in [
                (bar.ours, (0.15, 0.45), OURS_COLOR, "Our"),
                (bar.hunt, (0.55, 0.85), HUNT_COLOR, "Hunt"),
            ] {
                let Some(value) = value.filter(|v| v.is_finite()) else {
                    continue;
                };
                let series = chart.draw_series(std::iter::once(Rectangle::new(
                    [(x0, 0.0), (x1, value)],
                    color.mix(0.5).filled(),
                )))?;
                if index == 0 {
                    series.label(name).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.mix(0.5).filled())
                    });
                }
            }

            if index == 0 {
                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK.mix(0.3))
                    .draw()?;
            }
        }

        root.present()?;
    }
    Ok(svg)
}
