//! Color-magnitude diagrams
//!
//! Stars are drawn in input order, so callers sort by probability first to
//! put the most likely members on top. The G axis runs from 20 at the bottom
//! to 5 at the top; points outside that window are left out.

use plotters::prelude::*;

use crate::colormap::{draw_colorbar, probability_color};
use crate::{padded_range, ChartConfig, Result, StarPoint};

/// Faintest and brightest G drawn
pub const MAGNITUDE_WINDOW: (f64, f64) = (20.0, 5.0);

const COLORBAR_WIDTH: u32 = 80;

/// Point styling for a CMD
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmdStyle {
    /// Jet colormap by probability, with a color bar
    Probability,
    /// One translucent color, probabilities ignored
    Plain,
}

fn in_window(magnitude: f64) -> bool {
    let (faint, bright) = MAGNITUDE_WINDOW;
    magnitude <= faint && magnitude >= bright
}

/// Render a CMD: `stars` as (BP - RP, G) points and `isochrone` as a red line
pub fn cmd_chart(
    stars: &[StarPoint],
    isochrone: Option<&[(f64, f64)]>,
    style: CmdStyle,
    config: &ChartConfig,
) -> Result<String> {
    let stars: Vec<&StarPoint> = stars
        .iter()
        .filter(|s| s.is_finite() && in_window(s.y))
        .collect();
    let line: Vec<(f64, f64)> = isochrone
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|&(c, m)| c.is_finite() && in_window(m))
        .collect();

    let (x_min, x_max) = padded_range(
        stars.iter().map(|s| s.x).chain(line.iter().map(|p| p.0)),
        (-0.5, 3.0),
    );
    let (faint, bright) = MAGNITUDE_WINDOW;

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let plot_area = match style {
            CmdStyle::Probability => {
                let (plot_area, bar_area) =
                    root.split_horizontally(config.width.saturating_sub(COLORBAR_WIDTH));
                draw_colorbar(&bar_area, "probability")?;
                plot_area
            }
            CmdStyle::Plain => root.clone(),
        };

        // y holds -G so brighter stars sit higher
        let mut chart = ChartBuilder::on(&plot_area)
            .caption(&config.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, -faint..-bright)?;

        chart
            .configure_mesh()
            .x_desc("G_BP - G_RP (mag)")
            .y_desc("G (mag)")
            .y_label_formatter(&|y| format!("{:.0}", -y))
            .light_line_style(BLACK.mix(0.05))
            .draw()?;

        match style {
            CmdStyle::Probability => chart.draw_series(stars.iter().map(|s| {
                Circle::new((s.x, -s.y), 3, probability_color(s.probability).mix(0.9).filled())
            }))?,
            CmdStyle::Plain => chart.draw_series(
                stars
                    .iter()
                    .map(|s| Circle::new((s.x, -s.y), 3, BLUE.mix(0.3).filled())),
            )?,
        };

        if line.len() > 1 {
            chart.draw_series(LineSeries::new(
                line.iter().map(|&(c, m)| (c, -m)),
                RED.stroke_width(2),
            ))?;
        }

        root.present()?;
    }
    tracing::debug!(
        "Rendered CMD '{}' with {} stars, {} isochrone points",
        config.title,
        stars.len(),
        line.len()
    );
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_helpers::output_path;

    const ISOCHRONE_STROKE: &str = "stroke=\"#FF0000\"";

    fn members() -> Vec<StarPoint> {
        vec![
            StarPoint::new(0.4, 14.0, Some(0.2)),
            StarPoint::new(0.8, 15.5, Some(0.6)),
            StarPoint::new(1.1, 17.0, Some(0.95)),
        ]
    }

    #[test]
    fn test_cmd_with_isochrone() {
        let iso = vec![(0.2, 10.0), (0.6, 13.0), (1.0, 16.0), (1.4, 19.0)];
        let svg = cmd_chart(
            &members(),
            Some(iso.as_slice()),
            CmdStyle::Probability,
            &ChartConfig::titled("NGC_2516"),
        )
        .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("NGC_2516"));
        assert!(svg.contains(ISOCHRONE_STROKE));
        std::fs::write(output_path("cmd_probability.svg"), &svg).unwrap();
    }

    #[test]
    fn test_cmd_empty_renders() {
        let svg = cmd_chart(&[], None, CmdStyle::Plain, &ChartConfig::default()).unwrap();
        assert!(svg.contains("G (mag)"));
        assert!(!svg.contains("<circle"));
        assert!(!svg.contains(ISOCHRONE_STROKE));
    }

    #[test]
    fn test_cmd_drops_points_outside_window() {
        let stars = vec![
            StarPoint::new(0.5, 3.0, None),
            StarPoint::new(f64::NAN, 12.0, None),
            StarPoint::new(0.5, 12.0, None),
        ];
        let svg = cmd_chart(&stars, None, CmdStyle::Plain, &ChartConfig::default()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 1);
        std::fs::write(output_path("cmd_plain.svg"), &svg).unwrap();
    }

    #[test]
    fn test_window_bounds() {
        assert!(in_window(5.0));
        assert!(in_window(20.0));
        assert!(!in_window(20.1));
        assert!(!in_window(f64::NAN));
    }
}
