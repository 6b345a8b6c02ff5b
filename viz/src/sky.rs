//! RA/Dec scatter of cluster members

use plotters::prelude::*;

use crate::colormap::{draw_colorbar, probability_color};
use crate::{ChartConfig, Result, StarPoint};

const COLORBAR_WIDTH: u32 = 80;

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Square window centred on the stars, so one degree spans the same length on both axes
fn equal_aspect_window(stars: &[&StarPoint]) -> ((f64, f64), (f64, f64)) {
    if stars.is_empty() {
        return ((0.0, 1.0), (0.0, 1.0));
    }
    let (ra_lo, ra_hi) = extent(stars.iter().map(|s| s.x));
    let (dec_lo, dec_hi) = extent(stars.iter().map(|s| s.y));
    let half = 0.55 * (ra_hi - ra_lo).max(dec_hi - dec_lo).max(0.01);
    let ra_mid = 0.5 * (ra_lo + ra_hi);
    let dec_mid = 0.5 * (dec_lo + dec_hi);
    (
        (ra_mid - half, ra_mid + half),
        (dec_mid - half, dec_mid + half),
    )
}

/// Render member positions, `x` = RA and `y` = Dec in degrees
pub fn sky_chart(stars: &[StarPoint], config: &ChartConfig) -> Result<String> {
    let stars: Vec<&StarPoint> = stars.iter().filter(|s| s.is_finite()).collect();
    let ((ra_min, ra_max), (dec_min, dec_max)) = equal_aspect_window(&stars);

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot_area, bar_area) =
            root.split_horizontally(config.width.saturating_sub(COLORBAR_WIDTH));
        draw_colorbar(&bar_area, "probability")?;

        let mut chart = ChartBuilder::on(&plot_area)
            .caption(&config.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(ra_min..ra_max, dec_min..dec_max)?;

        chart
            .configure_mesh()
            .x_desc("RA")
            .y_desc("DEC")
            .x_label_formatter(&|x| format!("{:.2}", x))
            .y_label_formatter(&|y| format!("{:.2}", y))
            .light_line_style(BLACK.mix(0.05))
            .draw()?;

        chart.draw_series(stars.iter().map(|s| {
            Circle::new((s.x, s.y), 3, probability_color(s.probability).mix(0.9).filled())
        }))?;

        root.present()?;
    }
    tracing::debug!("Rendered sky chart '{}' with {} stars", config.title, stars.len());
    Ok(svg)
}
