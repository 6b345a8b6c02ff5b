//! Jet colormap

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::Result;

/// Flat color for points without a probability
pub const UNRATED: RGBColor = RGBColor(31, 119, 180);

/// Jet colormap: blue at 0, green at 0.5, red at 1
///
/// Values outside [0, 1] are clamped; NaN maps to the low end.
pub fn jet(value: f64) -> RGBColor {
    let t = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let channel = |center: f64| {
        let v = (1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0);
        (v * 255.0).round() as u8
    };
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

/// Point color for an optional membership probability
pub fn probability_color(probability: Option<f64>) -> RGBColor {
    probability.map_or(UNRATED, jet)
}

/// Vertical probability color bar filling `area`
pub(crate) fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    label: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    const STEPS: usize = 50;
    let mut bar = ChartBuilder::on(area)
        .margin_top(20)
        .margin_bottom(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;
    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_desc(label)
        .draw()?;
    bar.draw_series((0..STEPS).map(|i| {
        let lo = i as f64 / STEPS as f64;
        let hi = (i + 1) as f64 / STEPS as f64;
        Rectangle::new([(0.0, lo), (1.0, hi)], jet(0.5 * (lo + hi)).filled())
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_endpoints() {
        assert_eq!(jet(0.0), RGBColor(0, 0, 128));
        assert_eq!(jet(0.5), RGBColor(128, 255, 128));
        assert_eq!(jet(1.0), RGBColor(128, 0, 0));
    }

    #[test]
    fn test_jet_clamps() {
        assert_eq!(jet(-3.0), jet(0.0));
        assert_eq!(jet(7.0), jet(1.0));
        assert_eq!(jet(f64::NAN), jet(0.0));
    }

    #[test]
    fn test_probability_color() {
        assert_eq!(probability_color(None), UNRATED);
        assert_eq!(probability_color(Some(1.0)), jet(1.0));
    }
}
