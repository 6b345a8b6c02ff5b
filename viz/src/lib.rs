//! SVG charts for open cluster catalogs.
//!
//! Every chart renders to an in-memory SVG document with the `plotters` SVG
//! backend, so the dashboard can serve it directly or inline it in a page.
//!
//! # Charts
//!
//! - [`cmd`]: color-magnitude diagram of member stars with an optional
//!   isochrone line, G axis inverted.
//! - [`sky`]: RA/Dec scatter of member stars at equal aspect.
//! - [`compare`]: cross-catalog scatter of one parameter and the grouped
//!   "ours vs Hunt" parameter bars.
//!
//! Member points are colored by membership probability through the
//! [`colormap::jet`] scale. Stars without a probability use a flat color.
//!
//! Empty inputs are valid: the axes are drawn over a default range and the
//! chart is returned without points.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

pub mod cmd;
pub mod colormap;
pub mod compare;
pub mod sky;

/// Errors raised while rendering a chart.
#[derive(Debug, Error)]
pub enum VizError {
    /// Drawing backend failure.
    #[error("Render error: {0}")]
    Render(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for VizError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        VizError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VizError>;

/// Size and caption of one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub title: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 640,
            height: 480,
        }
    }
}

impl ChartConfig {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A member star placed in a chart's data coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPoint {
    pub x: f64,
    pub y: f64,
    /// Membership probability in [0, 1]; selects the point color
    pub probability: Option<f64>,
}

impl StarPoint {
    pub fn new(x: f64, y: f64, probability: Option<f64>) -> Self {
        Self { x, y, probability }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis range over the finite `values` with 5% padding, `default` when there are none
pub(crate) fn padded_range(
    values: impl IntoIterator<Item = f64>,
    default: (f64, f64),
) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return default;
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([0.0, 10.0], (0.0, 1.0)), (-0.5, 10.5));
        assert_eq!(padded_range([2.0, 2.0], (0.0, 1.0)), (1.5, 2.5));
    }

    #[test]
    fn test_padded_range_falls_back_without_finite_values() {
        assert_eq!(padded_range(std::iter::empty(), (-1.0, 3.0)), (-1.0, 3.0));
        assert_eq!(padded_range([f64::NAN, f64::INFINITY], (-1.0, 3.0)), (-1.0, 3.0));
    }

    #[test]
    fn test_chart_config_builders() {
        let config = ChartConfig::titled("CMD").with_size(300, 200);
        assert_eq!(config.title, "CMD");
        assert_eq!((config.width, config.height), (300, 200));
    }
}
