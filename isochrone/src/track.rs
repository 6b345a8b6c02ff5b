//! Isochrone tracks
//!
//! A track is an ordered list of synthetic stars with their initial mass and
//! one magnitude per band, stored as an `(n_stars, n_bands)` matrix.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::band::Band;
use crate::{IsochroneError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneTrack {
    bands: Vec<Band>,
    initial_mass: Array1<f64>,
    magnitudes: Array2<f64>,
}

impl IsochroneTrack {
    /// Build a track; `magnitudes` must have one row per mass and one column per band
    pub fn new(
        bands: Vec<Band>,
        initial_mass: Array1<f64>,
        magnitudes: Array2<f64>,
    ) -> Result<Self> {
        let expected = (initial_mass.len(), bands.len());
        if magnitudes.dim() != expected {
            return Err(IsochroneError::Shape(ndarray::ShapeError::from_kind(
                ndarray::ErrorKind::IncompatibleShape,
            )));
        }
        Ok(Self {
            bands,
            initial_mass,
            magnitudes,
        })
    }

    /// Build a track from per-band columns of equal length
    pub fn from_columns(initial_mass: Vec<f64>, columns: Vec<(Band, Vec<f64>)>) -> Result<Self> {
        let rows = initial_mass.len();
        let bands: Vec<Band> = columns.iter().map(|(b, _)| *b).collect();
        let mut magnitudes = Array2::from_elem((rows, bands.len()), f64::NAN);
        for (j, (_, values)) in columns.into_iter().enumerate() {
            let column = Array1::from(values);
            if column.len() != rows {
                return Err(IsochroneError::Shape(ndarray::ShapeError::from_kind(
                    ndarray::ErrorKind::IncompatibleShape,
                )));
            }
            magnitudes.column_mut(j).assign(&column);
        }
        Self::new(bands, Array1::from(initial_mass), magnitudes)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn initial_mass(&self) -> ArrayView1<'_, f64> {
        self.initial_mass.view()
    }

    pub fn magnitudes(&self) -> &Array2<f64> {
        &self.magnitudes
    }

    pub fn len(&self) -> usize {
        self.initial_mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initial_mass.is_empty()
    }

    fn band_index(&self, band: Band) -> Option<usize> {
        self.bands.iter().position(|&b| b == band)
    }

    /// Magnitudes of one band along the track
    pub fn magnitude(&self, band: Band) -> Option<ArrayView1<'_, f64>> {
        self.band_index(band).map(|j| self.magnitudes.column(j))
    }

    /// Color index `blue - red` along the track
    pub fn color(&self, blue: Band, red: Band) -> Option<Array1<f64>> {
        Some(&self.magnitude(blue)? - &self.magnitude(red)?)
    }

    /// (color, magnitude) pairs for a CMD, skipping non-finite points
    pub fn cmd_points(&self, blue: Band, red: Band, magnitude: Band) -> Vec<(f64, f64)> {
        let (Some(color), Some(mag)) = (self.color(blue, red), self.magnitude(magnitude)) else {
            return Vec::new();
        };
        color
            .iter()
            .zip(mag.iter())
            .filter(|(c, m)| c.is_finite() && m.is_finite())
            .map(|(&c, &m)| (c, m))
            .collect()
    }

    /// Track restricted to `bands`, in that order
    pub fn select_bands(&self, bands: &[Band]) -> Result<Self> {
        let indices = bands
            .iter()
            .map(|&b| self.band_index(b).ok_or(IsochroneError::UnknownBand(b)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            bands: bands.to_vec(),
            initial_mass: self.initial_mass.clone(),
            magnitudes: self.magnitudes.select(Axis(1), &indices),
        })
    }

    /// Drop stars whose magnitude in `band` is not finite
    pub fn retain_finite(&self, band: Band) -> Result<Self> {
        let column = self.magnitude(band).ok_or(IsochroneError::UnknownBand(band))?;
        let keep: Vec<usize> = column
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_finite())
            .map(|(i, _)| i)
            .collect();
        Ok(Self {
            bands: self.bands.clone(),
            initial_mass: self.initial_mass.select(Axis(0), &keep),
            magnitudes: self.magnitudes.select(Axis(0), &keep),
        })
    }

    /// Copy with every magnitude in band `j` shifted by `offsets[j]`
    pub(crate) fn shifted(&self, offsets: &Array1<f64>) -> Self {
        Self {
            bands: self.bands.clone(),
            initial_mass: self.initial_mass.clone(),
            magnitudes: &self.magnitudes + offsets,
        }
    }

    /// Linear blend with `other` at weight `w` (0 keeps `self`, 1 gives `other`)
    ///
    /// Both tracks are compared at equal initial mass: `other` is resampled
    /// onto the masses of `self` that lie inside both tracks' mass range.
    /// Returns `None` when the tracks share fewer than two masses or bands differ.
    pub fn blend(&self, other: &Self, w: f64) -> Option<Self> {
        if w <= 0.0 {
            return Some(self.clone());
        }
        if w >= 1.0 {
            return Some(other.clone());
        }
        if self.bands != other.bands || self.is_empty() || other.is_empty() {
            return None;
        }

        let lo = self.min_mass().max(other.min_mass());
        let hi = self.max_mass().min(other.max_mass());
        let keep: Vec<usize> = self
            .initial_mass
            .iter()
            .enumerate()
            .filter(|(_, m)| **m >= lo && **m <= hi)
            .map(|(i, _)| i)
            .collect();
        if keep.len() < 2 {
            return None;
        }

        let masses = self.initial_mass.select(Axis(0), &keep);
        let mut magnitudes = Array2::zeros((keep.len(), self.bands.len()));
        for j in 0..self.bands.len() {
            let own = self.magnitudes.column(j);
            let theirs = other.magnitudes.column(j);
            for (row, (&i, &m)) in keep.iter().zip(masses.iter()).enumerate() {
                let resampled = interpolate(other.initial_mass.view(), theirs, m);
                magnitudes[[row, j]] = (1.0 - w) * own[i] + w * resampled;
            }
        }

        Some(Self {
            bands: self.bands.clone(),
            initial_mass: masses,
            magnitudes,
        })
    }

    fn min_mass(&self) -> f64 {
        self.initial_mass.iter().copied().fold(f64::INFINITY, f64::min)
    }

    fn max_mass(&self) -> f64 {
        self.initial_mass
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Piecewise linear interpolation of `ys(xs)` at `x`; `xs` ascending
fn interpolate(xs: ArrayView1<f64>, ys: ArrayView1<f64>, x: f64) -> f64 {
    let n = xs.len();
    let upper = xs.as_slice().map_or_else(
        || xs.iter().position(|&v| v >= x).unwrap_or(n),
        |s| s.partition_point(|&v| v < x),
    );
    if upper == 0 {
        return ys[0];
    }
    if upper >= n {
        return ys[n - 1];
    }
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
