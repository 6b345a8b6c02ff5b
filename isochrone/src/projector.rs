//! Projection of absolute-magnitude tracks to observed magnitudes
//!
//! For every star and band `m`:
//!
//! ```text
//! m_obs = m_abs + 5 log10(d_pc) - 5 + k_m * A_V
//! ```
//!
//! The distance term is the same in every band, so it moves the whole track
//! vertically in a CMD. Extinction is wavelength dependent: with the Gaia law
//! `k_BP > k_G > k_RP`, so the track is also reddened (shifted in color),
//! which a uniform shift would miss.

use ndarray::Array1;
use serde::Serialize;

use crate::band::Band;
use crate::track::IsochroneTrack;
use crate::{IsochroneError, Result};

/// How `A_V` maps to extinction in each band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtinctionLaw {
    /// Same shift `A_V` in every band
    Uniform,
    /// Band-specific Gaia EDR3 coefficients, see [`Band::gaia_extinction_ratio`]
    GaiaEdr3,
}

impl ExtinctionLaw {
    pub fn from_gaia_flag(gaia: bool) -> Self {
        if gaia {
            Self::GaiaEdr3
        } else {
            Self::Uniform
        }
    }

    /// `k_m` for one band
    pub fn coefficient(&self, band: Band) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::GaiaEdr3 => band.gaia_extinction_ratio(),
        }
    }
}

/// Distance modulus `5 log10(d) - 5` for a distance in parsecs
pub fn distance_modulus(distance_pc: f64) -> f64 {
    5.0 * distance_pc.log10() - 5.0
}

/// A track in apparent magnitudes, with the parameters that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedIsochrone {
    track: IsochroneTrack,
    distance_pc: f64,
    a_v: f64,
    law: ExtinctionLaw,
}

impl ObservedIsochrone {
    pub fn track(&self) -> &IsochroneTrack {
        &self.track
    }

    pub fn distance_pc(&self) -> f64 {
        self.distance_pc
    }

    pub fn a_v(&self) -> f64 {
        self.a_v
    }

    pub fn law(&self) -> ExtinctionLaw {
        self.law
    }

    /// Observed (BP - RP, G) points for the CMD overlay
    pub fn gaia_cmd(&self) -> Vec<(f64, f64)> {
        self.track.cmd_points(Band::Bp, Band::Rp, Band::G)
    }
}

/// Shift `track` to the given distance and extinction
pub fn project(
    track: &IsochroneTrack,
    distance_pc: f64,
    a_v: f64,
    law: ExtinctionLaw,
) -> Result<ObservedIsochrone> {
    if !(distance_pc.is_finite() && distance_pc > 0.0) {
        return Err(IsochroneError::InvalidParameter {
            name: "distance",
            value: distance_pc,
        });
    }
    if !a_v.is_finite() {
        return Err(IsochroneError::InvalidParameter {
            name: "A_V",
            value: a_v,
        });
    }

    let modulus = distance_modulus(distance_pc);
    let offsets: Array1<f64> = track
        .bands()
        .iter()
        .map(|&band| modulus + law.coefficient(band) * a_v)
        .collect();

    Ok(ObservedIsochrone {
        track: track.shifted(&offsets),
        distance_pc,
        a_v,
        law,
    })
}
