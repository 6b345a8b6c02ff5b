//! Stellar isochrones for open cluster fitting
//!
//! An isochrone is the locus of stars of one age and metallicity in
//! absolute-magnitude space. This crate covers three steps:
//!
//! 1. **Grid lookup** ([`grid`]): the [`IsochroneGrid`] trait returns the
//!    track for a (log age, Z) pair. [`ParsecGrid`] implements it over a
//!    tabulated PARSEC v1.2S grid; tests substitute their own stubs.
//! 2. **Projection** ([`projector`]): shifts a track to apparent magnitudes
//!    with the distance modulus `5 log10(d) - 5` and a per-band extinction
//!    term `k_m * A_V`.
//! 3. **Fitting a catalog entry** ([`fit_isochrone`]): both steps driven by a
//!    cluster's fitted parameters and an explicit metallicity policy.
//!
//! # Metallicity
//!
//! The grid is indexed by mass fraction Z. Catalog metallicities are [Fe/H]
//! in dex and convert as `Z = 10^[Fe/H] * Z_sun` with `Z_sun = 0.0152`.
//! Callers must say which policy applies, see [`MetallicityPolicy`]: the
//! resulting track shape depends on it.

pub mod band;
pub mod grid;
pub mod projector;
pub mod track;

use serde::Serialize;
use thiserror::Error;

pub use band::{Band, GAIA_BANDS};
pub use grid::{IsochroneGrid, ParsecGrid};
pub use projector::{distance_modulus, project, ExtinctionLaw, ObservedIsochrone};
pub use track::IsochroneTrack;

/// Solar metal mass fraction of the PARSEC v1.2S grid
pub const SOLAR_Z: f64 = 0.0152;

#[derive(Error, Debug)]
pub enum IsochroneError {
    #[error("failed to read isochrone grid: {0}")]
    Catalog(#[from] cluster_catalog::CatalogError),

    #[error("band {0} is not available in the isochrone grid")]
    UnknownBand(Band),

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("isochrone grid is empty")]
    EmptyGrid,

    #[error("isochrone grid has no track for logAge={log_age}, Z={z}")]
    MissingNode { log_age: f64, z: f64 },

    #[error("track shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, IsochroneError>;

/// Which metallicity is handed to the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "policy", content = "fe_h", rename_all = "snake_case")]
pub enum MetallicityPolicy {
    /// Assume solar metallicity, [Fe/H] = 0
    Solar,
    /// Use a measured [Fe/H] from the catalog
    Measured(f64),
}

impl MetallicityPolicy {
    /// [Fe/H] in dex
    pub fn fe_h(&self) -> f64 {
        match self {
            Self::Solar => 0.0,
            Self::Measured(fe_h) => *fe_h,
        }
    }

    /// Metal mass fraction Z for the grid lookup
    pub fn z(&self) -> f64 {
        10f64.powf(self.fe_h()) * SOLAR_Z
    }
}

/// Everything needed to overlay an isochrone on a cluster's CMD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IsochroneRequest {
    /// log10(age / yr)
    pub log_age: f64,
    pub metallicity: MetallicityPolicy,
    pub distance_pc: f64,
    pub a_v: f64,
    pub law: ExtinctionLaw,
    /// Interpolate between grid nodes instead of taking the nearest one
    pub interpolate: bool,
}

impl IsochroneRequest {
    /// Interpolating request; `gaia_extinction` selects the per-band Gaia
    /// coefficients over a uniform `A_V` shift
    pub fn new(
        log_age: f64,
        metallicity: MetallicityPolicy,
        distance_pc: f64,
        a_v: f64,
        gaia_extinction: bool,
    ) -> Self {
        Self {
            log_age,
            metallicity,
            distance_pc,
            a_v,
            law: ExtinctionLaw::from_gaia_flag(gaia_extinction),
            interpolate: true,
        }
    }

    /// Request with Gaia extinction coefficients, the combination every
    /// dashboard chart uses
    pub fn gaia(log_age: f64, metallicity: MetallicityPolicy, distance_pc: f64, a_v: f64) -> Self {
        Self::new(log_age, metallicity, distance_pc, a_v, true)
    }
}

/// Look up the track for a request in the Gaia bands and project it
pub fn fit_isochrone<G: IsochroneGrid + ?Sized>(
    grid: &G,
    request: &IsochroneRequest,
) -> Result<ObservedIsochrone> {
    let track = grid.isochrone(
        request.log_age,
        request.metallicity.z(),
        &GAIA_BANDS,
        Band::G,
        request.interpolate,
    )?;
    tracing::debug!(
        "Isochrone logAge={:.3} Z={:.5}: {} points",
        request.log_age,
        request.metallicity.z(),
        track.len()
    );
    project(&track, request.distance_pc, request.a_v, request.law)
}
