//! Gaia photometric bands

use serde::Serialize;
use std::fmt;

/// Photometric band of the Gaia EDR3 system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Band {
    /// Broad G band (~330-1050 nm)
    G,
    /// Blue photometer band G_BP
    Bp,
    /// Red photometer band G_RP
    Rp,
}

/// Bands used for every CMD on the dashboard, primary band first
pub const GAIA_BANDS: [Band; 3] = [Band::G, Band::Bp, Band::Rp];

impl Band {
    pub const ALL: [Band; 3] = GAIA_BANDS;

    /// Column holding this band in PARSEC isochrone tables
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::G => "Gmag",
            Self::Bp => "G_BPmag",
            Self::Rp => "G_RPmag",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.column_name() == name)
    }

    /// A_band / A_V for Gaia EDR3 passbands (Cardelli et al. 1989 law,
    /// O'Donnell 1994 coefficients, as tabulated by the PARSEC CMD service)
    pub fn gaia_extinction_ratio(&self) -> f64 {
        match self {
            Self::G => 0.83627,
            Self::Bp => 1.08337,
            Self::Rp => 0.63439,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::G => "G",
            Self::Bp => "G_BP",
            Self::Rp => "G_RP",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_round_trip() {
        for band in Band::ALL {
            assert_eq!(Band::from_column_name(band.column_name()), Some(band));
        }
        assert_eq!(Band::from_column_name("Vmag"), None);
    }

    #[test]
    fn test_extinction_is_stronger_in_blue() {
        assert!(Band::Bp.gaia_extinction_ratio() > Band::G.gaia_extinction_ratio());
        assert!(Band::G.gaia_extinction_ratio() > Band::Rp.gaia_extinction_ratio());
    }
}
