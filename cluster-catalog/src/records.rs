//! Catalog row types

use serde::Serialize;
use std::fmt;

/// Object class tag carried by the Hunt cluster table (`kind` column)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ClusterKind {
    /// Open cluster, tagged `o`
    Open,
    /// Globular cluster, tagged `g`
    Globular,
    /// Moving group, tagged `m`
    MovingGroup,
    /// Any other tag, kept verbatim
    Other(String),
}

impl ClusterKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "o" => Self::Open,
            "g" => Self::Globular,
            "m" => Self::MovingGroup,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Open => "o",
            Self::Globular => "g",
            Self::MovingGroup => "m",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ClusterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<ClusterKind> for String {
    fn from(kind: ClusterKind) -> Self {
        kind.tag().to_string()
    }
}

/// One row of the Hunt cluster parameter table
///
/// Every numeric field is optional: a null in the source table stays `None`
/// all the way to the page, it is never replaced by a default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRecord {
    pub name: String,
    pub kind: ClusterKind,
    /// Right ascension (degrees)
    pub ra: Option<f64>,
    /// Declination (degrees)
    pub dec: Option<f64>,
    /// log10(age / yr), 84th percentile
    pub log_age_84: Option<f64>,
    /// Distance in parsecs, 84th percentile
    pub distance_84: Option<f64>,
    /// V-band extinction in magnitudes, 84th percentile
    pub a_v_84: Option<f64>,
    pub log_age_16: Option<f64>,
    pub log_age_50: Option<f64>,
    pub distance_16: Option<f64>,
    pub distance_50: Option<f64>,
    pub a_v_16: Option<f64>,
    pub a_v_50: Option<f64>,
    pub n_stars: Option<u64>,
    pub n_stars_tidal: Option<u64>,
    /// Core radius (pc)
    pub radius_c_pc: Option<f64>,
    /// Tidal radius (pc)
    pub radius_t_pc: Option<f64>,
    /// Total radius (pc)
    pub radius_total_pc: Option<f64>,
    /// Parallax (mas)
    pub parallax: Option<f64>,
    pub parallax_error: Option<f64>,
    /// Radial velocity (km/s)
    pub radial_velocity: Option<f64>,
    pub radial_velocity_error: Option<f64>,
}

impl ClusterRecord {
    pub fn is_open_cluster(&self) -> bool {
        self.kind == ClusterKind::Open
    }

    /// Distance in kiloparsecs, as shown on the dashboard
    pub fn distance_kpc(&self) -> Option<f64> {
        self.distance_84.map(|d| d / 1000.0)
    }
}

/// One member star of the Hunt membership table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStar {
    /// Cluster this star belongs to
    pub name: String,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    /// Gaia G magnitude
    pub g_mag: Option<f64>,
    /// Gaia G_BP magnitude
    pub bp_mag: Option<f64>,
    /// Gaia G_RP magnitude
    pub rp_mag: Option<f64>,
    /// Membership probability in [0, 1]
    pub probability: Option<f64>,
}

impl MemberStar {
    /// BP - RP color index
    pub fn color(&self) -> Option<f64> {
        Some(self.bp_mag? - self.rp_mag?)
    }
}

/// Fitted parameters shared by both catalogs, used for cross-catalog comparison
pub trait ClusterParameters {
    fn name(&self) -> &str;

    /// log10(age / yr)
    fn log_age(&self) -> Option<f64>;

    /// Distance in parsecs
    fn distance_pc(&self) -> Option<f64>;

    /// V-band extinction (mag)
    fn a_v(&self) -> Option<f64>;
}

impl ClusterParameters for ClusterRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn log_age(&self) -> Option<f64> {
        self.log_age_84
    }

    fn distance_pc(&self) -> Option<f64> {
        self.distance_84
    }

    fn a_v(&self) -> Option<f64> {
        self.a_v_84
    }
}
