//! Isochrone grid lookup
//!
//! The grid service is a capability boundary: everything downstream only
//! needs [`IsochroneGrid::isochrone`]. [`ParsecGrid`] is the bundled
//! implementation, a PARSEC table loaded once at startup.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::{debug, info, warn};

use cluster_catalog::table::{f64_column, read_parquet};

use crate::band::Band;
use crate::track::IsochroneTrack;
use crate::{IsochroneError, Result};

/// Source of theoretical isochrones in absolute magnitudes
pub trait IsochroneGrid: Send + Sync {
    /// Track for `log_age` (log10 yr) and metal mass fraction `metallicity`
    ///
    /// The track carries exactly `filters`, in that order. Stars without a
    /// finite `reference` magnitude are dropped. With `interpolate` unset the
    /// nearest grid node is returned unchanged.
    fn isochrone(
        &self,
        log_age: f64,
        metallicity: f64,
        filters: &[Band],
        reference: Band,
        interpolate: bool,
    ) -> Result<IsochroneTrack>;
}

/// Tabulated PARSEC isochrone grid
///
/// Nodes are keyed by (Z, log age). Lookups outside the tabulated range clamp
/// to the edge nodes.
#[derive(Debug, Clone)]
pub struct ParsecGrid {
    bands: Vec<Band>,
    ages: Vec<f64>,
    metallicities: Vec<f64>,
    tracks: HashMap<(usize, usize), IsochroneTrack>,
}

/// Grid column names; older PARSEC exports use `Z` instead of `Zini`
const AGE_COLUMN: &str = "logAge";
const Z_COLUMNS: [&str; 2] = ["Zini", "Z"];
const MASS_COLUMN: &str = "Mini";

impl ParsecGrid {
    /// Load a grid table from parquet
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let batch = read_parquet(path)?;

        let ages = f64_column(&batch, AGE_COLUMN)?;
        let z_column = Z_COLUMNS
            .iter()
            .find(|c| batch.column_by_name(c).is_some())
            .copied()
            .unwrap_or(Z_COLUMNS[0]);
        let metallicities = f64_column(&batch, z_column)?;
        let masses = f64_column(&batch, MASS_COLUMN)?;

        let schema = batch.schema();
        let mut band_columns = Vec::new();
        for field in schema.fields() {
            if let Some(band) = Band::from_column_name(field.name()) {
                band_columns.push((band, f64_column(&batch, field.name())?));
            }
        }

        let mut rows = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let (Some(age), Some(z), Some(mass)) = (ages[row], metallicities[row], masses[row])
            else {
                continue;
            };
            let mags = band_columns
                .iter()
                .map(|(_, values)| values[row].unwrap_or(f64::NAN))
                .collect();
            rows.push(GridRow {
                log_age: age,
                z,
                mass,
                mags,
            });
        }

        let bands = band_columns.iter().map(|(b, _)| *b).collect();
        let grid = Self::from_rows(bands, rows)?;
        info!(
            "Loaded isochrone grid {}: {} ages x {} metallicities",
            path.display(),
            grid.ages.len(),
            grid.metallicities.len()
        );
        Ok(grid)
    }

    fn from_rows(bands: Vec<Band>, rows: Vec<GridRow>) -> Result<Self> {
        if rows.is_empty() || bands.is_empty() {
            return Err(IsochroneError::EmptyGrid);
        }

        let ages = sorted_unique(rows.iter().map(|r| r.log_age));
        let metallicities = sorted_unique(rows.iter().map(|r| r.z));

        let mut grouped: HashMap<(usize, usize), Vec<GridRow>> = HashMap::new();
        for row in rows {
            let key = (
                position_of(&metallicities, row.z),
                position_of(&ages, row.log_age),
            );
            grouped.entry(key).or_default().push(row);
        }

        let mut tracks = HashMap::with_capacity(grouped.len());
        for (key, mut node_rows) in grouped {
            node_rows.sort_by(|a, b| a.mass.total_cmp(&b.mass));
            let masses = node_rows.iter().map(|r| r.mass).collect();
            let columns = bands
                .iter()
                .enumerate()
                .map(|(j, band)| (*band, node_rows.iter().map(|r| r.mags[j]).collect()))
                .collect();
            tracks.insert(key, IsochroneTrack::from_columns(masses, columns)?);
        }

        let expected = ages.len() * metallicities.len();
        if tracks.len() < expected {
            warn!(
                "Isochrone grid is sparse: {} of {} (Z, age) nodes present",
                tracks.len(),
                expected
            );
        }

        Ok(Self {
            bands,
            ages,
            metallicities,
            tracks,
        })
    }

    /// Tabulated log ages, ascending
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Tabulated metal mass fractions, ascending
    pub fn metallicities(&self) -> &[f64] {
        &self.metallicities
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    fn node(&self, z_index: usize, age_index: usize) -> Result<&IsochroneTrack> {
        self.tracks
            .get(&(z_index, age_index))
            .ok_or(IsochroneError::MissingNode {
                log_age: self.ages[age_index],
                z: self.metallicities[z_index],
            })
    }

    /// Age-interpolated track at one tabulated metallicity
    fn at_metallicity(&self, z_index: usize, log_age: f64) -> Result<IsochroneTrack> {
        let (lo, hi, w) = bracket(&self.ages, log_age);
        let young = self.node(z_index, lo)?;
        if lo == hi {
            return Ok(young.clone());
        }
        let old = self.node(z_index, hi)?;
        Ok(blend_or_nearest(young, old, w))
    }
}

#[derive(Debug, Clone)]
struct GridRow {
    log_age: f64,
    z: f64,
    mass: f64,
    mags: Vec<f64>,
}

impl IsochroneGrid for ParsecGrid {
    fn isochrone(
        &self,
        log_age: f64,
        metallicity: f64,
        filters: &[Band],
        reference: Band,
        interpolate: bool,
    ) -> Result<IsochroneTrack> {
        if !log_age.is_finite() {
            return Err(IsochroneError::InvalidParameter {
                name: "log age",
                value: log_age,
            });
        }
        if !(metallicity.is_finite() && metallicity > 0.0) {
            return Err(IsochroneError::InvalidParameter {
                name: "metallicity",
                value: metallicity,
            });
        }
        for band in filters.iter().chain(std::iter::once(&reference)) {
            if !self.bands.contains(band) {
                return Err(IsochroneError::UnknownBand(*band));
            }
        }

        // Metallicity is bracketed in log Z, the grid's natural spacing
        let log_zs: Vec<f64> = self.metallicities.iter().map(|z| z.log10()).collect();
        let log_z = metallicity.log10();

        let track = if interpolate {
            let (lo, hi, w) = bracket(&log_zs, log_z);
            let metal_poor = self.at_metallicity(lo, log_age)?;
            if lo == hi {
                metal_poor
            } else {
                let metal_rich = self.at_metallicity(hi, log_age)?;
                blend_or_nearest(&metal_poor, &metal_rich, w)
            }
        } else {
            let z_index = nearest(&log_zs, log_z);
            let age_index = nearest(&self.ages, log_age);
            self.node(z_index, age_index)?.clone()
        };

        debug!(
            "Grid lookup logAge={:.3} Z={:.5} interpolate={}: {} stars",
            log_age,
            metallicity,
            interpolate,
            track.len()
        );

        let mut columns: Vec<Band> = filters.to_vec();
        if !columns.contains(&reference) {
            columns.push(reference);
        }
        track
            .select_bands(&columns)?
            .retain_finite(reference)?
            .select_bands(filters)
    }
}

fn blend_or_nearest(a: &IsochroneTrack, b: &IsochroneTrack, w: f64) -> IsochroneTrack {
    match a.blend(b, w) {
        Some(track) => track,
        None if w < 0.5 => a.clone(),
        None => b.clone(),
    }
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let bits: BTreeSet<u64> = values.map(order_key).collect();
    bits.into_iter().map(from_order_key).collect()
}

/// Map an f64 to a u64 whose unsigned order matches numeric order
fn order_key(x: f64) -> u64 {
    let bits = x.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

fn from_order_key(key: u64) -> f64 {
    if key >> 63 == 1 {
        f64::from_bits(key & !(1 << 63))
    } else {
        f64::from_bits(!key)
    }
}

fn position_of(sorted: &[f64], value: f64) -> usize {
    sorted.partition_point(|&v| v < value)
}

/// Bracketing indices and weight of `x` in ascending `values`, clamped
fn bracket(values: &[f64], x: f64) -> (usize, usize, f64) {
    let last = values.len() - 1;
    if x <= values[0] {
        return (0, 0, 0.0);
    }
    if x >= values[last] {
        return (last, last, 0.0);
    }
    let hi = values.partition_point(|&v| v <= x);
    let lo = hi - 1;
    if values[lo] == x {
        return (lo, lo, 0.0);
    }
    (lo, hi, (x - values[lo]) / (values[hi] - values[lo]))
}

fn nearest(values: &[f64], x: f64) -> usize {
    let (lo, hi, w) = bracket(values, x);
    if w > 0.5 {
        hi
    } else {
        lo
    }
}
