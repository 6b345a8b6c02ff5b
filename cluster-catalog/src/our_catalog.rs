//! The internally fitted ("our") cluster catalog
//!
//! Fundamental parameters live in a `;`-delimited text table with a header
//! row. Member photometry is stored separately, one parquet file per cluster
//! named `<cluster>_data_stars.parquet`.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::records::ClusterParameters;
use crate::table::{f64_column, read_parquet};
use crate::{CatalogError, Result};

/// One row of our catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OurClusterRecord {
    pub name: String,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    /// log10(age / yr)
    pub log_age: Option<f64>,
    pub e_log_age: Option<f64>,
    /// Distance in parsecs
    pub distance: Option<f64>,
    pub e_distance: Option<f64>,
    /// [Fe/H] in dex
    pub fe_h: Option<f64>,
    pub e_fe_h: Option<f64>,
    pub a_v: Option<f64>,
    pub e_a_v: Option<f64>,
}

impl OurClusterRecord {
    pub fn distance_kpc(&self) -> Option<f64> {
        self.distance.map(|d| d / 1000.0)
    }

    pub fn e_distance_kpc(&self) -> Option<f64> {
        self.e_distance.map(|d| d / 1000.0)
    }
}

impl ClusterParameters for OurClusterRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn log_age(&self) -> Option<f64> {
        self.log_age
    }

    fn distance_pc(&self) -> Option<f64> {
        self.distance
    }

    fn a_v(&self) -> Option<f64> {
        self.a_v
    }
}

/// Text row as written by the fitting pipeline; values are parsed afterwards
/// so that blanks and `nan` become nulls instead of parse errors.
#[derive(Debug, Deserialize)]
struct RawRow {
    name: String,
    #[serde(rename = "RA_ICRS", alias = "ra", default)]
    ra: String,
    #[serde(rename = "DE_ICRS", alias = "dec", default)]
    dec: String,
    #[serde(default)]
    age: String,
    #[serde(default)]
    e_age: String,
    #[serde(default)]
    dist: String,
    #[serde(default)]
    e_dist: String,
    #[serde(rename = "FeH", default)]
    fe_h: String,
    #[serde(rename = "e_FeH", default)]
    e_fe_h: String,
    #[serde(rename = "Av", default)]
    a_v: String,
    #[serde(rename = "e_Av", default)]
    e_a_v: String,
}

fn parse_value(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

impl From<RawRow> for OurClusterRecord {
    fn from(raw: RawRow) -> Self {
        Self {
            name: raw.name,
            ra: parse_value(&raw.ra),
            dec: parse_value(&raw.dec),
            log_age: parse_value(&raw.age),
            e_log_age: parse_value(&raw.e_age),
            distance: parse_value(&raw.dist),
            e_distance: parse_value(&raw.e_dist),
            fe_h: parse_value(&raw.fe_h),
            e_fe_h: parse_value(&raw.e_fe_h),
            a_v: parse_value(&raw.a_v),
            e_a_v: parse_value(&raw.e_a_v),
        }
    }
}

/// Our catalog indexed by cluster name
#[derive(Debug, Clone, Default)]
pub struct OurCatalog {
    records: Vec<OurClusterRecord>,
    index: HashMap<String, usize>,
}

impl OurCatalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;
        info!("Loaded {} clusters from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse the `;`-delimited table from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut records = Vec::new();
        let mut index = HashMap::new();
        for row in csv.deserialize::<RawRow>() {
            let record = OurClusterRecord::from(row?);
            if index.contains_key(&record.name) {
                warn!("Duplicate cluster name '{}', keeping first row", record.name);
                continue;
            }
            index.insert(record.name.clone(), records.len());
            records.push(record);
        }

        Ok(Self { records, index })
    }

    pub fn get(&self, name: &str) -> Option<&OurClusterRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn records(&self) -> &[OurClusterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Photometry of one star in our membership files
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OurMemberStar {
    pub g_mag: Option<f64>,
    pub bp_mag: Option<f64>,
    pub rp_mag: Option<f64>,
}

impl OurMemberStar {
    pub fn color(&self) -> Option<f64> {
        Some(self.bp_mag? - self.rp_mag?)
    }
}

/// Path of a cluster's membership file inside `dir`
pub fn member_file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}_data_stars.parquet"))
}

/// Load our member photometry for one cluster
///
/// A cluster without a membership file has no members: the result is empty
/// rather than an error, like an unknown name in the Hunt member table.
pub fn load_our_members<P: AsRef<Path>>(dir: P, name: &str) -> Result<Vec<OurMemberStar>> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        warn!("Refusing to build a membership path from cluster name '{name}'");
        return Ok(Vec::new());
    }

    let path = member_file_path(dir.as_ref(), name);
    if !path.exists() {
        warn!("No membership file for {name} at {}", path.display());
        return Ok(Vec::new());
    }

    let batch = read_parquet(&path)?;
    let g_mag = f64_column(&batch, "Gmag")?;
    let bp_mag = f64_column(&batch, "BPmag")?;
    let rp_mag = f64_column(&batch, "RPmag")?;

    Ok((0..batch.num_rows())
        .map(|row| OurMemberStar {
            g_mag: g_mag[row],
            bp_mag: bp_mag[row],
            rp_mag: rp_mag[row],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TABLE: &str = "\
name ; RA_ICRS ; DE_ICRS ; age ; e_age ; dist ; e_dist ; FeH ; e_FeH ; Av ; e_Av
NGC_2516 ; 119.5 ; -60.8 ; 8.5 ; 0.1 ; 410 ; 12 ; -0.05 ; 0.02 ; 0.35 ; 0.03
Melotte_22 ; 56.75 ; 24.1 ; 8.1 ; 0.05 ; 136 ; 4 ; nan ; ; 0.1 ; 0.01
";

    #[test]
    fn test_parse_delimited_table() {
        let catalog = OurCatalog::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);

        let ngc = catalog.get("NGC_2516").unwrap();
        assert_eq!(ngc.log_age, Some(8.5));
        assert_eq!(ngc.fe_h, Some(-0.05));
        assert_relative_eq!(ngc.distance_kpc().unwrap(), 0.41);

        let pleiades = catalog.get("Melotte_22").unwrap();
        assert_eq!(pleiades.fe_h, None);
        assert_eq!(pleiades.e_fe_h, None);
        assert_eq!(pleiades.a_v, Some(0.1));
    }

    #[test]
    fn test_names_keep_file_order() {
        let catalog = OurCatalog::from_reader(TABLE.as_bytes()).unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["NGC_2516", "Melotte_22"]);
    }

    #[test]
    fn test_missing_member_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stars = load_our_members(dir.path(), "NGC_2516").unwrap();
        assert!(stars.is_empty());
    }

    #[test]
    fn test_path_like_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_our_members(dir.path(), "../secret").unwrap().is_empty());
        assert!(load_our_members(dir.path(), "a/b").unwrap().is_empty());
    }

    #[test]
    fn test_member_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        test_helpers::fixtures::write_our_members(
            dir.path(),
            "NGC_2516",
            &[(12.0, 12.5, 11.4), (15.0, 15.9, 14.1)],
        );

        let stars = load_our_members(dir.path(), "NGC_2516").unwrap();
        assert_eq!(stars.len(), 2);
        assert_relative_eq!(stars[1].color().unwrap(), 1.8, epsilon = 1e-12);
    }
}
