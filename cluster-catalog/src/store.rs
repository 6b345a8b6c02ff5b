//! Hunt catalog store
//!
//! Loads the cluster parameter table and the member star table once at
//! startup and indexes both by cluster name, so a selection is a hash lookup
//! rather than a scan of the full table.

use std::collections::HashMap;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use tracing::{debug, info, warn};

use crate::records::{ClusterKind, ClusterRecord, MemberStar};
use crate::table::{
    count_column, f64_column, null_count, optional_f64_column, read_parquet, select_rows,
    string_column, write_parquet,
};
use crate::{CatalogError, Result};

/// Cluster parameter table indexed by name
#[derive(Debug, Clone, Default)]
pub struct ClusterTable {
    records: Vec<ClusterRecord>,
    index: HashMap<String, usize>,
}

impl ClusterTable {
    /// Load the cluster table from a parquet file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let batch = read_parquet(path)?;
        let table = Self::from_batch(&batch)?;
        info!("Loaded {} clusters from {}", table.len(), path.display());
        Ok(table)
    }

    /// Build the table from an already decoded record batch
    pub fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let names = string_column(batch, "name")?;
        let kinds = string_column(batch, "kind")?;
        let ra = f64_column(batch, "ra")?;
        let dec = f64_column(batch, "dec")?;
        let log_age_84 = f64_column(batch, "log_age_84")?;
        let distance_84 = f64_column(batch, "distance_84")?;
        let a_v_84 = f64_column(batch, "a_v_84")?;
        let log_age_16 = optional_f64_column(batch, "log_age_16")?;
        let log_age_50 = optional_f64_column(batch, "log_age_50")?;
        let distance_16 = optional_f64_column(batch, "distance_16")?;
        let distance_50 = optional_f64_column(batch, "distance_50")?;
        let a_v_16 = optional_f64_column(batch, "a_v_16")?;
        let a_v_50 = optional_f64_column(batch, "a_v_50")?;
        let n_stars = count_column(batch, "n_stars")?;
        let n_stars_tidal = count_column(batch, "n_stars_tidal")?;
        let radius_c_pc = f64_column(batch, "radius_c_pc")?;
        let radius_t_pc = f64_column(batch, "radius_t_pc")?;
        let radius_total_pc = f64_column(batch, "radius_total_pc")?;
        let parallax = f64_column(batch, "parallax")?;
        let parallax_error = f64_column(batch, "parallax_error")?;
        let radial_velocity = f64_column(batch, "radial_velocity")?;
        let radial_velocity_error = f64_column(batch, "radial_velocity_error")?;

        let missing_rv = null_count(batch, "radial_velocity");
        if missing_rv > 0 {
            debug!("{missing_rv} clusters have no radial velocity");
        }

        let mut records = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let name = names[row]
                .clone()
                .ok_or(CatalogError::MissingName { row })?;
            let kind = kinds[row]
                .as_deref()
                .map(ClusterKind::from_tag)
                .unwrap_or_else(|| ClusterKind::Other(String::new()));

            records.push(ClusterRecord {
                name,
                kind,
                ra: ra[row],
                dec: dec[row],
                log_age_84: log_age_84[row],
                distance_84: distance_84[row],
                a_v_84: a_v_84[row],
                log_age_16: log_age_16[row],
                log_age_50: log_age_50[row],
                distance_16: distance_16[row],
                distance_50: distance_50[row],
                a_v_16: a_v_16[row],
                a_v_50: a_v_50[row],
                n_stars: n_stars[row],
                n_stars_tidal: n_stars_tidal[row],
                radius_c_pc: radius_c_pc[row],
                radius_t_pc: radius_t_pc[row],
                radius_total_pc: radius_total_pc[row],
                parallax: parallax[row],
                parallax_error: parallax_error[row],
                radial_velocity: radial_velocity[row],
                radial_velocity_error: radial_velocity_error[row],
            });
        }

        Ok(Self::from_records(records))
    }

    /// Index a list of records by name; later duplicates of a name are dropped
    pub fn from_records(records: Vec<ClusterRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            if index.contains_key(&record.name) {
                warn!("Duplicate cluster name '{}', keeping first row", record.name);
                continue;
            }
            index.insert(record.name.clone(), kept.len());
            kept.push(record);
        }

        Self {
            records: kept,
            index,
        }
    }

    /// Restrict the table to one object class
    pub fn filter_kind(&self, kind: &ClusterKind) -> Self {
        Self::from_records(
            self.records
                .iter()
                .filter(|r| &r.kind == kind)
                .cloned()
                .collect(),
        )
    }

    /// Restrict the table to open clusters, the set offered for selection
    pub fn open_clusters(&self) -> Self {
        self.filter_kind(&ClusterKind::Open)
    }

    /// Look up a cluster by exact name
    pub fn get(&self, name: &str) -> Option<&ClusterRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Rows whose name matches exactly; at most one since names are unique
    pub fn select(&self, name: &str) -> Vec<&ClusterRecord> {
        self.get(name).into_iter().collect()
    }

    /// Cluster names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn records(&self) -> &[ClusterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Member star table indexed by cluster name
///
/// Keeps the decoded record batch next to the typed rows so a cluster's
/// members can be exported with every original column.
#[derive(Debug, Clone)]
pub struct MemberTable {
    batch: RecordBatch,
    stars: Vec<MemberStar>,
    index: HashMap<String, Vec<usize>>,
}

impl MemberTable {
    /// Load the member table from a parquet file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let batch = read_parquet(path)?;
        let table = Self::from_batch(batch)?;
        info!(
            "Loaded {} member stars of {} clusters from {}",
            table.len(),
            table.index.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        let names = string_column(&batch, "name")?;
        let ra = f64_column(&batch, "ra")?;
        let dec = f64_column(&batch, "dec")?;
        let g_mag = f64_column(&batch, "phot_g_mean_mag")?;
        let bp_mag = f64_column(&batch, "phot_bp_mean_mag")?;
        let rp_mag = f64_column(&batch, "phot_rp_mean_mag")?;
        let probability = f64_column(&batch, "probability")?;

        let mut stars = Vec::with_capacity(batch.num_rows());
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();

        for (row, name) in names.into_iter().enumerate() {
            let name = name.ok_or(CatalogError::MissingName { row })?;
            index.entry(name.clone()).or_default().push(row);
            stars.push(MemberStar {
                name,
                ra: ra[row],
                dec: dec[row],
                g_mag: g_mag[row],
                bp_mag: bp_mag[row],
                rp_mag: rp_mag[row],
                probability: probability[row],
            });
        }

        Ok(Self {
            batch,
            stars,
            index,
        })
    }

    /// Members of one cluster in table order; empty when the name is unknown
    pub fn members_of(&self, name: &str) -> Vec<MemberStar> {
        self.rows_of(name)
            .iter()
            .map(|&row| self.stars[row].clone())
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.rows_of(name).len()
    }

    /// Parquet export of one cluster's rows with the full original schema
    pub fn export(&self, name: &str) -> Result<Vec<u8>> {
        let selected = select_rows(&self.batch, self.rows_of(name))?;
        write_parquet(&selected)
    }

    fn rows_of(&self, name: &str) -> &[usize] {
        self.index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_parquet_bytes;
    use test_helpers::fixtures::{cluster_batch, cluster_row, member_batch, MemberRow};

    fn sample_clusters() -> ClusterTable {
        let mut globular = cluster_row("NGC_104", 10.1, 4500.0, 0.1);
        globular.kind = "g";
        let batch = cluster_batch(&[
            cluster_row("NGC_2516", 8.7, 1200.0, 0.3),
            globular,
            cluster_row("Melotte_22", 8.1, 135.0, 0.1),
        ]);
        ClusterTable::from_batch(&batch).unwrap()
    }

    #[test]
    fn test_open_cluster_filter() {
        let open = sample_clusters().open_clusters();
        let names: Vec<_> = open.names().collect();
        assert_eq!(names, vec!["NGC_2516", "Melotte_22"]);

        for name in open.names() {
            let rows = open.select(name);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].kind, ClusterKind::Open);
        }
        assert!(open.get("NGC_104").is_none());
    }

    #[test]
    fn test_select_is_exact_and_case_sensitive() {
        let table = sample_clusters();
        assert_eq!(table.select("NGC_2516").len(), 1);
        assert!(table.select("ngc_2516").is_empty());
        assert!(table.select("NGC_2516 ").is_empty());
    }

    #[test]
    fn test_duplicate_names_keep_first_row() {
        let batch = cluster_batch(&[
            cluster_row("Blanco_1", 8.0, 240.0, 0.05),
            cluster_row("Blanco_1", 9.0, 999.0, 1.0),
        ]);
        let table = ClusterTable::from_batch(&batch).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Blanco_1").unwrap().log_age_84, Some(8.0));
    }

    #[test]
    fn test_null_parameters_stay_null() {
        let mut row = cluster_row("IC_2602", 7.5, 150.0, 0.1);
        row.radial_velocity = None;
        let table = ClusterTable::from_batch(&cluster_batch(&[row])).unwrap();
        let record = table.get("IC_2602").unwrap();
        assert_eq!(record.radial_velocity, None);
        assert_eq!(record.distance_kpc(), Some(0.15));
    }

    #[test]
    fn test_members_of_unknown_cluster_is_empty() {
        let table = MemberTable::from_batch(member_batch(&[MemberRow::new("NGC_2516", 0.8)]))
            .unwrap();
        assert!(table.members_of("NGC_3532").is_empty());
        assert_eq!(table.count("NGC_3532"), 0);
    }

    #[test]
    fn test_export_keeps_all_columns() {
        let batch = member_batch(&[
            MemberRow::new("NGC_2516", 0.8),
            MemberRow::new("Melotte_22", 0.7),
            MemberRow::new("NGC_2516", 0.95),
        ]);
        let schema = batch.schema();
        let table = MemberTable::from_batch(batch).unwrap();

        let exported = read_parquet_bytes(table.export("NGC_2516").unwrap()).unwrap();
        assert_eq!(exported.num_rows(), 2);
        assert_eq!(exported.schema().fields(), schema.fields());

        let empty = read_parquet_bytes(table.export("NGC_3532").unwrap()).unwrap();
        assert_eq!(empty.num_rows(), 0);
        assert_eq!(empty.schema().fields(), schema.fields());
    }
}
