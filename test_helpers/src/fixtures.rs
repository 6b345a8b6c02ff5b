//! Fixture catalog tables
//!
//! Builders for small parquet and text tables laid out like the real data
//! files, so loaders can be exercised without the survey data.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// One row of the Hunt cluster table
#[derive(Debug, Clone)]
pub struct ClusterRow {
    pub name: String,
    pub kind: &'static str,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub log_age_84: Option<f64>,
    pub distance_84: Option<f64>,
    pub a_v_84: Option<f64>,
    pub n_stars: Option<i64>,
    pub n_stars_tidal: Option<i64>,
    pub radius_c_pc: Option<f64>,
    pub radius_t_pc: Option<f64>,
    pub radius_total_pc: Option<f64>,
    pub parallax: Option<f64>,
    pub parallax_error: Option<f64>,
    pub radial_velocity: Option<f64>,
    pub radial_velocity_error: Option<f64>,
}

/// An open cluster row with plausible values for everything but the fit
pub fn cluster_row(name: &str, log_age: f64, distance_pc: f64, a_v: f64) -> ClusterRow {
    ClusterRow {
        name: name.to_string(),
        kind: "o",
        ra: Some(119.5),
        dec: Some(-60.8),
        log_age_84: Some(log_age),
        distance_84: Some(distance_pc),
        a_v_84: Some(a_v),
        n_stars: Some(2),
        n_stars_tidal: Some(2),
        radius_c_pc: Some(1.234_56),
        radius_t_pc: Some(9.876_54),
        radius_total_pc: Some(12.5),
        parallax: Some(2.4),
        parallax_error: Some(0.012_3),
        radial_velocity: Some(23.9),
        radial_velocity_error: Some(0.45),
    }
}

fn floats(values: impl Iterator<Item = Option<f64>>) -> ArrayRef {
    Arc::new(values.collect::<Float64Array>())
}

fn ints(values: impl Iterator<Item = Option<i64>>) -> ArrayRef {
    Arc::new(values.collect::<Int64Array>())
}

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(values.map(Some).collect::<StringArray>())
}

/// Record batch with the Hunt cluster table columns
pub fn cluster_batch(rows: &[ClusterRow]) -> RecordBatch {
    let float_columns = [
        "ra",
        "dec",
        "log_age_84",
        "distance_84",
        "a_v_84",
        "radius_c_pc",
        "radius_t_pc",
        "radius_total_pc",
        "parallax",
        "parallax_error",
        "radial_velocity",
        "radial_velocity_error",
    ];

    let mut fields = vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("kind", DataType::Utf8, false),
    ];
    fields.extend(
        float_columns
            .iter()
            .map(|c| Field::new(*c, DataType::Float64, true)),
    );
    fields.push(Field::new("n_stars", DataType::Int64, true));
    fields.push(Field::new("n_stars_tidal", DataType::Int64, true));

    let float_value = |row: &ClusterRow, column: &str| match column {
        "ra" => row.ra,
        "dec" => row.dec,
        "log_age_84" => row.log_age_84,
        "distance_84" => row.distance_84,
        "a_v_84" => row.a_v_84,
        "radius_c_pc" => row.radius_c_pc,
        "radius_t_pc" => row.radius_t_pc,
        "radius_total_pc" => row.radius_total_pc,
        "parallax" => row.parallax,
        "parallax_error" => row.parallax_error,
        "radial_velocity" => row.radial_velocity,
        "radial_velocity_error" => row.radial_velocity_error,
        _ => None,
    };

    let mut columns = vec![
        strings(rows.iter().map(|r| r.name.as_str())),
        strings(rows.iter().map(|r| r.kind)),
    ];
    for column in float_columns {
        columns.push(floats(rows.iter().map(|r| float_value(r, column))));
    }
    columns.push(ints(rows.iter().map(|r| r.n_stars)));
    columns.push(ints(rows.iter().map(|r| r.n_stars_tidal)));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .expect("cluster fixture columns match schema")
}

/// One row of the Hunt member table
#[derive(Debug, Clone)]
pub struct MemberRow {
    pub name: String,
    pub source_id: i64,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub g_mag: Option<f64>,
    pub bp_mag: Option<f64>,
    pub rp_mag: Option<f64>,
    pub probability: Option<f64>,
}

impl MemberRow {
    pub fn new(name: &str, probability: f64) -> Self {
        Self {
            name: name.to_string(),
            source_id: 5_290_000_000_000_000_000 + (probability * 1000.0) as i64,
            ra: Some(119.5 + probability),
            dec: Some(-60.8 - probability),
            g_mag: Some(10.0 + 5.0 * probability),
            bp_mag: Some(10.4 + 5.0 * probability),
            rp_mag: Some(9.6 + 5.0 * probability),
            probability: Some(probability),
        }
    }
}

/// Record batch with the Hunt member table columns plus a `source_id`
/// column the loaders do not interpret
pub fn member_batch(rows: &[MemberRow]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("source_id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("ra", DataType::Float64, true),
        Field::new("dec", DataType::Float64, true),
        Field::new("phot_g_mean_mag", DataType::Float64, true),
        Field::new("phot_bp_mean_mag", DataType::Float64, true),
        Field::new("phot_rp_mean_mag", DataType::Float64, true),
        Field::new("probability", DataType::Float64, true),
    ]);

    let columns = vec![
        ints(rows.iter().map(|r| Some(r.source_id))),
        strings(rows.iter().map(|r| r.name.as_str())),
        floats(rows.iter().map(|r| r.ra)),
        floats(rows.iter().map(|r| r.dec)),
        floats(rows.iter().map(|r| r.g_mag)),
        floats(rows.iter().map(|r| r.bp_mag)),
        floats(rows.iter().map(|r| r.rp_mag)),
        floats(rows.iter().map(|r| r.probability)),
    ];

    RecordBatch::try_new(Arc::new(schema), columns).expect("member fixture columns match schema")
}

/// One node row of a PARSEC style isochrone grid
#[derive(Debug, Clone, Copy)]
pub struct GridRow {
    pub log_age: f64,
    pub z: f64,
    pub initial_mass: f64,
    pub g_mag: f64,
    pub bp_mag: f64,
    pub rp_mag: f64,
}

/// Record batch with isochrone grid columns (`logAge`, `Zini`, `Mini`, bands)
pub fn grid_batch(rows: &[GridRow]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("Zini", DataType::Float64, false),
        Field::new("logAge", DataType::Float64, false),
        Field::new("Mini", DataType::Float64, false),
        Field::new("Gmag", DataType::Float64, true),
        Field::new("G_BPmag", DataType::Float64, true),
        Field::new("G_RPmag", DataType::Float64, true),
    ]);
    let columns = vec![
        floats(rows.iter().map(|r| Some(r.z))),
        floats(rows.iter().map(|r| Some(r.log_age))),
        floats(rows.iter().map(|r| Some(r.initial_mass))),
        floats(rows.iter().map(|r| Some(r.g_mag))),
        floats(rows.iter().map(|r| Some(r.bp_mag))),
        floats(rows.iter().map(|r| Some(r.rp_mag))),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).expect("grid fixture columns match schema")
}

/// A synthetic main sequence: brighter and bluer with mass, shifted by age
/// and metallicity so interpolation has something to resolve
pub fn synthetic_track(log_age: f64, z: f64) -> Vec<GridRow> {
    (0..20)
        .map(|i| {
            let mass = 0.5 + 0.1 * i as f64;
            let g = 9.0 - 5.0 * mass.log10() * 2.0 + (log_age - 8.0) * 0.5 + z * 10.0;
            let color = 1.5 - 0.6 * mass + z * 5.0;
            GridRow {
                log_age,
                z,
                initial_mass: mass,
                g_mag: g,
                bp_mag: g + 0.6 * color,
                rp_mag: g - 0.4 * color,
            }
        })
        .collect()
}

/// Write a record batch to a parquet file
pub fn write_parquet_file(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).expect("Failed to create fixture file");
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).expect("Failed to create parquet writer");
    writer.write(batch).expect("Failed to write fixture batch");
    writer.close().expect("Failed to close fixture file");
}

/// Write one of our per-cluster membership files with (G, BP, RP) rows
pub fn write_our_members(dir: &Path, name: &str, photometry: &[(f64, f64, f64)]) -> PathBuf {
    let schema = Schema::new(vec![
        Field::new("Gmag", DataType::Float64, true),
        Field::new("BPmag", DataType::Float64, true),
        Field::new("RPmag", DataType::Float64, true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            floats(photometry.iter().map(|p| Some(p.0))),
            floats(photometry.iter().map(|p| Some(p.1))),
            floats(photometry.iter().map(|p| Some(p.2))),
        ],
    )
    .expect("membership fixture columns match schema");

    let path = dir.join(format!("{name}_data_stars.parquet"));
    write_parquet_file(&path, &batch);
    path
}

/// Header of our `;`-delimited catalog
pub const OUR_CATALOG_HEADER: &str =
    "name;RA_ICRS;DE_ICRS;age;e_age;dist;e_dist;FeH;e_FeH;Av;e_Av";

/// Paths of a complete fixture data set
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub clusters: PathBuf,
    pub members: PathBuf,
    pub our_catalog: PathBuf,
    pub our_members_dir: PathBuf,
    pub isochrone_grid: PathBuf,
}

/// Write a small but complete data set under `root`
///
/// Hunt catalog: NGC_2516 (2 members), Melotte_22 (1 member), a globular
/// NGC_104 and IC_2602 with no members. Our catalog: NGC_2516, Melotte_22 and
/// Collinder_69 (absent from Hunt). Grid: two ages at two metallicities.
pub fn write_dataset(root: &Path) -> DatasetPaths {
    let parquet_dir = root.join("parquet");
    let our_members_dir = root.join("membership_data_edr3");
    std::fs::create_dir_all(&parquet_dir).expect("Failed to create parquet dir");
    std::fs::create_dir_all(&our_members_dir).expect("Failed to create membership dir");

    let mut globular = cluster_row("NGC_104", 10.1, 4500.0, 0.1);
    globular.kind = "g";
    let clusters = parquet_dir.join("clusters.parquet");
    write_parquet_file(
        &clusters,
        &cluster_batch(&[
            cluster_row("NGC_2516", 8.7, 1200.0, 0.3),
            cluster_row("Melotte_22", 8.1, 135.0, 0.1),
            globular,
            cluster_row("IC_2602", 7.5, 150.0, 0.05),
        ]),
    );

    let members = parquet_dir.join("members.parquet");
    write_parquet_file(
        &members,
        &member_batch(&[
            MemberRow::new("NGC_2516", 0.95),
            MemberRow::new("Melotte_22", 0.7),
            MemberRow::new("NGC_2516", 0.8),
        ]),
    );

    let our_catalog = root.join("log-results-eDR3.txt");
    let body = [
        OUR_CATALOG_HEADER,
        "NGC_2516;119.52;-60.75;8.5;0.1;410;12;-0.05;0.02;0.35;0.03",
        "Melotte_22;56.75;24.12;8.1;0.05;136;4;nan;;0.1;0.01",
        "Collinder_69;83.79;9.93;6.9;0.2;400;20;0.0;0.05;0.3;0.05",
    ]
    .join("\n");
    std::fs::write(&our_catalog, body).expect("Failed to write our catalog");

    write_our_members(
        &our_members_dir,
        "NGC_2516",
        &[(11.0, 11.3, 10.6), (13.5, 14.0, 12.8), (16.0, 16.8, 15.1)],
    );

    let isochrone_grid = root.join("parsec_grid.parquet");
    let mut rows = Vec::new();
    for z in [0.0076, 0.0152] {
        for log_age in [8.0, 9.0] {
            rows.extend(synthetic_track(log_age, z));
        }
    }
    write_parquet_file(&isochrone_grid, &grid_batch(&rows));

    DatasetPaths {
        clusters,
        members,
        our_catalog,
        our_members_dir,
        isochrone_grid,
    }
}
