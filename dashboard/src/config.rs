//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

use crate::error::{DashboardError, Result};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Web dashboard for the Hunt and our open cluster catalogs")]
pub struct Args {
    #[arg(short = 'p', long, default_value = "8501")]
    pub port: u16,

    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    pub bind_address: String,

    #[command(flatten)]
    pub data: DataPaths,

    /// Use the nearest grid node instead of interpolating in age and metallicity
    #[arg(long)]
    pub nearest_node: bool,
}

impl Args {
    pub fn interpolate(&self) -> bool {
        !self.nearest_node
    }
}

/// Input files, all read once at startup
#[derive(clap::Args, Debug, Clone)]
pub struct DataPaths {
    /// Hunt cluster parameter table
    #[arg(long, default_value = "data/parquet/clusters.parquet")]
    pub clusters: PathBuf,

    /// Hunt member star table
    #[arg(long, default_value = "data/parquet/members.parquet")]
    pub members: PathBuf,

    /// Our `;`-delimited cluster catalog
    #[arg(long, default_value = "data/log-results-eDR3.txt")]
    pub our_catalog: PathBuf,

    /// Directory of our `<name>_data_stars.parquet` member files
    #[arg(long, default_value = "data/membership_data_edr3")]
    pub our_members_dir: PathBuf,

    /// PARSEC isochrone grid table
    #[arg(long, default_value = "data/parsec_grid.parquet")]
    pub isochrone_grid: PathBuf,
}

impl DataPaths {
    /// Fail on the first input that does not exist
    pub fn validate(&self) -> Result<()> {
        let files = [
            ("cluster table", &self.clusters),
            ("member table", &self.members),
            ("our catalog", &self.our_catalog),
            ("isochrone grid", &self.isochrone_grid),
        ];
        for (what, path) in files {
            if !path.is_file() {
                return Err(DashboardError::MissingInput {
                    what,
                    path: path.clone(),
                });
            }
        }
        if !self.our_members_dir.is_dir() {
            return Err(DashboardError::MissingInput {
                what: "our member directory",
                path: self.our_members_dir.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["dashboard"]);
        assert_eq!(args.port, 8501);
        assert!(args.interpolate());
        assert_eq!(
            args.data.clusters,
            PathBuf::from("data/parquet/clusters.parquet")
        );
        assert_eq!(
            args.data.our_members_dir,
            PathBuf::from("data/membership_data_edr3")
        );
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "dashboard",
            "--port",
            "9000",
            "--nearest-node",
            "--members",
            "/tmp/m.parquet",
        ]);
        assert_eq!(args.port, 9000);
        assert!(!args.interpolate());
        assert_eq!(args.data.members, PathBuf::from("/tmp/m.parquet"));
    }

    #[test]
    fn test_validate_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = test_helpers::fixtures::write_dataset(dir.path());
        let mut data = DataPaths {
            clusters: paths.clusters,
            members: paths.members,
            our_catalog: paths.our_catalog,
            our_members_dir: paths.our_members_dir,
            isochrone_grid: paths.isochrone_grid,
        };
        assert!(data.validate().is_ok());

        data.members = dir.path().join("missing.parquet");
        match data.validate() {
            Err(DashboardError::MissingInput { what, .. }) => assert_eq!(what, "member table"),
            other => panic!("expected missing member table, got {other:?}"),
        }
    }
}
