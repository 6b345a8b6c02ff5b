//! Read-only data shared by every request

use std::path::PathBuf;
use std::sync::Arc;

use cluster_catalog::{compare_catalogs, CatalogComparison, ClusterTable, MemberTable, OurCatalog};
use isochrone::{IsochroneGrid, ParsecGrid};
use tracing::info;

use crate::config::DataPaths;
use crate::error::Result;

/// Catalogs and the isochrone grid, loaded once at startup and never mutated
pub struct AppState {
    /// Every row of the Hunt table, used for the cross-catalog comparison
    pub hunt: ClusterTable,
    /// Hunt rows of kind open, the names offered on the Hunt page
    pub open_clusters: ClusterTable,
    pub members: MemberTable,
    pub ours: OurCatalog,
    pub our_members_dir: PathBuf,
    pub grid: Box<dyn IsochroneGrid>,
    pub interpolate: bool,
    /// Our catalog against the full Hunt table, sorted by name
    pub comparison: CatalogComparison,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        hunt: ClusterTable,
        members: MemberTable,
        ours: OurCatalog,
        our_members_dir: PathBuf,
        grid: Box<dyn IsochroneGrid>,
        interpolate: bool,
    ) -> Self {
        let open_clusters = hunt.open_clusters();
        let comparison = compare_catalogs(ours.records(), hunt.records());
        info!(
            "{} Hunt clusters ({} open), {} member stars, {} in our catalog, {} in common",
            hunt.len(),
            open_clusters.len(),
            members.len(),
            ours.len(),
            comparison.len()
        );
        Self {
            hunt,
            open_clusters,
            members,
            ours,
            our_members_dir,
            grid,
            interpolate,
            comparison,
        }
    }

    /// Read every input; any failure here is fatal for the server
    pub fn load(paths: &DataPaths, interpolate: bool) -> Result<Self> {
        paths.validate()?;
        let hunt = ClusterTable::load(&paths.clusters)?;
        let members = MemberTable::load(&paths.members)?;
        let ours = OurCatalog::load(&paths.our_catalog)?;
        let grid = ParsecGrid::load(&paths.isochrone_grid)?;
        Ok(Self::new(
            hunt,
            members,
            ours,
            paths.our_members_dir.clone(),
            Box::new(grid),
            interpolate,
        ))
    }

    /// Open cluster shown when the Hunt page has no selection
    pub fn default_hunt_cluster(&self) -> Option<&str> {
        self.open_clusters.names().next()
    }

    /// Cluster shown when the comparison page has no selection
    pub fn default_compare_cluster(&self) -> Option<&str> {
        self.ours.names().next()
    }
}
