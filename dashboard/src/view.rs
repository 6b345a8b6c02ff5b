//! Per-selection pipeline
//!
//! A selection runs filter, isochrone lookup and projection against the shared
//! state, then hands the result to the pages and charts. Nothing is cached:
//! each request recomputes its view.

use cluster_catalog::{
    load_our_members, order_by_probability, ClusterRecord, MemberStar, OurClusterRecord,
    OurMemberStar,
};
use isochrone::{fit_isochrone, IsochroneRequest, MetallicityPolicy, ObservedIsochrone};
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::state::AppState;

/// A fitted isochrone and the request that produced it
#[derive(Debug, Clone)]
pub struct IsochroneFit {
    pub request: IsochroneRequest,
    pub observed: ObservedIsochrone,
}

/// Build the request for a cluster's fitted parameters
///
/// Returns `None` when any parameter is null: no overlay is drawn rather than
/// one at an invented default.
pub fn isochrone_request(
    log_age: Option<f64>,
    metallicity: Option<MetallicityPolicy>,
    distance_pc: Option<f64>,
    a_v: Option<f64>,
    interpolate: bool,
) -> Option<IsochroneRequest> {
    let mut request = IsochroneRequest::gaia(log_age?, metallicity?, distance_pc?, a_v?);
    request.interpolate = interpolate;
    Some(request)
}

/// Run a request against the grid; failures are logged and leave the CMD bare
fn fit(state: &AppState, name: &str, request: Option<IsochroneRequest>) -> Option<IsochroneFit> {
    let Some(request) = request else {
        debug!("{}: incomplete parameters, no isochrone", name);
        return None;
    };
    match fit_isochrone(state.grid.as_ref(), &request) {
        Ok(observed) => Some(IsochroneFit { request, observed }),
        Err(e) => {
            warn!("{}: isochrone fit failed: {}", name, e);
            None
        }
    }
}

/// Everything shown for one cluster of the Hunt catalog
#[derive(Debug, Clone)]
pub struct HuntView {
    pub record: ClusterRecord,
    /// Members in ascending probability order
    pub members: Vec<MemberStar>,
    pub isochrone: Option<IsochroneFit>,
}

impl HuntView {
    /// Hunt CMDs always assume solar metallicity
    pub fn build(state: &AppState, name: &str) -> Result<Self> {
        let record = state
            .open_clusters
            .get(name)
            .ok_or_else(|| DashboardError::UnknownCluster(name.to_string()))?
            .clone();
        let members = order_by_probability(state.members.members_of(name));
        let request = isochrone_request(
            record.log_age_84,
            Some(MetallicityPolicy::Solar),
            record.distance_84,
            record.a_v_84,
            state.interpolate,
        );
        let isochrone = fit(state, name, request);
        debug!("{}: {} members", name, members.len());
        Ok(Self {
            record,
            members,
            isochrone,
        })
    }
}

/// One cluster in both catalogs
#[derive(Debug, Clone)]
pub struct CompareView {
    pub ours: OurClusterRecord,
    /// `None` when the cluster is not an open cluster of the Hunt table
    pub hunt: Option<ClusterRecord>,
    pub hunt_members: Vec<MemberStar>,
    pub our_members: Vec<OurMemberStar>,
    /// Hunt parameters, solar metallicity
    pub hunt_isochrone: Option<IsochroneFit>,
    /// Hunt age, distance and A_V with our measured [Fe/H]
    pub our_isochrone: Option<IsochroneFit>,
}

impl CompareView {
    pub fn build(state: &AppState, name: &str) -> Result<Self> {
        let ours = state
            .ours
            .get(name)
            .ok_or_else(|| DashboardError::UnknownCluster(name.to_string()))?
            .clone();
        let hunt = state.open_clusters.get(name).cloned();
        let hunt_members = state.members.members_of(name);
        let our_members = load_our_members(&state.our_members_dir, name)?;

        let hunt_isochrone = hunt.as_ref().and_then(|record| {
            let request = isochrone_request(
                record.log_age_84,
                Some(MetallicityPolicy::Solar),
                record.distance_84,
                record.a_v_84,
                state.interpolate,
            );
            fit(state, name, request)
        });
        // only the metallicity differs from the Hunt overlay
        let our_request = hunt.as_ref().and_then(|record| {
            isochrone_request(
                record.log_age_84,
                ours.fe_h.map(MetallicityPolicy::Measured),
                record.distance_84,
                record.a_v_84,
                state.interpolate,
            )
        });
        let our_isochrone = fit(state, name, our_request);

        Ok(Self {
            ours,
            hunt,
            hunt_members,
            our_members,
            hunt_isochrone,
            our_isochrone,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use super::*;
    use approx::assert_relative_eq;
    use cluster_catalog::{ClusterTable, MemberTable, OurCatalog};
    use isochrone::{Band, IsochroneGrid, IsochroneTrack};
    use test_helpers::fixtures::{cluster_batch, cluster_row, member_batch, MemberRow};

    type Lookups = Arc<Mutex<Vec<(f64, f64)>>>;

    /// Returns one fixed track and remembers every (log age, Z) lookup
    struct RecordingGrid {
        lookups: Lookups,
    }

    impl IsochroneGrid for RecordingGrid {
        fn isochrone(
            &self,
            log_age: f64,
            metallicity: f64,
            filters: &[Band],
            _reference: Band,
            _interpolate: bool,
        ) -> isochrone::Result<IsochroneTrack> {
            self.lookups.lock().unwrap().push((log_age, metallicity));
            let columns = filters
                .iter()
                .map(|&band| (band, vec![4.0, 6.0]))
                .collect();
            IsochroneTrack::from_columns(vec![1.0, 0.8], columns)
        }
    }

    fn state(ours: &str) -> (AppState, Lookups) {
        let mut no_fit = cluster_row("IC_2602", 7.5, 150.0, 0.05);
        no_fit.a_v_84 = None;
        let mut globular = cluster_row("NGC_104", 10.1, 4500.0, 0.1);
        globular.kind = "g";
        let hunt = ClusterTable::from_batch(&cluster_batch(&[
            cluster_row("NGC_2516", 8.7, 1200.0, 0.3),
            no_fit,
            globular,
        ]))
        .unwrap();
        let members = MemberTable::from_batch(member_batch(&[
            MemberRow::new("NGC_2516", 0.95),
            MemberRow::new("NGC_2516", 0.8),
            MemberRow::new("Melotte_22", 0.7),
        ]))
        .unwrap();
        let ours = OurCatalog::from_reader(ours.as_bytes()).unwrap();
        let lookups = Lookups::default();
        let grid = RecordingGrid {
            lookups: Arc::clone(&lookups),
        };
        let state = AppState::new(
            hunt,
            members,
            ours,
            PathBuf::from("/nonexistent"),
            Box::new(grid),
            true,
        );
        (state, lookups)
    }

    fn catalog() -> String {
        [
            test_helpers::fixtures::OUR_CATALOG_HEADER,
            "NGC_2516;119.52;-60.75;8.5;0.1;410;12;-0.3;0.02;0.35;0.03",
            "Collinder_69;83.79;9.93;6.9;0.2;400;20;nan;0.05;0.3;0.05",
            "NGC_104;6.02;-72.08;8.0;0.1;400;10;-0.7;0.1;0.2;0.02",
            "IC_2602;160.6;-64.4;7.6;0.1;151;3;0.0;0.05;0.1;0.02",
        ]
        .join("\n")
    }

    #[test]
    fn test_hunt_view_ngc_2516() {
        let (state, lookups) = state(&catalog());
        let view = HuntView::build(&state, "NGC_2516").unwrap();

        assert_eq!(view.members.len(), 2);
        assert_eq!(view.members[0].probability, Some(0.8));
        assert_eq!(view.members[1].probability, Some(0.95));
        assert_relative_eq!(view.record.distance_kpc().unwrap(), 1.2);

        let fit = view.isochrone.expect("parameters are complete");
        assert_eq!(fit.request.distance_pc, 1200.0);
        assert_eq!(fit.request.a_v, 0.3);
        assert_eq!(fit.request.metallicity, MetallicityPolicy::Solar);
        assert_eq!(fit.observed.distance_pc(), 1200.0);
        assert_eq!(fit.observed.a_v(), 0.3);
        assert_eq!(*lookups.lock().unwrap(), vec![(8.7, 0.0152)]);
    }

    #[test]
    fn test_hunt_view_null_parameter_skips_isochrone() {
        let (state, _) = state(&catalog());
        let view = HuntView::build(&state, "IC_2602").unwrap();
        assert!(view.members.is_empty());
        assert!(view.isochrone.is_none());
    }

    #[test]
    fn test_hunt_view_unknown_cluster() {
        let (state, _) = state(&catalog());
        assert!(matches!(
            HuntView::build(&state, "ngc_2516"),
            Err(DashboardError::UnknownCluster(_))
        ));
    }

    #[test]
    fn test_compare_view_uses_measured_metallicity() {
        let (state, lookups) = state(&catalog());
        let view = CompareView::build(&state, "NGC_2516").unwrap();

        assert!(view.hunt.is_some());
        assert_eq!(view.hunt_members.len(), 2);
        assert!(view.our_members.is_empty());

        let ours = view.our_isochrone.expect("hunt fit and our [Fe/H] are present");
        assert_eq!(ours.request.metallicity, MetallicityPolicy::Measured(-0.3));
        assert_eq!(
            (ours.request.log_age, ours.request.distance_pc, ours.request.a_v),
            (8.7, 1200.0, 0.3)
        );
        assert_eq!(ours.observed.distance_pc(), 1200.0);
        let hunt = view.hunt_isochrone.expect("hunt parameters are complete");
        assert_eq!(hunt.request.metallicity, MetallicityPolicy::Solar);

        let lookups = lookups.lock().unwrap();
        assert_eq!(lookups.len(), 2);
        assert_eq!(lookups[0], (8.7, 0.0152));
        assert_eq!(lookups[1].0, 8.7);
        assert_relative_eq!(lookups[1].1, 0.0152 * 10f64.powf(-0.3), epsilon = 1e-12);
    }

    #[test]
    fn test_compare_view_ignores_hunt_globular() {
        let (state, lookups) = state(&catalog());
        let view = CompareView::build(&state, "NGC_104").unwrap();
        assert!(view.hunt.is_none());
        assert!(view.hunt_isochrone.is_none());
        assert!(view.our_isochrone.is_none());
        assert!(lookups.lock().unwrap().is_empty());
    }

    #[test]
    fn test_compare_view_null_hunt_parameter_skips_both_overlays() {
        let (state, _) = state(&catalog());
        let view = CompareView::build(&state, "IC_2602").unwrap();
        assert!(view.hunt.is_some());
        assert!(view.hunt_isochrone.is_none());
        assert!(view.our_isochrone.is_none());
    }

    #[test]
    fn test_compare_view_without_hunt_entry_or_metallicity() {
        let (state, _) = state(&catalog());
        let view = CompareView::build(&state, "Collinder_69").unwrap();
        assert!(view.hunt.is_none());
        assert!(view.hunt_isochrone.is_none());
        assert!(view.our_isochrone.is_none());
    }
}
