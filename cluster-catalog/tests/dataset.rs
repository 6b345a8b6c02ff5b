use cluster_catalog::table::read_parquet_bytes;
use cluster_catalog::{
    compare_catalogs, load_our_members, order_by_probability, ClusterKind, ClusterTable,
    MemberTable, OurCatalog,
};
use test_helpers::fixtures::write_dataset;

#[test]
fn test_every_open_name_selects_one_open_row() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_dataset(dir.path());
    let clusters = ClusterTable::load(&paths.clusters).unwrap();
    let open = clusters.open_clusters();

    assert_eq!(open.len(), 3);
    for name in open.names() {
        let rows = open.select(name);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, ClusterKind::Open);
    }
    assert!(open.get("NGC_104").is_none());
    assert!(clusters.get("NGC_104").is_some());
}

#[test]
fn test_members_of_selected_cluster() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_dataset(dir.path());
    let members = MemberTable::load(&paths.members).unwrap();

    let ngc_2516 = order_by_probability(members.members_of("NGC_2516"));
    let probabilities: Vec<_> = ngc_2516.iter().map(|m| m.probability).collect();
    assert_eq!(probabilities, vec![Some(0.8), Some(0.95)]);
    assert!(members.members_of("IC_2602").is_empty());

    let exported = read_parquet_bytes(members.export("NGC_2516").unwrap()).unwrap();
    assert_eq!(exported.num_rows(), 2);
    let empty = read_parquet_bytes(members.export("IC_2602").unwrap()).unwrap();
    assert_eq!(empty.num_rows(), 0);
    assert_eq!(empty.schema(), exported.schema());
}

#[test]
fn test_comparison_over_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_dataset(dir.path());
    let hunt = ClusterTable::load(&paths.clusters).unwrap();
    let ours = OurCatalog::load(&paths.our_catalog).unwrap();

    let comparison = compare_catalogs(ours.records(), hunt.records());
    assert_eq!(comparison.names, vec!["Melotte_22", "NGC_2516"]);
    assert_eq!(comparison.distance.ours, vec![Some(136.0), Some(410.0)]);
    assert_eq!(comparison.distance.hunt, vec![Some(135.0), Some(1200.0)]);
    assert_eq!(comparison.log_age.len(), 2);
    assert_eq!(comparison.a_v.len(), 2);
}

#[test]
fn test_our_member_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_dataset(dir.path());

    let stars = load_our_members(&paths.our_members_dir, "NGC_2516").unwrap();
    assert_eq!(stars.len(), 3);
    assert_eq!(stars[0].g_mag, Some(11.0));
    assert!(load_our_members(&paths.our_members_dir, "Melotte_22")
        .unwrap()
        .is_empty());
}
