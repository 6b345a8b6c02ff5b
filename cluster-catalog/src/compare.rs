//! Cross-catalog comparison
//!
//! Two catalogs are joined on exact, case-sensitive cluster name. The output
//! holds one slot per shared name, in sorted name order, and every parameter
//! sequence has the same length as the name list: slot `i` of each sequence
//! belongs to `names[i]` in both catalogs.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::records::ClusterParameters;

/// Paired values of one parameter; nulls keep their slot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterPairs {
    pub ours: Vec<Option<f64>>,
    pub hunt: Vec<Option<f64>>,
}

impl ParameterPairs {
    pub fn len(&self) -> usize {
        self.ours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ours.is_empty()
    }

    /// Pairs where both sides are present, for scatter plots
    pub fn complete(&self) -> Vec<(f64, f64)> {
        self.ours
            .iter()
            .zip(&self.hunt)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect()
    }
}

/// Aligned parameters of every cluster present in both catalogs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogComparison {
    pub names: Vec<String>,
    pub log_age: ParameterPairs,
    /// Distances in parsecs
    pub distance: ParameterPairs,
    pub a_v: ParameterPairs,
}

impl CatalogComparison {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Sorted, de-duplicated names present in both inputs
pub fn intersect_names<'a, A, B>(a: A, b: B) -> Vec<String>
where
    A: IntoIterator<Item = &'a str>,
    B: IntoIterator<Item = &'a str>,
{
    let left: BTreeSet<&str> = a.into_iter().collect();
    let right: BTreeSet<&str> = b.into_iter().collect();
    left.intersection(&right).map(|s| s.to_string()).collect()
}

fn first_by_name<T: ClusterParameters>(rows: &[T]) -> HashMap<&str, &T> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        index.entry(row.name()).or_insert(row);
    }
    index
}

/// Join `ours` and `hunt` on cluster name and pair their fitted parameters
///
/// When a name appears more than once in one input, its first row is used.
pub fn compare_catalogs<O, H>(ours: &[O], hunt: &[H]) -> CatalogComparison
where
    O: ClusterParameters,
    H: ClusterParameters,
{
    let names = intersect_names(
        ours.iter().map(|r| r.name()),
        hunt.iter().map(|r| r.name()),
    );
    let ours_by_name = first_by_name(ours);
    let hunt_by_name = first_by_name(hunt);

    let mut comparison = CatalogComparison::default();
    for name in &names {
        let (Some(o), Some(h)) = (ours_by_name.get(name.as_str()), hunt_by_name.get(name.as_str()))
        else {
            continue;
        };
        comparison.log_age.ours.push(o.log_age());
        comparison.log_age.hunt.push(h.log_age());
        comparison.distance.ours.push(o.distance_pc());
        comparison.distance.hunt.push(h.distance_pc());
        comparison.a_v.ours.push(o.a_v());
        comparison.a_v.hunt.push(h.a_v());
    }
    comparison.names = names;

    tracing::debug!("Catalog intersection holds {} clusters", comparison.len());
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: &'static str,
        age: Option<f64>,
        dist: Option<f64>,
        av: Option<f64>,
    }

    impl ClusterParameters for Row {
        fn name(&self) -> &str {
            self.name
        }
        fn log_age(&self) -> Option<f64> {
            self.age
        }
        fn distance_pc(&self) -> Option<f64> {
            self.dist
        }
        fn a_v(&self) -> Option<f64> {
            self.av
        }
    }

    fn row(name: &'static str, age: f64) -> Row {
        Row {
            name,
            age: Some(age),
            dist: Some(age * 100.0),
            av: Some(age / 10.0),
        }
    }

    #[test]
    fn test_lengths_match_intersection() {
        let ours = vec![row("C", 3.0), row("A", 1.0), row("X", 9.0), row("B", 2.0)];
        let hunt = vec![row("B", 20.0), row("Y", 0.0), row("A", 10.0), row("C", 30.0)];

        let cmp = compare_catalogs(&ours, &hunt);
        assert_eq!(cmp.names, vec!["A", "B", "C"]);
        assert_eq!(cmp.log_age.len(), 3);
        assert_eq!(cmp.distance.len(), 3);
        assert_eq!(cmp.a_v.len(), 3);
        assert_eq!(cmp.log_age.hunt.len(), cmp.log_age.ours.len());
    }

    #[test]
    fn test_slots_are_aligned_by_name() {
        let ours = vec![row("C", 3.0), row("A", 1.0), row("B", 2.0)];
        let hunt = vec![row("B", 20.0), row("A", 10.0), row("C", 30.0)];

        let cmp = compare_catalogs(&ours, &hunt);
        for (i, name) in cmp.names.iter().enumerate() {
            let o = ours.iter().find(|r| r.name == name.as_str()).unwrap();
            let h = hunt.iter().find(|r| r.name == name.as_str()).unwrap();
            assert_eq!(cmp.log_age.ours[i], o.age);
            assert_eq!(cmp.log_age.hunt[i], h.age);
            assert_eq!(cmp.distance.hunt[i], h.dist);
        }
    }

    #[test]
    fn test_empty_intersection() {
        let ours = vec![row("A", 1.0)];
        let hunt = vec![row("a", 1.0)];
        let cmp = compare_catalogs(&ours, &hunt);
        assert!(cmp.is_empty());
        assert!(cmp.log_age.is_empty());
        assert!(cmp.a_v.complete().is_empty());
    }

    #[test]
    fn test_nulls_keep_their_slot() {
        let mut partial = row("A", 1.0);
        partial.av = None;
        let ours = vec![partial, row("B", 2.0)];
        let hunt = vec![row("A", 10.0), row("B", 20.0)];

        let cmp = compare_catalogs(&ours, &hunt);
        assert_eq!(cmp.a_v.ours, vec![None, Some(0.2)]);
        assert_eq!(cmp.a_v.complete(), vec![(0.2, 2.0)]);
    }

    #[test]
    fn test_duplicate_names_use_first_row() {
        let ours = vec![row("A", 1.0), row("A", 5.0)];
        let hunt = vec![row("A", 10.0)];
        let cmp = compare_catalogs(&ours, &hunt);
        assert_eq!(cmp.names, vec!["A"]);
        assert_eq!(cmp.log_age.ours, vec![Some(1.0)]);
    }
}
