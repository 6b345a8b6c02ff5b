//! Draw order for member stars
//!
//! Stars are plotted in ascending membership probability so the most likely
//! members end up on top of the scatter.

use std::cmp::Ordering;

use crate::records::MemberStar;

/// Stable arg-sort of probabilities, ascending, nulls last
pub fn probability_order(probabilities: &[Option<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| compare_probability(probabilities[a], probabilities[b]));
    order
}

fn compare_probability(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reorder member stars for drawing; ties keep their input order
pub fn order_by_probability(stars: Vec<MemberStar>) -> Vec<MemberStar> {
    let probabilities: Vec<_> = stars.iter().map(|s| s.probability).collect();
    let order = probability_order(&probabilities);

    let mut slots: Vec<Option<MemberStar>> = stars.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(ra: f64, probability: Option<f64>) -> MemberStar {
        MemberStar {
            name: "NGC_2516".into(),
            ra: Some(ra),
            dec: None,
            g_mag: None,
            bp_mag: None,
            rp_mag: None,
            probability,
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let order = probability_order(&[Some(0.9), Some(0.1), Some(0.9), Some(0.5)]);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_nulls_sort_last() {
        let order = probability_order(&[None, Some(0.2), None, Some(0.1)]);
        assert_eq!(order, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_stars_reordered_by_probability() {
        let stars = vec![
            star(1.0, Some(0.9)),
            star(2.0, Some(0.1)),
            star(3.0, Some(0.9)),
            star(4.0, Some(0.5)),
        ];
        let ordered = order_by_probability(stars);
        let ras: Vec<_> = ordered.iter().map(|s| s.ra.unwrap()).collect();
        assert_eq!(ras, vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(probability_order(&[]).is_empty());
        assert!(order_by_probability(Vec::new()).is_empty());
    }
}
