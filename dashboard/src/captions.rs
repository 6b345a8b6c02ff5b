//! Parameter captions for the page sidebars
//!
//! Values are rounded to three decimals. A null value reads `nan`, the same
//! text a missing catalog entry has always shown.

use cluster_catalog::{ClusterRecord, OurClusterRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub label: &'static str,
    pub value: String,
    pub unit: Option<&'static str>,
}

impl Caption {
    fn new(label: &'static str, value: String, unit: Option<&'static str>) -> Self {
        Self { label, value, unit }
    }
}

/// `value` rounded to three decimals, `nan` when null
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let rounded = (v * 1000.0).round() / 1000.0;
            // avoid "-0"
            format!("{}", rounded + 0.0)
        }
        _ => "nan".to_string(),
    }
}

pub fn format_count(value: Option<u64>) -> String {
    value.map_or_else(|| "nan".to_string(), |n| n.to_string())
}

/// `value ± error`
pub fn format_with_error(value: Option<f64>, error: Option<f64>) -> String {
    format!("{} ± {}", format_value(value), format_value(error))
}

/// Fundamental parameters of a Hunt cluster
pub fn hunt_captions(record: &ClusterRecord) -> Vec<Caption> {
    vec![
        Caption::new("log(age)", format_value(record.log_age_84), None),
        Caption::new("Dist.", format_value(record.distance_kpc()), Some("kpc")),
        Caption::new("Av.", format_value(record.a_v_84), Some("mag")),
        Caption::new("N° members", format_count(record.n_stars), None),
        Caption::new(
            "N° members tidal radius",
            format_count(record.n_stars_tidal),
            None,
        ),
        Caption::new("Core radius", format_value(record.radius_c_pc), Some("pc")),
        Caption::new("Tidal radius", format_value(record.radius_t_pc), Some("pc")),
        Caption::new("Total radius", format_value(record.radius_total_pc), Some("pc")),
        Caption::new(
            "Parallax",
            format_with_error(record.parallax, record.parallax_error),
            Some("mas"),
        ),
        Caption::new(
            "Radial velocity",
            format_with_error(record.radial_velocity, record.radial_velocity_error),
            Some("km/s"),
        ),
    ]
}

/// The fitted subset shown beside our parameters on the comparison page
pub fn hunt_fit_captions(record: Option<&ClusterRecord>) -> Vec<Caption> {
    vec![
        Caption::new("log(age)", format_value(record.and_then(|r| r.log_age_84)), None),
        Caption::new(
            "Dist.",
            format_value(record.and_then(|r| r.distance_kpc())),
            Some("kpc"),
        ),
        Caption::new("Av.", format_value(record.and_then(|r| r.a_v_84)), Some("mag")),
    ]
}

/// Our fitted parameters with their uncertainties
pub fn our_captions(record: &OurClusterRecord) -> Vec<Caption> {
    vec![
        Caption::new(
            "log(age)",
            format_with_error(record.log_age, record.e_log_age),
            None,
        ),
        Caption::new(
            "Dist.",
            format_with_error(record.distance_kpc(), record.e_distance_kpc()),
            Some("kpc"),
        ),
        Caption::new("Av.", format_with_error(record.a_v, record.e_a_v), Some("mag")),
        Caption::new("[Fe/H]", format_with_error(record.fe_h, record.e_fe_h), None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_rounds_to_three_decimals() {
        assert_eq!(format_value(Some(1.23456)), "1.235");
        assert_eq!(format_value(Some(8.7)), "8.7");
        assert_eq!(format_value(Some(1.2)), "1.2");
        assert_eq!(format_value(Some(-0.0001)), "0");
    }

    #[test]
    fn test_null_reads_nan() {
        assert_eq!(format_value(None), "nan");
        assert_eq!(format_value(Some(f64::NAN)), "nan");
        assert_eq!(format_count(None), "nan");
        assert_eq!(format_with_error(Some(0.35), None), "0.35 ± nan");
    }

    #[test]
    fn test_hunt_fit_captions_without_record() {
        let captions = hunt_fit_captions(None);
        assert_eq!(captions.len(), 3);
        assert!(captions.iter().all(|c| c.value == "nan"));
    }
}
