//! Views to SVG charts

use cluster_catalog::{CatalogComparison, MemberStar, OurMemberStar, ParameterPairs};
use viz::cmd::{cmd_chart, CmdStyle};
use viz::compare::{catalog_scatter, parameter_bars, ParameterBar};
use viz::sky::sky_chart;
use viz::{ChartConfig, StarPoint};

use crate::error::{DashboardError, Result};
use crate::view::{CompareView, HuntView, IsochroneFit};

fn cmd_points(members: &[MemberStar]) -> Vec<StarPoint> {
    members
        .iter()
        .filter_map(|m| Some(StarPoint::new(m.color()?, m.g_mag?, m.probability)))
        .collect()
}

fn our_cmd_points(members: &[OurMemberStar]) -> Vec<StarPoint> {
    members
        .iter()
        .filter_map(|m| Some(StarPoint::new(m.color()?, m.g_mag?, None)))
        .collect()
}

fn isochrone_line(fit: Option<&IsochroneFit>) -> Option<Vec<(f64, f64)>> {
    fit.map(|f| f.observed.gaia_cmd())
}

/// Hunt CMD, members colored by probability over the solar isochrone
pub fn hunt_cmd(view: &HuntView) -> Result<String> {
    let line = isochrone_line(view.isochrone.as_ref());
    Ok(cmd_chart(
        &cmd_points(&view.members),
        line.as_deref(),
        CmdStyle::Probability,
        &ChartConfig::titled("CMD"),
    )?)
}

/// Member positions colored by probability
pub fn hunt_sky(view: &HuntView) -> Result<String> {
    let points: Vec<StarPoint> = view
        .members
        .iter()
        .filter_map(|m| Some(StarPoint::new(m.ra?, m.dec?, m.probability)))
        .collect();
    // square plot area beside the color bar
    let config = ChartConfig::titled("Distribution RA and DEC").with_size(560, 480);
    Ok(sky_chart(&points, &config)?)
}

pub fn compare_hunt_cmd(view: &CompareView) -> Result<String> {
    let points: Vec<StarPoint> = cmd_points(&view.hunt_members)
        .into_iter()
        .map(|p| StarPoint { probability: None, ..p })
        .collect();
    let line = isochrone_line(view.hunt_isochrone.as_ref());
    Ok(cmd_chart(
        &points,
        line.as_deref(),
        CmdStyle::Plain,
        &ChartConfig::titled("CMD Hunt"),
    )?)
}

pub fn compare_our_cmd(view: &CompareView) -> Result<String> {
    let line = isochrone_line(view.our_isochrone.as_ref());
    Ok(cmd_chart(
        &our_cmd_points(&view.our_members),
        line.as_deref(),
        CmdStyle::Plain,
        &ChartConfig::titled("CMD our"),
    )?)
}

/// Our fitted parameters beside Hunt's, distances in kpc
pub fn compare_parameters(view: &CompareView) -> Result<String> {
    let hunt = view.hunt.as_ref();
    let bars = [
        ParameterBar::new(
            "log(age)",
            view.ours.log_age,
            hunt.and_then(|h| h.log_age_84),
        ),
        ParameterBar::new(
            "Dist. (kpc)",
            view.ours.distance_kpc(),
            hunt.and_then(|h| h.distance_kpc()),
        ),
        ParameterBar::new("Av.(mag)", view.ours.a_v, hunt.and_then(|h| h.a_v_84)),
    ];
    Ok(parameter_bars(
        &bars,
        &ChartConfig::titled("Comparison of fundamental parameters"),
    )?)
}

/// Parameter plotted in a cross-catalog scatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogParameter {
    Distance,
    Age,
    Extinction,
}

impl CatalogParameter {
    pub const ALL: [CatalogParameter; 3] = [Self::Distance, Self::Age, Self::Extinction];

    /// Chart file name under `/charts/catalog/`
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Distance => "distance.svg",
            Self::Age => "age.svg",
            Self::Extinction => "av.svg",
        }
    }

    pub fn from_file_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.file_name() == name)
            .ok_or_else(|| DashboardError::UnknownChart(name.to_string()))
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Distance => "Distance catalog",
            Self::Age => "Age catalog",
            Self::Extinction => "Av catalog",
        }
    }

    fn pairs<'a>(&self, comparison: &'a CatalogComparison) -> &'a ParameterPairs {
        match self {
            Self::Distance => &comparison.distance,
            Self::Age => &comparison.log_age,
            Self::Extinction => &comparison.a_v,
        }
    }
}

/// Our value against Hunt's for every cluster both catalogs list
pub fn catalog(comparison: &CatalogComparison, parameter: CatalogParameter) -> Result<String> {
    let config = ChartConfig::titled(parameter.title()).with_size(480, 480);
    Ok(catalog_scatter(&parameter.pairs(comparison).complete(), &config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parameter_file_names() {
        for parameter in CatalogParameter::ALL {
            assert_eq!(
                CatalogParameter::from_file_name(parameter.file_name()).unwrap(),
                parameter
            );
        }
        assert!(matches!(
            CatalogParameter::from_file_name("pie.svg"),
            Err(DashboardError::UnknownChart(_))
        ));
    }

    #[test]
    fn test_members_without_photometry_are_skipped() {
        let mut star = MemberStar {
            name: "NGC_2516".into(),
            ra: Some(119.5),
            dec: Some(-60.8),
            g_mag: Some(12.0),
            bp_mag: Some(12.4),
            rp_mag: Some(11.6),
            probability: Some(0.9),
        };
        let complete = cmd_points(std::slice::from_ref(&star));
        assert_eq!(complete.len(), 1);
        assert!((complete[0].x - 0.8).abs() < 1e-9);

        star.bp_mag = None;
        assert!(cmd_points(&[star]).is_empty());
    }

    #[test]
    fn test_empty_comparison_renders() {
        let svg = catalog(&CatalogComparison::default(), CatalogParameter::Age).unwrap();
        assert!(svg.contains("Age catalog"));
        assert!(svg.contains("width=\"480\""));
        assert!(!svg.contains("width=\"640\""));
    }
}
