use std::time::Instant;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use cluster_catalog::ClusterRecord;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::charts::{self, CatalogParameter};
use crate::error::{DashboardError, Result};
use crate::pages::{compare_page, hunt_page, CompareCharts, HuntCharts};
use crate::state::{AppState, SharedState};
use crate::view::{CompareView, HuntView};

/// Query string of both pages
#[derive(Debug, Deserialize)]
pub struct Selection {
    pub cluster: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClusterSummary<'a> {
    #[serde(flatten)]
    pub record: &'a ClusterRecord,
    pub member_count: usize,
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/hunt") }))
        .route("/hunt", get(hunt_endpoint))
        .route("/hunt/members/:file", get(members_download_endpoint))
        .route("/compare", get(compare_endpoint))
        .route("/charts/hunt/:name/:chart", get(hunt_chart_endpoint))
        .route("/charts/compare/:name/:chart", get(compare_chart_endpoint))
        .route("/charts/catalog/:chart", get(catalog_chart_endpoint))
        .route("/api/clusters", get(cluster_list_endpoint))
        .route("/api/clusters/:name", get(cluster_endpoint))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
}

async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    info!(
        "{} {} {} - {:.1}ms",
        method,
        uri.path(),
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

fn selected_or(selection: Selection, default: Option<&str>) -> Result<String> {
    selection
        .cluster
        .or_else(|| default.map(str::to_string))
        .ok_or(DashboardError::EmptyCatalog)
}

fn render_hunt(state: &AppState, name: &str) -> Result<String> {
    let view = HuntView::build(state, name)?;
    let charts = HuntCharts {
        cmd: charts::hunt_cmd(&view)?,
        sky: charts::hunt_sky(&view)?,
    };
    Ok(hunt_page(state.open_clusters.names(), &view, &charts))
}

async fn hunt_endpoint(
    State(state): State<SharedState>,
    Query(selection): Query<Selection>,
) -> Result<Html<String>> {
    let name = selected_or(selection, state.default_hunt_cluster())?;
    Ok(Html(render_hunt(&state, &name)?))
}

fn render_compare(state: &AppState, name: &str) -> Result<String> {
    let view = CompareView::build(state, name)?;
    let catalogs = CatalogParameter::ALL
        .into_iter()
        .map(|p| Ok((p.title(), charts::catalog(&state.comparison, p)?)))
        .collect::<Result<Vec<_>>>()?;
    let charts = CompareCharts {
        hunt_cmd: charts::compare_hunt_cmd(&view)?,
        our_cmd: charts::compare_our_cmd(&view)?,
        parameters: charts::compare_parameters(&view)?,
        catalogs,
    };
    Ok(compare_page(state.ours.names(), &view, &charts))
}

async fn compare_endpoint(
    State(state): State<SharedState>,
    Query(selection): Query<Selection>,
) -> Result<Html<String>> {
    let name = selected_or(selection, state.default_compare_cluster())?;
    Ok(Html(render_compare(&state, &name)?))
}

/// Member rows of one open cluster as `NAME.parquet`, every column kept
async fn members_download_endpoint(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Result<Response> {
    let name = file.strip_suffix(".parquet").unwrap_or(&file);
    if state.open_clusters.get(name).is_none() {
        return Err(DashboardError::UnknownCluster(name.to_string()));
    }
    let bytes = state.members.export(name)?;
    info!("Exporting {} members of {} ({} bytes)", state.members.count(name), name, bytes.len());
    let disposition = format!("attachment; filename=\"{name}.parquet\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/vnd.apache.parquet".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn hunt_chart_endpoint(
    State(state): State<SharedState>,
    Path((name, chart)): Path<(String, String)>,
) -> Result<Response> {
    let view = HuntView::build(&state, &name)?;
    let svg = match chart.as_str() {
        "cmd.svg" => charts::hunt_cmd(&view)?,
        "sky.svg" => charts::hunt_sky(&view)?,
        _ => return Err(DashboardError::UnknownChart(chart)),
    };
    Ok(svg_response(svg))
}

async fn compare_chart_endpoint(
    State(state): State<SharedState>,
    Path((name, chart)): Path<(String, String)>,
) -> Result<Response> {
    if !matches!(chart.as_str(), "hunt-cmd.svg" | "our-cmd.svg" | "parameters.svg") {
        return Err(DashboardError::UnknownChart(chart));
    }
    let view = CompareView::build(&state, &name)?;
    let svg = match chart.as_str() {
        "hunt-cmd.svg" => charts::compare_hunt_cmd(&view)?,
        "our-cmd.svg" => charts::compare_our_cmd(&view)?,
        _ => charts::compare_parameters(&view)?,
    };
    Ok(svg_response(svg))
}

async fn catalog_chart_endpoint(
    State(state): State<SharedState>,
    Path(chart): Path<String>,
) -> Result<Response> {
    let parameter = CatalogParameter::from_file_name(&chart)?;
    Ok(svg_response(charts::catalog(&state.comparison, parameter)?))
}

async fn cluster_list_endpoint(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.open_clusters.names().map(str::to_string).collect())
}

async fn cluster_endpoint(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let record = state
        .open_clusters
        .get(&name)
        .ok_or_else(|| DashboardError::UnknownCluster(name.clone()))?;
    let summary = ClusterSummary {
        record,
        member_count: state.members.count(&name),
    };
    Ok((StatusCode::OK, Json(summary)).into_response())
}
