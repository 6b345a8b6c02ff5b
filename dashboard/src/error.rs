use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{what} not found at {}", .path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("unknown chart: {0}")]
    UnknownChart(String),

    #[error("catalog has no clusters to show")]
    EmptyCatalog,

    #[error(transparent)]
    Catalog(#[from] cluster_catalog::CatalogError),

    #[error(transparent)]
    Isochrone(#[from] isochrone::IsochroneError),

    #[error(transparent)]
    Render(#[from] viz::VizError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownCluster(_) | Self::UnknownChart(_) | Self::EmptyCatalog => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
