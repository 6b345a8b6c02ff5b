//! Web dashboard for open cluster catalogs
//!
//! Two pages over read-only data loaded at startup:
//!
//! - `/hunt`: one open cluster of the Hunt catalog with its fitted
//!   parameters, a CMD with the solar-metallicity isochrone, the members on
//!   the sky and a parquet download of the member rows.
//! - `/compare`: one cluster of our catalog beside its Hunt entry, with both
//!   CMDs, a parameter bar chart and catalog-wide scatters of age, distance
//!   and extinction.
//!
//! Every chart is also served on its own under `/charts/`, and the cluster
//! list and records are available as JSON under `/api/`.

pub mod captions;
pub mod charts;
pub mod config;
pub mod error;
pub mod pages;
pub mod routes;
pub mod state;
pub mod view;

use std::net::SocketAddr;

use tracing::info;

pub use config::{Args, DataPaths};
pub use error::{DashboardError, Result};
pub use routes::create_router;
pub use state::{AppState, SharedState};

/// Bind and serve until the process is stopped
pub async fn serve(state: SharedState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);
    info!("Hunt catalog: http://{}/hunt", addr);
    info!("Catalog comparison: http://{}/compare", addr);
    axum::serve(listener, app).await
}
