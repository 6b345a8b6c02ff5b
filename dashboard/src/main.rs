use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dashboard::{AppState, Args};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    info!("Loading catalogs");
    let state = AppState::load(&args.data, args.interpolate()).context("Failed to load data")?;

    let addr: SocketAddr = format!("{}:{}", args.bind_address, args.port)
        .parse()
        .context("Invalid bind address")?;

    dashboard::serve(Arc::new(state), addr)
        .await
        .context("Server error")?;
    Ok(())
}
