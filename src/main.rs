use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JsonRecordStore;

mod assembler;
mod config;
mod cursor;
mod errors;
mod fetch;
mod font_metrics;
mod geometry;
mod grid;
mod model;
mod routes;
mod state;
mod store;
mod text;
mod writer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("order_sheets={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting order-sheets v{}", env!("CARGO_PKG_VERSION"));

    let geometry = config.geometry()?;
    let store = JsonRecordStore::load(&config.records_path)?;
    info!(
        records = store.len(),
        path = %config.records_path.display(),
        "Record store loaded"
    );

    let fetcher = HttpFetcher::new(config.fetch_timeout, config.max_image_bytes);
    info!(
        timeout_ms = config.fetch_timeout.as_millis() as u64,
        concurrency = config.fetch_concurrency,
        "Image fetcher ready"
    );

    let state = AppState {
        store: Arc::new(store),
        fetcher: Arc::new(fetcher),
        geometry,
        config: config.clone(),
    };

    // Allow all origins for now; the CRUD gateway in front handles auth
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST and PORT must form a valid socket address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
