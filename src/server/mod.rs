//! HTTP server for mirrored sites.
//!
//! ```text
//! GET /favicon.ico   204
//! GET /health        OK
//! GET /output.css    {data_dir}/output.css, or empty
//! GET /feed.xml      RSS of the host's blog posts
//! GET /*             {data_dir}/{host}/{slug}; markdown is rendered
//! ```
//!
//! The host is taken from the `Host` header, so one server hosts every site.

mod error;
mod feed;
mod handlers;
mod render;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::app::{QuireError, Result};
use crate::config::Config;
use crate::store::JsonStore;

pub use error::ServerError;

pub struct AppState {
    pub config: Config,
    pub store: JsonStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = JsonStore::new(&config.data_dir);
        Self { config, store }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/favicon.ico", get(handlers::favicon))
        .route("/health", get(handlers::health))
        .route("/output.css", get(handlers::stylesheet))
        .route("/feed.xml", get(handlers::feed))
        .fallback(handlers::page)
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .map_err(|e| QuireError::Config(format!("Invalid server address: {e}")))?;
    let data_dir = config.data_dir.clone();
    let app = create_router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, data_dir = %data_dir.display(), "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
