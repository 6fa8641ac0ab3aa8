// src/server/mod.rs
// =============================================================================
// HTTP API for the `serve` subcommand.
//
// Routes:
// - POST /api/search  {"domain": "..."} -> one JSON response with everything
// - POST /api/stream  {"domain": "..."} -> Server-Sent Events, one frame per
//   subdomain, then an `event: complete` frame
//
// Every request starts its own discovery run; runs share nothing but the
// Discovery (sources + settings), which is read-only.
// =============================================================================

mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::engine::Discovery;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<Discovery>,
}

/// Build the axum router for the API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(routes::search_handler))
        .route("/api/stream", post(routes::stream_handler))
        // The browser UI may be served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves until the process is stopped
pub async fn serve(config: &ServerConfig, discovery: Discovery) -> Result<()> {
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, sources = discovery.source_count(), "starting subdomain discovery server");

    let state = AppState {
        discovery: Arc::new(discovery),
    };

    axum::serve(listener, router(state))
        .await
        .context("HTTP server stopped unexpectedly")?;

    Ok(())
}
