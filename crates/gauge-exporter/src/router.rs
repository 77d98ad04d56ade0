//! Axum router wiring.
//!
//! - `/gauge/<name>` : push (every method lands in the handler so rejects are counted)
//! - `/metrics`      : scrape
//! - `/version`      : version string

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};

use crate::{app_state::AppState, ingest, ops};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.cfg().exporter.max_body_bytes;

    Router::new()
        .route("/gauge", any(ingest::push_metric))
        .route("/gauge/*path", any(ingest::push_metric))
        .route("/metrics", get(ops::metrics))
        .route("/version", get(ops::version))
        .fallback(ingest::fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
