//! Operational HTTP endpoints.
//!
//! - `/metrics` : Prometheus text format (stored gauges + exporter instruments)
//! - `/version` : crate version as plain text

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}};

use crate::app_state::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.scrape();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn version() -> impl IntoResponse {
    (StatusCode::OK, VERSION)
}
