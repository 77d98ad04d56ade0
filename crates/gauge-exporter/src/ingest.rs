//! Push endpoint: `PUT /gauge/<metric-name>`.
//!
//! Responsibilities:
//! - Reject anything but PUT
//! - Extract the metric name from the path
//! - Decode + validate the JSON body (all-or-nothing)
//! - Apply the push to storage and count the outcome

use axum::{
    extract::{rejection::BytesRejection, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use gauge_core::error::{GaugeError, Result};
use gauge_core::protocol::{decode_push, parse_metric_name};

use crate::app_state::AppState;
use crate::obs::metrics::PushOutcome;

pub async fn push_metric(
    State(app): State<AppState>,
    method: Method,
    path: Option<Path<String>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let tail = path.map(|Path(p)| p).unwrap_or_default();
    respond(&app, &method, &tail, body)
}

/// Unmatched routes. `/gauge/` (empty name) still counts as a failed push.
pub async fn fallback(
    State(app): State<AppState>,
    method: Method,
    uri: Uri,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    if uri.path() == "/gauge/" {
        return respond(&app, &method, "", body);
    }
    (StatusCode::NOT_FOUND, "not found\n").into_response()
}

fn respond(
    app: &AppState,
    method: &Method,
    tail: &str,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    match handle_push(app, method, tail, body) {
        Ok(metric) => {
            app.metrics().record_push(PushOutcome::Success);
            tracing::debug!(metric = %metric, "push accepted");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            app.metrics().record_push(PushOutcome::Failed);
            tracing::debug!(path = %tail, code = e.client_code().as_str(), error = %e, "push rejected");
            error_response(&e)
        }
    }
}

fn handle_push(
    app: &AppState,
    method: &Method,
    tail: &str,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<String> {
    if method != Method::PUT {
        return Err(GaugeError::MethodNotAllowed);
    }
    let metric = parse_metric_name(tail)?;
    let body = body.map_err(body_error)?;
    let push = decode_push(&body)?;
    push.apply(&app.storage(), metric);
    Ok(metric.to_string())
}

fn body_error(rejection: BytesRejection) -> GaugeError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GaugeError::PayloadTooLarge
    } else {
        GaugeError::BadRequest(format!("error reading request body: {}", rejection.body_text()))
    }
}

pub fn error_response(e: &GaugeError) -> Response {
    let status = StatusCode::from_u16(e.client_code().http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("{e}\n")).into_response()
}
