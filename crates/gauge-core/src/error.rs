//! Shared error type across gauge-exporter crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// HTTP method not supported by the endpoint.
    MethodNotAllowed,
    /// Payload too large.
    PayloadTooLarge,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this error class.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => 400,
            ClientCode::MethodNotAllowed => 405,
            ClientCode::PayloadTooLarge => 413,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GaugeError>;

/// Unified error type used by core and exporter.
///
/// Storage operations never produce one of these; errors only come from the
/// push protocol and the process boundary (config, bind).
#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GaugeError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GaugeError::BadRequest(_) => ClientCode::BadRequest,
            GaugeError::MethodNotAllowed => ClientCode::MethodNotAllowed,
            GaugeError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            GaugeError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            GaugeError::Internal(_) => ClientCode::Internal,
        }
    }
}
