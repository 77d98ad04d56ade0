//! gauge-core: storage engine, push protocol, and error types.
//!
//! This crate owns the in-memory gauge registry and the wire contract of the
//! push endpoint. It carries no transport or runtime dependencies so the
//! exporter binary and tests can drive it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed pushes surface as `GaugeError`; storage operations are total.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod storage;

/// Shared result type.
pub use error::{GaugeError, Result};
