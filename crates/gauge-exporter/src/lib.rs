//! gauge-exporter library entry.
//!
//! This crate wires the push endpoint, the scrape endpoint, and the optional
//! expiry sweep around `gauge_core::storage::MetricsStorage`. It is consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ingest;
pub mod obs;
pub mod ops;
pub mod router;
pub mod sweep;
