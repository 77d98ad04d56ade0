//! Scrape output.
//!
//! `exposition` renders stored gauges; `metrics` holds the exporter's own
//! instruments. Both write the Prometheus text format without external
//! client crates.

pub mod exposition;
pub mod metrics;
