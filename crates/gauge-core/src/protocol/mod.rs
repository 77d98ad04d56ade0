//! Wire contracts of the exporter.
//!
//! - Push: JSON body of `PUT /gauge/<name>`, decoded and validated before it
//!   reaches storage.
//!
//! Parsers are panic-free: malformed input is reported as `GaugeError`.

pub mod push;

pub use push::{decode_push, parse_metric_name, DataPoint, Push, PushRequest};
