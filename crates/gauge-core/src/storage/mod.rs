//! In-memory gauge storage.
//!
//! `MetricLine` carries one label combination and its value; `MetricsStorage`
//! groups lines per metric name, reconciles pushes (zero-fill + upsert) and
//! tracks per-metric expiry. Expiry is detected lazily: nothing is evicted
//! until a caller observes `is_expired` and calls `delete` (or runs
//! `sweep_expired`).

pub mod line;
pub mod store;

pub use line::{LabelSet, MetricLine};
pub use store::{MetricGroup, MetricsStorage};
