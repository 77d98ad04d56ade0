//! Process-level instruments of the exporter.
//!
//! Counter and gauge types with dynamic labels backed by `DashMap`. Labels are
//! flattened into sorted key vectors and rendered in sorted order so scrapes
//! are deterministic.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use super::exposition::format_labels;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self.map.entry(label_key(labels)).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label combination (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(LabelKey, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (key, val) in rows {
            let labels = format_labels(key.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            let _ = writeln!(out, "{}{} {}", name, labels, val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    /// Overwrite the value.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self.map.entry(label_key(labels)).or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    /// Current value for a label combination (0 if never set).
    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        let mut rows: Vec<(LabelKey, i64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (key, val) in rows {
            let labels = format_labels(key.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            let _ = writeln!(out, "{}{} {}", name, labels, val);
        }
    }
}

/// Outcome label of a push request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Success,
    Failed,
}

impl PushOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            PushOutcome::Success => "success",
            PushOutcome::Failed => "failed",
        }
    }
}

/// Series name of the live lines gauge.
pub const METRIC_LINES: &str = "gauge_exporter_metric_lines_total";
/// Series name of the push request counter.
pub const REQUESTS: &str = "gauge_exporter_metrics_requests_total";

/// Names owned by the exporter's own instruments.
pub const RESERVED_NAMES: [&str; 2] = [METRIC_LINES, REQUESTS];

#[derive(Default)]
pub struct ExporterMetrics {
    /// Live lines in storage, refreshed on every scrape.
    pub metric_lines: GaugeVec,
    /// Push requests by outcome.
    pub requests: CounterVec,
}

impl ExporterMetrics {
    pub fn record_push(&self, outcome: PushOutcome) {
        self.requests.inc(&[("status", outcome.as_str())]);
    }

    pub fn set_metric_lines(&self, count: usize) {
        self.metric_lines
            .set(&[], i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render all instruments.
    pub fn render(&self, out: &mut String) {
        self.metric_lines.render(METRIC_LINES, out);
        self.requests.render(REQUESTS, out);
    }
}
