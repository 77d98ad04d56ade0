//! Metric line: one label combination and its latest value.

use std::collections::BTreeMap;
use std::fmt;

/// Label set attached to a single observation.
///
/// A `BTreeMap` keeps keys sorted, so iteration order is the canonical order
/// used for signatures and exposition.
pub type LabelSet = BTreeMap<String, String>;

/// A single gauge value for one label combination.
///
/// The label set is fixed once the line is built; only the value changes
/// (overwritten by a later push or zeroed by zero-fill).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    labels: LabelSet,
    value: f64,
}

impl MetricLine {
    pub fn new(labels: LabelSet, value: f64) -> Self {
        Self { labels, value }
    }

    /// Returns the line with every `extra` pair inserted into its labels.
    /// Existing keys are overwritten.
    pub fn with_extra_labels(mut self, extra: &LabelSet) -> Self {
        self.labels
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Label keys in lexicographic order.
    pub fn sorted_label_keys(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    /// Canonical identity: `k1:v1;k2:v2` with keys sorted.
    pub fn signature(&self) -> String {
        self.labels
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// True if every pair in `candidate` is present in this line with the same
    /// value. An empty candidate matches any line.
    pub fn matches_subset(&self, candidate: &LabelSet) -> bool {
        candidate
            .iter()
            .all(|(k, v)| self.labels.get(k) == Some(v))
    }

    /// True if this line shares at least one key with `other`, whatever the
    /// values. An empty `other` never overlaps.
    pub fn overlaps_keys(&self, other: &LabelSet) -> bool {
        other.keys().any(|k| self.labels.contains_key(k))
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}
