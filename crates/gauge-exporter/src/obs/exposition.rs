//! Prometheus text exposition of stored gauges.
//!
//! Every metric name becomes one gauge family. Names are sanitized to the
//! Prometheus charset (`[a-zA-Z_:][a-zA-Z0-9_:]*`); names that collapse to the
//! same family are merged, keeping one sample per label set. Lines with a
//! label key Prometheus cannot carry are skipped, as are metrics named like
//! one of the exporter's own instruments.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Write;

use gauge_core::storage::MetricLine;

use crate::obs::metrics::RESERVED_NAMES;

/// Helper to escape label values.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// `{k1="v1",k2="v2"}`, or an empty string when there are no labels.
pub fn format_labels<'a>(labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let body = labels
        .into_iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    if body.is_empty() {
        body
    } else {
        format!("{{{body}}}")
    }
}

/// Sample value as Prometheus expects it (`NaN`, `+Inf`, `-Inf` included).
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        v.to_string()
    }
}

/// Replace every character not allowed in a metric name with `_`.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    for (i, c) in name.chars().enumerate() {
        let ok = c.is_ascii_alphabetic() || c == '_' || c == ':' || (i > 0 && c.is_ascii_digit());
        if ok {
            out.push(c);
        } else if i == 0 && c.is_ascii_digit() {
            out.push('_');
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    if !(first.is_ascii_alphabetic() || first == '_') || name.starts_with("__") {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Gauge families collected during one scrape, each keyed by line signature.
#[derive(Default)]
pub struct Exposition {
    families: BTreeMap<String, BTreeMap<String, MetricLine>>,
}

impl Exposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the lines of one stored metric.
    ///
    /// Metrics whose family name belongs to an exporter instrument are
    /// skipped. Within a family the first line seen for a signature wins;
    /// later duplicates (from another name sanitizing to the same family)
    /// are skipped.
    pub fn push(&mut self, metric_name: &str, lines: Vec<MetricLine>) {
        let family = sanitize_metric_name(metric_name);
        if RESERVED_NAMES.contains(&family.as_str()) {
            if !lines.is_empty() {
                tracing::warn!(metric = %metric_name, family = %family, "metric skipped: name reserved by exporter");
            }
            return;
        }

        let samples = self.families.entry(family).or_default();
        for line in lines {
            if let Some(bad) = line.sorted_label_keys().into_iter().find(|k| !is_valid_label_name(k)) {
                tracing::warn!(metric = %metric_name, label = %bad, "line skipped: invalid label name");
                continue;
            }
            match samples.entry(line.signature()) {
                Entry::Vacant(slot) => {
                    slot.insert(line);
                }
                Entry::Occupied(slot) => {
                    tracing::warn!(metric = %metric_name, series = %slot.key(), "line skipped: duplicate series in family");
                }
            }
        }
    }

    pub fn render(&self, out: &mut String) {
        for (name, samples) in &self.families {
            if samples.is_empty() {
                continue;
            }
            let _ = writeln!(out, "# TYPE {} gauge", name);
            for line in samples.values() {
                let labels = line.labels();
                let pairs = line
                    .sorted_label_keys()
                    .into_iter()
                    .filter_map(|k| labels.get(k).map(|v| (k, v.as_str())));
                let _ = writeln!(out, "{}{} {}", name, format_labels(pairs), format_value(line.value()));
            }
        }
    }
}
