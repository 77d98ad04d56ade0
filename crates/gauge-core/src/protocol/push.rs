//! Push payload (JSON) and its validation.
//!
//! Wire shape:
//! `{"ttl": 60, "data": [{"labels": {...}, "value": 1.5}], "system_labels": {...}}`
//!
//! Decoding and validation happen here, before storage is touched. A push
//! either validates completely or is rejected as a whole.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{GaugeError, Result};
use crate::storage::{LabelSet, MetricLine, MetricsStorage};

/// One observation inside a push.
#[derive(Debug, Deserialize)]
pub struct DataPoint {
    /// Labels of this observation. `null` or absent means no labels.
    #[serde(default)]
    pub labels: Option<LabelSet>,
    /// `null` or absent reads as 0.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub value: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Push request body as received.
#[derive(Debug, Deserialize)]
pub struct PushRequest {
    /// Time-to-live in seconds; must be positive.
    #[serde(default)]
    pub ttl: i64,
    /// Observations. Must be present, may be empty.
    #[serde(default)]
    pub data: Option<Vec<DataPoint>>,
    /// Labels merged into every observation; also scopes zero-fill.
    #[serde(default)]
    pub system_labels: Option<LabelSet>,
}

/// A validated push, ready to be applied to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Push {
    pub system_labels: LabelSet,
    /// Lines with system labels already merged in.
    pub lines: Vec<MetricLine>,
    pub ttl: Duration,
}

impl PushRequest {
    /// Decode a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| GaugeError::BadRequest(format!("invalid push json: {e}")))
    }

    /// Check the request and build the lines to store.
    pub fn validate(self) -> Result<Push> {
        if self.ttl <= 0 {
            return Err(GaugeError::BadRequest("ttl must be a positive number of seconds".into()));
        }
        let data = self
            .data
            .ok_or_else(|| GaugeError::BadRequest("data is required".into()))?;
        let system_labels = self.system_labels.unwrap_or_default();

        let mut lines = Vec::with_capacity(data.len());
        for point in data {
            let line = MetricLine::new(point.labels.unwrap_or_default(), point.value);
            if line.overlaps_keys(&system_labels) {
                return Err(GaugeError::BadRequest(
                    "metric labels must not contain any of system_labels".into(),
                ));
            }
            lines.push(line.with_extra_labels(&system_labels));
        }

        Ok(Push {
            system_labels,
            lines,
            ttl: Duration::from_secs(self.ttl.unsigned_abs()),
        })
    }
}

impl Push {
    /// Reconcile this push into `storage` under `metric_name`.
    pub fn apply(self, storage: &MetricsStorage, metric_name: &str) {
        let count = self.lines.len();
        storage.update(metric_name, &self.system_labels, self.lines, self.ttl);
        tracing::trace!(metric = %metric_name, lines = count, "push applied");
    }
}

/// Decode and validate a push body in one step.
pub fn decode_push(body: &[u8]) -> Result<Push> {
    PushRequest::from_slice(body)?.validate()
}

/// Extract the metric name from the path after `/gauge/`.
///
/// The name is the first segment; anything after the next `/` is ignored.
pub fn parse_metric_name(path_tail: &str) -> Result<&str> {
    let tail = path_tail.strip_prefix('/').unwrap_or(path_tail);
    let name = tail.split('/').next().unwrap_or_default();
    if name.is_empty() {
        return Err(GaugeError::BadRequest("invalid metric name".into()));
    }
    Ok(name)
}
