use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::line::{LabelSet, MetricLine};

/// Lines of one metric name, keyed by signature.
pub type MetricGroup = HashMap<String, MetricLine>;

/// Upper bound applied to TTLs so `Instant` arithmetic cannot overflow.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Default)]
struct Inner {
    groups: HashMap<String, MetricGroup>,
    expiry: HashMap<String, Instant>,
}

/// Registry of all pushed gauges:
/// - `metric name -> MetricGroup`
/// - `metric name -> expiry instant`
///
/// Both maps sit behind one storage-wide `RwLock`. Writers (`update`,
/// `delete`, `delete_if_expired`, `sweep_expired`) hold the write lock for the whole operation,
/// readers (including `is_expired`) hold the read lock. Read operations return
/// copies; no guard or map reference leaves this type.
#[derive(Default)]
pub struct MetricsStorage {
    inner: RwLock<Inner>,
}

impl MetricsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile a push into the stored state of `metric_name`.
    ///
    /// 1. Every stored line matching `system_labels` is zeroed (kept, not
    ///    removed). Empty `system_labels` zeroes the whole metric.
    /// 2. The metric's expiry becomes `now + ttl`.
    /// 3. Each of `lines` is upserted by signature; later lines win.
    pub fn update(
        &self,
        metric_name: &str,
        system_labels: &LabelSet,
        lines: Vec<MetricLine>,
        ttl: Duration,
    ) {
        let now = Instant::now();
        let mut inner = self.inner.write();

        let group = inner.groups.entry(metric_name.to_string()).or_default();
        for line in group.values_mut() {
            if line.matches_subset(system_labels) {
                line.set_value(0.0);
            }
        }
        for line in lines {
            group.insert(line.signature(), line);
        }

        inner
            .expiry
            .insert(metric_name.to_string(), now + ttl.min(MAX_TTL));
    }

    /// True once the metric's TTL has elapsed. Unknown names are expired.
    pub fn is_expired(&self, metric_name: &str) -> bool {
        self.is_expired_at(metric_name, Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit instant.
    pub fn is_expired_at(&self, metric_name: &str, now: Instant) -> bool {
        self.inner
            .read()
            .expiry
            .get(metric_name)
            .map_or(true, |deadline| now >= *deadline)
    }

    /// Copy of the lines stored under `metric_name`, ordered by signature.
    /// Empty for unknown names. Expired metrics are not filtered.
    pub fn lines(&self, metric_name: &str) -> Vec<MetricLine> {
        let inner = self.inner.read();
        let Some(group) = inner.groups.get(metric_name) else {
            return Vec::new();
        };
        let mut entries: Vec<(&String, &MetricLine)> = group.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter().map(|(_, line)| line.clone()).collect()
    }

    /// Sorted snapshot of every known metric name.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().groups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Total number of lines across all metric names.
    pub fn line_count(&self) -> usize {
        self.inner.read().groups.values().map(HashMap::len).sum()
    }

    /// Forget `metric_name` entirely. Unknown names are a no-op.
    pub fn delete(&self, metric_name: &str) {
        let mut inner = self.inner.write();
        inner.groups.remove(metric_name);
        inner.expiry.remove(metric_name);
    }

    /// Delete `metric_name` only if it is still expired at `now`.
    ///
    /// Expiry is re-checked under the write lock, so a push that refreshed
    /// the metric after a caller's `is_expired` read is kept. Returns whether
    /// the metric was removed. Unknown names return `false`.
    pub fn delete_if_expired(&self, metric_name: &str, now: Instant) -> bool {
        let mut inner = self.inner.write();
        if !inner.groups.contains_key(metric_name) {
            return false;
        }
        let expired = inner
            .expiry
            .get(metric_name)
            .map_or(true, |deadline| now >= *deadline);
        if expired {
            inner.groups.remove(metric_name);
            inner.expiry.remove(metric_name);
        }
        expired
    }

    /// Delete every expired metric in one write-lock pass.
    /// Returns the removed names, sorted.
    pub fn sweep_expired(&self) -> Vec<String> {
        let now = Instant::now();
        let mut inner = self.inner.write();

        let mut expired: Vec<String> = inner
            .groups
            .keys()
            .filter(|name| inner.expiry.get(*name).map_or(true, |deadline| now >= *deadline))
            .cloned()
            .collect();
        expired.sort();

        for name in &expired {
            inner.groups.remove(name);
            inner.expiry.remove(name);
        }
        expired
    }
}
