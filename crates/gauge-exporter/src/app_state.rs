//! Shared application state for the exporter.

use std::sync::Arc;
use std::time::Instant;

use gauge_core::storage::MetricsStorage;

use crate::config::ExporterConfig;
use crate::obs::exposition::Exposition;
use crate::obs::metrics::ExporterMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    storage: Arc<MetricsStorage>,
    metrics: ExporterMetrics,
}

impl AppState {
    pub fn new(cfg: ExporterConfig) -> Self {
        Self::with_storage(cfg, Arc::new(MetricsStorage::new()))
    }

    pub fn with_storage(cfg: ExporterConfig, storage: Arc<MetricsStorage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                storage,
                metrics: ExporterMetrics::default(),
            }),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn storage(&self) -> Arc<MetricsStorage> {
        Arc::clone(&self.inner.storage)
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.inner.metrics
    }

    /// Build the `/metrics` body.
    ///
    /// Expired metrics seen during the walk are deleted and left out. The
    /// lines gauge is refreshed afterwards, so it counts surviving lines only.
    pub fn scrape(&self) -> String {
        let storage = &self.inner.storage;
        let mut exposition = Exposition::new();

        let now = Instant::now();
        for name in storage.names() {
            // the delete re-checks expiry, a push may have refreshed the name
            if storage.is_expired_at(&name, now) && storage.delete_if_expired(&name, now) {
                tracing::debug!(metric = %name, "expired metric deleted");
                continue;
            }
            exposition.push(&name, storage.lines(&name));
        }

        self.inner.metrics.set_metric_lines(storage.line_count());

        let mut out = String::new();
        exposition.render(&mut out);
        self.inner.metrics.render(&mut out);
        out
    }
}
