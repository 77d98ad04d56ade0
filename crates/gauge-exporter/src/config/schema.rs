use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use gauge_core::error::{GaugeError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GaugeError::UnsupportedVersion);
        }

        self.exporter.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// 0 disables the background sweep.
    #[serde(default)]
    pub sweep_interval_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
            sweep_interval_ms: 0,
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(GaugeError::BadRequest(
                "exporter.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        if self.sweep_interval_ms != 0 && !(1000..=3_600_000).contains(&self.sweep_interval_ms) {
            return Err(GaugeError::BadRequest(
                "exporter.sweep_interval_ms must be 0 or between 1000 and 3600000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            GaugeError::BadRequest(format!("exporter.listen must be a valid socket address: {e}"))
        })
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_ms > 0).then(|| Duration::from_millis(self.sweep_interval_ms))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8181".into()
}
fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}
