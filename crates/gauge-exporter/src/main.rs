//! gauge-exporter
//!
//! Accepts labeled gauge pushes over HTTP and serves them for Prometheus.
//! - Push:    PUT /gauge/<metric-name>
//! - Scrape:  GET /metrics
//! - Version: GET /version

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use gauge_core::error::{GaugeError, Result};
use gauge_exporter::{app_state, config, router, sweep};

#[derive(Parser)]
#[command(name = "gauge-exporter", version, about = "Push-to-pull gauge exporter")]
struct Cli {
    /// Http service address (overrides `exporter.listen` from the config file).
    #[arg(long)]
    listen: Option<String>,

    /// Optional YAML config file.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "gauge-exporter failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_from_file(path)?,
        None => config::ExporterConfig::default(),
    };
    if let Some(listen) = cli.listen {
        cfg.exporter.listen = listen;
    }
    cfg.validate()?;

    let listen = cfg.exporter.listen_addr()?;
    let sweep_every = cfg.exporter.sweep_interval();

    let state = app_state::AppState::new(cfg);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = sweep_every.map(|every| tokio::spawn(sweep::run(state.storage(), every, shutdown_rx)));

    let app = router::build_router(state);

    tracing::info!(%listen, version = env!("CARGO_PKG_VERSION"), "gauge-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| GaugeError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GaugeError::Internal(format!("server failed: {e}")))?;

    let _ = shutdown_tx.send(true);
    if let Some(task) = sweeper {
        let _ = task.await;
    }
    tracing::info!("gauge-exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
