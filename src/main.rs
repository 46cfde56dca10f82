#![forbid(unsafe_code)]

//! `remindd`: reminder scheduling server binary.
//!
//! Bootstraps configuration, loads the durable reminder snapshot,
//! re-spawns a monitor for every unresolved reminder, and serves the
//! JSON API until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use remindd::config::GlobalConfig;
use remindd::http::{self, AppState};
use remindd::monitor::consumer::spawn_alert_consumer;
use remindd::monitor::registry::MonitorRegistry;
use remindd::store::ReminderStore;
use remindd::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "remindd", about = "Reminder scheduling server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults apply
    /// when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the snapshot data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the HTTP port.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("remindd server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(port) = args.port {
        config.http_port = port;
    }
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Open the store ──────────────────────────────────
    let store = Arc::new(ReminderStore::open(config.snapshot_path())?);
    info!(count = store.len().await, "reminder store opened");

    // ── Start alert consumer and monitors ───────────────
    let ct = CancellationToken::new();
    let (alert_tx, alert_rx) = mpsc::channel(64);
    let consumer_handle = spawn_alert_consumer(alert_rx, ct.clone());

    let monitors = if config.alerts.monitors_enabled {
        let registry = Arc::new(MonitorRegistry::new(
            Arc::clone(&store),
            config.alert_window(),
            config.poll_interval(),
            alert_tx,
            ct.clone(),
        ));
        // Restarts abandon live monitors without losing state, so every
        // unresolved reminder gets its monitor back here.
        let mut respawned = 0_usize;
        for reminder in store.list().await {
            if !reminder.completed {
                registry.watch(&reminder.id).await;
                respawned += 1;
            }
        }
        info!(respawned, "reminder monitors started");
        Some(registry)
    } else {
        info!("background monitors disabled; sweep endpoint only");
        None
    };

    // ── Serve the HTTP API ──────────────────────────────
    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        monitors: monitors.clone(),
        window: config.alert_window(),
    });

    let http_ct = ct.clone();
    let http_port = config.http_port;
    let http_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(state, http_port, http_ct).await {
            error!(%err, "HTTP API failed");
        }
    });

    info!("remindd ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    if let Some(registry) = monitors {
        registry.shutdown().await;
    }
    let _ = tokio::join!(http_handle, consumer_handle);
    info!("remindd shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
