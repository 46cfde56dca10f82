//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::detector::AlertWindow;
use crate::{AppError, Result};

/// Alert-detection tuning knobs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AlertConfig {
    /// Seconds before the scheduled time at which the alert becomes due.
    #[serde(default = "default_lead_seconds")]
    pub lead_seconds: i64,
    /// Seconds past the scheduled time an alerted reminder may linger
    /// before it is marked triggered.
    #[serde(default = "default_grace_seconds")]
    pub grace_seconds: i64,
    /// Poll interval for per-reminder background monitors.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Whether background monitors are spawned at all. The on-demand
    /// sweep endpoint works either way.
    #[serde(default = "default_true")]
    pub monitors_enabled: bool,
}

fn default_lead_seconds() -> i64 {
    20
}

fn default_grace_seconds() -> i64 {
    1
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_http_port() -> u16 {
    3000
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            lead_seconds: default_lead_seconds(),
            grace_seconds: default_grace_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            monitors_enabled: true,
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Directory holding the reminder snapshot file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// HTTP port for the JSON API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Alert window and monitor tuning.
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http_port: default_http_port(),
            alerts: AlertConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the durable snapshot file under `data_dir`.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("reminders.json")
    }

    /// Alert window derived from the `[alerts]` section.
    #[must_use]
    pub fn alert_window(&self) -> AlertWindow {
        AlertWindow::new(self.alerts.lead_seconds, self.alerts.grace_seconds)
    }

    /// Monitor poll interval derived from the `[alerts]` section.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.alerts.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.alerts.lead_seconds < 0 {
            return Err(AppError::Config(
                "alerts.lead_seconds must not be negative".into(),
            ));
        }
        if self.alerts.grace_seconds < 0 {
            return Err(AppError::Config(
                "alerts.grace_seconds must not be negative".into(),
            ));
        }
        if self.alerts.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "alerts.poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
