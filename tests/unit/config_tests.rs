//! Unit tests for configuration parsing, defaults, and validation.

use std::path::PathBuf;

use remindd::config::GlobalConfig;
use remindd::detector::AlertWindow;
use remindd::AppError;

#[test]
fn defaults_apply_when_config_is_empty() {
    let config = GlobalConfig::from_toml_str("").expect("empty config is valid");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.data_dir, PathBuf::from("data"));
    assert_eq!(config.alerts.lead_seconds, 20);
    assert_eq!(config.alerts.grace_seconds, 1);
    assert_eq!(config.alerts.poll_interval_ms, 500);
    assert!(config.alerts.monitors_enabled);
}

#[test]
fn built_in_default_matches_empty_toml() {
    let parsed = GlobalConfig::from_toml_str("").expect("empty config is valid");
    assert_eq!(parsed, GlobalConfig::default());
}

#[test]
fn partial_config_overrides_only_named_fields() {
    let raw = r#"
        http_port = 8080

        [alerts]
        lead_seconds = 30
    "#;
    let config = GlobalConfig::from_toml_str(raw).expect("valid config");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.alerts.lead_seconds, 30);
    // Untouched fields keep their defaults.
    assert_eq!(config.alerts.grace_seconds, 1);
    assert_eq!(config.alerts.poll_interval_ms, 500);
}

#[test]
fn zero_poll_interval_is_rejected() {
    let raw = "[alerts]\npoll_interval_ms = 0\n";
    assert!(matches!(
        GlobalConfig::from_toml_str(raw),
        Err(AppError::Config(_))
    ));
}

#[test]
fn negative_lead_is_rejected() {
    let raw = "[alerts]\nlead_seconds = -5\n";
    assert!(matches!(
        GlobalConfig::from_toml_str(raw),
        Err(AppError::Config(_))
    ));
}

#[test]
fn negative_grace_is_rejected() {
    let raw = "[alerts]\ngrace_seconds = -1\n";
    assert!(matches!(
        GlobalConfig::from_toml_str(raw),
        Err(AppError::Config(_))
    ));
}

#[test]
fn malformed_toml_is_a_config_error() {
    assert!(matches!(
        GlobalConfig::from_toml_str("http_port = \"not a port"),
        Err(AppError::Config(_))
    ));
}

#[test]
fn snapshot_path_lives_under_data_dir() {
    let raw = "data_dir = \"/var/lib/remindd\"\n";
    let config = GlobalConfig::from_toml_str(raw).expect("valid config");
    assert_eq!(
        config.snapshot_path(),
        PathBuf::from("/var/lib/remindd/reminders.json")
    );
}

#[test]
fn alert_window_reflects_alert_section() {
    let raw = "[alerts]\nlead_seconds = 45\ngrace_seconds = 2\n";
    let config = GlobalConfig::from_toml_str(raw).expect("valid config");
    assert_eq!(config.alert_window(), AlertWindow::new(45, 2));
}
