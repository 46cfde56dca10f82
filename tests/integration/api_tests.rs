//! End-to-end tests for the JSON API on an ephemeral-port server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use remindd::detector::AlertWindow;
use remindd::http::{self, AppState};
use remindd::monitor::registry::MonitorRegistry;
use remindd::store::ReminderStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct TestServer {
    base: String,
    ct: CancellationToken,
    _dir: TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.ct.cancel();
    }
}

async fn spawn_server() -> TestServer {
    spawn_server_with(true).await
}

async fn spawn_server_with(monitors_enabled: bool) -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let store =
        Arc::new(ReminderStore::open(dir.path().join("reminders.json")).expect("open store"));

    let ct = CancellationToken::new();
    let (alert_tx, _alert_rx) = mpsc::channel(32);
    let monitors = monitors_enabled.then(|| {
        Arc::new(MonitorRegistry::new(
            Arc::clone(&store),
            AlertWindow::default(),
            Duration::from_millis(50),
            alert_tx,
            ct.clone(),
        ))
    });

    let state = Arc::new(AppState {
        store,
        monitors,
        window: AlertWindow::default(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let server_ct = ct.clone();
    tokio::spawn(async move {
        axum::serve(listener, http::router(state))
            .with_graceful_shutdown(async move { server_ct.cancelled().await })
            .await
            .expect("server runs");
    });

    TestServer {
        base: format!("http://{addr}"),
        ct,
        _dir: dir,
    }
}

fn in_seconds(offset: i64) -> String {
    (Utc::now() + chrono::Duration::seconds(offset)).to_rfc3339()
}

#[tokio::test]
async fn health_reports_ok_and_count() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/api/health", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["status"], "ok");
    assert_eq!(body["reminders_count"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_returns_201_with_assigned_id() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({
            "title": "dentist",
            "description": "6-month check",
            "time": in_seconds(3600),
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["id"], "1");
    assert_eq!(body["title"], "dentist");
    assert_eq!(body["alert_sent"], false);
    assert_eq!(body["completed"], false);
}

#[tokio::test]
async fn create_without_title_is_400() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({ "time": in_seconds(60) }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("json body");
    assert!(body["error"].as_str().expect("error string").contains("title"));
}

#[tokio::test]
async fn create_with_unparsable_time_is_400() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({ "title": "bad", "time": "whenever" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn get_unknown_reminder_is_404() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/reminders/99", server.base))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("json body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_is_sorted_by_scheduled_time() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    for (title, offset) in [("late", 300), ("early", 30), ("middle", 120)] {
        let response = client
            .post(format!("{}/api/reminders", server.base))
            .json(&json!({ "title": title, "time": in_seconds(offset) }))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), 201);
    }

    let body: Value = client
        .get(format!("{}/api/reminders", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");

    let titles: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, ["early", "middle", "late"]);
}

#[tokio::test]
async fn update_edits_fields_and_rejects_bad_time() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({ "title": "orig", "time": in_seconds(3600) }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let id = created["id"].as_str().expect("id");

    let updated: Value = client
        .put(format!("{}/api/reminders/{id}", server.base))
        .json(&json!({ "title": "renamed" }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(updated["title"], "renamed");
    assert!(updated["updated_at"].is_string());

    let bad = client
        .put(format!("{}/api/reminders/{id}", server.base))
        .json(&json!({ "time": "not a time" }))
        .send()
        .await
        .expect("request");
    assert_eq!(bad.status(), 400);

    let missing = client
        .put(format!("{}/api/reminders/777", server.base))
        .json(&json!({ "title": "ghost" }))
        .send()
        .await
        .expect("request");
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn delete_removes_and_then_404s() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({ "title": "trash me", "time": in_seconds(60) }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let id = created["id"].as_str().expect("id");

    let deleted: Value = client
        .delete(format!("{}/api/reminders/{id}", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(deleted["success"], true);

    let gone = client
        .get(format!("{}/api/reminders/{id}", server.base))
        .send()
        .await
        .expect("request");
    assert_eq!(gone.status(), 404);

    let again = client
        .delete(format!("{}/api/reminders/{id}", server.base))
        .send()
        .await
        .expect("request");
    assert_eq!(again.status(), 404);
}

#[tokio::test]
async fn complete_marks_done_and_stats_reflect_it() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({ "title": "finish", "time": in_seconds(3600) }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let id = created["id"].as_str().expect("id");

    let completed: Value = client
        .post(format!("{}/api/reminders/{id}/complete", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(completed["completed"], true);
    assert!(completed["completed_at"].is_string());

    let stats: Value = client
        .get(format!("{}/api/stats", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["upcoming"], 0);
}

#[tokio::test]
async fn check_alerts_delivers_once_per_scheduled_time() {
    // Monitors off so the on-demand sweep is the only alert path.
    let server = spawn_server_with(false).await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/reminders", server.base))
        .json(&json!({ "title": "imminent", "time": in_seconds(15) }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let id = created["id"].as_str().expect("id").to_owned();

    let first: Value = client
        .get(format!("{}/api/check-alerts", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let entry = &first[&id];
    assert_eq!(entry["type"], "alert");
    assert_eq!(entry["reminder"]["title"], "imminent");

    let second: Value = client
        .get(format!("{}/api/check-alerts", server.base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert!(
        second.as_object().expect("object").is_empty(),
        "no duplicate delivery for the same scheduled time"
    );
}
