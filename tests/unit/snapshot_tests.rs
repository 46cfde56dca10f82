//! Unit tests for snapshot load/save: round-trips, missing files, and
//! corrupt-file fallback.

use std::collections::HashMap;
use std::fs;

use chrono::{TimeZone, Utc};
use remindd::models::Reminder;
use remindd::store::snapshot::SnapshotFile;

fn sample_reminder(id: &str) -> Reminder {
    let mut r = Reminder::new(
        id.to_owned(),
        format!("reminder {id}"),
        "notes".into(),
        Utc.with_ymd_and_hms(2026, 10, 5, 8, 0, 0).unwrap(),
    );
    r.alert_sent = true;
    r.alert_time = Some(Utc.with_ymd_and_hms(2026, 10, 5, 7, 59, 45).unwrap());
    r
}

#[test]
fn missing_file_loads_empty_with_counter_reset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = SnapshotFile::open(dir.path().join("reminders.json")).expect("open");
    let snapshot = file.load_or_default();
    assert!(snapshot.reminders.is_empty());
    assert_eq!(snapshot.next_id, 1);
}

#[test]
fn corrupt_file_loads_empty_instead_of_failing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reminders.json");
    fs::write(&path, "{ this is not json").expect("write garbage");

    let file = SnapshotFile::open(path).expect("open");
    let snapshot = file.load_or_default();
    assert!(snapshot.reminders.is_empty());
    assert_eq!(snapshot.next_id, 1);
}

#[test]
fn save_then_load_round_trips_reminders_and_counter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = SnapshotFile::open(dir.path().join("reminders.json")).expect("open");

    let mut reminders = HashMap::new();
    reminders.insert("1".to_owned(), sample_reminder("1"));
    reminders.insert("2".to_owned(), sample_reminder("2"));
    file.save(&reminders, 3).expect("save");

    let snapshot = file.load_or_default();
    assert_eq!(snapshot.next_id, 3);
    assert_eq!(snapshot.reminders, reminders);
}

#[test]
fn save_overwrites_the_previous_snapshot_wholesale() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = SnapshotFile::open(dir.path().join("reminders.json")).expect("open");

    let mut first = HashMap::new();
    first.insert("1".to_owned(), sample_reminder("1"));
    file.save(&first, 2).expect("first save");

    let second = HashMap::new();
    file.save(&second, 2).expect("second save");

    let snapshot = file.load_or_default();
    assert!(snapshot.reminders.is_empty(), "old contents must not linger");
}

#[test]
fn open_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("state").join("deep").join("reminders.json");
    let file = SnapshotFile::open(nested.clone()).expect("open");
    file.save(&HashMap::new(), 1).expect("save");
    assert!(nested.exists());
}

#[test]
fn legacy_snapshot_with_missing_fields_still_loads() {
    // Older snapshots may predate some flags; serde defaults fill them in.
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reminders.json");
    fs::write(
        &path,
        r#"{
            "reminders": {
                "1": {
                    "id": "1",
                    "title": "bare",
                    "time": "2026-10-05T08:00:00Z",
                    "created_at": "2026-10-01T00:00:00Z"
                }
            },
            "next_id": 2
        }"#,
    )
    .expect("write snapshot");

    let file = SnapshotFile::open(path).expect("open");
    let snapshot = file.load_or_default();
    let bare = snapshot.reminders.get("1").expect("loaded reminder");
    assert!(!bare.alert_sent);
    assert!(!bare.triggered);
    assert!(!bare.completed);
    assert_eq!(bare.description, "");
}
