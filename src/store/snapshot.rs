//! Durable JSON snapshot of the full store state.
//!
//! The entire reminder map plus the next-id counter is serialized as one
//! unit and overwritten on every mutation. Writes go to a temporary file
//! in the same directory followed by an atomic rename, so readers never
//! observe a half-written snapshot. A missing or corrupt snapshot is
//! logged and treated as "no prior state" rather than a fatal error.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Reminder;
use crate::{AppError, Result};

/// Owned snapshot contents as loaded from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSnapshot {
    /// Reminder map keyed by id.
    #[serde(default)]
    pub reminders: HashMap<String, Reminder>,
    /// Next identifier to assign; counter starts at 1.
    #[serde(default = "default_next_id")]
    pub next_id: u64,
}

fn default_next_id() -> u64 {
    1
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            reminders: HashMap::new(),
            next_id: 1,
        }
    }
}

/// Borrowing mirror of [`StoreSnapshot`] so saves avoid cloning the map.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    reminders: &'a HashMap<String, Reminder>,
    next_id: u64,
}

/// Handle to the snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Create a handle for the given snapshot path, ensuring its parent
    /// directory exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the parent directory cannot be created.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, falling back to an empty store when the file
    /// is absent, unreadable, or corrupt.
    #[must_use]
    pub fn load_or_default(&self) -> StoreSnapshot {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no snapshot found; starting empty");
            return StoreSnapshot::default();
        }
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "snapshot unreadable; starting empty");
                return StoreSnapshot::default();
            }
        };
        match serde_json::from_str::<StoreSnapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    path = %self.path.display(),
                    count = snapshot.reminders.len(),
                    "loaded reminders from snapshot"
                );
                snapshot
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "snapshot corrupt; starting empty");
                StoreSnapshot::default()
            }
        }
    }

    /// Overwrite the snapshot atomically with the given state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` if serialization, the temp-file
    /// write, or the rename fails.
    pub fn save(&self, reminders: &HashMap<String, Reminder>, next_id: u64) -> Result<()> {
        let body = serde_json::to_vec_pretty(&SnapshotRef { reminders, next_id })?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|err| AppError::Persistence(format!("snapshot temp file: {err}")))?;
        tmp.write_all(&body)
            .map_err(|err| AppError::Persistence(format!("snapshot write: {err}")))?;
        tmp.persist(&self.path)
            .map_err(|err| AppError::Persistence(format!("snapshot rename: {err}")))?;
        Ok(())
    }
}
