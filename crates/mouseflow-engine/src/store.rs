//! Versioned JSON document persistence for the task list.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use mouseflow_core::config::{StorageConfig, DOCUMENT_VERSION, STORAGE_CONFIG_FILE, TASKS_FILE};
use mouseflow_core::types::{now_ms, StorageConfigDoc, Task, TaskDocument};

use crate::error::Result;

/// Whole-file persistence of the task list.
///
/// Each save rewrites the entire document atomically (temp file + rename),
/// so readers never observe a half-written file. Loads are lenient: a
/// missing or structurally invalid document yields an empty list rather
/// than an error, because losing a restart must never brick the app.
pub struct TaskStore {
    /// Current data directory. Mutable via [`TaskStore::set_storage_location`].
    data_dir: Mutex<PathBuf>,
    /// Location of `storage-config.json` — always next to the *default*
    /// data directory, so the override survives even when the data moves.
    config_path: PathBuf,
}

impl TaskStore {
    /// Open a store rooted at the configured data directory, honouring a
    /// valid `storage-config.json` override when one exists.
    pub fn open(config: &StorageConfig) -> Self {
        let default_dir = PathBuf::from(&config.data_dir);
        let config_path = default_dir
            .parent()
            .map(|p| p.join(STORAGE_CONFIG_FILE))
            .unwrap_or_else(|| default_dir.join(STORAGE_CONFIG_FILE));

        let data_dir = match load_storage_override(&config_path) {
            Some(dir) => {
                info!(dir = %dir.display(), "using custom storage location");
                dir
            }
            None => default_dir,
        };

        if let Err(e) = fs::create_dir_all(&data_dir) {
            warn!(dir = %data_dir.display(), "could not create data directory: {e}");
        }

        Self {
            data_dir: Mutex::new(data_dir),
            config_path,
        }
    }

    /// The directory currently holding `tasks.json`.
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.lock().expect("store state poisoned").clone()
    }

    /// Full path of the task document.
    pub fn tasks_path(&self) -> PathBuf {
        self.storage_dir().join(TASKS_FILE)
    }

    /// Load all persisted tasks.
    ///
    /// Missing file, unreadable content or an invalid document all degrade
    /// to an empty list (with a log line), never an error.
    pub fn load_tasks(&self) -> Vec<Task> {
        let path = self.tasks_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no task document yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path.display(), "task document unreadable: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<TaskDocument>(&raw) {
            Ok(doc) => {
                info!(count = doc.tasks.len(), version = %doc.version, "tasks loaded");
                doc.tasks
            }
            Err(e) => {
                warn!(path = %path.display(), "task document invalid, starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Write the full document as one atomic replace of the backing file.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        let doc = TaskDocument {
            version: DOCUMENT_VERSION.to_string(),
            timestamp: now_ms(),
            tasks: tasks.to_vec(),
        };

        let path = self.tasks_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&doc)?)?;
        fs::rename(&tmp, &path)?;

        debug!(count = tasks.len(), path = %path.display(), "tasks saved");
        Ok(())
    }

    /// Point the store at a new directory and persist the choice in
    /// `storage-config.json` so it survives restarts.
    pub fn set_storage_location(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let doc = StorageConfigDoc {
            storage_dir: dir.display().to_string(),
        };
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, serde_json::to_vec_pretty(&doc)?)?;

        *self.data_dir.lock().expect("store state poisoned") = dir.to_path_buf();
        info!(dir = %dir.display(), "storage location changed");
        Ok(())
    }

    /// Remove the task document. Missing file is a no-op.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(self.tasks_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn load_storage_override(config_path: &Path) -> Option<PathBuf> {
    let raw = fs::read_to_string(config_path).ok()?;
    match serde_json::from_str::<StorageConfigDoc>(&raw) {
        Ok(doc) => Some(PathBuf::from(doc.storage_dir)),
        Err(e) => {
            warn!(path = %config_path.display(), "storage config invalid, using default: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mouseflow_core::types::{TaskAction, TaskStatus};
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> TaskStore {
        TaskStore::open(&StorageConfig {
            data_dir: tmp.path().join("data").display().to_string(),
            autosave_interval_ms: 2_000,
        })
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            action: TaskAction::Move,
            x: 100,
            y: 200,
            target_x: None,
            target_y: None,
            button: None,
            scroll_x: None,
            scroll_y: None,
            delay: Some(10),
            scheduled_time: Some(1_800_000_000_000),
            created_at: now_ms(),
            status: TaskStatus::Pending,
            error: None,
        }
    }

    #[test]
    fn load_without_document_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(store_in(&tmp).load_tasks().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_every_field() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let mut failed = task("b");
        failed.status = TaskStatus::Failed;
        failed.error = Some("boom".to_string());
        store.save_tasks(&[task("a"), failed]).unwrap();

        let loaded = store.load_tasks();
        assert_eq!(loaded.len(), 2);
        let a = loaded.iter().find(|t| t.id == "a").unwrap();
        assert_eq!(a.x, 100);
        assert_eq!(a.delay, Some(10));
        assert_eq!(a.scheduled_time, Some(1_800_000_000_000));
        let b = loaded.iter().find(|t| t.id == "b").unwrap();
        assert_eq!(b.status, TaskStatus::Failed);
        assert_eq!(b.error.as_deref(), Some("boom"));
    }

    #[test]
    fn save_replaces_not_appends() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.save_tasks(&[task("a"), task("b")]).unwrap();
        store.save_tasks(&[task("c")]).unwrap();

        let loaded = store.load_tasks();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "c");
        // No temp file left behind after the rename.
        assert!(!store.tasks_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn invalid_document_degrades_to_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        fs::write(store.tasks_path(), r#"{"version":"1.0","timestamp":1}"#).unwrap();
        assert!(store.load_tasks().is_empty());

        fs::write(store.tasks_path(), "not json at all").unwrap();
        assert!(store.load_tasks().is_empty());
    }

    #[test]
    fn document_carries_version_and_timestamp() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.save_tasks(&[task("a")]).unwrap();

        let raw = fs::read_to_string(store.tasks_path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["version"], "1.0");
        assert!(doc["timestamp"].as_i64().unwrap() > 0);
        assert!(doc["tasks"].is_array());
    }

    #[test]
    fn storage_config_overrides_default_dir() {
        let tmp = TempDir::new().unwrap();
        let custom = tmp.path().join("elsewhere");
        fs::create_dir_all(&custom).unwrap();
        fs::write(
            tmp.path().join(STORAGE_CONFIG_FILE),
            serde_json::to_vec(&StorageConfigDoc {
                storage_dir: custom.display().to_string(),
            })
            .unwrap(),
        )
        .unwrap();

        let store = store_in(&tmp);
        assert_eq!(store.storage_dir(), custom);
    }

    #[test]
    fn set_storage_location_moves_target_and_persists() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let custom = tmp.path().join("moved");

        store.set_storage_location(&custom).unwrap();
        assert_eq!(store.storage_dir(), custom);
        store.save_tasks(&[task("a")]).unwrap();
        assert!(custom.join(TASKS_FILE).exists());

        // A fresh store picks up the persisted override.
        let reopened = store_in(&tmp);
        assert_eq!(reopened.storage_dir(), custom);
        assert_eq!(reopened.load_tasks().len(), 1);
    }

    #[test]
    fn clear_removes_document_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.save_tasks(&[task("a")]).unwrap();

        store.clear().unwrap();
        assert!(store.load_tasks().is_empty());
        store.clear().unwrap();
    }
}
