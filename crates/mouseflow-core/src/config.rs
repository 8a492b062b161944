use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Version string written into every persisted task document.
pub const DOCUMENT_VERSION: &str = "1.0";
/// File name of the task-list document inside the data directory.
pub const TASKS_FILE: &str = "tasks.json";
/// File name of the storage-location override document.
pub const STORAGE_CONFIG_FILE: &str = "storage-config.json";
/// Animation frame interval — 16 ms ≈ 60 samples/second.
pub const FRAME_INTERVAL_MS: u64 = 16;
/// Default total duration of an animated pointer move.
pub const MOVE_DURATION_MS: u64 = 500;

/// Top-level config (mouseflow.toml + MOUSEFLOW_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MouseflowConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
}

/// Where task data lives and how often dirty state is flushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Default data directory. A valid `storage-config.json` next to it
    /// overrides this at store initialisation.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Autosave tick interval in milliseconds.
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            autosave_interval_ms: default_autosave_interval_ms(),
        }
    }
}

/// Timing knobs for the pointer sub-steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerConfig {
    /// Total duration of an animated move.
    #[serde(default = "default_move_duration_ms")]
    pub move_duration_ms: u64,
    /// Pause between animation samples.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Settle pause between arriving at a click position and pressing.
    #[serde(default = "default_click_settle_ms")]
    pub click_settle_ms: u64,
    /// Hold between button press and release.
    #[serde(default = "default_click_hold_ms")]
    pub click_hold_ms: u64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            move_duration_ms: default_move_duration_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            click_settle_ms: default_click_settle_ms(),
            click_hold_ms: default_click_hold_ms(),
        }
    }
}

fn default_data_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.mouseflow/data")
}
fn default_autosave_interval_ms() -> u64 {
    2_000
}
fn default_move_duration_ms() -> u64 {
    MOVE_DURATION_MS
}
fn default_frame_interval_ms() -> u64 {
    FRAME_INTERVAL_MS
}
fn default_click_settle_ms() -> u64 {
    50
}
fn default_click_hold_ms() -> u64 {
    30
}

impl MouseflowConfig {
    /// Load config from a TOML file with MOUSEFLOW_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.mouseflow/mouseflow.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MouseflowConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MOUSEFLOW_").split("_"))
            .extract()
            .map_err(|e| crate::error::MouseflowError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.mouseflow/mouseflow.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let cfg = MouseflowConfig::default();
        assert_eq!(cfg.pointer.move_duration_ms, 500);
        assert_eq!(cfg.pointer.frame_interval_ms, 16);
        assert_eq!(cfg.storage.autosave_interval_ms, 2_000);
        assert!(cfg.storage.data_dir.ends_with(".mouseflow/data"));
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let cfg = MouseflowConfig::load(Some("/nonexistent/mouseflow.toml")).unwrap();
        assert_eq!(cfg.pointer.click_settle_ms, 50);
        assert_eq!(cfg.pointer.click_hold_ms, 30);
    }
}
