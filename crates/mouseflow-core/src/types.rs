use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// All task timestamps (`created_at`, `scheduled_time`, document
/// `timestamp`) use this representation.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A position in screen space (integer pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// The pointer action a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    /// Animated move to `(x, y)`.
    Move,
    /// Animated move to `(x, y)` followed by a button press/release.
    Click,
    /// Press at `(x, y)`, move to `(target_x, target_y)`, release.
    Drag,
    /// Jump to `(x, y)` and apply scroll deltas.
    Scroll,
}

/// Pointer button for `click` tasks (`drag` always uses the left button).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Lifecycle state of a task execution slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting for a timer to fire or an explicit run.
    Pending,
    /// Currently inside the execution state machine.
    Executing,
    /// Last run finished successfully.
    Completed,
    /// Last run failed; the task carries an `error` message.
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Executing => "executing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "executing" => Ok(TaskStatus::Executing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// A single pointer-automation task.
///
/// Field names serialise in camelCase so documents written by earlier
/// releases of the desktop app load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// UUID v4 string — unique across the registry, immutable.
    pub id: String,
    /// What this task does. Immutable after creation.
    pub action: TaskAction,
    /// Origin X coordinate (screen pixels).
    pub x: i32,
    /// Origin Y coordinate (screen pixels).
    pub y: i32,
    /// Drag destination X. Meaningful only for `drag`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_x: Option<i32>,
    /// Drag destination Y. Meaningful only for `drag`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_y: Option<i32>,
    /// Button for `click`. Absent means left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
    /// Signed horizontal scroll delta (positive = rightward).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_x: Option<i32>,
    /// Signed vertical scroll delta (positive = downward).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<i32>,
    /// Milliseconds to wait after execution starts, before any pointer action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    /// Absolute execution time (epoch ms). Absent means run only on request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<i64>,
    /// Creation timestamp (epoch ms). Immutable.
    pub created_at: i64,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Human-readable failure cause. Set only when `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// The button a `click` uses — the task's `button` field, or left.
    pub fn effective_button(&self) -> MouseButton {
        self.button.unwrap_or_default()
    }
}

/// Caller-supplied task definition: everything except the fields the
/// registry populates (`id`, `created_at`, `status`, `error`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub action: TaskAction,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<i64>,
}

/// Derived status counters reported to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    /// Id of the task currently inside the execution engine, if any.
    pub active_task: Option<String>,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
}

/// The persisted task-list document — one atomic whole-file snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDocument {
    /// Document format version (currently `"1.0"`).
    pub version: String,
    /// Epoch-ms timestamp of the save.
    pub timestamp: i64,
    pub tasks: Vec<Task>,
}

/// The small side document recording a custom storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfigDoc {
    pub storage_dir: String,
}
