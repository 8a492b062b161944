//! The owned task registry and timer scheduler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use mouseflow_core::config::MouseflowConfig;
use mouseflow_core::types::{now_ms, Point, StatusSummary, Task, TaskSpec, TaskStatus};
use mouseflow_driver::PointerDriver;

use crate::error::{EngineError, Result};
use crate::executor;
use crate::store::TaskStore;

#[derive(Default)]
struct ServiceState {
    tasks: HashMap<String, Task>,
    /// One outstanding timer per task id, kept consistent with `tasks`:
    /// arm and cancel always mutate both maps inside the same operation.
    timers: HashMap<String, JoinHandle<()>>,
    /// Advisory marker only — overlapping executions are not serialised.
    active_task: Option<String>,
    /// Set on every mutation; cleared by the autosave flush.
    dirty: bool,
}

/// The single service instance owning all task state.
///
/// Cheaply cloneable (`Arc` inner); every clone shares the same registry,
/// timer table and dirty flag. No other component mutates task fields —
/// the scheduler only touches the timer table, and the executor reports
/// outcomes back through [`MouseService::execute_task`].
///
/// Overlapping executions (a timer firing while a manual run is in flight)
/// are deliberately *not* serialised; the pointer is shared global state and
/// `active_task` is advisory, matching the observed desktop behaviour.
#[derive(Clone)]
pub struct MouseService {
    inner: Arc<Mutex<ServiceState>>,
    driver: Arc<dyn PointerDriver>,
    store: Arc<TaskStore>,
    config: Arc<MouseflowConfig>,
}

impl MouseService {
    /// Create an empty service (no persisted state touched).
    pub fn new(driver: Arc<dyn PointerDriver>, store: TaskStore, config: MouseflowConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServiceState::default())),
            driver,
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Create a service from the persisted document and reconcile timers.
    ///
    /// Every restored `pending` or `executing` task that still carries a
    /// `scheduled_time` gets a fresh timer at its *original* absolute time;
    /// an overdue time fires with zero delay, so tasks missed while the
    /// process was down run immediately rather than being dropped. An
    /// `executing` task without a schedule stays `executing` and waits for
    /// an explicit re-run.
    ///
    /// Must be called from within a Tokio runtime (timers are spawned).
    pub fn load(
        driver: Arc<dyn PointerDriver>,
        store: TaskStore,
        config: MouseflowConfig,
    ) -> Self {
        let service = Self::new(driver, store, config);

        let restored = service.store.load_tasks();
        let mut to_arm = Vec::new();
        {
            let mut state = service.lock();
            for task in restored {
                if let Some(at) = task.scheduled_time {
                    if matches!(task.status, TaskStatus::Pending | TaskStatus::Executing) {
                        to_arm.push((task.id.clone(), at));
                    }
                }
                state.tasks.insert(task.id.clone(), task);
            }
            info!(
                count = state.tasks.len(),
                rearmed = to_arm.len(),
                "registry restored"
            );
        }

        for (id, at) in to_arm {
            service.schedule_task(&id, at);
        }
        service
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &MouseflowConfig {
        &self.config
    }

    /// The persistence store backing this service.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    // --- registry operations -------------------------------------------

    /// Register a new task. Returns the fully populated record.
    ///
    /// Ids are UUID v4, so tasks created within the same millisecond never
    /// collide. When the spec carries a `scheduled_time` a timer is armed
    /// immediately.
    pub fn add_task(&self, spec: TaskSpec) -> Task {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            action: spec.action,
            x: spec.x,
            y: spec.y,
            target_x: spec.target_x,
            target_y: spec.target_y,
            button: spec.button,
            scroll_x: spec.scroll_x,
            scroll_y: spec.scroll_y,
            delay: spec.delay,
            scheduled_time: spec.scheduled_time,
            created_at: now_ms(),
            status: TaskStatus::Pending,
            error: None,
        };

        {
            let mut state = self.lock();
            state.tasks.insert(task.id.clone(), task.clone());
            state.dirty = true;
        }
        info!(task_id = %task.id, action = ?task.action, "task added");

        if let Some(at) = task.scheduled_time {
            self.schedule_task(&task.id, at);
        }
        task
    }

    /// All tasks, ordered by creation time (then id) for stable display.
    pub fn get_tasks(&self) -> Vec<Task> {
        let state = self.lock();
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        tasks
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.lock().tasks.get(id).cloned()
    }

    /// Remove a task, cancelling its outstanding timer first.
    ///
    /// Returns whether a task was actually removed. Does not abort an
    /// execution that has already begun — once the timer has fired the run
    /// goes to completion and its outcome is discarded.
    pub fn delete_task(&self, id: &str) -> bool {
        let removed = {
            let mut state = self.lock();
            if let Some(timer) = state.timers.remove(id) {
                timer.abort();
            }
            let removed = state.tasks.remove(id).is_some();
            if removed {
                state.dirty = true;
            }
            removed
        };
        if removed {
            info!(task_id = %id, "task deleted");
        }
        removed
    }

    /// Drop every task and cancel every timer.
    pub fn clear_all_tasks(&self) {
        let mut state = self.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        let count = state.tasks.len();
        state.tasks.clear();
        state.active_task = None;
        state.dirty = true;
        drop(state);
        info!(count, "all tasks cleared");
    }

    /// Derived status counters, computed by scanning current tasks.
    pub fn get_status(&self) -> StatusSummary {
        let state = self.lock();
        let mut summary = StatusSummary {
            active_task: state.active_task.clone(),
            pending_tasks: 0,
            completed_tasks: 0,
            failed_tasks: 0,
        };
        for task in state.tasks.values() {
            match task.status {
                TaskStatus::Pending => summary.pending_tasks += 1,
                TaskStatus::Completed => summary.completed_tasks += 1,
                TaskStatus::Failed => summary.failed_tasks += 1,
                TaskStatus::Executing => {}
            }
        }
        summary
    }

    /// Live cursor position, straight from the driver.
    pub async fn current_position(&self) -> Result<Point> {
        Ok(self.driver.position().await?)
    }

    // --- scheduler -------------------------------------------------------

    /// Arm (or re-arm) the one-shot timer for `id` at an absolute epoch-ms
    /// time. A past time fires with zero delay. Re-arming cancels the
    /// previous timer, so a task never has two outstanding timers; an id
    /// with no registered task arms nothing.
    ///
    /// The fired path removes its own timer entry *before* executing, so a
    /// stale handle can neither double-fire nor abort the run; failures are
    /// caught at this boundary and only logged — one failing task must not
    /// stop other timers from firing. The spawn and the handle insertion
    /// happen under the same lock, so the fired path cannot observe the
    /// timer table before its own entry is in place.
    pub fn schedule_task(&self, id: &str, scheduled_time: i64) {
        let wait = Duration::from_millis(scheduled_time.saturating_sub(now_ms()).max(0) as u64);

        let mut state = self.lock();
        if !state.tasks.contains_key(id) {
            warn!(task_id = %id, "schedule requested for unknown task");
            return;
        }

        let service = self.clone();
        let task_id = id.to_string();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            service.lock().timers.remove(&task_id);
            if let Err(e) = service.execute_task(&task_id).await {
                error!(task_id = %task_id, "scheduled execution failed: {e}");
            }
        });

        if let Some(previous) = state.timers.insert(id.to_string(), timer) {
            previous.abort();
            info!(task_id = %id, "timer re-armed");
        }
    }

    /// Number of currently outstanding timers (armed, not yet fired).
    pub fn outstanding_timers(&self) -> usize {
        self.lock().timers.len()
    }

    // --- execution -------------------------------------------------------

    /// Execute a task immediately, bypassing the scheduler.
    pub async fn run_task(&self, id: &str) -> Result<()> {
        self.execute_task(id).await
    }

    /// Run the task state machine: `pending → executing → completed|failed`.
    ///
    /// The active-task marker is cleared on *every* exit path, and a driver
    /// failure is recorded on the task before being re-surfaced to the
    /// caller. There is no cancellation point: once entered, the run goes
    /// to completion regardless of delete/clear requests for the same id.
    pub async fn execute_task(&self, id: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.lock();
            let task = state
                .tasks
                .get_mut(id)
                .ok_or_else(|| EngineError::TaskNotFound { id: id.to_string() })?;
            task.status = TaskStatus::Executing;
            task.error = None;
            let snapshot = task.clone();
            state.active_task = Some(id.to_string());
            state.dirty = true;
            snapshot
        };
        info!(task_id = %id, action = ?snapshot.action, "executing task");

        let result = executor::perform(self.driver.as_ref(), &self.config.pointer, &snapshot).await;

        {
            let mut state = self.lock();
            // The task may have been deleted mid-run; the outcome is then
            // dropped, but the marker is still cleared.
            if let Some(task) = state.tasks.get_mut(id) {
                match &result {
                    Ok(()) => {
                        task.status = TaskStatus::Completed;
                        task.error = None;
                    }
                    Err(e) => {
                        task.status = TaskStatus::Failed;
                        task.error = Some(e.to_string());
                    }
                }
                state.dirty = true;
            }
            if state.active_task.as_deref() == Some(id) {
                state.active_task = None;
            }
        }

        match &result {
            Ok(()) => info!(task_id = %id, "task completed"),
            Err(e) => warn!(task_id = %id, "task failed: {e}"),
        }
        result
    }

    // --- persistence -----------------------------------------------------

    /// Flush the registry to the store when dirty. Returns whether a write
    /// happened. A failed write re-marks the state dirty so the next
    /// autosave tick retries.
    pub fn flush_if_dirty(&self) -> bool {
        let snapshot = {
            let mut state = self.lock();
            if !state.dirty {
                return false;
            }
            state.dirty = false;
            state.tasks.values().cloned().collect::<Vec<_>>()
        };

        match self.store.save_tasks(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                error!("task flush failed, will retry: {e}");
                self.lock().dirty = true;
                false
            }
        }
    }

    /// Whether unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.inner.lock().expect("service state poisoned")
    }
}
