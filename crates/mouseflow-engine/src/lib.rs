//! `mouseflow-engine` — task scheduling and execution.
//!
//! # Overview
//!
//! [`MouseService`] owns the authoritative task registry: a map of task id
//! to [`mouseflow_core::Task`], a map of task id to its single outstanding
//! timer, the advisory active-task marker and the dirty flag. Tasks with a
//! `scheduled_time` get a one-shot timer that fires a full execution; the
//! executor walks the per-task state machine
//! (`pending → executing → completed | failed`), driving the pointer through
//! the [`mouseflow_driver::PointerDriver`] capability.
//!
//! Persistence is a versioned JSON document ([`store::TaskStore`]) flushed
//! by the [`autosave`] loop whenever the registry is dirty. On startup the
//! service re-arms a timer for every restored `pending`/`executing` task
//! that still carries a schedule; overdue ones fire immediately rather than
//! being dropped.

pub mod autosave;
pub mod error;
mod executor;
pub mod service;
pub mod store;

pub use autosave::run_autosave;
pub use error::{EngineError, Result};
pub use service::MouseService;
pub use store::TaskStore;
