//! `mouseflow-core` — shared data model and configuration.
//!
//! # Overview
//!
//! Defines the [`types::Task`] record and its lifecycle states, the persisted
//! document formats, and the [`config::MouseflowConfig`] loaded from
//! `mouseflow.toml` with `MOUSEFLOW_*` env overrides.
//!
//! # Task actions
//!
//! | Action   | Behaviour                                            |
//! |----------|------------------------------------------------------|
//! | `move`   | Animated pointer move to `(x, y)`                    |
//! | `click`  | Animated move, settle, then press/release `button`   |
//! | `drag`   | Move to `(x, y)`, press left, move to target, release |
//! | `scroll` | Jump to `(x, y)`, apply vertical then horizontal deltas |

pub mod config;
pub mod error;
pub mod types;

pub use config::MouseflowConfig;
pub use error::{MouseflowError, Result};
pub use types::{
    MouseButton, Point, StatusSummary, StorageConfigDoc, Task, TaskAction, TaskDocument, TaskSpec,
    TaskStatus,
};
