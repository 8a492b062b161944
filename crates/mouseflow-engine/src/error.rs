use thiserror::Error;

use mouseflow_driver::DriverError;

/// Errors that can occur within the task engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No task with the given ID exists in the registry.
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// The pointer backend failed during move/click/drag/scroll.
    #[error("Pointer driver error: {0}")]
    Driver(#[from] DriverError),

    /// Reading or writing the persisted document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
