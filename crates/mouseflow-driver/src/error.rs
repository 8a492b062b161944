use thiserror::Error;

/// Errors surfaced by a pointer backend.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The pointer device could not be reached at all.
    #[error("Pointer device unavailable: {0}")]
    Unavailable(String),

    /// A single operation failed (move, press, release, scroll).
    #[error("Pointer operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;
