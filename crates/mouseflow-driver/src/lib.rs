//! `mouseflow-driver` — the pointer capability boundary.
//!
//! The engine never touches the OS cursor directly; it goes through the
//! [`PointerDriver`] trait. Production builds plug in a platform backend,
//! tests and demos use [`mock::MockDriver`], which records every call.

pub mod error;
pub mod mock;

use async_trait::async_trait;

use mouseflow_core::types::{MouseButton, Point};

pub use error::{DriverError, Result};
pub use mock::{DriverCall, MockDriver};

/// Primitive pointer operations.
///
/// Implementations must be safe to share across tasks (`Send + Sync`) —
/// the engine holds one `Arc<dyn PointerDriver>` for its whole lifetime.
/// The cursor itself is shared global state: the engine does not serialise
/// overlapping executions, so two in-flight tasks may interleave calls.
#[async_trait]
pub trait PointerDriver: Send + Sync {
    /// Current cursor position.
    async fn position(&self) -> Result<Point>;

    /// Move the cursor to an absolute position (no animation — the engine
    /// drives animation by issuing one call per frame).
    async fn set_position(&self, point: Point) -> Result<()>;

    /// Press and hold a button.
    async fn press(&self, button: MouseButton) -> Result<()>;

    /// Release a previously pressed button.
    async fn release(&self, button: MouseButton) -> Result<()>;

    /// Apply discrete scroll units. Positive `dy` scrolls down, negative up;
    /// positive `dx` scrolls right, negative left.
    async fn scroll(&self, dx: i32, dy: i32) -> Result<()>;
}
