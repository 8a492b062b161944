//! In-memory pointer backend for tests and demos.

use std::sync::Mutex;

use async_trait::async_trait;

use mouseflow_core::types::{MouseButton, Point};

use crate::error::{DriverError, Result};
use crate::PointerDriver;

/// One recorded driver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    SetPosition(Point),
    Press(MouseButton),
    Release(MouseButton),
    Scroll { dx: i32, dy: i32 },
}

#[derive(Debug, Default)]
struct MockState {
    position: Point,
    calls: Vec<DriverCall>,
    /// When set, every mutating call fails with this message.
    fail_with: Option<String>,
}

/// Records every call and tracks the simulated cursor position.
///
/// `position()` reports wherever the last `set_position` left the cursor,
/// so tests can assert the exact final pixel after an animated move.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the simulated cursor at a specific position.
    pub fn at(x: i32, y: i32) -> Self {
        let driver = Self::default();
        driver.state.lock().expect("mock state poisoned").position = Point { x, y };
        driver
    }

    /// Make every subsequent mutating call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.state.lock().expect("mock state poisoned").fail_with = Some(message.to_string());
    }

    /// Stop injected failures.
    pub fn heal(&self) {
        self.state.lock().expect("mock state poisoned").fail_with = None;
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().expect("mock state poisoned").calls.clone()
    }

    /// Number of press/release pairs recorded.
    pub fn press_count(&self) -> usize {
        self.state
            .lock()
            .expect("mock state poisoned")
            .calls
            .iter()
            .filter(|c| matches!(c, DriverCall::Press(_)))
            .count()
    }

    /// The simulated cursor position right now.
    pub fn cursor(&self) -> Point {
        self.state.lock().expect("mock state poisoned").position
    }

    fn record(&self, call: DriverCall) -> Result<()> {
        let mut state = self.state.lock().expect("mock state poisoned");
        if let Some(msg) = &state.fail_with {
            return Err(DriverError::Operation(msg.clone()));
        }
        if let DriverCall::SetPosition(p) = call {
            state.position = p;
        }
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl PointerDriver for MockDriver {
    async fn position(&self) -> Result<Point> {
        Ok(self.state.lock().expect("mock state poisoned").position)
    }

    async fn set_position(&self, point: Point) -> Result<()> {
        self.record(DriverCall::SetPosition(point))
    }

    async fn press(&self, button: MouseButton) -> Result<()> {
        self.record(DriverCall::Press(button))
    }

    async fn release(&self, button: MouseButton) -> Result<()> {
        self.record(DriverCall::Release(button))
    }

    async fn scroll(&self, dx: i32, dy: i32) -> Result<()> {
        self.record(DriverCall::Scroll { dx, dy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let driver = MockDriver::new();
        driver.set_position(Point { x: 5, y: 6 }).await.unwrap();
        driver.press(MouseButton::Left).await.unwrap();
        driver.release(MouseButton::Left).await.unwrap();
        driver.scroll(0, 3).await.unwrap();

        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::SetPosition(Point { x: 5, y: 6 }),
                DriverCall::Press(MouseButton::Left),
                DriverCall::Release(MouseButton::Left),
                DriverCall::Scroll { dx: 0, dy: 3 },
            ]
        );
        assert_eq!(driver.cursor(), Point { x: 5, y: 6 });
    }

    #[tokio::test]
    async fn injected_failure_propagates_and_heals() {
        let driver = MockDriver::new();
        driver.fail_with("device gone");

        let err = driver.set_position(Point { x: 1, y: 1 }).await.unwrap_err();
        assert!(err.to_string().contains("device gone"));
        assert!(driver.calls().is_empty());

        driver.heal();
        driver.set_position(Point { x: 1, y: 1 }).await.unwrap();
        assert_eq!(driver.calls().len(), 1);
    }

    #[tokio::test]
    async fn position_reflects_last_set() {
        let driver = MockDriver::at(100, 200);
        assert_eq!(driver.position().await.unwrap(), Point { x: 100, y: 200 });
        driver.set_position(Point { x: -3, y: 7 }).await.unwrap();
        assert_eq!(driver.position().await.unwrap(), Point { x: -3, y: 7 });
    }
}
