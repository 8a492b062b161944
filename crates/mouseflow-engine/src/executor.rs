//! The per-task sub-step state machine.
//!
//! A run is: optional start delay, then one pointer action. All pauses are
//! `tokio::time::sleep`, so a task mid-animation yields the runtime to
//! other timers and callers — nothing here blocks the loop.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use mouseflow_core::config::PointerConfig;
use mouseflow_core::types::{MouseButton, Point, Task, TaskAction};
use mouseflow_driver::PointerDriver;

use crate::error::Result;

/// Run one task's pointer action to completion.
///
/// Only drives the hardware — status bookkeeping stays with the caller so
/// success and failure both flow back through a single cleanup point.
pub(crate) async fn perform(
    driver: &dyn PointerDriver,
    timing: &PointerConfig,
    task: &Task,
) -> Result<()> {
    if let Some(ms) = task.delay {
        if ms > 0 {
            debug!(task_id = %task.id, delay_ms = ms, "pre-action delay");
            sleep(Duration::from_millis(ms)).await;
        }
    }

    let origin = Point {
        x: task.x,
        y: task.y,
    };

    match task.action {
        TaskAction::Move => animate_move(driver, timing, origin, timing.move_duration_ms).await,
        TaskAction::Click => click(driver, timing, origin, task.effective_button()).await,
        TaskAction::Drag => drag(driver, timing, task, origin).await,
        TaskAction::Scroll => scroll(driver, task, origin).await,
    }
}

/// Animate the cursor from wherever it is to `end` over `duration_ms`.
///
/// Samples at the configured frame interval; each intermediate position is
/// the linear interpolation rounded to the nearest pixel. The last write
/// snaps to the exact target so rounding drift cannot accumulate.
async fn animate_move(
    driver: &dyn PointerDriver,
    timing: &PointerConfig,
    end: Point,
    duration_ms: u64,
) -> Result<()> {
    let start = driver.position().await?;
    let frame = timing.frame_interval_ms.max(1);
    let steps = duration_ms.div_ceil(frame).max(1);

    for step in 1..=steps {
        let progress = step as f64 / steps as f64;
        let x = (start.x as f64 + (end.x - start.x) as f64 * progress).round() as i32;
        let y = (start.y as f64 + (end.y - start.y) as f64 * progress).round() as i32;
        driver.set_position(Point { x, y }).await?;
        if step < steps {
            sleep(Duration::from_millis(frame)).await;
        }
    }

    driver.set_position(end).await?;
    Ok(())
}

async fn click(
    driver: &dyn PointerDriver,
    timing: &PointerConfig,
    origin: Point,
    button: MouseButton,
) -> Result<()> {
    animate_move(driver, timing, origin, timing.move_duration_ms).await?;
    sleep(Duration::from_millis(timing.click_settle_ms)).await;
    driver.press(button).await?;
    sleep(Duration::from_millis(timing.click_hold_ms)).await;
    driver.release(button).await?;
    Ok(())
}

/// Drag always uses the left button; `task.button` only affects clicks.
async fn drag(
    driver: &dyn PointerDriver,
    timing: &PointerConfig,
    task: &Task,
    origin: Point,
) -> Result<()> {
    let target = match (task.target_x, task.target_y) {
        (Some(x), Some(y)) => Point { x, y },
        _ => {
            // No destination: the whole action is a no-op, not an error.
            debug!(task_id = %task.id, "drag without target, skipping");
            return Ok(());
        }
    };

    let half = (timing.move_duration_ms / 2).max(1);
    animate_move(driver, timing, origin, half).await?;
    driver.press(MouseButton::Left).await?;
    animate_move(driver, timing, target, half).await?;
    driver.release(MouseButton::Left).await?;
    Ok(())
}

/// Vertical delta first, then horizontal, zero deltas skipped.
async fn scroll(driver: &dyn PointerDriver, task: &Task, origin: Point) -> Result<()> {
    driver.set_position(origin).await?;

    let dy = task.scroll_y.unwrap_or(0);
    if dy != 0 {
        driver.scroll(0, dy).await?;
    }
    let dx = task.scroll_x.unwrap_or(0);
    if dx != 0 {
        driver.scroll(dx, 0).await?;
    }
    Ok(())
}
