//! Periodic dirty-flag flush to the persistence store.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::service::MouseService;

/// Flush loop: every autosave interval, write the registry to disk if (and
/// only if) it changed since the last flush. This bounds write frequency
/// independent of mutation frequency — a burst of add/delete/status changes
/// lands in a single write.
///
/// Runs until `shutdown` broadcasts `true`; a final flush happens on the
/// way out so a clean shutdown never loses state. Write failures are
/// handled inside [`MouseService::flush_if_dirty`] (logged, retried next
/// tick).
pub async fn run_autosave(service: MouseService, mut shutdown: watch::Receiver<bool>) {
    let period = Duration::from_millis(service.config().storage.autosave_interval_ms.max(1));
    info!(interval_ms = period.as_millis() as u64, "autosave loop started");

    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if service.flush_if_dirty() {
                    debug!("autosave flushed");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    service.flush_if_dirty();
                    info!("autosave loop shutting down");
                    break;
                }
            }
        }
    }
}
