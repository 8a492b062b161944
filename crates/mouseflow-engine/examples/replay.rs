//! Minimal host wiring: load config, restore the registry, run the autosave
//! loop, and replay a couple of tasks against the mock driver.
//!
//! ```sh
//! cargo run -p mouseflow-engine --example replay
//! ```

use std::sync::Arc;

use tracing::info;

use mouseflow_core::types::{now_ms, TaskAction, TaskSpec};
use mouseflow_core::MouseflowConfig;
use mouseflow_driver::{MockDriver, PointerDriver};
use mouseflow_engine::{run_autosave, MouseService, TaskStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mouseflow_engine=debug,info".into()),
        )
        .init();

    // config: explicit path > MOUSEFLOW_CONFIG env > ~/.mouseflow/mouseflow.toml
    let config_path = std::env::var("MOUSEFLOW_CONFIG").ok();
    let config = MouseflowConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({e}), using defaults");
        MouseflowConfig::default()
    });

    let driver = Arc::new(MockDriver::at(0, 0));
    let store = TaskStore::open(&config.storage);
    info!(dir = %store.storage_dir().display(), "storage ready");

    let service = MouseService::load(driver.clone() as Arc<dyn PointerDriver>, store, config);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let autosave = tokio::spawn(run_autosave(service.clone(), shutdown_rx));

    // One immediate click, one move scheduled two seconds out.
    let click = service.add_task(TaskSpec {
        action: TaskAction::Click,
        x: 200,
        y: 150,
        target_x: None,
        target_y: None,
        button: None,
        scroll_x: None,
        scroll_y: None,
        delay: None,
        scheduled_time: None,
    });
    service.run_task(&click.id).await.expect("click run failed");

    service.add_task(TaskSpec {
        action: TaskAction::Move,
        x: 640,
        y: 360,
        target_x: None,
        target_y: None,
        button: None,
        scroll_x: None,
        scroll_y: None,
        delay: None,
        scheduled_time: Some(now_ms() + 2_000),
    });

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    let status = service.get_status();
    info!(
        completed = status.completed_tasks,
        pending = status.pending_tasks,
        failed = status.failed_tasks,
        cursor = ?driver.cursor(),
        "replay finished"
    );

    let _ = shutdown_tx.send(true);
    let _ = autosave.await;
}
