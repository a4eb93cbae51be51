//! `walko preview`: render into a page snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use walko_config::Config;
use walko_core::{
    ControllerOptions, FrequencyGate, HistoryStore, MemoryStorage, RenderController,
    StaticContentSource,
};
use walko_history_sqlite::SqliteStorage;
use walko_host_snapshot::{replay, EventScript, MountRecord, PageSnapshot, SnapshotHost};
use walko_protocols::{KeyValueStorage, SystemClock};

pub(crate) struct PreviewOptions {
    pub page: PathBuf,
    pub content: PathBuf,
    pub events: Option<PathBuf>,
    pub persist: bool,
    pub linger_ms: u64,
}

pub(crate) async fn run_preview(
    config: Config,
    options: PreviewOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = preview(&config, &options).await?;
    println!("{}", serde_json::to_string_pretty(&log)?);
    Ok(())
}

async fn preview(
    config: &Config,
    options: &PreviewOptions,
) -> Result<Vec<MountRecord>, Box<dyn std::error::Error>> {
    let snapshot = PageSnapshot::load(&options.page)?;
    let content = StaticContentSource::from_json(&std::fs::read_to_string(&options.content)?)?;
    let script = match &options.events {
        Some(path) => EventScript::from_json(&std::fs::read_to_string(path)?)?,
        None => EventScript::default(),
    };
    info!(
        "Previewing {} ({} scripted events)",
        snapshot.url,
        script.0.len()
    );

    let storage = open_storage(config, options.persist).await?;
    let history = Arc::new(HistoryStore::local(storage));
    let gate = Arc::new(FrequencyGate::new(history, Arc::new(SystemClock)));

    let host = Arc::new(SnapshotHost::new(snapshot));
    let controller = RenderController::new(
        host.clone(),
        Arc::new(content),
        gate,
        ControllerOptions {
            render: config.render.clone(),
            visitor: config.visitor.clone(),
        },
    );

    let (tx, rx) = mpsc::channel(32);
    let task = controller.spawn(rx);
    replay(&host, script, tx, Duration::from_millis(options.linger_ms)).await;
    task.await??;

    Ok(host.mount_log())
}

async fn open_storage(
    config: &Config,
    persist: bool,
) -> Result<Arc<dyn KeyValueStorage>, Box<dyn std::error::Error>> {
    if !persist {
        return Ok(Arc::new(MemoryStorage::new()));
    }
    let path = config.storage.resolved_path();
    info!("View history: {}", path.display());
    Ok(Arc::new(SqliteStorage::open(&path).await?))
}
