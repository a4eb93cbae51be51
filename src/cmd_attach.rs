//! `walko attach`: deliver into a live browser page.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use walko_config::Config;
use walko_core::{ControllerOptions, FrequencyGate, HistoryStore, RenderController};
use walko_host_cdp::{spawn_event_pump, CdpClient, CdpHost, CdpLocalStorage};
use walko_protocols::{HostEvent, RemoteViews, SystemClock};
use walko_public_api::PublicApiClient;

pub(crate) async fn run_attach(
    config: Config,
    endpoint: &str,
    target: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = CdpClient::connect(endpoint).await?;
    let session = Arc::new(client.attach(target).await?);
    let page_events = session
        .take_events()
        .ok_or("page session events already taken")?;

    let host = CdpHost::install(session.clone(), config.api.source.clone()).await?;
    let visitor = match host.visitor_config().await {
        Ok(Some(page)) => config.visitor.merged_with(&page),
        Ok(None) => config.visitor.clone(),
        Err(e) => {
            warn!("Ignoring unreadable window.WalkoConfig: {}", e);
            config.visitor.clone()
        }
    };

    let api = Arc::new(PublicApiClient::from_config(&config.api));
    info!("Fetching content from {}", api.base_url());
    let remote: Arc<dyn RemoteViews> = api.clone();
    let history = Arc::new(HistoryStore::for_visitor(
        &visitor,
        Arc::new(CdpLocalStorage::new(session.clone())),
        Some(remote),
    ));
    let gate = Arc::new(FrequencyGate::new(history, Arc::new(SystemClock)));

    let controller = RenderController::new(
        Arc::new(host),
        api,
        gate,
        ControllerOptions {
            render: config.render.clone(),
            visitor,
        },
    );

    let (tx, rx) = mpsc::channel(64);
    let pump = spawn_event_pump(page_events, tx.clone());
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, detaching");
            let _ = tx.send(HostEvent::Closed).await;
        }
    });

    info!("Attached to {}", session.target_id());
    let result = controller.run(rx).await;

    pump.abort();
    interrupt.abort();
    drop(client);
    result?;
    Ok(())
}
