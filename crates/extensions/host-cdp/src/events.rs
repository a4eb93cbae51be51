//! CDP events to [`HostEvent`]s.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use walko_protocols::HostEvent;

use crate::cdp::CdpEvent;

/// Binding the page runtime reports events through.
pub const EMIT_BINDING: &str = "__walkoEmit";

/// Translate one CDP event. Returns `None` for events the controller does not
/// care about.
pub fn parse_event(event: &CdpEvent) -> Option<HostEvent> {
    match event.method.as_str() {
        "Runtime.bindingCalled" if event.params["name"] == EMIT_BINDING => {
            let payload = event.params["payload"].as_str()?;
            match serde_json::from_str(payload) {
                Ok(host_event) => Some(host_event),
                Err(e) => {
                    warn!("Ignoring malformed page event {:?}: {}", payload, e);
                    None
                }
            }
        }
        "Page.frameNavigated" => {
            let frame = &event.params["frame"];
            if frame.get("parentId").is_some_and(|p| !p.is_null()) {
                return None;
            }
            frame["url"]
                .as_str()
                .map(|url| HostEvent::Navigated { url: url.to_string() })
        }
        "Inspector.detached" | "Target.detachedFromTarget" | "Target.targetDestroyed" => {
            Some(HostEvent::Closed)
        }
        _ => None,
    }
}

/// Forward page events to `tx` until the page goes away. `Closed` is always
/// the last event delivered.
pub fn spawn_event_pump(
    mut events: mpsc::UnboundedReceiver<CdpEvent>,
    tx: mpsc::Sender<HostEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(host_event) = parse_event(&event) else {
                continue;
            };
            let closed = host_event == HostEvent::Closed;
            if tx.send(host_event).await.is_err() || closed {
                return;
            }
        }
        debug!("CDP event stream ended");
        let _ = tx.send(HostEvent::Closed).await;
    })
}
