//! Scripted host events for previews.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use walko_protocols::HostEvent;

use crate::error::SnapshotError;
use crate::host::SnapshotHost;

/// A host event delivered `at_ms` after replay starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedEvent {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

/// Ordered list of scripted events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventScript(pub Vec<ScriptedEvent>);

impl EventScript {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut script: EventScript = serde_json::from_str(json)?;
        script.0.sort_by_key(|e| e.at_ms);
        Ok(script)
    }

    /// Time of the last event.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.0.last().map(|e| e.at_ms).unwrap_or(0))
    }
}

/// Feed `script` to the controller, then wait `linger` and send `Closed`
/// unless the script already closed the page.
pub async fn replay(
    host: &SnapshotHost,
    script: EventScript,
    events: mpsc::Sender<HostEvent>,
    linger: Duration,
) {
    let start = Instant::now();

    for scripted in script.0 {
        tokio::time::sleep_until(start + Duration::from_millis(scripted.at_ms)).await;
        debug!("replaying {:?} at {}ms", scripted.event, scripted.at_ms);
        host.observe(&scripted.event);
        let closed = scripted.event == HostEvent::Closed;
        if events.send(scripted.event).await.is_err() {
            warn!("Controller stopped before the script finished");
            return;
        }
        if closed {
            return;
        }
    }

    tokio::time::sleep(linger).await;
    let _ = events.send(HostEvent::Closed).await;
}
