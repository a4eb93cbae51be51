//! Per-user history served by the remote view API.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};
use walko_config::VisitorConfig;
use walko_protocols::{ContentType, RemoteViews, ViewEvent, ViewMetadata, ViewRecord};

/// Identity attached to every remote read and write.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteIdentity {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

impl RemoteIdentity {
    pub fn from_visitor(visitor: &VisitorConfig) -> Option<Self> {
        visitor.identity().map(|user_id| Self {
            user_id: user_id.to_string(),
            user_email: visitor.user_email.clone(),
            user_name: visitor.user_name.clone(),
        })
    }
}

/// Remote history with an optimistic local overlay.
///
/// Writes are fire-and-forget, so the overlay keeps this page's own views
/// visible to later reads even before (or without) the server seeing them.
pub struct RemoteHistory {
    api: Arc<dyn RemoteViews>,
    identity: RemoteIdentity,
    overlay: Mutex<HashMap<(ContentType, String), ViewRecord>>,
}

impl RemoteHistory {
    pub fn new(api: Arc<dyn RemoteViews>, identity: RemoteIdentity) -> Self {
        Self {
            api,
            identity,
            overlay: Mutex::new(HashMap::new()),
        }
    }

    pub fn identity(&self) -> &RemoteIdentity {
        &self.identity
    }

    pub async fn get_records(
        &self,
        content_type: ContentType,
        ids: &[String],
    ) -> HashMap<String, ViewRecord> {
        if ids.is_empty() {
            return HashMap::new();
        }

        let mut records = match self
            .api
            .fetch_views(&self.identity.user_id, content_type, ids)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "View history read failed, treating {} records as unseen: {}",
                    content_type, e
                );
                HashMap::new()
            }
        };

        {
            let overlay = self.overlay.lock();
            for id in ids {
                if let Some(local) = overlay.get(&(content_type, id.clone())) {
                    let merged = records
                        .get(id)
                        .map(|server| server.merge(local))
                        .unwrap_or(*local);
                    records.insert(id.clone(), merged);
                }
            }
        }
        records.retain(|id, _| ids.contains(id));
        records
    }

    pub async fn record_view(
        &self,
        content_type: ContentType,
        id: &str,
        metadata: ViewMetadata,
        now: DateTime<Utc>,
    ) -> ViewRecord {
        let ids = [id.to_string()];
        let current = self
            .get_records(content_type, &ids)
            .await
            .remove(id)
            .unwrap_or_default();
        let next = current.incremented(now);
        self.overlay
            .lock()
            .insert((content_type, id.to_string()), next);

        let event = ViewEvent {
            user_id: self.identity.user_id.clone(),
            user_email: self.identity.user_email.clone(),
            user_name: self.identity.user_name.clone(),
            content_type,
            content_id: id.to_string(),
            metadata,
        };
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            match api.record_view(&event).await {
                Ok(()) => debug!("Recorded {} view {}", event.content_type, event.content_id),
                Err(e) => warn!(
                    "Dropped {} view {} for user {}: {}",
                    event.content_type, event.content_id, event.user_id, e
                ),
            }
        });

        next
    }

    pub fn reset(&self, content_type: ContentType, id: &str) {
        self.overlay.lock().remove(&(content_type, id.to_string()));
    }
}
