//! View history: one store per visitor, backed either by device-local
//! key/value storage or by the remote per-user view API.

mod local;
mod memory;
mod remote;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use walko_config::VisitorConfig;
use walko_protocols::{
    ContentType, KeyValueStorage, RemoteViews, StorageError, ViewMetadata, ViewRecord,
};

pub use local::LocalHistory;
pub use memory::MemoryStorage;
pub use remote::{RemoteHistory, RemoteIdentity};

/// The two interchangeable history backends.
pub enum HistoryStore {
    Local(LocalHistory),
    Remote(RemoteHistory),
}

impl HistoryStore {
    pub fn local(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::Local(LocalHistory::new(storage))
    }

    pub fn remote(api: Arc<dyn RemoteViews>, identity: RemoteIdentity) -> Self {
        Self::Remote(RemoteHistory::new(api, identity))
    }

    /// Remote when the visitor carries a user id and a view API is
    /// available, otherwise local. Never a mix of both.
    pub fn for_visitor(
        visitor: &VisitorConfig,
        local: Arc<dyn KeyValueStorage>,
        remote: Option<Arc<dyn RemoteViews>>,
    ) -> Self {
        match (RemoteIdentity::from_visitor(visitor), remote) {
            (Some(identity), Some(api)) => {
                info!("Using remote view history for user {}", identity.user_id);
                Self::remote(api, identity)
            }
            _ => {
                info!("Using local view history ({})", local.id());
                Self::local(local)
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }

    /// Records for `ids`; absent ids are simply missing from the map.
    pub async fn get_records(
        &self,
        content_type: ContentType,
        ids: &[String],
    ) -> HashMap<String, ViewRecord> {
        match self {
            Self::Local(local) => local.get_records(content_type, ids).await,
            Self::Remote(remote) => remote.get_records(content_type, ids).await,
        }
    }

    /// One record, or the zero record when absent.
    pub async fn get_record(&self, content_type: ContentType, id: &str) -> ViewRecord {
        let ids = [id.to_string()];
        self.get_records(content_type, &ids)
            .await
            .remove(id)
            .unwrap_or_default()
    }

    /// Increment the view count and stamp `last_seen = now`.
    pub async fn record_view(
        &self,
        content_type: ContentType,
        id: &str,
        metadata: ViewMetadata,
        now: DateTime<Utc>,
    ) -> Result<ViewRecord, StorageError> {
        match self {
            Self::Local(local) => local.record_view(content_type, id, now).await,
            Self::Remote(remote) => Ok(remote.record_view(content_type, id, metadata, now).await),
        }
    }

    /// Forget a record on this device.
    pub async fn reset(&self, content_type: ContentType, id: &str) -> Result<(), StorageError> {
        match self {
            Self::Local(local) => local.reset(content_type, id).await,
            Self::Remote(remote) => {
                remote.reset(content_type, id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
