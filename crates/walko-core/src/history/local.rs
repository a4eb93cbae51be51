//! Device-local history over a key/value store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use walko_protocols::{ContentType, KeyValueStorage, StorageError, ViewRecord};

pub struct LocalHistory {
    storage: Arc<dyn KeyValueStorage>,
}

impl LocalHistory {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    async fn read(&self, key: &str) -> Result<Option<ViewRecord>, StorageError> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    pub async fn get_records(
        &self,
        content_type: ContentType,
        ids: &[String],
    ) -> HashMap<String, ViewRecord> {
        let mut records = HashMap::with_capacity(ids.len());
        for id in ids {
            let key = content_type.storage_key(id);
            match self.read(&key).await {
                Ok(Some(record)) => {
                    records.insert(id.clone(), record);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable view record: {}", e),
            }
        }
        records
    }

    pub async fn record_view(
        &self,
        content_type: ContentType,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<ViewRecord, StorageError> {
        let key = content_type.storage_key(id);
        let current = match self.read(&key).await {
            Ok(record) => record.unwrap_or_default(),
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!("Overwriting unreadable view record: {}", e);
                ViewRecord::default()
            }
            Err(e) => return Err(e),
        };

        let next = current.incremented(now);
        let encoded = serde_json::to_string(&next).map_err(|e| StorageError::Corrupt {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.storage.set(&key, encoded).await?;
        Ok(next)
    }

    pub async fn reset(&self, content_type: ContentType, id: &str) -> Result<(), StorageError> {
        self.storage.remove(&content_type.storage_key(id)).await
    }
}
