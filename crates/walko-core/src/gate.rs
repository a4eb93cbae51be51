//! Frequency gate: decides whether content is eligible to show.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use walko_protocols::{Clock, ContentType, FrequencyPolicy, StorageError, ViewMetadata, ViewRecord};

use crate::history::HistoryStore;

/// Pure eligibility rule shared by every history backend.
pub fn is_eligible(policy: &FrequencyPolicy, record: &ViewRecord, now: DateTime<Utc>) -> bool {
    match policy {
        FrequencyPolicy::Once => record.view_count == 0,
        FrequencyPolicy::Always => true,
        FrequencyPolicy::Count { max } => record.view_count < *max,
        FrequencyPolicy::Days { cooldown_days } => match record.last_seen {
            None => true,
            Some(last_seen) => now - last_seen >= Duration::days(i64::from(*cooldown_days)),
        },
    }
}

/// Gate bound to a history backend and a clock.
pub struct FrequencyGate {
    history: Arc<HistoryStore>,
    clock: Arc<dyn Clock>,
}

impl FrequencyGate {
    pub fn new(history: Arc<HistoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { history, clock }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Keep the items whose policy allows showing them, preserving order.
    ///
    /// History is read in one batch per call.
    pub async fn filter_eligible<T, F>(
        &self,
        content_type: ContentType,
        items: Vec<T>,
        key: F,
    ) -> Vec<T>
    where
        F: Fn(&T) -> (&str, FrequencyPolicy),
    {
        if items.is_empty() {
            return items;
        }

        let ids: Vec<String> = items.iter().map(|item| key(item).0.to_string()).collect();
        let records = self.history.get_records(content_type, &ids).await;
        let now = self.now();

        items
            .into_iter()
            .filter(|item| {
                let (id, policy) = key(item);
                let record = records.get(id).cloned().unwrap_or_default();
                let eligible = is_eligible(&policy, &record, now);
                debug!(
                    "gate {} {} policy={} views={} eligible={}",
                    content_type,
                    id,
                    policy.kind(),
                    record.view_count,
                    eligible
                );
                eligible
            })
            .collect()
    }

    /// Record one view and report whether the item is still eligible.
    pub async fn record_view(
        &self,
        content_type: ContentType,
        id: &str,
        policy: &FrequencyPolicy,
        metadata: ViewMetadata,
    ) -> Result<bool, StorageError> {
        let now = self.now();
        let record = self
            .history
            .record_view(content_type, id, metadata, now)
            .await
            .inspect_err(|e| warn!("Failed to record {} view for {}: {}", content_type, id, e))?;
        Ok(is_eligible(policy, &record, now))
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
