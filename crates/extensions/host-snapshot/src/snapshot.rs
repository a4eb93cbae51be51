//! Recorded page snapshot format.

use std::path::Path;

use serde::{Deserialize, Serialize};
use walko_protocols::{ElementRect, Viewport};

use crate::error::SnapshotError;

/// A page as captured by the dashboard: URL, viewport, and the bounding box of
/// every element content may anchor to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub elements: Vec<SnapshotElement>,
}

/// One recorded element, keyed by the selector it was captured under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotElement {
    pub selector: String,
    pub rect: ElementRect,
    /// Element is absent until this many milliseconds after the host starts.
    #[serde(default)]
    pub appears_after_ms: u64,
    /// Element leaves the document this many milliseconds after the host starts.
    #[serde(default)]
    pub removed_after_ms: Option<u64>,
}

impl SnapshotElement {
    pub fn is_attached(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.appears_after_ms
            && self.removed_after_ms.is_none_or(|removed| elapsed_ms < removed)
    }
}

impl PageSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        if snapshot.url.trim().is_empty() {
            return Err(SnapshotError::Invalid("url must not be empty".to_string()));
        }
        Ok(snapshot)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
