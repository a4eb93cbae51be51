//! Content source and remote view-store protocol definitions.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::types::{ContentType, TooltipDefinition, TourDefinition, ViewRecord};

/// Supplies the tours and tooltips that match a page.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Returns the source ID.
    fn id(&self) -> &str;

    /// Tours matching `url`, localized to `lang`.
    async fn fetch_tours(&self, url: &str, lang: &str) -> Result<Vec<TourDefinition>, SourceError>;

    /// Tooltips matching `url`, localized to `lang`.
    async fn fetch_tooltips(
        &self,
        url: &str,
        lang: &str,
    ) -> Result<Vec<TooltipDefinition>, SourceError>;
}

/// Per-user view history kept on the server.
#[async_trait]
pub trait RemoteViews: Send + Sync {
    /// Batched read of view records for `ids`. Ids absent from the map have no
    /// record yet.
    async fn fetch_views(
        &self,
        user_id: &str,
        content_type: ContentType,
        ids: &[String],
    ) -> Result<HashMap<String, ViewRecord>, SourceError>;

    /// Record one view.
    async fn record_view(&self, event: &ViewEvent) -> Result<(), SourceError>;
}

/// Body of `POST /api/public/views`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEvent {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub content_type: ContentType,
    pub content_id: String,
    pub metadata: ViewMetadata,
}

/// Where a view happened.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub url: String,
    pub source: String,
}

/// `GET /api/public/views` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewsResponse {
    #[serde(default)]
    pub views: HashMap<String, ViewRecord>,
}
