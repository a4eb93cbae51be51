//! Content source backed by a fixed bundle, used by previews and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use walko_protocols::{ContentSource, SourceError, TooltipDefinition, TourDefinition};

use crate::url_pattern::url_matches;

/// Tours and tooltips as exported from the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBundle {
    #[serde(default)]
    pub tours: Vec<TourDefinition>,
    #[serde(default)]
    pub tooltips: Vec<TooltipDefinition>,
}

pub struct StaticContentSource {
    bundle: ContentBundle,
}

impl StaticContentSource {
    pub fn new(bundle: ContentBundle) -> Self {
        Self { bundle }
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    fn id(&self) -> &str {
        "static"
    }

    async fn fetch_tours(
        &self,
        url: &str,
        _lang: &str,
    ) -> Result<Vec<TourDefinition>, SourceError> {
        let tours: Vec<_> = self
            .bundle
            .tours
            .iter()
            .filter(|t| url_matches(&t.url_pattern, url))
            .cloned()
            .collect();
        debug!("static source: {} tours match {}", tours.len(), url);
        Ok(tours)
    }

    async fn fetch_tooltips(
        &self,
        url: &str,
        _lang: &str,
    ) -> Result<Vec<TooltipDefinition>, SourceError> {
        Ok(self
            .bundle
            .tooltips
            .iter()
            .filter(|t| url_matches(&t.url_pattern, url))
            .cloned()
            .collect())
    }
}
