//! Public API client implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use walko_config::ApiConfig;
use walko_protocols::{
    ContentSource, ContentType, RemoteViews, SourceError, TooltipDefinition, TooltipsResponse,
    TourDefinition, ToursResponse, ViewEvent, ViewRecord, ViewsResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://app.walko.io";

/// Client for `/api/public/*`.
pub struct PublicApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl PublicApiClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_url(DEFAULT_BASE_URL.to_string(), token)
    }

    /// Create a client against a custom deployment.
    pub fn with_url(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::with_url(api.base_url.clone(), api.token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/api/public/{}", self.base_url, resource)
    }

    fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(resource));
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SourceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status,
                message: text,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SourceError> {
        let response = self.send(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PublicApiClient {
    fn id(&self) -> &str {
        "public-api"
    }

    async fn fetch_tours(&self, url: &str, lang: &str) -> Result<Vec<TourDefinition>, SourceError> {
        let builder = self
            .request(Method::GET, "tours")
            .query(&[("url", url), ("lang", lang)]);
        let response: ToursResponse = self.get_json(builder).await?;
        debug!("fetched {} tours for {}", response.tours.len(), url);
        Ok(response.tours)
    }

    async fn fetch_tooltips(
        &self,
        url: &str,
        lang: &str,
    ) -> Result<Vec<TooltipDefinition>, SourceError> {
        let builder = self
            .request(Method::GET, "tooltips")
            .query(&[("url", url), ("lang", lang)]);
        let response: TooltipsResponse = self.get_json(builder).await?;
        debug!("fetched {} tooltips for {}", response.tooltips.len(), url);
        Ok(response.tooltips)
    }
}

#[async_trait]
impl RemoteViews for PublicApiClient {
    async fn fetch_views(
        &self,
        user_id: &str,
        content_type: ContentType,
        ids: &[String],
    ) -> Result<HashMap<String, ViewRecord>, SourceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = ids.join(",");
        let builder = self
            .request(Method::GET, "views")
            .header("X-User-Id", user_id)
            .query(&[("type", content_type.as_str()), ("ids", ids.as_str())]);
        let response: ViewsResponse = self.get_json(builder).await?;
        Ok(response.views)
    }

    async fn record_view(&self, event: &ViewEvent) -> Result<(), SourceError> {
        let builder = self
            .request(Method::POST, "views")
            .header("X-User-Id", event.user_id.as_str())
            .json(event);
        self.send(builder).await?;
        debug!(
            "recorded {} view of {} for {}",
            event.content_type, event.content_id, event.user_id
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
