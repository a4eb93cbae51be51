//! The attached page's `localStorage` as [`KeyValueStorage`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use walko_protocols::{KeyValueStorage, StorageError};

use crate::cdp::PageSession;

pub struct CdpLocalStorage {
    session: Arc<PageSession>,
}

impl CdpLocalStorage {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    async fn run(&self, expression: String) -> Result<serde_json::Value, StorageError> {
        self.session
            .evaluate(&expression)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

pub(crate) fn get_expression(key: &str) -> String {
    format!("window.localStorage.getItem({})", json!(key))
}

pub(crate) fn set_expression(key: &str, value: &str) -> String {
    format!("window.localStorage.setItem({}, {})", json!(key), json!(value))
}

pub(crate) fn remove_expression(key: &str) -> String {
    format!("window.localStorage.removeItem({})", json!(key))
}

#[async_trait]
impl KeyValueStorage for CdpLocalStorage {
    fn id(&self) -> &str {
        "localStorage"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.run(get_expression(key)).await?;
        Ok(value.as_str().map(|s| s.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.run(set_expression(key, &value)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.run(remove_expression(key)).await?;
        Ok(())
    }
}
