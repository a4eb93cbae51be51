//! [`DomHost`] backed by a live page.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use walko_config::VisitorConfig;
use walko_protocols::{
    DomHost, ElementHandle, ElementRect, HostError, Layer, MountSpec, NodeId, Viewport,
};

use crate::cdp::{CdpError, PageSession};
use crate::events::EMIT_BINDING;

/// Script installed into every document of the attached page.
pub const PAGE_RUNTIME: &str = include_str!("page_runtime.js");

pub struct CdpHost {
    session: Arc<PageSession>,
    surface: String,
}

impl CdpHost {
    /// Install the page runtime into the current and all future documents.
    pub async fn install(
        session: Arc<PageSession>,
        surface: impl Into<String>,
    ) -> Result<Self, CdpError> {
        session
            .call("Runtime.addBinding", Some(json!({ "name": EMIT_BINDING })))
            .await?;
        session
            .call(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(json!({ "source": PAGE_RUNTIME })),
            )
            .await?;
        session.evaluate(PAGE_RUNTIME).await?;

        info!("Page runtime installed on target {}", session.target_id());
        Ok(Self {
            session,
            surface: surface.into(),
        })
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    /// The page-injected `window.WalkoConfig` object, if the site set one.
    pub async fn visitor_config(&self) -> Result<Option<VisitorConfig>, CdpError> {
        let raw = self
            .session
            .evaluate("JSON.stringify(window.WalkoConfig ?? null)")
            .await?;
        let Some(raw) = raw.as_str() else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(raw)?;
        if value.is_null() {
            return Ok(None);
        }
        VisitorConfig::from_page_json(value)
            .map(Some)
            .map_err(|e| CdpError::InvalidResponse(e.to_string()))
    }

    async fn invoke(&self, function: &str, args: &[Value]) -> Result<Value, HostError> {
        let expression = call_expression(function, args);
        debug!("page runtime: {}", function);
        Ok(self.session.evaluate(&expression).await?)
    }
}

/// `window.__walko.<function>(<args as JSON>)`.
pub(crate) fn call_expression(function: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("window.__walko.{}({})", function, args.join(", "))
}

pub(crate) fn decode_query(value: &Value) -> Result<Option<ElementHandle>, HostError> {
    if value["invalid"].as_bool() == Some(true) {
        return Err(HostError::InvalidSelector(String::new()));
    }
    Ok(value["handle"].as_str().map(|h| ElementHandle(h.to_string())))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, HostError> {
    serde_json::from_value(value).map_err(|e| HostError::Other(format!("bad {}: {}", what, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, HostError> {
    serde_json::to_value(value).map_err(|e| HostError::Other(e.to_string()))
}

#[async_trait]
impl DomHost for CdpHost {
    fn surface(&self) -> &str {
        &self.surface
    }

    async fn current_url(&self) -> Result<String, HostError> {
        let value = self.session.evaluate("location.href").await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| HostError::Other("location.href is not a string".to_string()))
    }

    async fn viewport(&self) -> Result<Viewport, HostError> {
        decode(self.invoke("viewport", &[]).await?, "viewport")
    }

    async fn browser_language(&self) -> Result<Option<String>, HostError> {
        let value = self.invoke("language", &[]).await?;
        Ok(value.as_str().map(|s| s.to_string()))
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, HostError> {
        let value = self.invoke("query", &[json!(selector)]).await?;
        decode_query(&value).map_err(|e| match e {
            HostError::InvalidSelector(_) => HostError::InvalidSelector(selector.to_string()),
            other => other,
        })
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<ElementRect>, HostError> {
        let value = self.invoke("rect", &[json!(element.0)]).await?;
        if value.is_null() {
            return Ok(None);
        }
        decode(value, "rect").map(Some)
    }

    async fn attach_root(&self, layer: Layer) -> Result<(), HostError> {
        self.invoke("attachRoot", &[to_json(&layer)?]).await?;
        Ok(())
    }

    async fn mount(&self, layer: Layer, node: NodeId, spec: &MountSpec) -> Result<(), HostError> {
        self.invoke("mount", &[to_json(&layer)?, json!(node.0), to_json(spec)?])
            .await?;
        Ok(())
    }

    async fn update(&self, node: NodeId, spec: &MountSpec) -> Result<(), HostError> {
        let updated = self.invoke("update", &[json!(node.0), to_json(spec)?]).await?;
        if updated.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(HostError::UnknownNode(node.0))
        }
    }

    async fn unmount(&self, node: NodeId) -> Result<(), HostError> {
        self.invoke("unmount", &[json!(node.0)]).await?;
        Ok(())
    }

    async fn clear_layer(&self, layer: Layer) -> Result<(), HostError> {
        self.invoke("clearLayer", &[to_json(&layer)?]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_expression_escapes_arguments() {
        let expr = call_expression("query", &[json!("a[title=\"x\"]")]);
        assert_eq!(expr, r#"window.__walko.query("a[title=\"x\"]")"#);
        assert_eq!(call_expression("viewport", &[]), "window.__walko.viewport()");
    }

    #[test]
    fn test_call_expression_with_layer_and_node() {
        let layer = serde_json::to_value(Layer::Tooltips).unwrap();
        let expr = call_expression("mount", &[layer, json!(7), json!({"type": "beacon"})]);
        assert_eq!(expr, r#"window.__walko.mount("tooltips", 7, {"type":"beacon"})"#);
    }

    #[test]
    fn test_decode_query() {
        let found = decode_query(&json!({"handle": "el-3"})).unwrap();
        assert_eq!(found, Some(ElementHandle("el-3".into())));
        assert!(decode_query(&json!({"handle": null})).unwrap().is_none());
        assert!(matches!(
            decode_query(&json!({"invalid": true})),
            Err(HostError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_runtime_exposes_host_api() {
        for name in ["query", "rect", "mount", "update", "unmount", "clearLayer", "viewport"] {
            assert!(PAGE_RUNTIME.contains(name), "{}", name);
        }
        assert!(PAGE_RUNTIME.contains(EMIT_BINDING));
        assert!(PAGE_RUNTIME.contains("window.__walko = {"));
    }

    #[test]
    fn test_scroll_and_resize_listeners_are_passive() {
        let listeners: Vec<&str> = PAGE_RUNTIME
            .lines()
            .filter(|l| l.contains("addEventListener"))
            .filter(|l| l.contains("\"scroll\"") || l.contains("\"resize\""))
            .collect();
        assert_eq!(listeners.len(), 2);
        for line in listeners {
            assert!(line.trim_end().ends_with("passive);"), "{}", line);
        }
        assert!(PAGE_RUNTIME.contains("const passive = { capture: true, passive: true };"));
    }
}
