//! DOM host protocol definitions.
//!
//! A host is the delivery surface the render controller draws into: a live
//! browser page, an embedded script context, or a recorded page snapshot used
//! by the dashboard preview. The controller only ever talks to the page through
//! this capability set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::types::{ElementRect, IconShape, Position, Viewport};

/// Handle for a node mounted by the controller. Allocated by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Opaque handle for a live page element. Allocated by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub String);

/// Isolated container a node is mounted into (one shadow root each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Tours,
    Tooltips,
}

/// Semantic role of a card button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    Next,
    Prev,
    Skip,
    Finish,
    Dismiss,
}

/// A clickable button inside a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardButton {
    pub node: NodeId,
    pub label: String,
    pub action: ButtonAction,
    pub primary: bool,
}

/// What a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CardKind {
    #[serde(rename_all = "camelCase")]
    TourStep { step_index: usize, step_count: usize },
    Tooltip,
}

/// Card content panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMount {
    pub content_id: String,
    pub kind: CardKind,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub buttons: Vec<CardButton>,
    pub position: Position,
    pub width: f64,
    pub padding: f64,
    pub border_radius: f64,
    pub shadow: bool,
    pub background_color: String,
    pub text_color: String,
    pub button_color: Option<String>,
    pub button_text_color: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub z_index: i64,
    /// Rendered without an anchor, centered in the viewport.
    pub centered: bool,
}

/// Attention marker next to a tooltip anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconMount {
    pub content_id: String,
    pub shape: IconShape,
    pub color: String,
    pub size: f64,
    pub pulsing: bool,
    pub position: Position,
    pub z_index: i64,
}

/// Outline drawn over a tour step's anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightMount {
    pub content_id: String,
    pub rect: ElementRect,
    pub pulsing: bool,
    pub z_index: i64,
}

/// A node the controller asks the host to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MountSpec {
    Beacon(BeaconMount),
    Card(CardMount),
    Highlight(HighlightMount),
}

impl MountSpec {
    pub fn content_id(&self) -> &str {
        match self {
            Self::Beacon(b) => &b.content_id,
            Self::Card(c) => &c.content_id,
            Self::Highlight(h) => &h.content_id,
        }
    }

    /// Node ids of the buttons this mount renders.
    pub fn button_nodes(&self) -> Vec<NodeId> {
        match self {
            Self::Card(card) => card.buttons.iter().map(|b| b.node).collect(),
            _ => Vec::new(),
        }
    }
}

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// The page URL changed (SPA navigation or full load).
    Navigated { url: String },
    /// The page or an ancestor of an anchor scrolled.
    Scrolled,
    /// The viewport changed size.
    Resized { viewport: Viewport },
    /// A pointer click; `node` is set when it landed on a controller node.
    Clicked {
        #[serde(default)]
        node: Option<NodeId>,
        x: f64,
        y: f64,
    },
    /// The pointer entered a controller node.
    PointerEntered { node: NodeId },
    /// The host is going away; the controller should tear down and stop.
    Closed,
}

/// Capability set a delivery surface offers to the render controller.
///
/// All DOM mutation goes through one controller per page context; hosts must
/// not mutate mounted nodes on their own.
#[async_trait]
pub trait DomHost: Send + Sync {
    /// Name of the delivery surface, reported as view metadata.
    fn surface(&self) -> &str;

    /// Current page URL.
    async fn current_url(&self) -> Result<String, HostError>;

    /// Current viewport size.
    async fn viewport(&self) -> Result<Viewport, HostError>;

    /// Browser-reported language (`navigator.language`), if any.
    async fn browser_language(&self) -> Result<Option<String>, HostError>;

    /// First element matching `selector`. Malformed selectors fail with
    /// [`HostError::InvalidSelector`].
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, HostError>;

    /// Current bounding rect, or `None` once the element left the document.
    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<ElementRect>, HostError>;

    /// Create the isolated container for `layer` if it does not exist yet.
    async fn attach_root(&self, layer: Layer) -> Result<(), HostError>;

    /// Render a new node into `layer`.
    async fn mount(&self, layer: Layer, node: NodeId, spec: &MountSpec) -> Result<(), HostError>;

    /// Re-render an existing node with new geometry or content.
    async fn update(&self, node: NodeId, spec: &MountSpec) -> Result<(), HostError>;

    /// Remove a node and its buttons.
    async fn unmount(&self, node: NodeId) -> Result<(), HostError>;

    /// Remove everything rendered into `layer`.
    async fn clear_layer(&self, layer: Layer) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_event_wire_format() {
        let event: HostEvent =
            serde_json::from_str(r#"{"type":"clicked","node":3,"x":1.5,"y":2}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::Clicked {
                node: Some(NodeId(3)),
                x: 1.5,
                y: 2.0
            }
        );

        let event: HostEvent = serde_json::from_str(r#"{"type":"clicked","x":0,"y":0}"#).unwrap();
        assert!(matches!(event, HostEvent::Clicked { node: None, .. }));
    }

    #[test]
    fn test_navigated_event() {
        let event: HostEvent =
            serde_json::from_str(r#"{"type":"navigated","url":"https://a.test/x"}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::Navigated {
                url: "https://a.test/x".to_string()
            }
        );
    }

    #[test]
    fn test_mount_spec_tagged() {
        let spec = MountSpec::Highlight(HighlightMount {
            content_id: "t1".into(),
            rect: ElementRect::new(1.0, 2.0, 3.0, 4.0),
            pulsing: false,
            z_index: 10,
        });
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "highlight");
        assert_eq!(value["contentId"], "t1");
        assert_eq!(spec.content_id(), "t1");
        assert!(spec.button_nodes().is_empty());
    }
}
