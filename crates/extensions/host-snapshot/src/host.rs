//! [`DomHost`] over a [`PageSnapshot`].

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use walko_protocols::{
    DomHost, ElementHandle, ElementRect, HostError, HostEvent, Layer, MountSpec, NodeId, Viewport,
};

use crate::selector::check_selector;
use crate::snapshot::{PageSnapshot, SnapshotElement};

/// One entry of the mount log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountRecord {
    /// Milliseconds since the host was created.
    pub at_ms: u64,
    #[serde(flatten)]
    pub op: MountOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum MountOp {
    Attach { layer: Layer },
    Mount { layer: Layer, node: NodeId, spec: MountSpec },
    Update { node: NodeId, spec: MountSpec },
    Unmount { node: NodeId },
    Clear { layer: Layer },
}

struct PageState {
    url: String,
    viewport: Viewport,
}

pub struct SnapshotHost {
    elements: Vec<SnapshotElement>,
    language: Option<String>,
    started: Instant,
    page: Mutex<PageState>,
    roots: Mutex<HashSet<Layer>>,
    live: Mutex<BTreeMap<NodeId, (Layer, MountSpec)>>,
    log: Mutex<Vec<MountRecord>>,
}

impl SnapshotHost {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            elements: snapshot.elements,
            language: snapshot.language,
            started: Instant::now(),
            page: Mutex::new(PageState {
                url: snapshot.url,
                viewport: snapshot.viewport,
            }),
            roots: Mutex::new(HashSet::new()),
            live: Mutex::new(BTreeMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Mirror page-level effects of a scripted event before it reaches the
    /// controller.
    pub fn observe(&self, event: &HostEvent) {
        let mut page = self.page.lock();
        match event {
            HostEvent::Navigated { url } => page.url = url.clone(),
            HostEvent::Resized { viewport } => page.viewport = *viewport,
            _ => {}
        }
    }

    /// Everything the controller did, in order.
    pub fn mount_log(&self) -> Vec<MountRecord> {
        self.log.lock().clone()
    }

    /// Nodes still mounted.
    pub fn live_nodes(&self) -> Vec<(NodeId, MountSpec)> {
        self.live
            .lock()
            .iter()
            .map(|(node, (_, spec))| (*node, spec.clone()))
            .collect()
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn record(&self, op: MountOp) {
        let at_ms = self.elapsed_ms();
        self.log.lock().push(MountRecord { at_ms, op });
    }

    fn find(&self, selector: &str) -> Option<usize> {
        let elapsed = self.elapsed_ms();
        self.elements
            .iter()
            .position(|e| e.selector == selector && e.is_attached(elapsed))
    }

    fn element(&self, handle: &ElementHandle) -> Option<&SnapshotElement> {
        let index: usize = handle.0.strip_prefix("snap:")?.parse().ok()?;
        self.elements.get(index)
    }

    fn require_root(&self, layer: Layer) -> Result<(), HostError> {
        if self.roots.lock().contains(&layer) {
            Ok(())
        } else {
            Err(HostError::Other(format!("{:?} root not attached", layer)))
        }
    }
}

#[async_trait]
impl DomHost for SnapshotHost {
    fn surface(&self) -> &str {
        "preview"
    }

    async fn current_url(&self) -> Result<String, HostError> {
        Ok(self.page.lock().url.clone())
    }

    async fn viewport(&self) -> Result<Viewport, HostError> {
        Ok(self.page.lock().viewport)
    }

    async fn browser_language(&self) -> Result<Option<String>, HostError> {
        Ok(self.language.clone())
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, HostError> {
        check_selector(selector)?;
        let selector = selector.trim();
        let found = self.find(selector).map(|i| ElementHandle(format!("snap:{}", i)));
        debug!("query {:?} -> {:?}", selector, found);
        Ok(found)
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<ElementRect>, HostError> {
        let elapsed = self.elapsed_ms();
        Ok(self
            .element(element)
            .filter(|e| e.is_attached(elapsed))
            .map(|e| e.rect))
    }

    async fn attach_root(&self, layer: Layer) -> Result<(), HostError> {
        if self.roots.lock().insert(layer) {
            self.record(MountOp::Attach { layer });
        }
        Ok(())
    }

    async fn mount(&self, layer: Layer, node: NodeId, spec: &MountSpec) -> Result<(), HostError> {
        self.require_root(layer)?;
        self.live.lock().insert(node, (layer, spec.clone()));
        self.record(MountOp::Mount {
            layer,
            node,
            spec: spec.clone(),
        });
        Ok(())
    }

    async fn update(&self, node: NodeId, spec: &MountSpec) -> Result<(), HostError> {
        {
            let mut live = self.live.lock();
            let entry = live.get_mut(&node).ok_or(HostError::UnknownNode(node.0))?;
            entry.1 = spec.clone();
        }
        self.record(MountOp::Update {
            node,
            spec: spec.clone(),
        });
        Ok(())
    }

    async fn unmount(&self, node: NodeId) -> Result<(), HostError> {
        if self.live.lock().remove(&node).is_some() {
            self.record(MountOp::Unmount { node });
        }
        Ok(())
    }

    async fn clear_layer(&self, layer: Layer) -> Result<(), HostError> {
        self.live.lock().retain(|_, (l, _)| *l != layer);
        self.record(MountOp::Clear { layer });
        Ok(())
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
