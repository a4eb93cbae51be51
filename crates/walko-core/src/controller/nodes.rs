use std::collections::HashMap;

use walko_protocols::{ButtonAction, Layer, NodeId};

/// What a mounted node means to the controller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeRole {
    TourHighlight,
    TourCard,
    TourButton(ButtonAction),
    TooltipBeacon(String),
    TooltipCard(String),
    TooltipButton(String),
}

/// Allocates node ids and remembers the role of each live one.
#[derive(Debug, Default)]
pub(crate) struct NodeRegistry {
    next: u64,
    roles: HashMap<NodeId, (Layer, NodeRole)>,
}

impl NodeRegistry {
    pub(crate) fn allocate(&mut self, layer: Layer, role: NodeRole) -> NodeId {
        self.next += 1;
        let id = NodeId(self.next);
        self.roles.insert(id, (layer, role));
        id
    }

    pub(crate) fn role(&self, id: NodeId) -> Option<&NodeRole> {
        self.roles.get(&id).map(|(_, role)| role)
    }

    pub(crate) fn release(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.roles.remove(&id);
        }
    }

    pub(crate) fn release_layer(&mut self, layer: Layer) {
        self.roles.retain(|_, (l, _)| *l != layer);
    }

    pub(crate) fn len(&self) -> usize {
        self.roles.len()
    }
}
