//! Tooltip discovery, beacons, and card interactions.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use walko_protocols::{
    BeaconMount, CardMount, ContentType, DismissKind, ElementHandle, ElementRect, Layer,
    MountSpec, NodeId, TooltipDefinition, TriggerKind,
};

use super::layout;
use super::messages::Internal;
use super::nodes::NodeRole;
use super::RenderController;
use crate::resolver::{self, Resolution};

/// A tooltip whose beacon is on the page.
pub(crate) struct TooltipInstance {
    pub definition: TooltipDefinition,
    pub element: ElementHandle,
    pub rect: ElementRect,
    pub beacon: (NodeId, BeaconMount),
    pub card: Option<(NodeId, CardMount)>,
}

impl TooltipInstance {
    fn owns(&self, node: NodeId) -> bool {
        self.beacon.0 == node
            || self.card.as_ref().is_some_and(|(card, spec)| {
                *card == node || spec.buttons.iter().any(|b| b.node == node)
            })
    }
}

impl RenderController {
    pub(super) fn spawn_tooltip_discovery(&self) {
        let content = Arc::clone(&self.content);
        let gate = Arc::clone(&self.gate);
        let tx = self.inbox_tx.clone();
        let (generation, url, lang) = (self.generation, self.url.clone(), self.language.clone());

        tokio::spawn(async move {
            let tooltips = match content.fetch_tooltips(&url, &lang).await {
                Ok(tooltips) => tooltips,
                Err(e) => {
                    warn!(
                        "Tooltip fetch from {} failed, no tooltips this page: {}",
                        content.id(),
                        e
                    );
                    return;
                }
            };
            let tooltips = gate
                .filter_eligible(ContentType::Tooltip, tooltips, |t| (t.id.as_str(), t.frequency))
                .await;
            let _ = tx.send(Internal::TooltipsReady {
                generation,
                tooltips,
            });
        });
    }

    pub(super) async fn on_tooltips_ready(&mut self, tooltips: Vec<TooltipDefinition>) {
        debug!("{} eligible tooltips for {}", tooltips.len(), self.url);
        for tooltip in tooltips {
            if tooltip.delay_ms > 0 {
                let message = Internal::TooltipDue {
                    generation: self.generation,
                    tooltip_id: tooltip.id.clone(),
                    retried: false,
                };
                self.schedule(Duration::from_millis(tooltip.delay_ms), message);
                self.pending_tooltips.insert(tooltip.id.clone(), tooltip);
            } else {
                self.mount_tooltip(tooltip, false).await;
            }
        }
    }

    pub(super) async fn on_tooltip_due(&mut self, tooltip_id: &str, retried: bool) {
        if let Some(tooltip) = self.pending_tooltips.remove(tooltip_id) {
            self.mount_tooltip(tooltip, retried).await;
        }
    }

    async fn mount_tooltip(&mut self, tooltip: TooltipDefinition, retried: bool) {
        if self.tooltips.contains_key(&tooltip.id) {
            debug!("beacon for tooltip {} already mounted", tooltip.id);
            return;
        }

        let resolution = match resolver::resolve(self.host.as_ref(), &tooltip.selector).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!("Selector lookup failed for tooltip {}: {}", tooltip.id, e);
                return;
            }
        };

        let (element, rect) = match resolution {
            Resolution::Found { element, rect } => (element, rect),
            ref miss if miss.should_retry() && !retried => {
                debug!("tooltip {} anchor missing, retrying once", tooltip.id);
                let message = Internal::TooltipDue {
                    generation: self.generation,
                    tooltip_id: tooltip.id.clone(),
                    retried: true,
                };
                self.schedule(self.retry_delay(), message);
                self.pending_tooltips.insert(tooltip.id.clone(), tooltip);
                return;
            }
            Resolution::NotFound => {
                info!("Tooltip {} anchor not found after retry, skipping", tooltip.id);
                return;
            }
            Resolution::NotPositional | Resolution::Invalid => {
                debug!("tooltip {} has no usable selector, skipping", tooltip.id);
                return;
            }
        };

        let spec = layout::beacon_mount(&tooltip, &rect, &self.options.render);
        let node = self
            .nodes
            .allocate(Layer::Tooltips, NodeRole::TooltipBeacon(tooltip.id.clone()));
        if let Err(e) = self
            .host
            .mount(Layer::Tooltips, node, &MountSpec::Beacon(spec.clone()))
            .await
        {
            warn!("Failed to mount beacon for tooltip {}: {}", tooltip.id, e);
            self.nodes.release([node]);
            return;
        }

        debug!(
            "beacon {} mounted at ({}, {})",
            tooltip.id, spec.position.top, spec.position.left
        );
        self.tooltips.insert(
            tooltip.id.clone(),
            TooltipInstance {
                definition: tooltip,
                element,
                rect,
                beacon: (node, spec),
                card: None,
            },
        );
    }

    /// Open the card of a click-trigger tooltip.
    pub(super) async fn on_beacon_clicked(&mut self, id: &str) {
        let clickable = self
            .tooltips
            .get(id)
            .is_some_and(|t| t.definition.trigger == TriggerKind::Click);
        if clickable {
            self.open_tooltip_card(id).await;
        }
    }

    /// Whether `id` is the tooltip whose card is open and whose beacon
    /// toggles it by click.
    pub(super) fn is_open_click_beacon(&self, id: &str) -> bool {
        self.open_tooltip.as_deref() == Some(id)
            && self
                .tooltips
                .get(id)
                .is_some_and(|t| t.definition.trigger == TriggerKind::Click)
    }

    pub(super) async fn handle_pointer_entered(&mut self, node: NodeId) {
        let Some(NodeRole::TooltipBeacon(id)) = self.nodes.role(node).cloned() else {
            return;
        };
        let hover = self
            .tooltips
            .get(&id)
            .is_some_and(|t| t.definition.trigger == TriggerKind::Hover);
        if hover {
            self.open_tooltip_card(&id).await;
        }
    }

    /// Open a tooltip's card, closing any other open card without recording.
    async fn open_tooltip_card(&mut self, id: &str) {
        if self.open_tooltip.as_deref() == Some(id) {
            return;
        }
        if let Some(other) = self.open_tooltip.take() {
            debug!("closing tooltip {} to open {}", other, id);
            self.close_tooltip_card(&other).await;
        }

        let host = Arc::clone(&self.host);
        let viewport = self.viewport;
        let Some(instance) = self.tooltips.get_mut(id) else {
            return;
        };
        if let Ok(Some(rect)) = host.bounding_rect(&instance.element).await {
            instance.rect = rect;
        }

        let render = &self.options.render;
        let beacon = layout::beacon_mount(&instance.definition, &instance.rect, render);
        let position =
            layout::tooltip_card_position(&instance.definition, beacon.position, viewport, render);
        let nodes = &mut self.nodes;
        let buttons = layout::tooltip_buttons(&instance.definition, &self.personalizer, || {
            nodes.allocate(Layer::Tooltips, NodeRole::TooltipButton(id.to_string()))
        });
        let card = layout::tooltip_card(
            &instance.definition,
            position,
            buttons,
            render,
            &self.personalizer,
        );
        let node = self
            .nodes
            .allocate(Layer::Tooltips, NodeRole::TooltipCard(id.to_string()));

        if let Err(e) = host.mount(Layer::Tooltips, node, &MountSpec::Card(card.clone())).await {
            warn!("Failed to mount card for tooltip {}: {}", id, e);
        }
        instance.card = Some((node, card));
        self.open_tooltip = Some(id.to_string());
        debug!("tooltip {} opened at ({}, {})", id, position.top, position.left);
    }

    async fn close_tooltip_card(&mut self, id: &str) {
        let Some((node, card)) = self.tooltips.get_mut(id).and_then(|t| t.card.take()) else {
            return;
        };
        self.unmount(node).await;
        self.nodes.release(card.buttons.iter().map(|b| b.node).chain([node]));
        if self.open_tooltip.as_deref() == Some(id) {
            self.open_tooltip = None;
        }
    }

    /// Policy dismissal: close the card, record a view, and drop the beacon
    /// when the tooltip is no longer eligible.
    pub(super) async fn dismiss_tooltip(&mut self, id: &str) {
        let Some(policy) = self.tooltips.get(id).map(|t| t.definition.frequency) else {
            return;
        };
        self.close_tooltip_card(id).await;
        info!("Tooltip {} dismissed", id);

        match self.record_view(ContentType::Tooltip, id, &policy).await {
            Some(false) => {
                debug!("tooltip {} no longer eligible, removing beacon", id);
                self.remove_tooltip(id).await;
            }
            Some(true) | None => {}
        }
    }

    /// Apply `click_element` / `click_outside` to the open card.
    pub(super) async fn dismiss_on_click(&mut self, node: Option<NodeId>, x: f64, y: f64) {
        let Some(id) = self.open_tooltip.clone() else {
            return;
        };
        let host = Arc::clone(&self.host);
        let Some(instance) = self.tooltips.get_mut(&id) else {
            return;
        };

        let dismiss = match instance.definition.dismiss {
            DismissKind::Button => false,
            DismissKind::ClickElement => {
                if let Ok(Some(rect)) = host.bounding_rect(&instance.element).await {
                    instance.rect = rect;
                }
                instance.rect.contains(x, y)
            }
            DismissKind::ClickOutside => {
                let own_node = node.is_some_and(|n| instance.owns(n));
                let render = &self.options.render;
                let in_card = instance
                    .card
                    .as_ref()
                    .is_some_and(|(_, card)| layout::card_area(card, render).contains(x, y));
                !own_node && !in_card
            }
        };

        if dismiss {
            self.dismiss_tooltip(&id).await;
        }
    }

    async fn remove_tooltip(&mut self, id: &str) {
        self.close_tooltip_card(id).await;
        if let Some(instance) = self.tooltips.remove(id) {
            self.unmount(instance.beacon.0).await;
            self.nodes.release([instance.beacon.0]);
        }
    }

    pub(super) async fn teardown_tooltips(&mut self) {
        let ids: Vec<String> = self.tooltips.keys().cloned().collect();
        for id in ids {
            self.remove_tooltip(&id).await;
        }
        self.pending_tooltips.clear();
        self.open_tooltip = None;
    }

    pub(super) async fn reflow_tooltips(&mut self) {
        let host = Arc::clone(&self.host);
        let viewport = self.viewport;
        let render = self.options.render.clone();

        for instance in self.tooltips.values_mut() {
            match host.bounding_rect(&instance.element).await {
                Ok(Some(rect)) => instance.rect = rect,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Failed to measure tooltip {} anchor: {}", instance.definition.id, e);
                    continue;
                }
            }

            let beacon = layout::beacon_mount(&instance.definition, &instance.rect, &render);
            let (beacon_node, beacon_spec) = &mut instance.beacon;
            if beacon_spec.position != beacon.position {
                beacon_spec.position = beacon.position;
                let spec = MountSpec::Beacon(beacon_spec.clone());
                if let Err(e) = host.update(*beacon_node, &spec).await {
                    warn!("Failed to update beacon: {}", e);
                }
            }

            if let Some((card_node, card)) = instance.card.as_mut() {
                let position = layout::tooltip_card_position(
                    &instance.definition,
                    beacon.position,
                    viewport,
                    &render,
                );
                if card.position != position {
                    card.position = position;
                    if let Err(e) = host.update(*card_node, &MountSpec::Card(card.clone())).await {
                        warn!("Failed to update tooltip card: {}", e);
                    }
                }
            }
        }
    }
}
