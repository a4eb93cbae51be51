//! Tour discovery and step rendering.

use std::sync::Arc;

use tracing::{debug, info, warn};
use walko_protocols::{ContentType, ElementHandle, ElementRect, Layer, MountSpec, TourDefinition};

use super::layout::{self, StepCard};
use super::messages::Internal;
use super::nodes::NodeRole;
use super::tour::{ActiveTour, MountedStep, TourCommand, TourPhase};
use super::RenderController;
use crate::resolver::{self, Resolution};

impl RenderController {
    pub(super) fn spawn_tour_fetch(&self) {
        let content = Arc::clone(&self.content);
        let tx = self.inbox_tx.clone();
        let (generation, url, lang) = (self.generation, self.url.clone(), self.language.clone());

        tokio::spawn(async move {
            let tours = match content.fetch_tours(&url, &lang).await {
                Ok(tours) => tours,
                Err(e) => {
                    warn!("Tour fetch from {} failed, no tours this page: {}", content.id(), e);
                    Vec::new()
                }
            };
            let _ = tx.send(Internal::ToursFetched { generation, tours });
        });
    }

    pub(super) fn on_tours_fetched(&mut self, tours: Vec<TourDefinition>) {
        if self.tour_phase != TourPhase::FetchingContent {
            return;
        }

        let tours: Vec<_> = tours.into_iter().filter(|t| !t.steps.is_empty()).collect();
        if tours.is_empty() {
            debug!("no tours for {}", self.url);
            self.tour_phase = TourPhase::Idle;
            return;
        }

        self.tour_phase = TourPhase::GateCheck;
        let gate = Arc::clone(&self.gate);
        let tx = self.inbox_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let tours = gate
                .filter_eligible(ContentType::Tour, tours, |t| (t.id.as_str(), t.frequency))
                .await;
            let _ = tx.send(Internal::ToursEligible { generation, tours });
        });
    }

    pub(super) async fn on_tours_eligible(&mut self, tours: Vec<TourDefinition>) {
        if self.tour_phase != TourPhase::GateCheck {
            return;
        }

        let Some(first) = tours.into_iter().next() else {
            debug!("no eligible tours for {}", self.url);
            self.tour_phase = TourPhase::Idle;
            return;
        };

        info!("Starting tour {} ({:?}) on {}", first.id, first.name, self.url);
        self.active_tour = Some(ActiveTour::new(first));
        self.tour_phase = TourPhase::Showing(0);
        self.show_step(0, false).await;
    }

    pub(super) async fn on_retry_step(&mut self, tour_id: &str, step_index: usize) {
        let waiting = self
            .active_tour
            .as_ref()
            .is_some_and(|tour| tour.definition.id == tour_id && tour.mounted.is_none());
        if waiting && self.tour_phase == TourPhase::Showing(step_index) {
            self.show_step(step_index, true).await;
        }
    }

    pub(super) async fn apply_tour_command(&mut self, command: TourCommand) {
        let Some(step_count) = self.active_tour.as_ref().map(|t| t.steps.len()) else {
            return;
        };

        let previous = self.tour_phase;
        let next = previous.apply(command, step_count);
        if next == previous {
            return;
        }
        debug!("tour {:?} -> {:?} on {:?}", previous, next, command);
        self.tour_phase = next;

        match next {
            TourPhase::Showing(index) => self.show_step(index, false).await,
            TourPhase::Ended { completed } => self.end_tour(completed).await,
            _ => {}
        }
    }

    /// Resolve and mount step `index`, scheduling the single retry on a miss.
    async fn show_step(&mut self, index: usize, retried: bool) {
        self.unmount_step().await;

        let Some(tour) = self.active_tour.as_ref() else {
            return;
        };
        let Some(step) = tour.steps.get(index) else {
            return;
        };
        let tour_id = tour.definition.id.clone();

        let resolution = match resolver::resolve(self.host.as_ref(), &step.selector).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!("Selector lookup failed for tour {} step {}: {}", tour_id, index, e);
                Resolution::Invalid
            }
        };

        let anchor = match resolution {
            ref miss if miss.should_retry() && !retried => {
                debug!("tour {} step {} anchor missing, retrying once", tour_id, index);
                self.schedule(
                    self.retry_delay(),
                    Internal::RetryStep {
                        generation: self.generation,
                        tour_id,
                        step_index: index,
                    },
                );
                return;
            }
            Resolution::NotFound => {
                info!(
                    "Tour {} step {} anchor not found after retry, centering",
                    tour_id, index
                );
                None
            }
            other => other.found(),
        };

        self.mount_step(index, anchor).await;
    }

    async fn mount_step(&mut self, index: usize, anchor: Option<(ElementHandle, ElementRect)>) {
        let Some(tour) = self.active_tour.as_ref() else {
            return;
        };
        let Some(step) = tour.steps.get(index) else {
            return;
        };
        let render = &self.options.render;
        let count = tour.steps.len();
        let rect = anchor.as_ref().map(|(_, rect)| *rect);
        let position = layout::step_position(rect.as_ref(), step.placement, self.viewport, render);

        let nodes = &mut self.nodes;
        let buttons = layout::step_buttons(step, index, count, &self.personalizer, |action| {
            nodes.allocate(Layer::Tours, NodeRole::TourButton(action))
        });
        let card = layout::step_card(
            StepCard {
                tour: &tour.definition,
                step,
                index,
                count,
                position,
                centered: rect.is_none(),
                buttons,
            },
            render,
            &self.personalizer,
        );
        let highlight =
            rect.map(|rect| layout::step_highlight(&tour.definition.id, step, rect, render));
        let placement = step.placement;

        let highlight = match highlight {
            Some(spec) => {
                let node = self.nodes.allocate(Layer::Tours, NodeRole::TourHighlight);
                let mount = MountSpec::Highlight(spec.clone());
                if let Err(e) = self.host.mount(Layer::Tours, node, &mount).await {
                    warn!("Failed to mount highlight: {}", e);
                }
                Some((node, spec))
            }
            None => None,
        };

        let card_node = self.nodes.allocate(Layer::Tours, NodeRole::TourCard);
        if let Err(e) = self
            .host
            .mount(Layer::Tours, card_node, &MountSpec::Card(card.clone()))
            .await
        {
            warn!("Failed to mount tour card: {}", e);
        }
        debug!(
            "tour step {} mounted at ({}, {}) centered={}",
            index, card.position.top, card.position.left, card.centered
        );

        if let Some(tour) = self.active_tour.as_mut() {
            tour.mounted = Some(MountedStep {
                index,
                anchor: anchor.map(|(element, _)| element),
                placement,
                highlight,
                card: (card_node, card),
            });
        }
    }

    pub(super) async fn unmount_step(&mut self) {
        let Some(mounted) = self.active_tour.as_mut().and_then(|t| t.mounted.take()) else {
            return;
        };
        if let Some((node, _)) = &mounted.highlight {
            self.unmount(*node).await;
        }
        self.unmount(mounted.card.0).await;
        self.nodes.release(mounted.node_ids());
    }

    async fn end_tour(&mut self, completed: bool) {
        self.unmount_step().await;
        if let Err(e) = self.host.clear_layer(Layer::Tours).await {
            warn!("Failed to clear tour layer: {}", e);
        }
        self.nodes.release_layer(Layer::Tours);

        let Some(tour) = self.active_tour.take() else {
            return;
        };
        info!("Tour {} ended (completed={})", tour.definition.id, completed);
        if completed {
            self.record_view(ContentType::Tour, &tour.definition.id, &tour.definition.frequency)
                .await;
        }
    }

    pub(super) async fn reflow_tour(&mut self) {
        let host = Arc::clone(&self.host);
        let viewport = self.viewport;
        let render = self.options.render.clone();
        let Some(mounted) = self.active_tour.as_mut().and_then(|t| t.mounted.as_mut()) else {
            return;
        };

        let rect = match &mounted.anchor {
            Some(element) => match host.bounding_rect(element).await {
                Ok(Some(rect)) => Some(rect),
                Ok(None) => {
                    debug!("tour anchor detached, keeping last position");
                    return;
                }
                Err(e) => {
                    warn!("Failed to measure tour anchor: {}", e);
                    return;
                }
            },
            None => None,
        };

        let position = layout::step_position(rect.as_ref(), mounted.placement, viewport, &render);
        if let (Some(rect), Some((node, spec))) = (rect, mounted.highlight.as_mut()) {
            spec.rect = rect;
            if let Err(e) = host.update(*node, &MountSpec::Highlight(spec.clone())).await {
                warn!("Failed to update highlight: {}", e);
            }
        }

        let (node, card) = &mut mounted.card;
        if card.position != position {
            card.position = position;
            if let Err(e) = host.update(*node, &MountSpec::Card(card.clone())).await {
                warn!("Failed to update tour card: {}", e);
            }
        }
    }
}
