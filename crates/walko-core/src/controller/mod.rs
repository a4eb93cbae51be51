//! Render controller: one instance per page-load context.
//!
//! The controller owns every node it mounts through the [`DomHost`]. It runs
//! as a single task that selects between host events and its own internal
//! messages; content fetches, gate checks and timers run in spawned tasks
//! and report back by message, so tours and tooltips never wait on each
//! other. A navigation bumps the generation counter, tears everything down
//! and restarts discovery; results from older generations are dropped.

mod layout;
mod messages;
mod nodes;
mod tooltips;
mod tour;
mod tours;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walko_config::{resolve_language, RenderConfig, VisitorConfig};
use walko_protocols::{
    ContentSource, ContentType, DomHost, FrequencyPolicy, HostEvent, Layer, NodeId,
    TooltipDefinition, ViewMetadata, Viewport,
};

use crate::error::ControllerError;
use crate::gate::FrequencyGate;
use crate::personalize::Personalizer;

use messages::Internal;
use nodes::{NodeRegistry, NodeRole};
use tooltips::TooltipInstance;
use tour::ActiveTour;

pub use tour::{TourCommand, TourPhase};

/// Per-visitor settings a controller is built with.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub render: RenderConfig,
    pub visitor: VisitorConfig,
}

pub struct RenderController {
    host: Arc<dyn DomHost>,
    content: Arc<dyn ContentSource>,
    gate: Arc<FrequencyGate>,
    personalizer: Personalizer,
    options: ControllerOptions,

    language: String,
    url: String,
    viewport: Viewport,
    generation: u64,
    nodes: NodeRegistry,

    tour_phase: TourPhase,
    active_tour: Option<ActiveTour>,

    tooltips: HashMap<String, TooltipInstance>,
    pending_tooltips: HashMap<String, TooltipDefinition>,
    open_tooltip: Option<String>,

    inbox_tx: mpsc::UnboundedSender<Internal>,
    inbox: mpsc::UnboundedReceiver<Internal>,
}

enum Step {
    Host(Option<HostEvent>),
    Internal(Internal),
}

impl RenderController {
    pub fn new(
        host: Arc<dyn DomHost>,
        content: Arc<dyn ContentSource>,
        gate: Arc<FrequencyGate>,
        options: ControllerOptions,
    ) -> Self {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        Self {
            host,
            content,
            gate,
            personalizer: Personalizer::new(&options.visitor),
            options,
            language: String::new(),
            url: String::new(),
            viewport: Viewport::default(),
            generation: 0,
            nodes: NodeRegistry::default(),
            tour_phase: TourPhase::Idle,
            active_tour: None,
            tooltips: HashMap::new(),
            pending_tooltips: HashMap::new(),
            open_tooltip: None,
            inbox_tx,
            inbox,
        }
    }

    /// Run on a new task until the host closes.
    pub fn spawn(
        self,
        events: mpsc::Receiver<HostEvent>,
    ) -> JoinHandle<Result<(), ControllerError>> {
        tokio::spawn(self.run(events))
    }

    /// Drive the controller until the host reports `Closed`.
    ///
    /// Returns `EventStreamClosed` if the event sender is dropped without a
    /// `Closed` event. Nodes are torn down in both cases.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<HostEvent>,
    ) -> Result<(), ControllerError> {
        self.start().await?;

        loop {
            let step = tokio::select! {
                event = events.recv() => Step::Host(event),
                Some(message) = self.inbox.recv() => Step::Internal(message),
            };

            match step {
                Step::Host(Some(HostEvent::Closed)) => {
                    info!("Host closed, tearing down {}", self.url);
                    self.teardown().await;
                    return Ok(());
                }
                Step::Host(Some(event)) => self.handle_event(event).await,
                Step::Host(None) => {
                    warn!("Host event stream ended without close");
                    self.teardown().await;
                    return Err(ControllerError::EventStreamClosed);
                }
                Step::Internal(message) => self.handle_internal(message).await,
            }
        }
    }

    async fn start(&mut self) -> Result<(), ControllerError> {
        self.host.attach_root(Layer::Tours).await?;
        self.host.attach_root(Layer::Tooltips).await?;
        self.url = self.host.current_url().await?;
        self.viewport = self.host.viewport().await?;

        let browser = self.host.browser_language().await.unwrap_or_else(|e| {
            warn!("Could not read browser language: {}", e);
            None
        });
        self.language = resolve_language(
            self.options.visitor.user_locale.as_deref(),
            browser.as_deref(),
        )
        .to_string();

        info!(
            "Render controller started on {} (surface={}, lang={}, history={})",
            self.url,
            self.host.surface(),
            self.language,
            self.gate.history().backend()
        );
        self.discover();
        Ok(())
    }

    /// Start a fresh discovery pipeline for the current URL.
    fn discover(&mut self) {
        self.generation += 1;
        self.tour_phase = TourPhase::FetchingContent;
        self.spawn_tour_fetch();
        self.spawn_tooltip_discovery();
    }

    async fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Navigated { url } => {
                if url == self.url {
                    debug!("navigation to the same url ignored: {}", url);
                    return;
                }
                info!("Navigated {} -> {}", self.url, url);
                self.teardown().await;
                self.url = url;
                self.discover();
            }
            HostEvent::Scrolled => self.reflow().await,
            HostEvent::Resized { viewport } => {
                self.viewport = viewport;
                self.reflow().await;
            }
            HostEvent::Clicked { node, x, y } => self.handle_click(node, x, y).await,
            HostEvent::PointerEntered { node } => self.handle_pointer_entered(node).await,
            HostEvent::Closed => {}
        }
    }

    async fn handle_internal(&mut self, message: Internal) {
        if message.generation() != self.generation {
            debug!(
                "dropping stale message from generation {} (current {})",
                message.generation(),
                self.generation
            );
            return;
        }

        match message {
            Internal::ToursFetched { tours, .. } => self.on_tours_fetched(tours),
            Internal::ToursEligible { tours, .. } => self.on_tours_eligible(tours).await,
            Internal::TooltipsReady { tooltips, .. } => self.on_tooltips_ready(tooltips).await,
            Internal::RetryStep {
                tour_id,
                step_index,
                ..
            } => self.on_retry_step(&tour_id, step_index).await,
            Internal::TooltipDue {
                tooltip_id,
                retried,
                ..
            } => self.on_tooltip_due(&tooltip_id, retried).await,
        }
    }

    async fn handle_click(&mut self, node: Option<NodeId>, x: f64, y: f64) {
        let role = node.and_then(|n| self.nodes.role(n).cloned());

        // The open card's dismiss policy sees every click first, including
        // clicks on other controller nodes.
        let on_open_beacon = matches!(
            &role,
            Some(NodeRole::TooltipBeacon(id)) if self.is_open_click_beacon(id)
        );
        if !on_open_beacon {
            self.dismiss_on_click(node, x, y).await;
        }

        match role {
            Some(NodeRole::TourButton(action)) => {
                if let Some(command) = TourCommand::from_action(action) {
                    self.apply_tour_command(command).await;
                }
            }
            Some(NodeRole::TooltipButton(id)) => self.dismiss_tooltip(&id).await,
            Some(NodeRole::TooltipBeacon(id)) => self.on_beacon_clicked(&id).await,
            _ => {}
        }
    }

    async fn reflow(&mut self) {
        self.reflow_tour().await;
        self.reflow_tooltips().await;
    }

    /// Unmount everything and forget all per-page state.
    async fn teardown(&mut self) {
        self.unmount_step().await;
        self.active_tour = None;
        self.tour_phase = TourPhase::Idle;
        self.teardown_tooltips().await;

        for layer in [Layer::Tours, Layer::Tooltips] {
            if let Err(e) = self.host.clear_layer(layer).await {
                warn!("Failed to clear {:?} layer: {}", layer, e);
            }
            self.nodes.release_layer(layer);
        }
    }

    async fn unmount(&self, node: NodeId) {
        if let Err(e) = self.host.unmount(node).await {
            warn!("Failed to unmount {}: {}", node, e);
        }
    }

    fn metadata(&self) -> ViewMetadata {
        ViewMetadata {
            url: self.url.clone(),
            source: self.host.surface().to_string(),
        }
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.options.render.retry_delay_ms)
    }

    /// Deliver `message` after `delay`.
    fn schedule(&self, delay: Duration, message: Internal) {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message);
        });
    }

    /// Record a view; `Some(still_eligible)` on success.
    async fn record_view(
        &self,
        content_type: ContentType,
        id: &str,
        policy: &FrequencyPolicy,
    ) -> Option<bool> {
        self.gate
            .record_view(content_type, id, policy, self.metadata())
            .await
            .ok()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
