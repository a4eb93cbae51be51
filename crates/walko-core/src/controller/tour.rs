//! Tour playthrough state machine.

use walko_protocols::{
    ButtonAction, CardMount, ElementHandle, HighlightMount, NodeId, Placement, TourDefinition,
    TourStep,
};

/// Lifecycle of the (single) tour played per page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TourPhase {
    #[default]
    Idle,
    FetchingContent,
    GateCheck,
    Showing(usize),
    Ended { completed: bool },
}

/// Navigation input from the step card or the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourCommand {
    Next,
    Prev,
    Skip,
    Finish,
    Close,
}

impl TourCommand {
    pub fn from_action(action: ButtonAction) -> Option<Self> {
        match action {
            ButtonAction::Next => Some(Self::Next),
            ButtonAction::Prev => Some(Self::Prev),
            ButtonAction::Skip => Some(Self::Skip),
            ButtonAction::Finish => Some(Self::Finish),
            ButtonAction::Dismiss => None,
        }
    }
}

impl TourPhase {
    /// Apply a command; phases other than `Showing` ignore commands.
    pub fn apply(self, command: TourCommand, step_count: usize) -> TourPhase {
        let TourPhase::Showing(index) = self else {
            return self;
        };
        match command {
            TourCommand::Next | TourCommand::Finish if index + 1 >= step_count => {
                TourPhase::Ended { completed: true }
            }
            TourCommand::Next | TourCommand::Finish => TourPhase::Showing(index + 1),
            TourCommand::Prev => TourPhase::Showing(index.saturating_sub(1)),
            TourCommand::Skip | TourCommand::Close => TourPhase::Ended { completed: false },
        }
    }
}

/// Snapshot of the tour being played.
pub(crate) struct ActiveTour {
    pub definition: TourDefinition,
    pub steps: Vec<TourStep>,
    pub mounted: Option<MountedStep>,
}

impl ActiveTour {
    pub(crate) fn new(definition: TourDefinition) -> Self {
        let steps = definition.ordered_steps();
        Self {
            definition,
            steps,
            mounted: None,
        }
    }
}

/// Nodes of the currently displayed step.
pub(crate) struct MountedStep {
    pub index: usize,
    pub anchor: Option<ElementHandle>,
    pub placement: Placement,
    pub highlight: Option<(NodeId, HighlightMount)>,
    pub card: (NodeId, CardMount),
}

impl MountedStep {
    pub(crate) fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.card.1.buttons.iter().map(|b| b.node).collect();
        ids.push(self.card.0);
        ids.extend(self.highlight.as_ref().map(|(id, _)| *id));
        ids
    }
}
