use walko_protocols::{TooltipDefinition, TourDefinition};

/// Work results and timers reported back to the controller task.
///
/// Every variant carries the navigation generation it was started under;
/// the controller drops messages from earlier generations.
#[derive(Debug)]
pub(crate) enum Internal {
    ToursFetched {
        generation: u64,
        tours: Vec<TourDefinition>,
    },
    ToursEligible {
        generation: u64,
        tours: Vec<TourDefinition>,
    },
    TooltipsReady {
        generation: u64,
        tooltips: Vec<TooltipDefinition>,
    },
    RetryStep {
        generation: u64,
        tour_id: String,
        step_index: usize,
    },
    TooltipDue {
        generation: u64,
        tooltip_id: String,
        retried: bool,
    },
}

impl Internal {
    pub(crate) fn generation(&self) -> u64 {
        match self {
            Self::ToursFetched { generation, .. }
            | Self::ToursEligible { generation, .. }
            | Self::TooltipsReady { generation, .. }
            | Self::RetryStep { generation, .. }
            | Self::TooltipDue { generation, .. } => *generation,
        }
    }
}
