//! # Walko Core
//!
//! The shared engine behind every delivery surface: selector resolution,
//! frequency gating, view history, positioning math and the render
//! controller that ties them to a [`walko_protocols::DomHost`].

pub mod controller;
pub mod gate;
pub mod geometry;
pub mod history;
pub mod personalize;
pub mod resolver;
pub mod static_source;
pub mod url_pattern;

mod error;

pub use controller::{ControllerOptions, RenderController};
pub use error::ControllerError;
pub use gate::{is_eligible, FrequencyGate};
pub use history::{HistoryStore, MemoryStorage, RemoteIdentity};
pub use personalize::Personalizer;
pub use resolver::{is_positional, resolve, Resolution};
pub use static_source::{ContentBundle, StaticContentSource};
pub use url_pattern::url_matches;
