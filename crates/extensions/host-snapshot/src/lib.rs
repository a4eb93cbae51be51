//! Preview delivery surface for Walko.
//!
//! Renders into a recorded page snapshot instead of a live document. Every
//! mount operation is appended to a log the dashboard preview can replay.

mod error;
mod host;
mod script;
mod selector;
mod snapshot;

pub use error::SnapshotError;
pub use host::{MountOp, MountRecord, SnapshotHost};
pub use script::{replay, EventScript, ScriptedEvent};
pub use selector::check_selector;
pub use snapshot::{PageSnapshot, SnapshotElement};
