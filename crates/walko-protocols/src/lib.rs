//! # Walko Protocols
//!
//! Data model and protocol definitions (traits) for the Walko tour and tooltip
//! engine. Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`DomHost`] - Delivery surface the render controller draws into
//! - [`ContentSource`] - Supplies tours and tooltips for a page
//! - [`RemoteViews`] - Per-user view history kept on the server
//! - [`KeyValueStorage`] - Device-local durable storage
//! - [`Clock`] - Wall clock used by frequency decisions

pub mod clock;
pub mod error;
pub mod host;
pub mod source;
pub mod storage;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{HostError, SourceError, StorageError};
pub use host::{
    BeaconMount, ButtonAction, CardButton, CardKind, CardMount, DomHost, ElementHandle,
    HighlightMount, HostEvent, Layer, MountSpec, NodeId,
};
pub use source::{ContentSource, RemoteViews, ViewEvent, ViewMetadata, ViewsResponse};
pub use storage::KeyValueStorage;
pub use types::*;
