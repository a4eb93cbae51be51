//! HTTP client for the Walko public API.
//!
//! One client serves both seams: [`ContentSource`](walko_protocols::ContentSource)
//! for tours and tooltips, and [`RemoteViews`](walko_protocols::RemoteViews) for
//! identified visitors' view history.

mod client;

pub use client::{PublicApiClient, DEFAULT_BASE_URL};
