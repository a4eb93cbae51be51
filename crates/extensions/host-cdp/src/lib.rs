//! Live-browser delivery surface for Walko.
//!
//! Attaches to a running Chrome/Chromium through the DevTools Protocol,
//! injects a small page runtime that owns the shadow-root layers, and exposes
//! the page as a [`DomHost`](walko_protocols::DomHost). The page's own
//! `localStorage` backs the device-local view history.
//!
//! ```bash
//! chrome --remote-debugging-port=9222
//! walko attach --cdp http://localhost:9222
//! ```

pub mod cdp;
mod events;
mod host;
mod storage;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use events::{parse_event, spawn_event_pump, EMIT_BINDING};
pub use host::{CdpHost, PAGE_RUNTIME};
pub use storage::CdpLocalStorage;
