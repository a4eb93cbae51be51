//! Minimal Chrome DevTools Protocol client.
//!
//! Connects to the browser endpoint over WebSocket, attaches flat sessions to
//! page targets, and routes events to the session they belong to.

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
