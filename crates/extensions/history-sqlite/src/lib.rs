//! SQLite storage backend for Walko.
//!
//! Durable device-local key/value storage, used where the browser's
//! `localStorage` is not available (CLI preview with `--persist`).

mod schema;
mod storage;

pub use storage::SqliteStorage;
