//! Error types for the Walko protocol layer.

mod host;
mod source;
mod storage;

pub use host::*;
pub use source::*;
pub use storage::*;
