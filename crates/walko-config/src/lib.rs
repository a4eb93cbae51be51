//! # Walko Config
//!
//! Configuration management for the Walko engine: the TOML file consumed by
//! the CLI, the page-injected visitor object, and language selection.

mod error;
mod loader;
mod locale;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use locale::{normalize_locale, resolve_language, SUPPORTED_LANGUAGES};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
