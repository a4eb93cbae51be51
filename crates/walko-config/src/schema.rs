//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub visitor: VisitorConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Public API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Workspace token sent as `Authorization: Bearer <token>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Delivery surface reported in view metadata.
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            source: default_source(),
        }
    }
}

fn default_base_url() -> String {
    "https://app.walko.io".to_string()
}

fn default_source() -> String {
    "embed".to_string()
}

/// Visitor identity, either from `[visitor]` or the page-injected
/// `window.WalkoConfig` object (camelCase keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitorConfig {
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, alias = "userEmail", skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, alias = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(default, alias = "userLocale", skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,

    #[serde(default, alias = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, alias = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl VisitorConfig {
    /// Parse the page-injected config object.
    pub fn from_page_json(value: serde_json::Value) -> Result<Self, crate::ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The configured user id, ignoring blank values.
    pub fn identity(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Fields set in `other` win over fields set here.
    pub fn merged_with(&self, other: &VisitorConfig) -> VisitorConfig {
        VisitorConfig {
            user_id: other.user_id.clone().or_else(|| self.user_id.clone()),
            user_email: other.user_email.clone().or_else(|| self.user_email.clone()),
            user_name: other.user_name.clone().or_else(|| self.user_name.clone()),
            user_locale: other.user_locale.clone().or_else(|| self.user_locale.clone()),
            first_name: other.first_name.clone().or_else(|| self.first_name.clone()),
            last_name: other.last_name.clone().or_else(|| self.last_name.clone()),
        }
    }
}

/// Render tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Delay before the single selector re-resolution attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Card height assumed before layout.
    #[serde(default = "default_estimated_card_height")]
    pub estimated_card_height: f64,

    /// Minimum distance between a card and the viewport edge.
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: f64,

    /// Base z-index for mounted nodes without an explicit one.
    #[serde(default = "default_z_index")]
    pub default_z_index: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            estimated_card_height: default_estimated_card_height(),
            viewport_margin: default_viewport_margin(),
            default_z_index: default_z_index(),
        }
    }
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_estimated_card_height() -> f64 {
    250.0
}

fn default_viewport_margin() -> f64 {
    16.0
}

fn default_z_index() -> i64 {
    2_147_483_000
}

/// Device-local view history storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured path, or `~/.walko/views.sqlite3`.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".walko"))
                .unwrap_or_else(|| PathBuf::from(".walko"))
                .join("views.sqlite3")
        })
    }
}
