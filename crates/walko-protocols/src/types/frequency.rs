//! Frequency policies governing how often content may be shown.

use serde::{Deserialize, Serialize};

/// How often a tour or tooltip may be shown to one viewer.
///
/// On the wire this is carried as flat `frequencyType` / `frequencyCount` /
/// `frequencyDays` fields; use `#[serde(flatten)]` when embedding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FrequencyFields", into = "FrequencyFields")]
pub enum FrequencyPolicy {
    /// Shown until viewed once.
    #[default]
    Once,
    /// Shown on every eligible page load.
    Always,
    /// Shown until viewed `max` times.
    Count { max: u32 },
    /// Shown again once `cooldown_days` have passed since the last view.
    Days { cooldown_days: u32 },
}

impl FrequencyPolicy {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Always => "always",
            Self::Count { .. } => "count",
            Self::Days { .. } => "days",
        }
    }
}

/// Flat wire representation of [`FrequencyPolicy`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyFields {
    #[serde(default)]
    pub frequency_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_days: Option<u32>,
}

impl From<FrequencyFields> for FrequencyPolicy {
    fn from(fields: FrequencyFields) -> Self {
        let kind = fields
            .frequency_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match kind.as_str() {
            "always" => Self::Always,
            "count" => Self::Count {
                max: fields.frequency_count.filter(|c| *c > 0).unwrap_or(1),
            },
            "days" => Self::Days {
                cooldown_days: fields.frequency_days.unwrap_or(1),
            },
            _ => Self::Once,
        }
    }
}

impl From<FrequencyPolicy> for FrequencyFields {
    fn from(policy: FrequencyPolicy) -> Self {
        let (count, days) = match policy {
            FrequencyPolicy::Count { max } => (Some(max), None),
            FrequencyPolicy::Days { cooldown_days } => (None, Some(cooldown_days)),
            _ => (None, None),
        };
        Self {
            frequency_type: Some(policy.kind().to_string()),
            frequency_count: count,
            frequency_days: days,
        }
    }
}
