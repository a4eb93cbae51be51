//! View history records.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::lenient::lenient_str_enum;

/// Kind of content a view record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    #[default]
    Tour,
    Tooltip,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tour => "tour",
            Self::Tooltip => "tooltip",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tooltip" => Self::Tooltip,
            _ => Self::Tour,
        }
    }

    /// Device-local storage key, e.g. `walko_tour_42`.
    pub fn storage_key(&self, content_id: &str) -> String {
        format!("walko_{}_{}", self.as_str(), content_id)
    }
}

lenient_str_enum!(ContentType);

/// How many times a viewer has seen a piece of content, and when last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    #[serde(default)]
    pub view_count: u32,
    #[serde(
        default,
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_timestamp"
    )]
    pub last_seen: Option<DateTime<Utc>>,
}

impl ViewRecord {
    pub fn new(view_count: u32, last_seen: Option<DateTime<Utc>>) -> Self {
        Self {
            view_count,
            last_seen,
        }
    }

    /// Record produced by one more view at `now`.
    pub fn incremented(&self, now: DateTime<Utc>) -> Self {
        Self {
            view_count: self.view_count.saturating_add(1),
            last_seen: Some(now),
        }
    }

    /// Combine two observations of the same record, keeping the larger count
    /// and the latest timestamp.
    pub fn merge(&self, other: &ViewRecord) -> Self {
        Self {
            view_count: self.view_count.max(other.view_count),
            last_seen: match (self.last_seen, other.last_seen) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

fn serialize_millis<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.serialize_i64(ts.timestamp_millis()),
        None => serializer.serialize_none(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

/// Accepts epoch milliseconds (what browsers write) or RFC 3339 (what the
/// server returns). Unparseable values read as "never seen".
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Millis(ms)) => Utc.timestamp_millis_opt(ms).single(),
        Some(RawTimestamp::Float(ms)) => Utc.timestamp_millis_opt(ms as i64).single(),
        Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| text.parse::<i64>().ok().and_then(|ms| Utc.timestamp_millis_opt(ms).single())),
        None => None,
    })
}
