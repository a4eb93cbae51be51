//! Tour and tooltip definitions as served by the public API.

use serde::{Deserialize, Deserializer, Serialize};

use super::frequency::FrequencyPolicy;
use super::geometry::{Edge, Placement};
use super::lenient::lenient_str_enum;

/// Content ids arrive as strings or integers depending on the backend row type.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Int(n) => n.to_string(),
    })
}

/// A multi-step product tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDefinition {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url_pattern: String,
    #[serde(default)]
    pub steps: Vec<TourStep>,
    #[serde(default)]
    pub style: TourStyle,
    #[serde(flatten)]
    pub frequency: FrequencyPolicy,
}

impl TourDefinition {
    /// Steps in navigation order (stable on equal `stepOrder`).
    pub fn ordered_steps(&self) -> Vec<TourStep> {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|s| s.step_order);
        steps
    }
}

/// One step of a tour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourStep {
    /// CSS selector of the anchor; empty or markup-like means "show centered".
    pub selector: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub button_text: Option<String>,
    pub placement: Placement,
    pub pulse_enabled: bool,
    pub z_index: Option<i64>,
    pub step_order: i64,
}

/// Card styling shared by every step of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourStyle {
    pub background_color: String,
    pub text_color: String,
    pub button_color: String,
    pub button_text_color: String,
    pub border_radius: f64,
    pub padding: f64,
    pub shadow: bool,
}

impl Default for TourStyle {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".into(),
            text_color: "#111827".into(),
            button_color: "#4f46e5".into(),
            button_text_color: "#ffffff".into(),
            border_radius: 8.0,
            padding: 16.0,
            shadow: true,
        }
    }
}

/// Shape of a tooltip beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconShape {
    #[default]
    Dot,
    Star,
    Sparkle,
    Wand,
}

impl IconShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Star => "star",
            Self::Sparkle => "sparkle",
            Self::Wand => "wand",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "star" => Self::Star,
            "sparkle" => Self::Sparkle,
            "wand" => Self::Wand,
            _ => Self::Dot,
        }
    }
}

lenient_str_enum!(IconShape);

/// What opens a tooltip card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerKind {
    #[default]
    Click,
    Hover,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Hover => "hover",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "hover" => Self::Hover,
            _ => Self::Click,
        }
    }
}

lenient_str_enum!(TriggerKind);

/// What closes an open tooltip card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DismissKind {
    #[default]
    Button,
    ClickElement,
    ClickOutside,
}

impl DismissKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::ClickElement => "click_element",
            Self::ClickOutside => "click_outside",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "click_element" => Self::ClickElement,
            "click_outside" => Self::ClickOutside,
            _ => Self::Button,
        }
    }
}

lenient_str_enum!(DismissKind);

/// Beacon appearance and anchoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeaconStyle {
    pub icon_shape: IconShape,
    pub pulsing: bool,
    #[serde(alias = "beaconEdge")]
    pub edge: Edge,
    /// Perpendicular offset; positive moves away from the element.
    #[serde(alias = "beaconOffset")]
    pub offset: f64,
    /// Along-edge offset; positive moves toward bottom/right.
    #[serde(alias = "beaconOffsetY")]
    pub offset_y: f64,
    #[serde(alias = "beaconSize")]
    pub size: f64,
    #[serde(alias = "beaconColor")]
    pub color: String,
}

impl Default for BeaconStyle {
    fn default() -> Self {
        Self {
            icon_shape: IconShape::Dot,
            pulsing: true,
            edge: Edge::Right,
            offset: 0.0,
            offset_y: 0.0,
            size: 16.0,
            color: "#4f46e5".into(),
        }
    }
}

/// Tooltip card appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardStyle {
    /// Space between beacon and card.
    #[serde(alias = "cardGap")]
    pub gap: f64,
    /// Shift along the perpendicular axis of placement.
    pub card_offset_y: f64,
    #[serde(alias = "cardWidth")]
    pub width: f64,
    #[serde(alias = "cardPadding")]
    pub padding: f64,
    #[serde(alias = "cardBorderRadius")]
    pub border_radius: f64,
    #[serde(alias = "cardShadow")]
    pub shadow: bool,
    #[serde(alias = "cardBgColor")]
    pub background_color: String,
    #[serde(alias = "cardTextColor")]
    pub text_color: String,
    pub font_size: f64,
    pub font_family: Option<String>,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            gap: 12.0,
            card_offset_y: 0.0,
            width: 300.0,
            padding: 16.0,
            border_radius: 8.0,
            shadow: true,
            background_color: "#ffffff".into(),
            text_color: "#111827".into(),
            font_size: 14.0,
            font_family: None,
        }
    }
}

/// A standalone tooltip anchored to one element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipDefinition {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url_pattern: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default, alias = "triggerType")]
    pub trigger: TriggerKind,
    #[serde(default, alias = "dismissType")]
    pub dismiss: DismissKind,
    #[serde(default)]
    pub beacon: BeaconStyle,
    #[serde(default)]
    pub card: CardStyle,
    #[serde(flatten)]
    pub frequency: FrequencyPolicy,
    #[serde(default)]
    pub z_index: Option<i64>,
    #[serde(default)]
    pub delay_ms: u64,
}

/// `GET /api/public/tours` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToursResponse {
    #[serde(default)]
    pub tours: Vec<TourDefinition>,
}

/// `GET /api/public/tooltips` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TooltipsResponse {
    #[serde(default)]
    pub tooltips: Vec<TooltipDefinition>,
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
