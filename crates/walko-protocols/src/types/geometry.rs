//! Geometry value types shared by hosts and the geometry engine.
//!
//! All coordinates are viewport-relative CSS pixels.

use serde::{Deserialize, Serialize};

use super::lenient::lenient_str_enum;

/// Bounding box of an anchor element, as reported by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Check if a point is inside this rect (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// Top-left corner of a positioned beacon or card.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

impl Position {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Rect covering `size` starting at this position.
    pub fn with_size(&self, width: f64, height: f64) -> ElementRect {
        ElementRect::new(self.top, self.left, width, height)
    }
}

/// Alias kept for readability at call sites.
pub type BeaconPosition = Position;

/// Alias kept for readability at call sites.
pub type CardPosition = Position;

/// Visible viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Side of the anchor element a beacon is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    #[default]
    Right,
}

impl Edge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            _ => Self::Right,
        }
    }

    /// Whether the edge runs horizontally (card stacks vertically).
    pub fn is_vertical_stack(&self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

lenient_str_enum!(Edge);

/// Placement of a tour step card relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Auto,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Auto => "auto",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Auto,
        }
    }
}

lenient_str_enum!(Placement);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = ElementRect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.right(), 120.0);
        assert_eq!(rect.center_x(), 70.0);
        assert_eq!(rect.center_y(), 35.0);
    }

    #[test]
    fn test_rect_contains_is_edge_inclusive() {
        let rect = ElementRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(10.0, 10.0));
        assert!(!rect.contains(10.1, 5.0));
    }

    #[test]
    fn test_edge_unknown_defaults_to_right() {
        let edge: Edge = serde_json::from_str("\"diagonal\"").unwrap();
        assert_eq!(edge, Edge::Right);
        let edge: Edge = serde_json::from_str("null").unwrap();
        assert_eq!(edge, Edge::Right);
    }

    #[test]
    fn test_edge_roundtrip_is_lowercase() {
        assert_eq!(serde_json::to_string(&Edge::Bottom).unwrap(), "\"bottom\"");
        let edge: Edge = serde_json::from_str("\"TOP\"").unwrap();
        assert_eq!(edge, Edge::Top);
    }

    #[test]
    fn test_placement_unknown_defaults_to_auto() {
        let placement: Placement = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(placement, Placement::Auto);
    }
}
