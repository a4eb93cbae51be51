use tracing::debug;
use walko_protocols::{BeaconPosition, CardPosition, CardStyle, Edge, Viewport};

use super::clamp::{clamp_to_viewport, ESTIMATED_CARD_HEIGHT, VIEWPORT_MARGIN};

/// Card sizing and spacing relative to its beacon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    /// Space between beacon and card.
    pub gap: f64,
    /// Shift along the axis perpendicular to placement.
    pub card_offset: f64,
    pub width: f64,
    pub estimated_height: f64,
    pub margin: f64,
}

impl CardLayout {
    pub fn from_style(style: &CardStyle, estimated_height: f64, margin: f64) -> Self {
        Self {
            gap: style.gap,
            card_offset: style.card_offset_y,
            width: style.width,
            estimated_height,
            margin,
        }
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::from_style(&CardStyle::default(), ESTIMATED_CARD_HEIGHT, VIEWPORT_MARGIN)
    }
}

/// Place a card on the far side of the beacon from its element, flipping to
/// the near side when the far side would overflow, then clamp.
pub fn card_position(
    beacon: BeaconPosition,
    edge: Edge,
    beacon_size: f64,
    layout: &CardLayout,
    viewport: Viewport,
) -> CardPosition {
    let s = beacon_size;
    let w = layout.width;
    let h = layout.estimated_height;
    let gap = layout.gap;

    let raw = match edge {
        Edge::Bottom | Edge::Top => {
            let below = beacon.top + s + gap;
            let above = beacon.top - gap - h;
            let top = match edge {
                Edge::Bottom if below + h > viewport.height => above,
                Edge::Bottom => below,
                _ if above < 0.0 => below,
                _ => above,
            };
            CardPosition::new(top, beacon.left + s / 2.0 - w / 2.0 + layout.card_offset)
        }
        Edge::Right | Edge::Left => {
            let right = beacon.left + s + gap;
            let left_side = beacon.left - gap - w;
            let left = match edge {
                Edge::Right if right + w > viewport.width => left_side,
                Edge::Right => right,
                _ if left_side < 0.0 => right,
                _ => left_side,
            };
            CardPosition::new(beacon.top + s / 2.0 - h / 2.0 + layout.card_offset, left)
        }
    };

    let clamped = clamp_to_viewport(raw, w, h, viewport, layout.margin);
    debug!(
        "card position edge={} raw=({}, {}) clamped=({}, {})",
        edge, raw.top, raw.left, clamped.top, clamped.left
    );
    clamped
}

/// A `width` x `height` card centered in the viewport, then clamped.
pub fn centered_position(width: f64, height: f64, viewport: Viewport, margin: f64) -> CardPosition {
    let raw = CardPosition::new(
        (viewport.height - height) / 2.0,
        (viewport.width - width) / 2.0,
    );
    clamp_to_viewport(raw, width, height, viewport, margin)
}
