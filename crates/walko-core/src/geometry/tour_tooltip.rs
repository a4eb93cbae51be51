use walko_protocols::{ElementRect, Placement, Position, Viewport};

use super::clamp::clamp_axis;

pub const TOUR_TOOLTIP_WIDTH: f64 = 320.0;
pub const TOUR_TOOLTIP_PADDING: f64 = 12.0;
pub const TOUR_TOOLTIP_ESTIMATED_HEIGHT: f64 = 180.0;

/// Turn `auto` into a concrete side: below when it fits, otherwise above.
pub fn resolve_placement(
    placement: Placement,
    rect: &ElementRect,
    viewport: Viewport,
) -> Placement {
    match placement {
        Placement::Auto => {
            let needed = TOUR_TOOLTIP_PADDING + TOUR_TOOLTIP_ESTIMATED_HEIGHT;
            if rect.bottom() + needed <= viewport.height {
                Placement::Bottom
            } else {
                Placement::Top
            }
        }
        other => other,
    }
}

/// Position of a tour step card next to its anchor.
///
/// Horizontal overflow is clamped; vertically only the top is floored to
/// the padding. The card never flips sides.
pub fn tour_tooltip_position(
    rect: &ElementRect,
    placement: Placement,
    viewport: Viewport,
) -> Position {
    let w = TOUR_TOOLTIP_WIDTH;
    let h = TOUR_TOOLTIP_ESTIMATED_HEIGHT;
    let pad = TOUR_TOOLTIP_PADDING;

    let (top, left) = match resolve_placement(placement, rect, viewport) {
        Placement::Top => (rect.top - pad - h, rect.center_x() - w / 2.0),
        Placement::Left => (rect.center_y() - h / 2.0, rect.left - w - pad),
        Placement::Right => (rect.center_y() - h / 2.0, rect.right() + pad),
        Placement::Bottom | Placement::Auto => (rect.bottom() + pad, rect.center_x() - w / 2.0),
    };

    Position::new(top.max(pad), clamp_axis(left, w, viewport.width, pad))
}
