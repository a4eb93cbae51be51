use walko_protocols::{Position, Viewport};

/// Minimum distance between a card and any viewport edge.
pub const VIEWPORT_MARGIN: f64 = 16.0;

/// Card height assumed before layout, used by flip and clamp.
pub const ESTIMATED_CARD_HEIGHT: f64 = 250.0;

/// Keep a `width` x `height` box `margin` pixels inside the viewport.
///
/// When the viewport is too small for the box plus both margins, the
/// leading margin wins so the box's top-left corner stays visible.
pub fn clamp_to_viewport(
    position: Position,
    width: f64,
    height: f64,
    viewport: Viewport,
    margin: f64,
) -> Position {
    Position::new(
        clamp_axis(position.top, height, viewport.height, margin),
        clamp_axis(position.left, width, viewport.width, margin),
    )
}

pub(crate) fn clamp_axis(value: f64, extent: f64, span: f64, margin: f64) -> f64 {
    // Not f64::clamp: the upper bound may fall below the lower one.
    margin.max(value.min(span - extent - margin))
}
