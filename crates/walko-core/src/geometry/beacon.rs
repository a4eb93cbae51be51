use walko_protocols::{BeaconPosition, BeaconStyle, Edge, ElementRect};

/// Inputs that anchor a beacon to an element edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeaconAnchor {
    pub edge: Edge,
    /// Perpendicular offset; positive moves outward from the element.
    pub offset: f64,
    /// Along-edge offset; positive moves toward bottom/right.
    pub offset_y: f64,
    pub size: f64,
}

impl From<&BeaconStyle> for BeaconAnchor {
    fn from(style: &BeaconStyle) -> Self {
        Self {
            edge: style.edge,
            offset: style.offset,
            offset_y: style.offset_y,
            size: style.size,
        }
    }
}

/// Top-left corner of a beacon centered on the chosen edge of `rect`.
pub fn beacon_position(rect: &ElementRect, anchor: &BeaconAnchor) -> BeaconPosition {
    let half = anchor.size / 2.0;
    match anchor.edge {
        Edge::Top => BeaconPosition::new(
            rect.top - half - anchor.offset,
            rect.center_x() - half + anchor.offset_y,
        ),
        Edge::Bottom => BeaconPosition::new(
            rect.bottom() - half + anchor.offset,
            rect.center_x() - half + anchor.offset_y,
        ),
        Edge::Left => BeaconPosition::new(
            rect.center_y() - half + anchor.offset_y,
            rect.left - half - anchor.offset,
        ),
        Edge::Right => BeaconPosition::new(
            rect.center_y() - half + anchor.offset_y,
            rect.right() - half + anchor.offset,
        ),
    }
}
