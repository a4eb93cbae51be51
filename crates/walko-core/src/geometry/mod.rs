//! Pure positioning math.
//!
//! Two distinct models live here:
//!
//! - beacon tooltips: a beacon is anchored to one edge of the element
//!   ([`beacon_position`]) and its card is placed relative to the beacon
//!   with flip-on-overflow ([`card_position`]);
//! - tour steps: the step card is placed directly next to the element at a
//!   named placement with no flipping ([`tour_tooltip_position`]).
//!
//! Both finish with a viewport clamp. Every function is side-effect free and
//! is re-run on scroll and resize.

mod beacon;
mod card;
mod clamp;
mod tour_tooltip;

pub use beacon::{beacon_position, BeaconAnchor};
pub use card::{card_position, centered_position, CardLayout};
pub use clamp::{clamp_to_viewport, ESTIMATED_CARD_HEIGHT, VIEWPORT_MARGIN};
pub use tour_tooltip::{
    resolve_placement, tour_tooltip_position, TOUR_TOOLTIP_ESTIMATED_HEIGHT, TOUR_TOOLTIP_PADDING,
    TOUR_TOOLTIP_WIDTH,
};
