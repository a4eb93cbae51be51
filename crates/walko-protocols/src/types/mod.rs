//! Data model shared across the Walko workspace.

mod lenient;
mod content;
mod frequency;
mod geometry;
mod view;

pub use content::*;
pub use frequency::*;
pub use geometry::*;
pub use view::*;
