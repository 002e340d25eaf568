//! Drawable producers: the inline element kinds a compiled document can
//! ask to draw themselves into a rectangle.
//!
//! Each variant measures itself for layout and emits chunks into a draw
//! device under a material resolved by the asset cache. A drawable whose
//! backing asset failed to resolve measures 1x1 and draws nothing, so the
//! document keeps laying out around the hole.

pub mod anime;
pub mod font;
pub mod image;

pub use self::anime::Anime;
pub use self::font::{Font, FontStyle, GlyphUvSource};
pub use self::image::Image;

use crate::geometry::Size;

/// Measured size reported by a drawable whose asset is missing.
pub(crate) fn degraded_size() -> Size {
    Size::new(1.0, 1.0)
}
