//! Text drawable: cosmic-text measurement and shaping into glyph quads.
//!
//! The font owns no glyph bitmaps. Shaping yields glyph ids and document
//! positions; the UV quad for each glyph comes from the host's glyph
//! texture through the [`GlyphUvSource`] seam, and the whole shaped run
//! lands in one chunk under the font's material.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};

use crate::assets::MaterialId;
use crate::chunk::UvFrame;
use crate::device::DrawDevice;
use crate::geometry::{Color, Rect, Size};

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

bitflags! {
    /// Bold/italic style pair carried in font cache keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
    }
}

/// Source of UV quads for shaped glyphs.
///
/// The glyph texture lives with the host; a font only needs to know where
/// each glyph id sits on it. Quads use the chunk winding order
/// (bottom-left, top-left, top-right, bottom-right).
pub trait GlyphUvSource {
    fn glyph_uv(&self, glyph_id: u16) -> UvFrame;
}

/// A sized, styled font face that measures and draws text runs.
pub struct Font {
    face: String,
    size: f32,
    style: FontStyle,
    line_height: f32,
    white_size: f32,
    backing: Option<FontBacking>,
}

struct FontBacking {
    material: MaterialId,
    font_system: Rc<RefCell<FontSystem>>,
    glyph_uvs: Rc<dyn GlyphUvSource>,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("face", &self.face)
            .field("size", &self.size)
            .field("style", &self.style)
            .field("resolved", &self.backing.is_some())
            .finish()
    }
}

impl Font {
    pub(crate) fn resolved(
        face: String,
        size: f32,
        style: FontStyle,
        material: MaterialId,
        font_system: Rc<RefCell<FontSystem>>,
        glyph_uvs: Rc<dyn GlyphUvSource>,
    ) -> Self {
        let mut font = Self {
            face,
            size,
            style,
            line_height: size * LINE_HEIGHT_FACTOR,
            white_size: 0.0,
            backing: Some(FontBacking {
                material,
                font_system,
                glyph_uvs,
            }),
        };
        // the shaper collapses lone trailing spaces, so the width of a
        // blank is the difference between " ." and "."
        font.white_size = font.measure_raw(" .").width - font.measure_raw(".").width;
        font
    }

    pub(crate) fn missing(face: String, size: f32, style: FontStyle) -> Self {
        Self {
            face,
            size,
            style,
            line_height: size * LINE_HEIGHT_FACTOR,
            white_size: 0.0,
            backing: None,
        }
    }

    pub fn face(&self) -> &str {
        &self.face
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Space between text baselines in pixels.
    pub fn line_spacing(&self) -> f32 {
        self.line_height
    }

    /// Width of one collapsed word space.
    pub fn white_size(&self) -> f32 {
        self.white_size
    }

    fn attrs(&self) -> Attrs<'_> {
        let family = match self.face.as_str() {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        };
        let weight = if self.style.contains(FontStyle::BOLD) {
            Weight::BOLD
        } else {
            Weight::NORMAL
        };
        let style = if self.style.contains(FontStyle::ITALIC) {
            Style::Italic
        } else {
            Style::Normal
        };
        Attrs::new().family(family).weight(weight).style(style)
    }

    fn measure_raw(&self, text: &str) -> Size {
        let Some(backing) = &self.backing else {
            return Size::zero();
        };
        let mut font_system = backing.font_system.borrow_mut();
        let metrics = Metrics::new(self.size, self.line_height);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        buffer.set_size(&mut font_system, None, None);
        buffer.set_text(&mut font_system, text, &self.attrs(), Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut font_system, true);

        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }
        if height == 0.0 {
            height = self.line_height;
        }
        Size::new(width, height)
    }

    /// Measure a text run, restoring the width of trailing spaces that the
    /// shaper collapses. A font whose face failed to resolve measures 1x1.
    pub fn measure(&self, text: &str) -> Size {
        if self.backing.is_none() {
            return super::degraded_size();
        }
        let mut size = self.measure_raw(text);
        for c in text.chars().rev() {
            if c == ' ' {
                size.width += self.white_size;
            } else {
                break;
            }
        }
        size
    }

    /// Shape `text` into `rect` and emit the glyph quads as one chunk.
    /// Lines wrap at the rect width; overflow past the rect height is kept,
    /// matching how the layout pass already sized the rect.
    pub fn draw(
        &self,
        _id: &str,
        rect: Rect,
        color: Color,
        text: &str,
        _link: Option<&str>,
        device: &mut DrawDevice,
    ) {
        let Some(backing) = &self.backing else {
            return;
        };

        let mut chunk = device.acquire_chunk();
        chunk.rect = rect;
        {
            let mut font_system = backing.font_system.borrow_mut();
            let metrics = Metrics::new(self.size, self.line_height);
            let mut buffer = Buffer::new(&mut font_system, metrics);
            buffer.set_size(&mut font_system, Some(rect.width), None);
            buffer.set_text(&mut font_system, text, &self.attrs(), Shaping::Advanced, None);
            buffer.shape_until_scroll(&mut font_system, true);

            for run in buffer.layout_runs() {
                for glyph in run.glyphs.iter() {
                    let glyph_rect = Rect::new(
                        rect.x + glyph.x,
                        rect.y + run.line_top,
                        glyph.w,
                        run.line_height,
                    );
                    let uv = backing.glyph_uvs.glyph_uv(glyph.glyph_id);
                    chunk.push_quad(glyph_rect, color, &uv);
                }
            }
        }
        device.merge_chunks(backing.material, chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FullTexture;

    impl GlyphUvSource for FullTexture {
        fn glyph_uv(&self, _glyph_id: u16) -> UvFrame {
            [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
        }
    }

    #[test]
    fn style_flags_compose() {
        let style = FontStyle::BOLD | FontStyle::ITALIC;
        assert!(style.contains(FontStyle::BOLD));
        assert!(style.contains(FontStyle::ITALIC));
        assert_eq!(FontStyle::default(), FontStyle::empty());
    }

    #[test]
    fn missing_font_degrades() {
        let font = Font::missing("nope".into(), 16.0, FontStyle::empty());
        assert_eq!(font.measure("hello world"), Size::new(1.0, 1.0));

        let mut device = DrawDevice::new();
        font.draw(
            "t0",
            Rect::new(0.0, 0.0, 100.0, 20.0),
            Color::WHITE,
            "hello",
            None,
            &mut device,
        );
        assert_eq!(device.batch_count(), 0);
        assert_eq!(device.vertex_count(), 0);
    }

    #[test]
    fn empty_text_still_measures_one_line() {
        let font_system = Rc::new(RefCell::new(FontSystem::new()));
        let font = Font::resolved(
            "sans-serif".into(),
            12.0,
            FontStyle::empty(),
            MaterialId::new(1),
            font_system,
            Rc::new(FullTexture),
        );
        let size = font.measure("");
        assert_eq!(size.height, 12.0 * LINE_HEIGHT_FACTOR);
        assert_eq!(size.width, 0.0);
    }

    #[test]
    fn resolved_font_emits_quad_multiple_vertices() {
        let font_system = Rc::new(RefCell::new(FontSystem::new()));
        let font = Font::resolved(
            "sans-serif".into(),
            12.0,
            FontStyle::BOLD,
            MaterialId::new(1),
            font_system,
            Rc::new(FullTexture),
        );
        let mut device = DrawDevice::new();
        font.draw(
            "t0",
            Rect::new(0.0, 0.0, 200.0, 20.0),
            Color::BLACK,
            "hi",
            None,
            &mut device,
        );
        assert_eq!(device.batch_count(), 1);
        assert_eq!(device.vertex_count() % 4, 0);
    }
}
