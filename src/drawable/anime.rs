//! Sprite-sheet animation drawable.

use std::rc::Rc;

use crate::assets::MaterialId;
use crate::chunk::{AnimeState, UvFrame};
use crate::device::DrawDevice;
use crate::geometry::{Color, Rect, Size};

/// An animated inline sprite: a sequence of atlas frames cycled at a
/// per-element fps.
///
/// The frame table is built once per asset and shared by reference with
/// every chunk the drawable emits, so a document full of the same smiley
/// carries a single table.
#[derive(Debug, Clone)]
pub struct Anime {
    material: Option<MaterialId>,
    frames: Rc<Vec<UvFrame>>,
    width: f32,
    height: f32,
}

impl Anime {
    pub(crate) fn resolved(
        material: MaterialId,
        frames: Rc<Vec<UvFrame>>,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            material: Some(material),
            frames,
            width,
            height,
        }
    }

    pub(crate) fn missing() -> Self {
        Self {
            material: None,
            frames: Rc::new(Vec::new()),
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// First frame's pixel size, or 1x1 when the asset is missing.
    pub fn measured_size(&self) -> Size {
        if self.width > 0.0 && self.height > 0.0 {
            Size::new(self.width, self.height)
        } else {
            super::degraded_size()
        }
    }

    /// Emit one animated quad chunk showing the first frame; the draw
    /// device advances it every rendered frame at `fps`.
    pub fn draw(
        &self,
        _id: &str,
        rect: Rect,
        color: Color,
        _link: Option<&str>,
        fps: u32,
        device: &mut DrawDevice,
    ) {
        let Some(material) = self.material else {
            return;
        };
        let Some(first) = self.frames.first() else {
            return;
        };
        let mut chunk = device.acquire_chunk();
        chunk.rect = rect;
        chunk.push_quad(rect, color, first);
        chunk.anim = Some(AnimeState::new(
            1.0 / fps.max(1) as f32,
            Rc::clone(&self.frames),
        ));
        device.merge_chunks(material, chunk);
    }
}
