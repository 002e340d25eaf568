//! Still-image drawable: one textured quad per draw.

use crate::assets::MaterialId;
use crate::chunk::UvFrame;
use crate::device::DrawDevice;
use crate::geometry::{Color, Rect, Size};

/// An inline image: either a whole texture or one sprite of an atlas.
///
/// Built by the asset cache; `resolved` carries the material and the UV
/// quad of the backing texture region, `missing` is the degraded form
/// produced when resolution failed.
#[derive(Debug, Clone)]
pub struct Image {
    material: Option<MaterialId>,
    uv: Option<UvFrame>,
    width: f32,
    height: f32,
}

impl Image {
    pub(crate) fn resolved(material: MaterialId, uv: UvFrame, width: f32, height: f32) -> Self {
        Self {
            material: Some(material),
            uv: Some(uv),
            width,
            height,
        }
    }

    pub(crate) fn missing() -> Self {
        Self {
            material: None,
            uv: None,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Intrinsic pixel size, or 1x1 when the asset is missing.
    pub fn measured_size(&self) -> Size {
        if self.width > 0.0 && self.height > 0.0 {
            Size::new(self.width, self.height)
        } else {
            super::degraded_size()
        }
    }

    /// Emit one quad chunk covering `rect`. Silently does nothing when the
    /// backing asset failed to resolve.
    pub fn draw(
        &self,
        _id: &str,
        rect: Rect,
        color: Color,
        _link: Option<&str>,
        device: &mut DrawDevice,
    ) {
        let (Some(material), Some(uv)) = (self.material, self.uv) else {
            return;
        };
        let mut chunk = device.acquire_chunk();
        chunk.rect = rect;
        chunk.push_quad(rect, color, &uv);
        device.merge_chunks(material, chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: UvFrame = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    #[test]
    fn resolved_image_measures_its_pixels() {
        let image = Image::resolved(MaterialId::new(1), FULL, 48.0, 32.0);
        assert_eq!(image.measured_size(), Size::new(48.0, 32.0));
    }

    #[test]
    fn missing_image_measures_one_by_one_and_draws_nothing() {
        let image = Image::missing();
        assert_eq!(image.measured_size(), Size::new(1.0, 1.0));

        let mut device = DrawDevice::new();
        image.draw(
            "img0",
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Color::WHITE,
            None,
            &mut device,
        );
        assert_eq!(device.batch_count(), 0);
        assert_eq!(device.vertex_count(), 0);
    }

    #[test]
    fn draw_emits_one_quad_under_the_material() {
        let image = Image::resolved(MaterialId::new(3), FULL, 48.0, 32.0);
        let mut device = DrawDevice::new();
        image.draw(
            "img0",
            Rect::new(5.0, 5.0, 48.0, 32.0),
            Color::rgba(255, 0, 0, 255),
            Some("https://example.org"),
            &mut device,
        );
        assert_eq!(device.batch_count(), 1);
        assert_eq!(device.vertex_count(), 4);
        assert_eq!(device.materials().next(), Some(MaterialId::new(3)));
    }
}
