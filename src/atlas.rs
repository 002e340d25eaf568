//! Sprite atlas geometry: named pixel rects on one texture and their UV
//! quads.
//!
//! Texture space uses a top-left origin; the UV quads come out in the
//! chunk winding order (bottom-left, top-left, top-right, bottom-right)
//! so they can be handed straight to `ChunkDrawer::push_quad`. Animation
//! frames are discovered by sprite-name prefix over the lexicographically
//! sorted sprite list.

use crate::assets::TextureHandle;
use crate::chunk::UvFrame;
use crate::geometry::Rect;

/// One named region of the atlas texture, in pixels.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub name: String,
    pub rect: Rect,
}

/// A texture plus the named sprite rects packed onto it.
#[derive(Debug)]
pub struct SpriteAtlas {
    texture: TextureHandle,
    width: u32,
    height: u32,
    sprites: Vec<Sprite>,
}

impl SpriteAtlas {
    /// Build an atlas over `texture` with the given pixel dimensions.
    /// Sprites are kept sorted by name so frame sequences come out in
    /// a stable order.
    pub fn new(texture: TextureHandle, width: u32, height: u32, mut sprites: Vec<Sprite>) -> Self {
        sprites.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            texture,
            width,
            height,
            sprites,
        }
    }

    /// Build a uniform-grid atlas whose tiles are named
    /// `{prefix}000`, `{prefix}001`, ... in row-major order.
    pub fn grid(
        texture: TextureHandle,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        prefix: &str,
    ) -> Self {
        let cols = (width / tile_width.max(1)) as usize;
        let rows = (height / tile_height.max(1)) as usize;
        let mut sprites = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                sprites.push(Sprite {
                    name: format!("{prefix}{:03}", row * cols + col),
                    rect: Rect::new(
                        (col as u32 * tile_width) as f32,
                        (row as u32 * tile_height) as f32,
                        tile_width as f32,
                        tile_height as f32,
                    ),
                });
            }
        }
        Self::new(texture, width, height, sprites)
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites
            .binary_search_by(|s| s.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.sprites[i])
    }

    /// UV quad for a named sprite, or `None` when the atlas has no such
    /// sprite.
    pub fn sprite_uv(&self, name: &str) -> Option<UvFrame> {
        self.sprite(name).map(|s| self.rect_uv(&s.rect))
    }

    /// UV quads for every sprite whose name starts with `prefix`, in
    /// sorted-name order. Empty when nothing matches.
    pub fn frame_sequence(&self, prefix: &str) -> Vec<UvFrame> {
        self.sprites
            .iter()
            .filter(|s| s.name.starts_with(prefix))
            .map(|s| self.rect_uv(&s.rect))
            .collect()
    }

    /// Pixel size of the first frame in a prefix sequence; animations use
    /// it as their measured size.
    pub fn frame_size(&self, prefix: &str) -> Option<(f32, f32)> {
        self.sprites
            .iter()
            .find(|s| s.name.starts_with(prefix))
            .map(|s| (s.rect.width, s.rect.height))
    }

    fn rect_uv(&self, rect: &Rect) -> UvFrame {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        let u0 = rect.x / w;
        let u1 = (rect.x + rect.width) / w;
        let v0 = rect.y / h;
        let v1 = (rect.y + rect.height) / h;
        [[u0, v1], [u0, v0], [u1, v0], [u1, v1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn atlas() -> SpriteAtlas {
        SpriteAtlas::new(
            TextureHandle(7),
            256,
            128,
            vec![
                Sprite {
                    name: "walk_001".into(),
                    rect: Rect::new(64.0, 0.0, 64.0, 64.0),
                },
                Sprite {
                    name: "icon".into(),
                    rect: Rect::new(0.0, 64.0, 32.0, 32.0),
                },
                Sprite {
                    name: "walk_000".into(),
                    rect: Rect::new(0.0, 0.0, 64.0, 64.0),
                },
            ],
        )
    }

    #[test]
    fn sprite_uv_stays_in_unit_square() {
        let atlas = atlas();
        let uv = atlas.sprite_uv("icon").unwrap();
        for [u, v] in uv {
            assert!((0.0..=1.0).contains(&u));
            assert!((0.0..=1.0).contains(&v));
        }
        // top-left-origin texture space: the quad's top-left vertex is uv[1]
        assert_eq!(uv[1], [0.0, 0.5]);
        assert_eq!(uv[3], [0.125, 0.75]);
    }

    #[test]
    fn missing_sprite_is_none() {
        assert!(atlas().sprite_uv("absent").is_none());
    }

    #[test]
    fn frame_sequence_is_sorted_and_filtered() {
        let atlas = atlas();
        let frames = atlas.frame_sequence("walk_");
        assert_eq!(frames.len(), 2);
        // walk_000 occupies the left half of the top strip
        assert_eq!(frames[0][1], [0.0, 0.0]);
        assert_eq!(frames[1][1], [0.25, 0.0]);
        assert!(atlas.frame_sequence("run_").is_empty());
    }

    #[test]
    fn frame_size_reports_first_frame() {
        assert_eq!(atlas().frame_size("walk_"), Some((64.0, 64.0)));
        assert_eq!(atlas().frame_size("run_"), None);
    }

    #[test]
    fn grid_tiles_cover_the_texture() {
        let atlas = SpriteAtlas::grid(TextureHandle(1), 128, 128, 64, 64, "tile_");
        let frames = atlas.frame_sequence("tile_");
        assert_eq!(frames.len(), 4);
        let uv = atlas.sprite_uv("tile_003").unwrap();
        assert_eq!(uv[1], [0.5, 0.5]);
        assert_eq!(uv[3], [1.0, 1.0]);
    }

    #[test]
    fn shared_frame_table_can_be_handed_to_chunks() {
        let atlas = atlas();
        let frames = Rc::new(atlas.frame_sequence("walk_"));
        assert_eq!(Rc::strong_count(&frames), 1);
        let cloned = Rc::clone(&frames);
        assert_eq!(cloned.len(), 2);
    }
}
