//! Instance-owned asset caches and material resolution.
//!
//! One cache serves one draw-device/compiler pair and dies with it; there
//! is no process-wide state. Fonts, images, animations and materials are
//! all keyed by string and resolved at most once. Resolution failures are
//! logged and produce degraded drawables, never errors — the document
//! keeps laying out around a missing asset.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use cosmic_text::FontSystem;

use crate::atlas::SpriteAtlas;
use crate::chunk::UvFrame;
use crate::device::DrawDevice;
use crate::drawable::{Anime, Font, FontStyle, GlyphUvSource, Image};
use crate::geometry::{Color, Rect};

/// UV quad spanning a whole texture, in the chunk winding order.
pub(crate) const FULL_QUAD_UV: UvFrame = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

/// Opaque handle to a texture owned by the host's texture provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque material handle compared by the batcher. Minted only by the
/// asset cache; equal ids mean the same texture/material state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(u32);

impl MaterialId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved texture and its pixel size.
#[derive(Debug, Clone, Copy)]
pub struct TextureInfo {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// A font's glyph texture together with its per-glyph UV lookup.
#[derive(Clone)]
pub struct FontAtlas {
    pub texture: TextureHandle,
    pub glyph_uvs: Rc<dyn GlyphUvSource>,
}

/// Narrow seam to the host's texture storage.
///
/// Implementations load and own the actual pixel data; the cache only
/// keeps handles and geometry. Every method may return `None` for an
/// unresolvable source — the caller degrades and the document renders on.
pub trait TextureProvider {
    /// Resolve a whole-texture source such as an image path.
    fn texture(&mut self, src: &str) -> Option<TextureInfo>;
    /// Resolve a sprite atlas by source path.
    fn atlas(&mut self, src: &str) -> Option<Rc<SpriteAtlas>>;
    /// Resolve the glyph texture for a sized, styled face.
    fn font_atlas(&mut self, face: &str, size: f32, style: FontStyle) -> Option<FontAtlas>;
    /// The shared 1x1 white texture backing fill rectangles.
    fn white_texture(&mut self) -> Option<TextureInfo>;
}

/// String-keyed caches for everything a compiled document resolves.
pub struct AssetCache {
    provider: Box<dyn TextureProvider>,
    font_system: Rc<RefCell<FontSystem>>,
    fonts: HashMap<String, Rc<Font>>,
    images: HashMap<String, Rc<Image>>,
    animes: HashMap<String, Rc<Anime>>,
    materials: HashMap<String, MaterialId>,
    material_textures: Vec<TextureHandle>,
}

impl AssetCache {
    pub fn new(provider: Box<dyn TextureProvider>) -> Self {
        Self {
            provider,
            font_system: Rc::new(RefCell::new(FontSystem::new())),
            fonts: HashMap::new(),
            images: HashMap::new(),
            animes: HashMap::new(),
            materials: HashMap::new(),
            material_textures: Vec::new(),
        }
    }

    /// Resolve `src` to an image drawable. `path#sprite` addresses one
    /// sprite of an atlas, anything else a whole texture.
    pub fn load_image(&mut self, src: &str) -> Rc<Image> {
        if let Some(image) = self.images.get(src) {
            return Rc::clone(image);
        }
        let image = Rc::new(self.resolve_image(src));
        self.images.insert(src.to_owned(), Rc::clone(&image));
        image
    }

    fn resolve_image(&mut self, src: &str) -> Image {
        if let Some((path, sprite_name)) = src.rsplit_once('#') {
            let Some(atlas) = self.provider.atlas(path) else {
                log::error!("could not load atlas from {path}");
                return Image::missing();
            };
            let Some(sprite) = atlas.sprite(sprite_name) else {
                log::error!("could not load sprite {sprite_name} from {path}");
                return Image::missing();
            };
            let (width, height) = (sprite.rect.width, sprite.rect.height);
            let uv = atlas
                .sprite_uv(sprite_name)
                .unwrap_or(FULL_QUAD_UV);
            let material = self.material(path, atlas.texture());
            Image::resolved(material, uv, width, height)
        } else {
            let Some(info) = self.provider.texture(src) else {
                log::error!("could not load texture from {src}");
                return Image::missing();
            };
            let material = self.material(src, info.handle);
            Image::resolved(material, FULL_QUAD_UV, info.width as f32, info.height as f32)
        }
    }

    /// Resolve `path#prefix` to an animation drawable whose frames are the
    /// atlas sprites matching the prefix, in sorted-name order.
    pub fn load_anime(&mut self, src: &str) -> Rc<Anime> {
        if let Some(anime) = self.animes.get(src) {
            return Rc::clone(anime);
        }
        let anime = Rc::new(self.resolve_anime(src));
        self.animes.insert(src.to_owned(), Rc::clone(&anime));
        anime
    }

    fn resolve_anime(&mut self, src: &str) -> Anime {
        let Some((path, prefix)) = src.rsplit_once('#') else {
            log::error!("anime source {src} has no sprite prefix");
            return Anime::missing();
        };
        let Some(atlas) = self.provider.atlas(path) else {
            log::error!("could not load atlas from {path}");
            return Anime::missing();
        };
        let frames = atlas.frame_sequence(prefix);
        if frames.is_empty() {
            log::error!("could not load anime {prefix} from {path}");
            return Anime::missing();
        }
        let (width, height) = atlas.frame_size(prefix).unwrap_or((1.0, 1.0));
        let material = self.material(path, atlas.texture());
        Anime::resolved(material, Rc::new(frames), width, height)
    }

    /// Resolve a sized, styled face to a font drawable.
    pub fn load_font(&mut self, face: &str, size: f32, style: FontStyle) -> Rc<Font> {
        let key = font_key(face, size, style);
        if let Some(font) = self.fonts.get(&key) {
            return Rc::clone(font);
        }
        let font = match self.provider.font_atlas(face, size, style) {
            Some(atlas) => {
                let material = self.material(&key, atlas.texture);
                Font::resolved(
                    face.to_owned(),
                    size,
                    style,
                    material,
                    Rc::clone(&self.font_system),
                    atlas.glyph_uvs,
                )
            }
            None => {
                log::error!("could not load font {key}");
                Font::missing(face.to_owned(), size, style)
            }
        };
        let font = Rc::new(font);
        self.fonts.insert(key, Rc::clone(&font));
        font
    }

    /// Material for `key`, minting a fresh id on first sight.
    pub fn material(&mut self, key: &str, texture: TextureHandle) -> MaterialId {
        if let Some(id) = self.materials.get(key) {
            return *id;
        }
        let id = MaterialId::new(self.material_textures.len() as u32);
        self.material_textures.push(texture);
        self.materials.insert(key.to_owned(), id);
        id
    }

    /// Texture behind a material, for the host's per-submesh binding pass.
    pub fn material_texture(&self, id: MaterialId) -> Option<TextureHandle> {
        self.material_textures.get(id.index()).copied()
    }

    /// Draw a solid rectangle on the shared white material.
    pub fn fill_rect(&mut self, rect: Rect, color: Color, device: &mut DrawDevice) {
        let Some(info) = self.provider.white_texture() else {
            log::error!("no white texture available for fill rects");
            return;
        };
        let material = self.material("#white", info.handle);
        let mut chunk = device.acquire_chunk();
        chunk.rect = rect;
        chunk.push_quad(rect, color, &FULL_QUAD_UV);
        device.merge_chunks(material, chunk);
    }
}

fn font_key(face: &str, size: f32, style: FontStyle) -> String {
    format!(
        "{face}{size}{}{}",
        if style.contains(FontStyle::BOLD) { "b" } else { "" },
        if style.contains(FontStyle::ITALIC) { "i" } else { "" },
    )
}
