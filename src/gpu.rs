//! wgpu-backed host integration: texture storage and mesh buffers.
//!
//! This is the production implementation of the two host seams. The
//! texture provider decodes raster images and uploads them to GPU
//! textures; atlases and font glyph textures are registered by the host,
//! since their packing happens outside this crate. The mesh keeps one
//! buffer per vertex attribute plus one index buffer per submesh, all
//! replaced wholesale when the corresponding dirty flag fires.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use wgpu::{Device, Extent3d, Queue, TextureDimension, TextureFormat, TextureUsages};

use crate::assets::{FontAtlas, MaterialId, TextureHandle, TextureInfo, TextureProvider};
use crate::atlas::SpriteAtlas;
use crate::drawable::FontStyle;
use crate::geometry::Color;
use crate::mesh::HostMesh;

/// Texture storage backed by a wgpu device.
pub struct GpuTextureProvider {
    device: Arc<Device>,
    queue: Arc<Queue>,
    textures: Vec<wgpu::Texture>,
    atlases: HashMap<String, Rc<SpriteAtlas>>,
    font_atlases: HashMap<(String, u32, u8), FontAtlas>,
    white: Option<TextureInfo>,
}

impl GpuTextureProvider {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>) -> Self {
        Self {
            device,
            queue,
            textures: Vec::new(),
            atlases: HashMap::new(),
            font_atlases: HashMap::new(),
            white: None,
        }
    }

    /// View over a previously issued handle, for the host's bind groups.
    pub fn texture_view(&self, handle: TextureHandle) -> Option<wgpu::TextureView> {
        self.textures
            .get(handle.0 as usize)
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    /// Decode a raster file and upload it, returning its handle and size.
    pub fn upload_file(&mut self, path: &str) -> Option<TextureInfo> {
        let img = image::open(path).ok()?;
        self.upload_rgba(&img.to_rgba8())
    }

    /// Upload decoded RGBA pixels.
    pub fn upload_rgba(&mut self, rgba: &image::RgbaImage) -> Option<TextureInfo> {
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        // Rgba8Unorm passes colors through without sRGB conversion; the
        // host framebuffer handles encoding.
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("placard texture"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(texture);
        Some(TextureInfo {
            handle,
            width,
            height,
        })
    }

    /// Register a sprite atlas under a source path. The atlas texture must
    /// have been uploaded through this provider.
    pub fn register_atlas(&mut self, src: &str, atlas: SpriteAtlas) {
        self.atlases.insert(src.to_owned(), Rc::new(atlas));
    }

    /// Register a font's glyph texture and UV lookup for a face/size/style
    /// combination.
    pub fn register_font_atlas(
        &mut self,
        face: &str,
        size: f32,
        style: FontStyle,
        atlas: FontAtlas,
    ) {
        self.font_atlases
            .insert((face.to_owned(), size.to_bits(), style.bits()), atlas);
    }
}

impl TextureProvider for GpuTextureProvider {
    fn texture(&mut self, src: &str) -> Option<TextureInfo> {
        self.upload_file(src)
    }

    fn atlas(&mut self, src: &str) -> Option<Rc<SpriteAtlas>> {
        self.atlases.get(src).cloned()
    }

    fn font_atlas(&mut self, face: &str, size: f32, style: FontStyle) -> Option<FontAtlas> {
        self.font_atlases
            .get(&(face.to_owned(), size.to_bits(), style.bits()))
            .cloned()
    }

    fn white_texture(&mut self) -> Option<TextureInfo> {
        if let Some(info) = self.white {
            return Some(info);
        }
        let pixel = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let info = self.upload_rgba(&pixel)?;
        self.white = Some(info);
        Some(info)
    }
}

/// The document mesh as wgpu buffers, one index buffer per submesh.
pub struct GpuMesh {
    device: Arc<Device>,
    vertex_buffer: Option<wgpu::Buffer>,
    color_buffer: Option<wgpu::Buffer>,
    uv_buffer: Option<wgpu::Buffer>,
    index_buffers: Vec<wgpu::Buffer>,
    index_counts: Vec<u32>,
    materials: Vec<MaterialId>,
}

impl GpuMesh {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            vertex_buffer: None,
            color_buffer: None,
            uv_buffer: None,
            index_buffers: Vec::new(),
            index_counts: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn color_buffer(&self) -> Option<&wgpu::Buffer> {
        self.color_buffer.as_ref()
    }

    pub fn uv_buffer(&self) -> Option<&wgpu::Buffer> {
        self.uv_buffer.as_ref()
    }

    pub fn submesh_count(&self) -> usize {
        self.index_buffers.len()
    }

    /// Index buffer and triangle-index count for one submesh; draw these
    /// in list order to respect paint order.
    pub fn submesh(&self, i: usize) -> Option<(&wgpu::Buffer, u32)> {
        Some((self.index_buffers.get(i)?, *self.index_counts.get(i)?))
    }

    /// Material bound by each submesh, in the same order.
    pub fn materials(&self) -> &[MaterialId] {
        &self.materials
    }
}

impl HostMesh for GpuMesh {
    fn set_vertices(&mut self, verts: &[[f32; 3]]) {
        self.vertex_buffer = (!verts.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("placard vertex buffer"),
                    contents: bytemuck::cast_slice(verts),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
    }

    fn set_colors(&mut self, colors: &[Color]) {
        self.color_buffer = (!colors.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("placard color buffer"),
                    contents: bytemuck::cast_slice(colors),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
    }

    fn set_uvs(&mut self, uvs: &[[f32; 2]]) {
        self.uv_buffer = (!uvs.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("placard uv buffer"),
                    contents: bytemuck::cast_slice(uvs),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
    }

    fn set_submeshes(&mut self, submeshes: &[Vec<u16>], materials: &[MaterialId]) {
        self.index_buffers = submeshes
            .iter()
            .map(|indices| {
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("placard index buffer"),
                        contents: bytemuck::cast_slice(indices),
                        usage: wgpu::BufferUsages::INDEX,
                    })
            })
            .collect();
        self.index_counts = submeshes.iter().map(|i| i.len() as u32).collect();
        self.materials = materials.to_vec();
    }
}
