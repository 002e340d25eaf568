//! Renders a small HTML-like markup dialect (paragraphs, fonts, colors,
//! inline images, sprite-sheet animations, links) into a batched triangle
//! mesh for a host rendering environment.
//!
//! The pipeline, bottom up:
//!
//! - [`drawable`] elements emit quads — one [`chunk::ChunkDrawer`] per
//!   atomic visual unit — into a [`device::DrawDevice`].
//! - The device merges chunks into per-material batches whose order is
//!   paint order, then flattens everything into parallel vertex/color/UV
//!   arrays with one 16-bit triangle list per batch.
//! - Sprite animations swap their UV slice in place each frame; geometry
//!   is never re-issued between layouts.
//! - [`mesh::sync_mesh`] publishes whichever arrays are dirty into the
//!   host's mesh; [`gpu`] has the wgpu-backed implementations of the host
//!   seams.
//! - [`view::DocumentView`] drives the whole thing for one document:
//!   recompile on markup/width change, tick animations every frame.
//!
//! The markup parser and layout engine live with the host behind
//! [`view::DocumentCompiler`]; asset pixel storage lives behind
//! [`assets::TextureProvider`].

pub mod assets;
pub mod atlas;
pub mod chunk;
pub mod device;
pub mod drawable;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod mesh;
pub mod view;

pub mod prelude {
    pub use crate::assets::{
        AssetCache, FontAtlas, MaterialId, TextureHandle, TextureInfo, TextureProvider,
    };
    pub use crate::atlas::{Sprite, SpriteAtlas};
    pub use crate::chunk::{AnimeState, ChunkDrawer, ChunkPool, UvFrame};
    pub use crate::device::{DrawDevice, MaterialBatch, MAX_VERTICES};
    pub use crate::drawable::{Anime, Font, FontStyle, GlyphUvSource, Image};
    pub use crate::error::DrawError;
    pub use crate::geometry::{Color, Rect, Size};
    pub use crate::gpu::{GpuMesh, GpuTextureProvider};
    pub use crate::mesh::{sync_mesh, HostMesh};
    pub use crate::view::{DocumentCompiler, DocumentView, ViewState};
}
