//! The draw device: per-material batching, flattening and animation tick.
//!
//! Drawables emit chunks in document order. The device groups them into
//! material batches whose list order is also paint order, then flattens
//! every batch into the parallel vertex/color/UV arrays the host consumes,
//! with one 16-bit triangle-index list per batch. Animated chunks are
//! re-found each frame through a registry of flat-array offsets so UV
//! swaps never touch geometry.

use crate::assets::MaterialId;
use crate::chunk::{ChunkDrawer, ChunkPool};
use crate::error::DrawError;
use crate::geometry::Color;

/// Hard ceiling on the flattened vertex count. Submesh indices are 16-bit,
/// so a document reaching this count cannot be uploaded.
pub const MAX_VERTICES: usize = 65_000;

/// An ordered group of chunks sharing one material, rendered as one
/// submesh. Batches are painted in insertion order, so a later batch
/// always renders on top of an earlier one.
#[derive(Debug)]
pub struct MaterialBatch {
    pub material: MaterialId,
    pub chunks: Vec<ChunkDrawer>,
}

/// Locates one animated chunk and its slice of the flat UV array.
///
/// The generation stamp ties the entry to the populate pass that produced
/// it; `clear` bumps the device generation, so an entry can never write
/// into arrays rebuilt after its chunk was released.
#[derive(Debug, Clone, Copy)]
struct AnimeRef {
    batch: usize,
    chunk: usize,
    start: usize,
    generation: u64,
}

/// Aggregates chunks for one rendered document view.
///
/// Lifecycle per re-layout: `clear`, any number of `merge_chunks`, one
/// `populate_vertices`. `update_animations` runs every frame in between.
#[derive(Debug, Default)]
pub struct DrawDevice {
    batches: Vec<MaterialBatch>,
    anime: Vec<AnimeRef>,
    pool: ChunkPool,

    verts: Vec<[f32; 3]>,
    colors: Vec<Color>,
    uvs: Vec<[f32; 2]>,
    triangles: Vec<Vec<u16>>,

    num_verts: usize,
    generation: u64,
    populated: bool,

    vert_dirty: bool,
    color_dirty: bool,
    uv_dirty: bool,
}

impl DrawDevice {
    pub fn new() -> Self {
        Self {
            vert_dirty: true,
            color_dirty: true,
            uv_dirty: true,
            ..Self::default()
        }
    }

    /// Take a pooled chunk drawer to fill and hand back via `merge_chunks`.
    pub fn acquire_chunk(&mut self) -> ChunkDrawer {
        self.pool.acquire()
    }

    /// Merge a finished chunk into the batch list.
    ///
    /// Batches are scanned newest to oldest. The first batch with the same
    /// material absorbs the chunk; but if a chunk of a different-material
    /// batch overlaps the incoming rect before one is found, the scan stops
    /// there and a new batch opens, keeping the overlapped content painted
    /// underneath. Merging into any same-material batch reached without
    /// crossing an overlap is safe: same material means same texture state,
    /// and intra-material draw order cannot change the output.
    pub fn merge_chunks(&mut self, material: MaterialId, chunk: ChunkDrawer) {
        self.num_verts += chunk.vertex_count();

        for i in (0..self.batches.len()).rev() {
            if self.batches[i].material == material {
                self.batches[i].chunks.push(chunk);
                return;
            }
            let blocked = self.batches[i]
                .chunks
                .iter()
                .any(|older| older.rect.intersects(&chunk.rect));
            if blocked {
                break;
            }
        }
        self.batches.push(MaterialBatch {
            material,
            chunks: vec![chunk],
        });
    }

    /// Flatten every batch into the parallel arrays and build one
    /// quad-triangulated index list per batch.
    ///
    /// Rebuilds wholesale, so calling it again without intervening merges
    /// produces identical output. Fails before touching any array when the
    /// accumulated vertex count reaches the 16-bit index ceiling; nothing
    /// is published for a failing compile.
    pub fn populate_vertices(&mut self) -> Result<(), DrawError> {
        if self.num_verts >= MAX_VERTICES {
            return Err(DrawError::VertexOverflow {
                count: self.num_verts,
                limit: MAX_VERTICES,
            });
        }

        self.verts.clear();
        self.colors.clear();
        self.uvs.clear();
        self.triangles.clear();
        self.anime.clear();

        let mut total = 0usize;
        for (bi, batch) in self.batches.iter().enumerate() {
            let batch_start = total;
            for (ci, chunk) in batch.chunks.iter().enumerate() {
                if chunk.is_animated() {
                    self.anime.push(AnimeRef {
                        batch: bi,
                        chunk: ci,
                        start: total,
                        generation: self.generation,
                    });
                }
                self.verts.extend_from_slice(&chunk.positions);
                self.colors.extend_from_slice(&chunk.colors);
                self.uvs.extend_from_slice(&chunk.uvs);
                total += chunk.vertex_count();
            }

            let mut indices = Vec::with_capacity((total - batch_start) / 4 * 6);
            let mut i = batch_start;
            while i + 3 < total {
                let v = i as u16;
                indices.extend_from_slice(&[v, v + 1, v + 2, v + 2, v + 3, v]);
                i += 4;
            }
            self.triangles.push(indices);
        }

        log::debug!(
            "populated {} vertices across {} batches",
            total,
            self.batches.len()
        );

        self.populated = true;
        self.vert_dirty = true;
        self.color_dirty = true;
        self.uv_dirty = true;
        Ok(())
    }

    /// Tick every registered animated chunk. Runs once per rendered frame
    /// whether or not a re-layout happened.
    pub fn update_animations(&mut self, dt: f32) {
        let Self {
            batches,
            anime,
            uvs,
            uv_dirty,
            generation,
            ..
        } = self;
        for aref in anime.iter() {
            if aref.generation != *generation {
                continue;
            }
            let chunk = &mut batches[aref.batch].chunks[aref.chunk];
            if let Some(anim) = chunk.anim.as_mut() {
                if anim.tick(dt, uvs, aref.start) {
                    *uv_dirty = true;
                }
            }
        }
    }

    /// Full teardown at the start of a re-layout: raise every dirty flag,
    /// discard the flat arrays, release all chunks back into the pool and
    /// empty the batch list.
    pub fn clear(&mut self) {
        self.vert_dirty = true;
        self.color_dirty = true;
        self.uv_dirty = true;
        self.verts.clear();
        self.colors.clear();
        self.uvs.clear();
        self.triangles.clear();
        self.anime.clear();
        self.num_verts = 0;
        self.populated = false;
        self.generation += 1;
        for mut batch in self.batches.drain(..) {
            for chunk in batch.chunks.drain(..) {
                self.pool.release(chunk);
            }
        }
    }

    /// Flat vertex positions, parallel with `colors` and `uvs`.
    pub fn verts(&self) -> &[[f32; 3]] {
        &self.verts
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// One triangle-index list per batch, in paint order.
    pub fn submeshes(&self) -> &[Vec<u16>] {
        &self.triangles
    }

    /// One material per submesh, in the same paint order.
    pub fn materials(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.batches.iter().map(|b| b.material)
    }

    /// Accumulated vertex count across all merged chunks.
    pub fn vertex_count(&self) -> usize {
        self.num_verts
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Whether `populate_vertices` has succeeded since the last `clear`.
    /// The sync boundary publishes nothing until it has.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn vert_dirty(&self) -> bool {
        self.vert_dirty
    }

    pub fn color_dirty(&self) -> bool {
        self.color_dirty
    }

    pub fn uv_dirty(&self) -> bool {
        self.uv_dirty
    }

    /// Read-and-clear accessors for the host's upload gating.
    pub fn take_vert_dirty(&mut self) -> bool {
        std::mem::take(&mut self.vert_dirty)
    }

    pub fn take_color_dirty(&mut self) -> bool {
        std::mem::take(&mut self.color_dirty)
    }

    pub fn take_uv_dirty(&mut self) -> bool {
        std::mem::take(&mut self.uv_dirty)
    }

    #[cfg(test)]
    pub(crate) fn pool_idle(&self) -> usize {
        self.pool.idle()
    }
}
