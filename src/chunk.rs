//! Per-primitive vertex accumulation and the chunk free-list pool.
//!
//! A chunk holds the positions, colors and texture coordinates of one
//! atomic visual unit: a single quad for images, sprites and fill
//! rectangles, or an arbitrary (still multiple-of-4) run of glyph quads
//! for shaped text. Chunks are acquired from a pool at draw time, handed
//! to the draw device, and released back when the device is cleared.

use std::rc::Rc;

use crate::geometry::{Color, Rect};

/// One animation frame's texture coordinates, one entry per quad vertex in
/// the shared winding order (bottom-left, top-left, top-right, bottom-right).
pub type UvFrame = [[f32; 2]; 4];

/// Timing and frame-table state for a sprite-animation chunk.
///
/// The frame table is shared with the anime asset that produced the chunk,
/// so many chunks of the same animation reference one table. Each tick
/// writes into the draw device's flat UV array; the chunk never owns that
/// array, it only knows its slice via the offset the device hands in.
#[derive(Debug, Clone)]
pub struct AnimeState {
    /// Seconds between frame advances (`1.0 / fps`).
    frame_interval: f32,
    frames: Rc<Vec<UvFrame>>,
    cursor: usize,
    elapsed: f32,
}

impl AnimeState {
    pub fn new(frame_interval: f32, frames: Rc<Vec<UvFrame>>) -> Self {
        Self {
            frame_interval,
            frames,
            cursor: 0,
            elapsed: 0.0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Current index into the frame table, always in `[0, frame_count)`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Accumulate `dt`; once a full interval has elapsed, write the current
    /// frame's UVs into `uvs` at `start` and advance the cursor with
    /// wraparound. Returns whether the UV buffer was touched.
    pub(crate) fn tick(&mut self, dt: f32, uvs: &mut [[f32; 2]], start: usize) -> bool {
        if self.frames.is_empty() {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed < self.frame_interval {
            return false;
        }
        self.elapsed = 0.0;
        let frame = &self.frames[self.cursor];
        uvs[start..start + frame.len()].copy_from_slice(frame);
        self.cursor = (self.cursor + 1) % self.frames.len();
        true
    }
}

/// Vertex data for one atomic visual unit.
///
/// The three buffers stay parallel: every position has exactly one color
/// and one UV entry at the same index.
#[derive(Debug, Default)]
pub struct ChunkDrawer {
    /// Document-space rectangle, used only by the batcher's overlap test.
    pub rect: Rect,
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<Color>,
    pub uvs: Vec<[f32; 2]>,
    /// Present only for sprite-animation chunks.
    pub anim: Option<AnimeState>,
}

impl ChunkDrawer {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_animated(&self) -> bool {
        self.anim.is_some()
    }

    /// Append one vertex with its parallel color and UV entry.
    pub fn push_vertex(&mut self, position: [f32; 3], color: Color, uv: [f32; 2]) {
        self.positions.push(position);
        self.colors.push(color);
        self.uvs.push(uv);
    }

    /// Append a full quad for `rect` in the fixed winding order:
    /// bottom-left, top-left, top-right, bottom-right. Document-space `y`
    /// grows downward and is stored negated in render space.
    pub fn push_quad(&mut self, rect: Rect, color: Color, uv: &UvFrame) {
        self.push_vertex([rect.x, -rect.y - rect.height, 0.0], color, uv[0]);
        self.push_vertex([rect.x, -rect.y, 0.0], color, uv[1]);
        self.push_vertex([rect.x + rect.width, -rect.y, 0.0], color, uv[2]);
        self.push_vertex([rect.x + rect.width, -rect.y - rect.height, 0.0], color, uv[3]);
    }

    fn reset(&mut self) {
        self.rect = Rect::default();
        self.positions.clear();
        self.colors.clear();
        self.uvs.clear();
        self.anim = None;
    }
}

/// Free-list pool for chunk drawers.
///
/// Ownership is linear: `acquire` hands the chunk out by value, the draw
/// device takes it back through `merge_chunks`, and `release` returns it
/// here once the device is cleared. A released chunk keeps its buffer
/// capacity so steady-state recompiles stop allocating.
#[derive(Debug, Default)]
pub struct ChunkPool {
    free: Vec<ChunkDrawer>,
}

impl ChunkPool {
    pub fn acquire(&mut self) -> ChunkDrawer {
        self.free.pop().unwrap_or_default()
    }

    pub fn release(&mut self, mut chunk: ChunkDrawer) {
        chunk.reset();
        self.free.push(chunk);
    }

    /// Number of chunks currently parked in the free list.
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv_frame(v: f32) -> UvFrame {
        [[v, v], [v, v], [v, v], [v, v]]
    }

    #[test]
    fn push_quad_winding_and_render_space() {
        let mut chunk = ChunkDrawer::default();
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        chunk.push_quad(rect, Color::WHITE, &[[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);

        assert_eq!(chunk.vertex_count(), 4);
        // bottom-left, top-left, top-right, bottom-right with y negated
        assert_eq!(chunk.positions[0], [10.0, -60.0, 0.0]);
        assert_eq!(chunk.positions[1], [10.0, -20.0, 0.0]);
        assert_eq!(chunk.positions[2], [40.0, -20.0, 0.0]);
        assert_eq!(chunk.positions[3], [40.0, -60.0, 0.0]);
        assert_eq!(chunk.colors.len(), 4);
        assert_eq!(chunk.uvs.len(), 4);
    }

    #[test]
    fn buffers_stay_parallel() {
        let mut chunk = ChunkDrawer::default();
        for i in 0..8 {
            chunk.push_vertex([i as f32, 0.0, 0.0], Color::BLACK, [0.0, 0.0]);
        }
        assert_eq!(chunk.positions.len(), chunk.colors.len());
        assert_eq!(chunk.positions.len(), chunk.uvs.len());
    }

    #[test]
    fn tick_accumulates_until_interval() {
        let frames = Rc::new(vec![uv_frame(0.0), uv_frame(1.0)]);
        let mut state = AnimeState::new(0.1, frames);
        let mut uvs = vec![[9.0, 9.0]; 4];

        assert!(!state.tick(0.05, &mut uvs, 0));
        assert_eq!(uvs[0], [9.0, 9.0]);
        // second tick reaches the interval exactly and fires
        assert!(state.tick(0.05, &mut uvs, 0));
        assert_eq!(uvs, vec![[0.0, 0.0]; 4]);
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn tick_wraps_cursor() {
        let frames = Rc::new(vec![uv_frame(0.0), uv_frame(1.0)]);
        let mut state = AnimeState::new(0.1, frames);
        let mut uvs = vec![[0.0, 0.0]; 4];

        assert!(state.tick(0.1, &mut uvs, 0));
        assert_eq!(state.cursor(), 1);
        assert!(state.tick(0.1, &mut uvs, 0));
        assert_eq!(state.cursor(), 0);
        assert_eq!(uvs, vec![[1.0, 1.0]; 4]);
    }

    #[test]
    fn tick_writes_at_start_offset() {
        let frames = Rc::new(vec![uv_frame(5.0)]);
        let mut state = AnimeState::new(0.1, frames);
        let mut uvs = vec![[0.0, 0.0]; 12];

        assert!(state.tick(0.2, &mut uvs, 4));
        assert_eq!(uvs[3], [0.0, 0.0]);
        assert_eq!(uvs[4], [5.0, 5.0]);
        assert_eq!(uvs[7], [5.0, 5.0]);
        assert_eq!(uvs[8], [0.0, 0.0]);
    }

    #[test]
    fn tick_with_empty_frame_table_is_noop() {
        let mut state = AnimeState::new(0.1, Rc::new(Vec::new()));
        let mut uvs = vec![[0.0, 0.0]; 4];
        assert!(!state.tick(10.0, &mut uvs, 0));
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn pool_reuses_released_chunks() {
        let mut pool = ChunkPool::default();
        let mut chunk = pool.acquire();
        chunk.push_quad(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE, &uv_frame(0.0));
        chunk.anim = Some(AnimeState::new(0.1, Rc::new(vec![uv_frame(0.0)])));
        pool.release(chunk);
        assert_eq!(pool.idle(), 1);

        let reused = pool.acquire();
        assert_eq!(pool.idle(), 0);
        assert_eq!(reused.vertex_count(), 0);
        assert!(!reused.is_animated());
        assert_eq!(reused.rect, Rect::default());
    }
}
