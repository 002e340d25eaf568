//! One rendered document view: compile-on-change, per-frame animation
//! tick, and dirty-gated publication to the host mesh.
//!
//! The view owns the draw device and the asset cache for its lifetime, so
//! nothing it resolves outlives it. Its lifecycle is an explicit state
//! machine rather than a set of host callbacks: a view is constructed
//! `Uninitialized`, attached into `Ready`, and ends `Disposed`; every
//! operation outside its legal state is a logged no-op.

use crate::assets::{AssetCache, TextureProvider};
use crate::device::DrawDevice;
use crate::error::DrawError;
use crate::mesh::{sync_mesh, HostMesh};

/// Lifecycle of a rendered document view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Constructed but not yet attached to a host surface.
    Uninitialized,
    /// Attached; `update` compiles and publishes.
    Ready,
    /// Detached for good.
    Disposed,
}

/// The markup layout front end, implemented by the host.
///
/// `compile` parses and lays out the document; `draw` walks the laid-out
/// tree and asks every visible inline element to emit its chunks. Both
/// resolve assets through the cache the view hands in.
pub trait DocumentCompiler {
    /// Lay out `markup` within `max_width`; returns the compiled height.
    fn compile(&mut self, markup: &str, max_width: f32, assets: &mut AssetCache) -> f32;
    /// Emit chunks for every visible element of the compiled layout.
    fn draw(&mut self, dt: f32, assets: &mut AssetCache, device: &mut DrawDevice);
}

pub struct DocumentView {
    state: ViewState,
    compiler: Box<dyn DocumentCompiler>,
    assets: AssetCache,
    device: DrawDevice,
    markup: String,
    max_width: f32,
    cached_markup: Option<String>,
    cached_width: f32,
    compiled_height: f32,
}

impl DocumentView {
    pub fn new(compiler: Box<dyn DocumentCompiler>, provider: Box<dyn TextureProvider>) -> Self {
        Self {
            state: ViewState::Uninitialized,
            compiler,
            assets: AssetCache::new(provider),
            device: DrawDevice::new(),
            markup: String::new(),
            max_width: 0.0,
            cached_markup: None,
            cached_width: 0.0,
            compiled_height: 0.0,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Attach to the host surface. Legal only once, from `Uninitialized`.
    pub fn attach(&mut self) {
        match self.state {
            ViewState::Uninitialized => self.state = ViewState::Ready,
            other => log::warn!("attach ignored on {other:?} view"),
        }
    }

    /// Detach for good. Idempotent; the device's chunks are released.
    pub fn dispose(&mut self) {
        if self.state != ViewState::Disposed {
            self.state = ViewState::Disposed;
            self.device.clear();
        }
    }

    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
    }

    pub fn set_max_width(&mut self, max_width: f32) {
        self.max_width = max_width;
    }

    /// Height of the last successful compile, in document pixels.
    pub fn compiled_height(&self) -> f32 {
        self.compiled_height
    }

    pub fn device(&self) -> &DrawDevice {
        &self.device
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// Per-frame driver: recompiles when the markup or width changed,
    /// ticks animations, and publishes dirty buffers into `mesh`.
    ///
    /// A zero or negative width skips the rebuild for this frame and
    /// retries once the width is valid; running content keeps animating
    /// meanwhile. Vertex overflow is the one fatal error: it propagates
    /// and nothing is published for that compile.
    pub fn update(&mut self, dt: f32, mesh: &mut dyn HostMesh) -> Result<(), DrawError> {
        match self.state {
            ViewState::Ready => {}
            other => {
                log::warn!("update ignored on {other:?} view");
                return Ok(());
            }
        }

        let changed = self.cached_markup.as_deref() != Some(self.markup.as_str())
            || self.cached_width != self.max_width;
        if changed {
            if self.max_width <= 0.0 {
                log::warn!("skipping layout rebuild: target width {} not valid", self.max_width);
            } else {
                self.compiled_height =
                    self.compiler
                        .compile(&self.markup, self.max_width, &mut self.assets);
                self.cached_markup = Some(self.markup.clone());
                self.cached_width = self.max_width;

                self.device.clear();
                self.compiler.draw(dt, &mut self.assets, &mut self.device);
                self.device.populate_vertices()?;
            }
        }

        self.device.update_animations(dt);
        sync_mesh(&mut self.device, mesh);
        Ok(())
    }
}
