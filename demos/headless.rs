//! Headless end-to-end run: compile a tiny document, batch it, animate it
//! for a few frames, and upload the mesh into wgpu buffers without
//! opening a window.

use std::sync::Arc;

use placard::prelude::*;

/// Stand-in for the host's markup front end: lays nothing out, just draws
/// a background strip, one atlas sprite and one animated sprite.
struct DemoCompiler;

impl DocumentCompiler for DemoCompiler {
    fn compile(&mut self, markup: &str, _max_width: f32, _assets: &mut AssetCache) -> f32 {
        markup.lines().count().max(1) as f32 * 24.0
    }

    fn draw(&mut self, _dt: f32, assets: &mut AssetCache, device: &mut DrawDevice) {
        assets.fill_rect(
            Rect::new(0.0, 0.0, 320.0, 48.0),
            Color::from_hex(0x202830),
            device,
        );
        let icon = assets.load_image("sheet#tile_001");
        icon.draw(
            "icon",
            Rect::new(8.0, 8.0, 32.0, 32.0),
            Color::WHITE,
            None,
            device,
        );
        let spinner = assets.load_anime("sheet#tile_");
        spinner.draw(
            "spinner",
            Rect::new(48.0, 8.0, 32.0, 32.0),
            Color::WHITE,
            None,
            10,
            device,
        );
    }
}

fn main() {
    env_logger::init();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(
        instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
    )
    .expect("Failed to find GPU adapter");
    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("placard demo device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::default(),
        experimental_features: wgpu::ExperimentalFeatures::default(),
        trace: wgpu::Trace::Off,
    }))
    .expect("Failed to create device");
    let device = Arc::new(device);
    let queue = Arc::new(queue);

    let mut provider = GpuTextureProvider::new(Arc::clone(&device), Arc::clone(&queue));
    let checker = image::RgbaImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgba([240, 240, 240, 255])
        } else {
            image::Rgba([40, 40, 40, 255])
        }
    });
    let info = provider.upload_rgba(&checker).expect("texture upload");
    provider.register_atlas(
        "sheet",
        SpriteAtlas::grid(info.handle, info.width, info.height, 32, 32, "tile_"),
    );

    let mut view = DocumentView::new(Box::new(DemoCompiler), Box::new(provider));
    let mut mesh = GpuMesh::new(Arc::clone(&device));

    view.attach();
    view.set_markup("<p>hello <img src=\"sheet#tile_001\"/> world</p>");
    view.set_max_width(320.0);

    for frame in 0..6 {
        view.update(1.0 / 30.0, &mut mesh).expect("update failed");
        println!(
            "frame {frame}: {} vertices, {} submeshes, compiled height {}",
            view.device().verts().len(),
            mesh.submesh_count(),
            view.compiled_height(),
        );
    }

    for (i, material) in mesh.materials().iter().enumerate() {
        let (_, index_count) = mesh.submesh(i).expect("submesh");
        println!(
            "submesh {i}: {index_count} indices on texture {:?}",
            view.assets().material_texture(*material),
        );
    }
}
