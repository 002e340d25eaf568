//! The sync boundary between the draw device's flat arrays and the host's
//! renderable mesh object.
//!
//! Uploads are gated by the device's three dirty flags: a buffer is pushed
//! to the host only when its flag is set, and syncing consumes the flag.
//! Until a layout pass has populated the device, nothing is published at
//! all — a failed compile can never leak a partial mesh.

use crate::assets::MaterialId;
use crate::device::DrawDevice;
use crate::geometry::Color;

/// Host-side mesh the flattened arrays upload into.
///
/// The three attribute buffers are parallel and always replaced whole;
/// only animation-driven UV swaps make `set_uvs` fire without the others.
pub trait HostMesh {
    fn set_vertices(&mut self, verts: &[[f32; 3]]);
    fn set_colors(&mut self, colors: &[Color]);
    fn set_uvs(&mut self, uvs: &[[f32; 2]]);
    /// Replace the submesh index lists and their materials, in paint order.
    fn set_submeshes(&mut self, submeshes: &[Vec<u16>], materials: &[MaterialId]);
}

/// Push whichever buffers are dirty into `mesh`, consuming their flags.
pub fn sync_mesh(device: &mut DrawDevice, mesh: &mut dyn HostMesh) {
    if !device.is_populated() {
        return;
    }
    if device.take_vert_dirty() {
        mesh.set_vertices(device.verts());
        let materials: Vec<MaterialId> = device.materials().collect();
        mesh.set_submeshes(device.submeshes(), &materials);
    }
    if device.take_color_dirty() {
        mesh.set_colors(device.colors());
    }
    if device.take_uv_dirty() {
        mesh.set_uvs(device.uvs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::AnimeState;
    use crate::geometry::Rect;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingMesh {
        vertex_uploads: usize,
        color_uploads: usize,
        uv_uploads: usize,
        submesh_uploads: usize,
        last_uvs: Vec<[f32; 2]>,
    }

    impl HostMesh for RecordingMesh {
        fn set_vertices(&mut self, _verts: &[[f32; 3]]) {
            self.vertex_uploads += 1;
        }
        fn set_colors(&mut self, _colors: &[Color]) {
            self.color_uploads += 1;
        }
        fn set_uvs(&mut self, uvs: &[[f32; 2]]) {
            self.uv_uploads += 1;
            self.last_uvs = uvs.to_vec();
        }
        fn set_submeshes(&mut self, _submeshes: &[Vec<u16>], _materials: &[MaterialId]) {
            self.submesh_uploads += 1;
        }
    }

    fn populated_device() -> DrawDevice {
        let mut device = DrawDevice::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut chunk = device.acquire_chunk();
        chunk.rect = rect;
        chunk.push_quad(
            rect,
            Color::WHITE,
            &[[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        );
        chunk.anim = Some(AnimeState::new(
            0.1,
            Rc::new(vec![[[0.5, 0.5]; 4], [[0.25, 0.25]; 4]]),
        ));
        device.merge_chunks(crate::assets::MaterialId::new(1), chunk);
        device.populate_vertices().unwrap();
        device
    }

    #[test]
    fn nothing_publishes_before_populate() {
        let mut device = DrawDevice::new();
        let mut mesh = RecordingMesh::default();
        sync_mesh(&mut device, &mut mesh);
        assert_eq!(mesh.vertex_uploads, 0);
        assert_eq!(mesh.uv_uploads, 0);
        // the flags stay raised for the sync that follows a real populate
        assert!(device.vert_dirty());
    }

    #[test]
    fn first_sync_uploads_everything_second_uploads_nothing() {
        let mut device = populated_device();
        let mut mesh = RecordingMesh::default();

        sync_mesh(&mut device, &mut mesh);
        assert_eq!(mesh.vertex_uploads, 1);
        assert_eq!(mesh.submesh_uploads, 1);
        assert_eq!(mesh.color_uploads, 1);
        assert_eq!(mesh.uv_uploads, 1);

        sync_mesh(&mut device, &mut mesh);
        assert_eq!(mesh.vertex_uploads, 1);
        assert_eq!(mesh.color_uploads, 1);
        assert_eq!(mesh.uv_uploads, 1);
    }

    #[test]
    fn animation_tick_reuploads_only_uvs() {
        let mut device = populated_device();
        let mut mesh = RecordingMesh::default();
        sync_mesh(&mut device, &mut mesh);

        device.update_animations(0.1);
        sync_mesh(&mut device, &mut mesh);
        assert_eq!(mesh.vertex_uploads, 1);
        assert_eq!(mesh.color_uploads, 1);
        assert_eq!(mesh.uv_uploads, 2);
        assert_eq!(mesh.last_uvs, vec![[0.5, 0.5]; 4]);
    }
}
