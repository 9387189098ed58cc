//! Tessellation of scene node primitives

use super::NodeKind;
use crate::viewport::mesh::{self, MeshData};

/// Radial segments for a smooth cylinder
pub const CYLINDER_SEGMENTS: u32 = 64;
/// Radial segments for the hexagonal prism
pub const HEXAGON_SEGMENTS: u32 = 6;

/// Turn a node's geometry into mesh data. `None` for nodes without triangles.
pub fn tessellate(kind: &NodeKind, color: [f32; 3]) -> Option<MeshData> {
    match kind {
        NodeKind::Group | NodeKind::RemoteModel { .. } => None,
        NodeKind::Box { size } => Some(mesh::cube(size.x, size.y, size.z, color)),
        NodeKind::Cylinder {
            radius,
            height,
            segments,
        } => Some(mesh::cylinder(*radius, *height, *segments, color)),
        NodeKind::Mesh(data) if data.is_empty() => None,
        NodeKind::Mesh(data) => Some(data.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn groups_have_no_geometry() {
        assert!(tessellate(&NodeKind::Group, mesh::DEFAULT_COLOR).is_none());
        assert!(tessellate(&NodeKind::Mesh(MeshData::default()), mesh::DEFAULT_COLOR).is_none());
    }

    #[test]
    fn box_and_cylinder_tessellate() {
        let b = tessellate(&NodeKind::Box { size: Vec3::ONE }, mesh::DEFAULT_COLOR).unwrap();
        assert_eq!(b.triangle_count(), 12);
        let c = tessellate(
            &NodeKind::Cylinder { radius: 1.0, height: 1.0, segments: HEXAGON_SEGMENTS },
            mesh::DEFAULT_COLOR,
        )
        .unwrap();
        assert_eq!(c.triangle_count(), 24);
    }
}
