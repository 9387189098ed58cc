//! Binary STL export.
//!
//! Layout: 80-byte header, u32 triangle count, then 50 bytes per triangle
//! (normal, three vertices, u16 attribute), all little-endian.

use glam::Vec3;

use crate::build::SceneNode;
use crate::viewport::mesh::face_normal;

/// Header prefix; the rest of the 80 bytes is zero padding
pub const STL_HEADER_PREFIX: &[u8] = b"fast3dprint binary STL";

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

/// Decoded STL facet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlTriangle {
    pub normal: Vec3,
    pub vertices: [Vec3; 3],
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("STL data too short: {0} bytes")]
    Truncated(usize),
    #[error("STL declares {declared} triangles but holds {actual}")]
    CountMismatch { declared: u32, actual: usize },
    #[error("scene has more triangles than binary STL can hold")]
    TooManyTriangles,
    #[error("failed to write STL: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize every exportable triangle of `root` as binary STL.
///
/// Remote models carry no local triangles and are not written.
pub fn export_stl(root: &SceneNode) -> Result<Vec<u8>, ExportError> {
    write_stl(&root.triangles())
}

/// Binary STL for a triangle list
pub fn write_stl(triangles: &[[Vec3; 3]]) -> Result<Vec<u8>, ExportError> {
    let count = u32::try_from(triangles.len()).map_err(|_| ExportError::TooManyTriangles)?;

    let mut out = Vec::with_capacity(HEADER_LEN + 4 + triangles.len() * TRIANGLE_LEN);

    // Header
    out.extend_from_slice(STL_HEADER_PREFIX);
    out.resize(HEADER_LEN, 0);
    out.extend_from_slice(&count.to_le_bytes());

    // Facets
    for tri in triangles {
        push_vec3(&mut out, face_normal(tri));
        for v in tri {
            push_vec3(&mut out, *v);
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(out)
}

/// Export `root` straight to a file
pub fn export_stl_to_file(root: &SceneNode, path: &std::path::Path) -> Result<usize, ExportError> {
    let bytes = export_stl(root)?;
    std::fs::write(path, &bytes)?;
    tracing::info!("exported {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

/// Decode a binary STL buffer
pub fn read_stl(bytes: &[u8]) -> Result<Vec<StlTriangle>, ExportError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(ExportError::Truncated(bytes.len()));
    }
    let declared = read_u32(bytes, HEADER_LEN);
    let body = &bytes[HEADER_LEN + 4..];
    let actual = body.len() / TRIANGLE_LEN;
    if actual != declared as usize || body.len() % TRIANGLE_LEN != 0 {
        return Err(ExportError::CountMismatch { declared, actual });
    }

    Ok(body
        .chunks_exact(TRIANGLE_LEN)
        .map(|facet| StlTriangle {
            normal: read_vec3(facet, 0),
            vertices: [read_vec3(facet, 12), read_vec3(facet, 24), read_vec3(facet, 36)],
        })
        .collect())
}

fn push_vec3(out: &mut Vec<u8>, v: Vec3) {
    for f in v.to_array() {
        out.extend_from_slice(&f.to_le_bytes());
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_vec3(bytes: &[u8], at: usize) -> Vec3 {
    Vec3::new(read_f32(bytes, at), read_f32(bytes, at + 4), read_f32(bytes, at + 8))
}

/// Edge-sensitive export request: one `fire` yields exactly one `take`.
#[derive(Debug, Default)]
pub struct ExportTrigger {
    armed: bool,
}

impl ExportTrigger {
    pub fn fire(&mut self) {
        self.armed = true;
    }

    /// True once per `fire`, then disarmed
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::NodeKind;

    fn unit_cube_scene() -> SceneNode {
        SceneNode::group("root").with_child(SceneNode::new("cube", NodeKind::Box { size: Vec3::ONE }))
    }

    #[test]
    fn unit_cube_exports_twelve_outward_triangles() {
        let bytes = export_stl(&unit_cube_scene()).unwrap();
        assert_eq!(bytes.len(), 80 + 4 + 12 * 50);
        assert!(bytes.starts_with(STL_HEADER_PREFIX));
        assert_eq!(read_u32(&bytes, 80), 12);

        let tris = read_stl(&bytes).unwrap();
        assert_eq!(tris.len(), 12);
        for t in &tris {
            let centroid = (t.vertices[0] + t.vertices[1] + t.vertices[2]) / 3.0;
            assert!(t.normal.dot(centroid) > 0.0, "inward facet {t:?}");
            assert!((t.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn export_is_byte_identical_when_repeated() {
        let scene = unit_cube_scene();
        assert_eq!(export_stl(&scene).unwrap(), export_stl(&scene).unwrap());
    }

    #[test]
    fn empty_scene_is_header_only() {
        let bytes = export_stl(&SceneNode::group("root")).unwrap();
        assert_eq!(bytes.len(), 84);
        assert!(read_stl(&bytes).unwrap().is_empty());
    }

    #[test]
    fn degenerate_triangle_gets_zero_normal() {
        let bytes = write_stl(&[[Vec3::ZERO, Vec3::X, Vec3::X * 2.0]]).unwrap();
        let tris = read_stl(&bytes).unwrap();
        assert_eq!(tris[0].normal, Vec3::ZERO);
    }

    #[test]
    fn read_rejects_truncated_data() {
        assert!(matches!(read_stl(&[0u8; 10]), Err(ExportError::Truncated(10))));

        let mut bytes = export_stl(&unit_cube_scene()).unwrap();
        bytes.truncate(bytes.len() - 50);
        assert!(matches!(
            read_stl(&bytes),
            Err(ExportError::CountMismatch { declared: 12, actual: 11 })
        ));
    }

    #[test]
    fn trigger_fires_once() {
        let mut trigger = ExportTrigger::default();
        assert!(!trigger.take());
        trigger.fire();
        trigger.fire();
        assert!(trigger.take());
        assert!(!trigger.take());
    }
}
