//! Mesh validation utilities.
//!
//! `MeshValidator` checks mesh data integrity: correct stride, in-range
//! indices, unit normals, AABB dimensions, closed and outward-facing surfaces.

use std::collections::HashMap;

use glam::Vec3;

use crate::viewport::mesh::{face_normal, Aabb, MeshData, STRIDE};

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    /// Create a new validator for the given mesh.
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    /// Number of vertices (vertices buffer length / 9).
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len() / STRIDE
    }

    /// Number of triangles (indices buffer length / 3).
    pub fn triangle_count(&self) -> usize {
        self.mesh.indices.len() / 3
    }

    /// Check that the vertex buffer length is a multiple of 9 (the stride).
    pub fn is_stride_valid(&self) -> bool {
        self.mesh.vertices.len() % STRIDE == 0
    }

    /// Check that the index buffer length is a multiple of 3.
    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        self.mesh.vertices.chunks_exact(STRIDE).all(|v| {
            let len = Vec3::new(v[3], v[4], v[5]).length();
            (len - 1.0).abs() <= epsilon
        })
    }

    /// Number of zero-area triangles
    pub fn degenerate_triangles(&self) -> usize {
        self.mesh
            .triangles()
            .filter(|t| face_normal(t) == Vec3::ZERO)
            .count()
    }

    /// Compute the axis-aligned bounding box of the mesh.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_mesh(self.mesh)
    }

    /// Compute the dimensions (width, height, depth) of the bounding box.
    pub fn dimensions(&self) -> [f32; 3] {
        self.aabb().size().to_array()
    }

    /// Check that the AABB dimensions are approximately equal to `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        let dims = self.dimensions();
        dims.iter()
            .zip(expected)
            .all(|(d, e)| (d - e).abs() < tolerance)
    }

    /// Signed enclosed volume; positive for a closed, outward-wound surface
    pub fn signed_volume(&self) -> f32 {
        self.mesh
            .triangles()
            .map(|[a, b, c]| a.dot(b.cross(c)) / 6.0)
            .sum()
    }

    /// Every directed edge is matched by its reverse (compared by position)
    pub fn is_watertight(&self) -> bool {
        let key = |v: Vec3| (v * 1e4).round().as_ivec3().to_array();
        let mut edges: HashMap<([i32; 3], [i32; 3]), i32> = HashMap::new();
        for tri in self.mesh.triangles() {
            for i in 0..3 {
                let (a, b) = (key(tri[i]), key(tri[(i + 1) % 3]));
                *edges.entry((a, b)).or_default() += 1;
                *edges.entry((b, a)).or_default() -= 1;
            }
        }
        edges.values().all(|&n| n == 0)
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of {STRIDE}",
                self.mesh.vertices.len()
            ));
        }

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
            // triangle walks below would index out of bounds
            return errors;
        }

        if self.vertex_count() > 0 && !self.are_normals_normalized(0.1) {
            errors.push("Some normals are not unit-length (epsilon=0.1)".to_string());
        }

        let degenerate = self.degenerate_triangles();
        if degenerate > 0 {
            errors.push(format!("{degenerate} degenerate triangles"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::mesh::{cube, cylinder, DEFAULT_COLOR};

    #[test]
    fn cube_is_valid_closed_and_outward() {
        let mesh = cube(2.0, 3.0, 4.0, DEFAULT_COLOR);
        let v = MeshValidator::new(&mesh);
        assert!(v.validate_all().is_empty(), "{:?}", v.validate_all());
        assert!(v.assert_dimensions_approx([2.0, 3.0, 4.0], 1e-5));
        assert!(v.is_watertight());
        assert!((v.signed_volume() - 24.0).abs() < 1e-3);
    }

    #[test]
    fn cylinder_volume_is_positive() {
        let mesh = cylinder(1.0, 2.0, 64, DEFAULT_COLOR);
        let v = MeshValidator::new(&mesh);
        assert!(v.validate_all().is_empty());
        let expected = std::f32::consts::PI * 2.0;
        assert!((v.signed_volume() - expected).abs() < 0.05);
    }

    #[test]
    fn open_surface_is_not_watertight() {
        let mesh = MeshData::from_triangles(&[[Vec3::ZERO, Vec3::X, Vec3::Y]], DEFAULT_COLOR);
        assert!(!MeshValidator::new(&mesh).is_watertight());
    }

    #[test]
    fn detects_broken_buffers() {
        let mut mesh = cube(1.0, 1.0, 1.0, DEFAULT_COLOR);
        mesh.indices.push(999);
        let errors = MeshValidator::new(&mesh).validate_all();
        assert!(errors.iter().any(|e| e.contains("multiple of 3")));
        assert!(errors.iter().any(|e| e.contains("out of range")));
    }
}
