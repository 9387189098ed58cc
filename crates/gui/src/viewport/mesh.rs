use glam::Vec3;

/// Default preview color for generated solids
pub const DEFAULT_COLOR: [f32; 3] = [0.0, 0.8, 0.85];

/// Floats per interleaved vertex
pub const STRIDE: usize = 9;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    /// Iterate triangles as position triples, in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.position(tri[0] as usize),
                self.position(tri[1] as usize),
                self.position(tri[2] as usize),
            ]
        })
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        if offset == Vec3::ZERO {
            return;
        }
        for v in self.vertices.chunks_exact_mut(STRIDE) {
            v[0] += offset.x;
            v[1] += offset.y;
            v[2] += offset.z;
        }
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Build a flat-shaded mesh from a triangle soup.
    pub fn from_triangles(triangles: &[[Vec3; 3]], color: [f32; 3]) -> Self {
        let mut vertices = Vec::with_capacity(triangles.len() * 3 * STRIDE);
        let mut indices = Vec::with_capacity(triangles.len() * 3);
        for tri in triangles {
            let normal = face_normal(tri);
            let base = (vertices.len() / STRIDE) as u32;
            for p in tri {
                push_vert(&mut vertices, p.x, p.y, p.z, normal, color);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        Self { vertices, indices }
    }
}

/// Unit normal of a counter-clockwise triangle (zero for degenerate ones).
pub fn face_normal(tri: &[Vec3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn from_mesh(mesh: &MeshData) -> Self {
        let mut aabb = Self::empty();
        for i in 0..mesh.vertex_count() {
            aabb.include(mesh.position(i));
        }
        aabb
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }
}

// ── Primitive generation ─────────────────────────────────────

/// Origin-centered box, 12 outward-wound triangles.
pub fn cube(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * STRIDE);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / STRIDE) as u32;
        for v in quad {
            push_vert(&mut vertices, v.x, v.y, v.z, *normal, color);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Origin-centered cylinder along Y. `segments` = 6 gives a hexagonal prism.
pub fn cylinder(radius: f32, height: f32, segments: u32, color: [f32; 3]) -> MeshData {
    let hh = height * 0.5;
    let segments = segments.max(3);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side faces
    for i in 0..segments {
        let a0 = (i as f32) * std::f32::consts::TAU / segments as f32;
        let a1 = ((i + 1) as f32) * std::f32::consts::TAU / segments as f32;

        let c0 = a0.cos();
        let s0 = a0.sin();
        let c1 = a1.cos();
        let s1 = a1.sin();

        let n0 = Vec3::new(c0, 0.0, s0);
        let n1 = Vec3::new(c1, 0.0, s1);

        let base = (vertices.len() / STRIDE) as u32;

        push_vert(&mut vertices, radius * c0, -hh, radius * s0, n0, color);
        push_vert(&mut vertices, radius * c1, -hh, radius * s1, n1, color);
        push_vert(&mut vertices, radius * c1, hh, radius * s1, n1, color);
        push_vert(&mut vertices, radius * c0, hh, radius * s0, n0, color);

        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    add_cap(&mut vertices, &mut indices, radius, hh, segments, Vec3::Y, color);
    add_cap(&mut vertices, &mut indices, radius, -hh, segments, Vec3::NEG_Y, color);

    MeshData { vertices, indices }
}

// ── Helpers ──────────────────────────────────────────────────

pub(crate) fn push_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[px, py, pz, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

/// Triangle fan cap; winding follows `normal` (±Y).
fn add_cap(
    vertices: &mut Vec<f32>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    segments: u32,
    normal: Vec3,
    color: [f32; 3],
) {
    let center_idx = (vertices.len() / STRIDE) as u32;
    push_vert(vertices, 0.0, y, 0.0, normal, color);

    for i in 0..segments {
        let angle = (i as f32) * std::f32::consts::TAU / segments as f32;
        push_vert(vertices, radius * angle.cos(), y, radius * angle.sin(), normal, color);
    }

    for i in 0..segments {
        let next = (i + 1) % segments;
        if normal.y > 0.0 {
            indices.extend_from_slice(&[center_idx, center_idx + 1 + next, center_idx + 1 + i]);
        } else {
            indices.extend_from_slice(&[center_idx, center_idx + 1 + i, center_idx + 1 + next]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &MeshData) {
        let center = Aabb::from_mesh(mesh).center();
        for tri in mesh.triangles() {
            let n = face_normal(&tri);
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(n.dot(centroid - center) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn cube_has_twelve_outward_triangles() {
        let mesh = cube(2.0, 3.0, 4.0, DEFAULT_COLOR);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(Aabb::from_mesh(&mesh).size(), Vec3::new(2.0, 3.0, 4.0));
        assert_outward(&mesh);
    }

    #[test]
    fn cylinder_windings_point_outward() {
        let mesh = cylinder(5.0, 10.0, 64, DEFAULT_COLOR);
        assert_eq!(mesh.triangle_count(), 64 * 2 + 64 * 2);
        assert_outward(&mesh);

        let hex = cylinder(5.0, 10.0, 6, DEFAULT_COLOR);
        assert_eq!(hex.triangle_count(), 24);
        assert_outward(&hex);
    }

    #[test]
    fn translate_and_append() {
        let mut a = cube(1.0, 1.0, 1.0, DEFAULT_COLOR);
        let mut b = cube(1.0, 1.0, 1.0, DEFAULT_COLOR);
        b.translate(Vec3::new(10.0, 0.0, 0.0));
        a.append(&b);

        assert_eq!(a.triangle_count(), 24);
        let aabb = Aabb::from_mesh(&a);
        assert_eq!(aabb.min.x, -0.5);
        assert_eq!(aabb.max.x, 10.5);
        assert!(a.indices.iter().all(|&i| (i as usize) < a.vertex_count()));
    }

    #[test]
    fn from_triangles_is_flat_shaded() {
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mesh = MeshData::from_triangles(&[tri], DEFAULT_COLOR);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(&mesh.vertices[3..6], &[0.0, 0.0, 1.0]);
    }
}
