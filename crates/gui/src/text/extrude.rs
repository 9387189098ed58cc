//! Text extrusion adapter: `TextSpec` → extruded glyph solid.

use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, Vec3};
use shared::TextSpec;

use super::triangulate::{group_contours, triangulate, Polygon};
use super::typeface::Contour;
use super::{FontStatus, GlyphSource};
use crate::build::{NodeKind, SceneNode};
use crate::units::cm_to_scene;
use crate::viewport::mesh::{Aabb, MeshData, DEFAULT_COLOR};

/// Bevel and curve quality settings for extruded text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BevelProfile {
    pub thickness: f64,
    pub size: f64,
    pub offset: f64,
    pub segments: u32,
    pub curve_segments: u32,
}

impl BevelProfile {
    /// Same profile with lengths converted from centimeters to scene units
    pub fn to_scene(&self) -> Self {
        Self {
            thickness: cm_to_scene(self.thickness) as f64,
            size: cm_to_scene(self.size) as f64,
            offset: cm_to_scene(self.offset) as f64,
            ..*self
        }
    }
}

/// Fixed text bevel (centimeters). Not user-tunable.
pub const TEXT_BEVEL: BevelProfile = BevelProfile {
    thickness: 0.02,
    size: 0.02,
    offset: 0.0,
    segments: 5,
    curve_segments: 12,
};

/// Outcome of a text extrusion request
#[derive(Debug, Clone, PartialEq)]
pub enum TextExtrusion {
    /// Nothing to draw (blank text or no drawable glyphs)
    Empty,
    /// Font still loading
    Pending,
    /// Font failed to load; rendered as nothing
    Failed(String),
    Ready(SceneNode),
}

impl TextExtrusion {
    pub fn into_node(self) -> Option<SceneNode> {
        match self {
            TextExtrusion::Ready(node) => Some(node),
            _ => None,
        }
    }
}

/// Extrude `spec` with the fixed bevel profile.
///
/// The node's mesh is centered on X and Y and spans z ≥ 0, so the caller can
/// place its back face directly onto a surface.
pub fn extrude(spec: &TextSpec, fonts: &dyn GlyphSource) -> TextExtrusion {
    if spec.is_blank() {
        return TextExtrusion::Empty;
    }

    let typeface = match fonts.font_status(&spec.font) {
        FontStatus::Ready(tf) => tf,
        FontStatus::Pending => return TextExtrusion::Pending,
        FontStatus::Failed(reason) => {
            tracing::warn!("text {:?} not rendered: {reason}", spec.content);
            return TextExtrusion::Failed(reason);
        }
    };

    let contours = typeface.layout(
        &spec.content,
        cm_to_scene(spec.size) as f64,
        cm_to_scene(spec.letter_spacing) as f64,
        TEXT_BEVEL.curve_segments,
    );
    let mut mesh = extrude_contours(
        contours,
        cm_to_scene(spec.depth) as f64,
        &TEXT_BEVEL.to_scene(),
        DEFAULT_COLOR,
    );
    if mesh.is_empty() {
        return TextExtrusion::Empty;
    }

    let aabb = Aabb::from_mesh(&mesh);
    let center = aabb.center();
    mesh.translate(Vec3::new(-center.x, -center.y, -aabb.min.z));

    TextExtrusion::Ready(SceneNode::new("text", NodeKind::Mesh(mesh)))
}

/// Extrude flattened outlines along +Z from z = 0 to z = `depth`, with bevel
/// rings extending `bevel.thickness` beyond both faces.
pub fn extrude_contours(
    contours: Vec<Contour>,
    depth: f64,
    bevel: &BevelProfile,
    color: [f32; 3],
) -> MeshData {
    let layers = bevel_layers(depth, bevel);
    let mut triangles: Vec<[Vec3; 3]> = Vec::new();

    for polygon in group_contours(contours) {
        extrude_polygon(&polygon, &layers, &mut triangles);
    }

    MeshData::from_triangles(&triangles, color)
}

/// (z, outward offset) for each ring layer, front to back
fn bevel_layers(depth: f64, bevel: &BevelProfile) -> Vec<(f64, f64)> {
    let segments = if bevel.thickness > 0.0 { bevel.segments } else { 0 };
    let mut layers = Vec::with_capacity(2 * segments as usize + 2);

    let ring = |b: u32| {
        let t = b as f64 / segments as f64;
        (
            bevel.thickness * (t * FRAC_PI_2).cos(),
            bevel.size * (t * FRAC_PI_2).sin() + bevel.offset,
        )
    };

    for b in 0..segments {
        let (z, bs) = ring(b);
        layers.push((-z, bs));
    }
    let body = if segments > 0 { bevel.size + bevel.offset } else { bevel.offset };
    layers.push((0.0, body));
    layers.push((depth, body));
    for b in (0..segments).rev() {
        let (z, bs) = ring(b);
        layers.push((depth + z, bs));
    }

    layers
}

fn extrude_polygon(polygon: &Polygon, layers: &[(f64, f64)], out: &mut Vec<[Vec3; 3]>) {
    let rings: Vec<Vec<DVec2>> = polygon
        .rings()
        .map(|r| r.iter().map(|p| DVec2::new(p.x, p.y)).collect())
        .collect();
    let offsets: Vec<Vec<DVec2>> = rings.iter().map(|r| bevel_vectors(r)).collect();

    // layer_points[layer][flat index]
    let layer_points: Vec<Vec<Vec3>> = layers
        .iter()
        .map(|&(z, bs)| {
            rings
                .iter()
                .zip(&offsets)
                .flat_map(|(ring, offs)| {
                    ring.iter().zip(offs).map(move |(p, o)| {
                        let q = *p + *o * bs;
                        Vec3::new(q.x as f32, q.y as f32, z as f32)
                    })
                })
                .collect()
        })
        .collect();

    let (Some(front), Some(back)) = (layer_points.first(), layer_points.last()) else {
        return;
    };
    // caps plus two wall triangles per edge and layer step
    out.reserve(2 * polygon.vertex_count() * layers.len());

    for [a, b, c] in triangulate(polygon) {
        out.push([front[a], front[c], front[b]]);
        out.push([back[a], back[b], back[c]]);
    }

    let mut start = 0;
    for ring in &rings {
        let n = ring.len();
        for pair in layer_points.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            for i in 0..n {
                let (a, b) = (start + i, start + (i + 1) % n);
                out.push([lo[a], lo[b], hi[b]]);
                out.push([lo[a], hi[b], hi[a]]);
            }
        }
        start += n;
    }
}

/// Per-vertex miter direction pointing away from the solid, scaled so an
/// offset of 1 moves both adjacent edges by 1.
fn bevel_vectors(ring: &[DVec2]) -> Vec<DVec2> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let e0 = (cur - prev).normalize_or_zero();
            let e1 = (next - cur).normalize_or_zero();
            let n0 = DVec2::new(e0.y, -e0.x);
            let n1 = DVec2::new(e1.y, -e1.x);
            let dir = (n0 + n1).normalize_or_zero();
            // clamp spikes at very sharp corners
            dir / dir.dot(n1).max(0.25)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{block_fonts, PendingFonts, BLOCK_FONT};
    use crate::text::StaticFonts;
    use kurbo::Point;

    fn text(content: &str) -> TextSpec {
        TextSpec {
            font: BLOCK_FONT.to_string(),
            ..TextSpec::new(content)
        }
    }

    fn no_bevel() -> BevelProfile {
        BevelProfile {
            thickness: 0.0,
            size: 0.0,
            offset: 0.0,
            segments: 0,
            curve_segments: 1,
        }
    }

    #[test]
    fn empty_text_yields_no_node() {
        let fonts = block_fonts();
        assert_eq!(extrude(&text(""), &fonts), TextExtrusion::Empty);
        assert_eq!(extrude(&text("  \n "), &fonts), TextExtrusion::Empty);
    }

    #[test]
    fn pending_font_yields_no_node() {
        assert_eq!(extrude(&text("Hi"), &PendingFonts), TextExtrusion::Pending);
    }

    #[test]
    fn missing_font_fails_soft() {
        let result = extrude(&text("Hi"), &StaticFonts::new());
        assert!(matches!(result, TextExtrusion::Failed(_)));
    }

    #[test]
    fn block_letter_dimensions_include_bevel() {
        // 'I' is 200 x 700 font units; size 1 cm = 10 units per 1000 font units
        let node = extrude(&text("I"), &block_fonts()).into_node().unwrap();
        let NodeKind::Mesh(mesh) = &node.kind else {
            panic!("text node should carry a mesh");
        };
        let aabb = Aabb::from_mesh(mesh);
        let size = aabb.size();
        assert!((size.x - 2.4).abs() < 1e-3, "{size:?}");
        assert!((size.y - 7.4).abs() < 1e-3, "{size:?}");
        assert!((size.z - 5.4).abs() < 1e-3, "{size:?}");
        assert!(aabb.min.z.abs() < 1e-5);
        assert!(aabb.center().x.abs() < 1e-4);
    }

    #[test]
    fn square_without_bevel_is_a_closed_box() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mesh = extrude_contours(vec![square], 2.0, &no_bevel(), DEFAULT_COLOR);
        assert_eq!(mesh.triangle_count(), 12);
        let center = Aabb::from_mesh(&mesh).center();
        for tri in mesh.triangles() {
            let n = crate::viewport::mesh::face_normal(&tri);
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(n.dot(centroid - center) > 0.0);
        }
    }

    #[test]
    fn bevel_layers_are_monotonic_in_z() {
        let layers = bevel_layers(5.0, &TEXT_BEVEL.to_scene());
        assert_eq!(layers.len(), 2 * TEXT_BEVEL.segments as usize + 2);
        assert!(layers.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!((layers[0].0 + 0.2).abs() < 1e-6);
        assert!((layers[layers.len() - 1].0 - 5.2).abs() < 1e-6);
    }

    #[test]
    fn glyph_with_hole_keeps_hole_open() {
        // 'O' fixture: 600x700 ring with a 200x300 counter
        let node = extrude(&text("O"), &block_fonts()).into_node().unwrap();
        let NodeKind::Mesh(mesh) = &node.kind else {
            panic!("text node should carry a mesh");
        };
        let aabb = Aabb::from_mesh(mesh);
        // No cap triangle may cover the center of the counter
        let c = aabb.center();
        let covers_center = mesh.triangles().any(|t| {
            let n = crate::viewport::mesh::face_normal(&t);
            if n.z.abs() < 0.99 {
                return false;
            }
            let p = glam::Vec2::new(c.x, c.y);
            let [a, b, cc] = t.map(|v| glam::Vec2::new(v.x, v.y));
            let s1 = (b - a).perp_dot(p - a);
            let s2 = (cc - b).perp_dot(p - b);
            let s3 = (a - cc).perp_dot(p - cc);
            (s1 > 0.0 && s2 > 0.0 && s3 > 0.0) || (s1 < 0.0 && s2 < 0.0 && s3 < 0.0)
        });
        assert!(!covers_center);
    }
}
