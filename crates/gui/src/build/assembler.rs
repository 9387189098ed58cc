//! Shape assembler: `ShapeSpec` (+ trophy texts) → scene node tree.
//!
//! Pure function of its inputs. Dimensions are not validated here; the UI
//! rejects non-positive or non-finite values before assembly.

use glam::Vec3;
use shared::{ShapeKind, ShapeSpec, TextSpec, DEFAULT_PLAQUE_TEXT};

use super::primitives::{CYLINDER_SEGMENTS, HEXAGON_SEGMENTS};
use super::{NodeKind, SceneNode};
use crate::text::{self, GlyphSource};
use crate::units::cm_to_scene;
use crate::viewport::mesh::Aabb;

/// Extra base width beyond the plaque (cm)
pub const BASE_MARGIN_CM: f64 = 2.0;
/// Base size along Z (cm)
pub const BASE_THICKNESS_CM: f64 = 3.0;
/// Plaque size along Z (cm)
pub const PLAQUE_THICKNESS_CM: f64 = 0.5;
/// Gap between a face and the text sitting on it (cm)
pub const TEXT_CLEARANCE_CM: f64 = 0.01;

/// Derived placement of the trophy parts, in scene units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrophyLayout {
    pub base_size: Vec3,
    pub base_center: Vec3,
    pub plaque_size: Vec3,
    pub plaque_center: Vec3,
    /// Back-face anchor of the plaque text
    pub plaque_text_anchor: Vec3,
    /// Back-face anchor of the base text
    pub base_text_anchor: Vec3,
}

impl TrophyLayout {
    /// The base is `depth` tall with its bottom on the origin; the plaque
    /// stands directly on top of it.
    pub fn compute(spec: &ShapeSpec) -> Self {
        let width = cm_to_scene(spec.width);
        let height = cm_to_scene(spec.height);
        let depth = cm_to_scene(spec.depth);
        let margin = cm_to_scene(BASE_MARGIN_CM);
        let base_thickness = cm_to_scene(BASE_THICKNESS_CM);
        let plaque_thickness = cm_to_scene(PLAQUE_THICKNESS_CM);
        let clearance = cm_to_scene(TEXT_CLEARANCE_CM);

        let base_center = Vec3::new(0.0, depth / 2.0, 0.0);
        let plaque_center = Vec3::new(0.0, depth + height / 2.0, 0.0);

        Self {
            base_size: Vec3::new(width + margin, depth, base_thickness),
            base_center,
            plaque_size: Vec3::new(width, height, plaque_thickness),
            plaque_center,
            plaque_text_anchor: plaque_center + Vec3::Z * (plaque_thickness / 2.0 + clearance),
            base_text_anchor: base_center + Vec3::Z * (base_thickness / 2.0 + clearance),
        }
    }
}

/// Assemble the scene node for a shape.
///
/// `plaque_text` and `base_text` only matter for the trophy. An empty plaque
/// text falls back to "Trophy"; an empty base text renders nothing.
pub fn assemble(
    spec: &ShapeSpec,
    plaque_text: &TextSpec,
    base_text: &TextSpec,
    fonts: &dyn GlyphSource,
) -> SceneNode {
    let width = cm_to_scene(spec.width);
    let height = cm_to_scene(spec.height);
    let depth = cm_to_scene(spec.depth);

    match spec.kind {
        ShapeKind::Cube => SceneNode::new(
            "cube",
            NodeKind::Box {
                size: Vec3::new(width, height, depth),
            },
        ),
        ShapeKind::Cylinder => SceneNode::new(
            "cylinder",
            NodeKind::Cylinder {
                radius: width / 2.0,
                height,
                segments: CYLINDER_SEGMENTS,
            },
        ),
        ShapeKind::Hexagon => SceneNode::new(
            "hexagon",
            NodeKind::Cylinder {
                radius: width / 2.0,
                height,
                segments: HEXAGON_SEGMENTS,
            },
        ),
        ShapeKind::Trophy => trophy(spec, plaque_text, base_text, fonts),
    }
}

fn trophy(
    spec: &ShapeSpec,
    plaque_text: &TextSpec,
    base_text: &TextSpec,
    fonts: &dyn GlyphSource,
) -> SceneNode {
    let layout = TrophyLayout::compute(spec);

    let mut node = SceneNode::group("trophy")
        .with_child(
            SceneNode::new("base", NodeKind::Box { size: layout.base_size })
                .with_translation(layout.base_center),
        )
        .with_child(
            SceneNode::new("plaque", NodeKind::Box { size: layout.plaque_size })
                .with_translation(layout.plaque_center),
        );

    let plaque_text = if plaque_text.is_blank() {
        TextSpec {
            content: DEFAULT_PLAQUE_TEXT.to_string(),
            ..plaque_text.clone()
        }
    } else {
        plaque_text.clone()
    };

    for (name, spec, anchor) in [
        ("plaque_text", &plaque_text, layout.plaque_text_anchor),
        ("base_text", base_text, layout.base_text_anchor),
    ] {
        if let Some(mut text_node) = text::extrude(spec, fonts).into_node() {
            text_node.name = name.to_string();
            text_node.translation = anchor;
            node.children.push(text_node);
        }
    }

    node
}

/// Scene node for the 3D text mode: centered on X/Z, resting on y = 0.
pub fn text_scene(spec: &TextSpec, fonts: &dyn GlyphSource) -> Option<SceneNode> {
    let mut node = text::extrude(spec, fonts).into_node()?;
    if let NodeKind::Mesh(mesh) = &node.kind {
        let aabb = Aabb::from_mesh(mesh);
        let center = aabb.center();
        node.translation = Vec3::new(-center.x, -aabb.min.y, -center.z);
    }
    Some(node)
}
