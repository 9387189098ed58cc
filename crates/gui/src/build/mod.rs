//! Scene description and geometry assembly.
//!
//! Assemblers return a `SceneNode` tree: an explicit, inspectable geometry
//! description. The preview and the STL exporter both walk this tree; neither
//! depends on renderer-internal state.

pub mod assembler;
pub mod cache;
pub mod primitives;

use glam::Vec3;
use shared::{ActiveParams, ModeParams};

use crate::text::GlyphSource;
use crate::viewport::mesh::{MeshData, DEFAULT_COLOR};

pub use assembler::{assemble, text_scene, TrophyLayout};
pub use cache::PreviewCache;

/// Geometry carried by a scene node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure container
    Group,
    /// Origin-centered box, size in scene units
    Box { size: Vec3 },
    /// Origin-centered cylinder along Y
    Cylinder { radius: f32, height: f32, segments: u32 },
    /// Pre-tessellated geometry (extruded text)
    Mesh(MeshData),
    /// Backend-generated model with no local triangles
    RemoteModel { url: String },
}

/// Node in the scene description tree
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    /// Offset relative to the parent
    pub translation: Vec3,
    /// Non-exportable nodes (and their subtree) are skipped by the exporter
    pub exportable: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            translation: Vec3::ZERO,
            exportable: true,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn non_exportable(mut self) -> Self {
        self.exportable = false;
        self
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Number of nodes in the subtree (including self) matching `pred`
    pub fn count(&self, pred: &dyn Fn(&SceneNode) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self.children.iter().map(|c| c.count(pred)).sum::<usize>()
    }

    /// Local geometry of this node alone (no children, no translation)
    pub fn local_mesh(&self) -> Option<MeshData> {
        primitives::tessellate(&self.kind, DEFAULT_COLOR)
    }

    /// Flatten the subtree into world-space meshes, depth-first in child order.
    ///
    /// With `exportable_only`, non-exportable subtrees are skipped.
    pub fn world_meshes(&self, exportable_only: bool) -> Vec<(String, MeshData)> {
        let mut out = Vec::new();
        self.collect_meshes(Vec3::ZERO, exportable_only, &mut out);
        out
    }

    fn collect_meshes(
        &self,
        parent_offset: Vec3,
        exportable_only: bool,
        out: &mut Vec<(String, MeshData)>,
    ) {
        if exportable_only && !self.exportable {
            return;
        }
        let offset = parent_offset + self.translation;
        if let Some(mut mesh) = self.local_mesh() {
            mesh.translate(offset);
            out.push((self.name.clone(), mesh));
        }
        for child in &self.children {
            child.collect_meshes(offset, exportable_only, out);
        }
    }

    /// World-space triangles of every exportable node.
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        self.world_meshes(true)
            .iter()
            .flat_map(|(_, mesh)| mesh.triangles().collect::<Vec<_>>())
            .collect()
    }

    /// Remote model URLs referenced anywhere in the subtree
    pub fn remote_models(&self) -> Vec<&str> {
        let mut urls = Vec::new();
        if let NodeKind::RemoteModel { url } = &self.kind {
            urls.push(url.as_str());
        }
        for child in &self.children {
            urls.extend(child.remote_models());
        }
        urls
    }
}

/// Placeholder solid shown by backend modes until a model arrives (1 cm cube)
pub fn placeholder() -> SceneNode {
    let size = Vec3::splat(crate::units::cm_to_scene(1.0));
    SceneNode::new("placeholder", NodeKind::Box { size })
}

/// Scene for the active mode. A pure function of the active mode's record;
/// other modes' parameters are never read.
///
/// `remote_model` is the accepted model reference of the active backend mode.
pub fn scene_for_mode(
    params: &ModeParams,
    fonts: &dyn GlyphSource,
    remote_model: Option<&str>,
) -> SceneNode {
    let root = SceneNode::group("root");
    match params.active_params() {
        ActiveParams::Shapes(shapes) => {
            root.with_child(assemble(&shapes.shape, &shapes.plaque_text, &shapes.base_text, fonts))
        }
        ActiveParams::Text(text) => match text_scene(text, fonts) {
            Some(node) => root.with_child(node),
            None => root,
        },
        ActiveParams::Ai(_) | ActiveParams::Image(_) => match remote_model {
            Some(url) => root.with_child(SceneNode::new(
                "generated_model",
                NodeKind::RemoteModel { url: url.to_string() },
            )),
            None => root.with_child(placeholder()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_meshes_accumulate_translation() {
        let root = SceneNode::group("root").with_translation(Vec3::new(0.0, 5.0, 0.0)).with_child(
            SceneNode::new("box", NodeKind::Box { size: Vec3::splat(2.0) })
                .with_translation(Vec3::new(1.0, 0.0, 0.0)),
        );
        let meshes = root.world_meshes(true);
        assert_eq!(meshes.len(), 1);
        let aabb = crate::viewport::mesh::Aabb::from_mesh(&meshes[0].1);
        assert_eq!(aabb.center(), Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn non_exportable_subtree_is_skipped() {
        let root = SceneNode::group("root")
            .with_child(SceneNode::new("a", NodeKind::Box { size: Vec3::ONE }))
            .with_child(
                SceneNode::group("helpers")
                    .non_exportable()
                    .with_child(SceneNode::new("grid", NodeKind::Box { size: Vec3::ONE })),
            );
        assert_eq!(root.world_meshes(true).len(), 1);
        assert_eq!(root.world_meshes(false).len(), 2);
        assert_eq!(root.triangles().len(), 12);
    }

    #[test]
    fn remote_model_has_no_triangles() {
        let root = SceneNode::group("root").with_child(SceneNode::new(
            "m",
            NodeKind::RemoteModel { url: "http://x/static/a.ply".into() },
        ));
        assert!(root.triangles().is_empty());
        assert_eq!(root.remote_models(), vec!["http://x/static/a.ply"]);
    }
}
