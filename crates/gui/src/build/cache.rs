//! Preview mesh cache management

use shared::{ActiveParams, GenerationMode, ModeParams, ShapesParams, TextSpec};

use super::{scene_for_mode, SceneNode};
use crate::text::GlyphSource;
use crate::viewport::mesh::{Aabb, MeshData};

/// The part of `ModeParams` the preview depends on: the active record only
#[derive(Debug, Clone, PartialEq)]
enum ActiveRecord {
    /// AI and image previews depend only on the remote model
    Backend(GenerationMode),
    Text(TextSpec),
    Shapes(ShapesParams),
}

impl ActiveRecord {
    fn of(params: &ModeParams) -> Self {
        match params.active_params() {
            ActiveParams::Text(text) => Self::Text(text.clone()),
            ActiveParams::Shapes(shapes) => Self::Shapes(shapes.clone()),
            ActiveParams::Ai(_) | ActiveParams::Image(_) => Self::Backend(params.active),
        }
    }

    fn matches(&self, params: &ModeParams) -> bool {
        match (self, params.active_params()) {
            (Self::Text(a), ActiveParams::Text(b)) => a == b,
            (Self::Shapes(a), ActiveParams::Shapes(b)) => a == b,
            (Self::Backend(mode), ActiveParams::Ai(_) | ActiveParams::Image(_)) => {
                *mode == params.active
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    record: ActiveRecord,
    remote_model: Option<String>,
    font_revision: u64,
}

/// Cached scene and its world meshes, rebuilt when the active parameters,
/// the accepted remote model or the set of loaded fonts change
#[derive(Default)]
pub struct PreviewCache {
    key: Option<CacheKey>,
    scene: Option<SceneNode>,
    meshes: Vec<(String, MeshData)>,
    aabb: Option<Aabb>,
    rebuild_count: u64,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cache is still valid
    pub fn is_valid(&self, params: &ModeParams, remote_model: Option<&str>, font_revision: u64) -> bool {
        self.key.as_ref().is_some_and(|key| {
            key.font_revision == font_revision
                && key.remote_model.as_deref() == remote_model
                && key.record.matches(params)
        })
    }

    /// Return the scene for `params`, rebuilding only when an input changed
    pub fn get_or_rebuild(
        &mut self,
        params: &ModeParams,
        fonts: &dyn GlyphSource,
        remote_model: Option<&str>,
        font_revision: u64,
    ) -> &SceneNode {
        if !self.is_valid(params, remote_model, font_revision) || self.scene.is_none() {
            self.rebuild(params, fonts, remote_model, font_revision);
        }
        // rebuild always fills the scene
        self.scene.get_or_insert_with(|| SceneNode::group("root"))
    }

    fn rebuild(
        &mut self,
        params: &ModeParams,
        fonts: &dyn GlyphSource,
        remote_model: Option<&str>,
        font_revision: u64,
    ) {
        let scene = scene_for_mode(params, fonts, remote_model);
        self.meshes = scene.world_meshes(false);

        let mut aabb = Aabb::empty();
        for (_, mesh) in &self.meshes {
            let m = Aabb::from_mesh(mesh);
            if !m.is_empty() {
                aabb.include(m.min);
                aabb.include(m.max);
            }
        }
        self.aabb = (!aabb.is_empty()).then_some(aabb);

        self.scene = Some(scene);
        self.key = Some(CacheKey {
            record: ActiveRecord::of(params),
            remote_model: remote_model.map(str::to_string),
            font_revision,
        });
        self.rebuild_count += 1;
        tracing::debug!("preview rebuilt ({} meshes)", self.meshes.len());
    }

    /// World-space meshes of the cached scene (helpers included)
    pub fn meshes(&self) -> &[(String, MeshData)] {
        &self.meshes
    }

    /// Bounds of all cached meshes
    pub fn aabb(&self) -> Option<Aabb> {
        self.aabb
    }

    /// Cached scene, if built
    pub fn scene(&self) -> Option<&SceneNode> {
        self.scene.as_ref()
    }

    /// Rebuild counter
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{block_fonts, shape, shapes_params, text_params};
    use shared::ShapeKind;

    #[test]
    fn unchanged_inputs_do_not_rebuild() {
        let fonts = block_fonts();
        let params = shapes_params(shape(ShapeKind::Cube, 10.0, 10.0, 5.0), "", "");
        let mut cache = PreviewCache::new();
        cache.get_or_rebuild(&params, &fonts, None, 0);
        cache.get_or_rebuild(&params, &fonts, None, 0);
        assert_eq!(cache.rebuild_count(), 1);
        assert_eq!(cache.meshes().len(), 1);
    }

    #[test]
    fn param_remote_or_font_change_rebuilds() {
        let fonts = block_fonts();
        let mut params = text_params("I");
        let mut cache = PreviewCache::new();
        cache.get_or_rebuild(&params, &fonts, None, 0);

        params.text.content = "IO".into();
        cache.get_or_rebuild(&params, &fonts, None, 0);
        assert_eq!(cache.rebuild_count(), 2);

        cache.get_or_rebuild(&params, &fonts, None, 1);
        assert_eq!(cache.rebuild_count(), 3);

        cache.get_or_rebuild(&params, &fonts, Some("http://h/static/a.ply"), 1);
        assert_eq!(cache.rebuild_count(), 4);
    }

    #[test]
    fn inactive_record_edits_keep_the_cache() {
        let fonts = block_fonts();
        let mut params = text_params("IO");
        let mut cache = PreviewCache::new();
        cache.get_or_rebuild(&params, &fonts, None, 0);

        params.ai.prompt = "teapot".into();
        params.image.front_image = Some("/tmp/front.png".into());
        params.shapes.shape.width = 42.0;
        params.shapes.plaque_text.content = "CUP".into();
        cache.get_or_rebuild(&params, &fonts, None, 0);
        assert_eq!(cache.rebuild_count(), 1);

        params.active = GenerationMode::Ai;
        cache.get_or_rebuild(&params, &fonts, None, 0);
        assert_eq!(cache.rebuild_count(), 2);
        params.ai.prompt = "a low-poly fox".into();
        params.text.content = "LOL".into();
        cache.get_or_rebuild(&params, &fonts, None, 0);
        assert_eq!(cache.rebuild_count(), 2);

        // same placeholder, but a different mode
        params.active = GenerationMode::Image;
        cache.get_or_rebuild(&params, &fonts, None, 0);
        assert_eq!(cache.rebuild_count(), 3);

        // the edited text record is picked up on return
        params.active = GenerationMode::Text;
        let scene = cache.get_or_rebuild(&params, &fonts, None, 0);
        assert!(scene.find("text").is_some());
        assert_eq!(cache.rebuild_count(), 4);
    }

    #[test]
    fn aabb_covers_scene() {
        let fonts = block_fonts();
        let params = shapes_params(shape(ShapeKind::Cube, 10.0, 10.0, 5.0), "", "");
        let mut cache = PreviewCache::new();
        cache.get_or_rebuild(&params, &fonts, None, 0);
        let aabb = cache.aabb().unwrap();
        assert_eq!(aabb.size(), glam::Vec3::new(100.0, 100.0, 50.0));
    }
}
