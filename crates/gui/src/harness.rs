//! Headless test harness for driving the configurator programmatically.
//!
//! Mirrors what the UI does each frame (edit params, rebuild the preview,
//! fire the export trigger) without a window, a runtime or network fonts.

use shared::{GenerationMode, ModeParams, ShapeKind, ShapeSpec};

use crate::build::{NodeKind, PreviewCache, SceneNode};
use crate::export::{export_stl, read_stl, ExportError, ExportTrigger, StlTriangle};
use crate::fixtures::{block_fonts, block_text};
use crate::state::{ModeState, ParamsError};
use crate::text::StaticFonts;
use crate::validation::MeshValidator;
use crate::viewport::mesh::MeshData;

/// Headless test harness: mode state, fonts, preview cache and export trigger
pub struct TestHarness {
    pub modes: ModeState,
    pub fonts: StaticFonts,
    pub export: ExportTrigger,
    remote_model: Option<String>,
    font_revision: u64,
    cache: PreviewCache,
    last_meshes: Vec<(String, MeshData)>,
}

impl TestHarness {
    /// Create a harness in the default (AI) mode with the block font loaded.
    pub fn new() -> Self {
        Self::with_fonts(block_fonts())
    }

    pub fn with_fonts(fonts: StaticFonts) -> Self {
        Self {
            modes: ModeState::default(),
            fonts,
            export: ExportTrigger::default(),
            remote_model: None,
            font_revision: 0,
            cache: PreviewCache::new(),
            last_meshes: Vec::new(),
        }
    }

    // ── Parameter editing ─────────────────────────────────────

    pub fn params(&self) -> &ModeParams {
        &self.modes.params
    }

    pub fn params_mut(&mut self) -> &mut ModeParams {
        &mut self.modes.params
    }

    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.modes.set_active(mode);
    }

    /// Switch to the shapes mode with the given shape (centimeters)
    pub fn set_shape(&mut self, kind: ShapeKind, width: f64, height: f64, depth: f64) {
        self.set_mode(GenerationMode::Shapes);
        self.modes.params.shapes.shape = ShapeSpec {
            kind,
            width,
            height,
            depth,
        };
    }

    /// Set both trophy texts, rendered with the block font
    pub fn set_trophy_texts(&mut self, plaque: &str, base: &str) {
        self.modes.params.shapes.plaque_text = block_text(plaque);
        self.modes.params.shapes.base_text = block_text(base);
    }

    /// Switch to the 3D text mode with `content` in the block font
    pub fn set_text(&mut self, content: &str) {
        self.set_mode(GenerationMode::Text);
        self.modes.params.text = block_text(content);
    }

    /// Simulate an accepted generation result for the active backend mode
    pub fn set_remote_model(&mut self, reference: Option<&str>) {
        self.remote_model = reference.map(str::to_string);
    }

    /// Register another font, as a finished font load would
    pub fn add_font(&mut self, reference: &str, typeface: crate::text::Typeface) {
        self.fonts.insert(reference, typeface);
        self.font_revision += 1;
    }

    /// Load params from JSON (replaces current)
    pub fn load_params_json(&mut self, json: &str) -> Result<(), ParamsError> {
        self.modes = ModeState::from_json(json)?;
        Ok(())
    }

    /// Export the current params as JSON
    pub fn export_params_json(&self) -> String {
        serde_json::to_string_pretty(&self.modes.params).unwrap_or_default()
    }

    // ── Build + inspection ────────────────────────────────────

    /// Rebuild the preview (if inputs changed) and return the scene
    pub fn build(&mut self) -> &SceneNode {
        let remote = self
            .modes
            .params
            .active
            .uses_backend()
            .then_some(self.remote_model.as_deref())
            .flatten();
        self.cache
            .get_or_rebuild(&self.modes.params, &self.fonts, remote, self.font_revision);
        self.last_meshes = self.cache.meshes().to_vec();
        self.cache.get_or_rebuild(&self.modes.params, &self.fonts, remote, self.font_revision)
    }

    /// Number of meshes after build
    pub fn visible_mesh_count(&self) -> usize {
        self.last_meshes.len()
    }

    /// World-space mesh of a named node after build
    pub fn mesh_of(&self, name: &str) -> Option<&MeshData> {
        self.last_meshes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, mesh)| mesh)
    }

    /// Create a validator for a node's mesh
    pub fn validate_mesh(&self, name: &str) -> Option<MeshValidator<'_>> {
        self.mesh_of(name).map(MeshValidator::new)
    }

    /// Extruded text nodes in the current scene
    pub fn text_node_count(&mut self) -> usize {
        self.build().count(&|n| matches!(n.kind, NodeKind::Mesh(_)))
    }

    /// Rebuild counter of the preview cache
    pub fn rebuild_count(&self) -> u64 {
        self.cache.rebuild_count()
    }

    // ── Export ────────────────────────────────────────────────

    /// Fire the export trigger and run one frame's worth of export handling
    pub fn export(&mut self) -> Option<Result<Vec<u8>, ExportError>> {
        self.export.fire();
        self.run_export_frame()
    }

    /// One frame: export only if the trigger is armed
    pub fn run_export_frame(&mut self) -> Option<Result<Vec<u8>, ExportError>> {
        if !self.export.take() {
            return None;
        }
        let scene = self.build().clone();
        Some(export_stl(&scene))
    }

    /// Export and decode the resulting STL
    pub fn exported_triangles(&mut self) -> Result<Vec<StlTriangle>, ExportError> {
        match self.export() {
            Some(bytes) => read_stl(&bytes?),
            None => Ok(Vec::new()),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_harness_shows_placeholder() {
        let mut h = TestHarness::new();
        assert!(h.build().find("placeholder").is_some());
        assert_eq!(h.visible_mesh_count(), 1);
    }

    #[test]
    fn cube_builds_one_valid_mesh() {
        let mut h = TestHarness::new();
        h.set_shape(ShapeKind::Cube, 1.0, 2.0, 3.0);
        h.build();
        assert_eq!(h.visible_mesh_count(), 1);
        let v = h.validate_mesh("cube").unwrap();
        assert!(v.validate_all().is_empty());
        assert!(v.assert_dimensions_approx([10.0, 20.0, 30.0], 1e-4));
    }

    #[test]
    fn remote_model_replaces_placeholder_in_backend_modes_only() {
        let mut h = TestHarness::new();
        h.set_remote_model(Some("http://localhost:8000/static/abc.ply"));
        assert!(h.build().find("generated_model").is_some());
        assert_eq!(h.visible_mesh_count(), 0);

        h.set_shape(ShapeKind::Cube, 1.0, 1.0, 1.0);
        assert!(h.build().find("generated_model").is_none());
    }

    #[test]
    fn rebuilds_only_on_change() {
        let mut h = TestHarness::new();
        h.set_text("I");
        h.build();
        h.build();
        assert_eq!(h.rebuild_count(), 1);
        h.set_text("IO");
        h.build();
        assert_eq!(h.rebuild_count(), 2);
    }

    #[test]
    fn params_json_round_trip() {
        let mut h = TestHarness::new();
        h.set_shape(ShapeKind::Hexagon, 3.0, 4.0, 5.0);
        let json = h.export_params_json();

        let mut h2 = TestHarness::new();
        h2.load_params_json(&json).unwrap();
        assert_eq!(h2.params(), h.params());
        assert!(h2.load_params_json("{").is_err());
    }

    #[test]
    fn export_frame_without_trigger_does_nothing() {
        let mut h = TestHarness::new();
        assert!(h.run_export_frame().is_none());
        assert!(h.export().is_some());
        assert!(h.run_export_frame().is_none());
    }
}
