pub mod images;
pub mod settings;

use std::path::Path;

use shared::{GenerationMode, ModeParams, ShapeSpec};
use tokio::runtime::Handle;

use crate::build::{PreviewCache, SceneNode};
use crate::export::{export_stl, ExportError, ExportTrigger};
use crate::generation::{GenerationError, GenerationState, Ticket};
use crate::text::{FontLibrary, GlyphSource};

pub use images::{is_supported_image, ImageSlot};
pub use settings::{AppSettings, UiSettings, ViewportSettings};

/// Per-mode parameter records plus the active-mode selector.
///
/// Switching modes only moves the selector; every record keeps its values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeState {
    pub params: ModeParams,
}

impl ModeState {
    pub fn new(params: ModeParams) -> Self {
        Self { params }
    }

    pub fn active(&self) -> GenerationMode {
        self.params.active
    }

    /// Select `mode`; returns the previously active mode
    pub fn set_active(&mut self, mode: GenerationMode) -> GenerationMode {
        std::mem::replace(&mut self.params.active, mode)
    }

    /// Load a `ModeParams` JSON file (missing fields take defaults)
    pub fn load_from(path: &Path) -> Result<Self, ParamsError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Parse and validate `ModeParams` JSON
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: ModeParams = serde_json::from_str(json)?;
        validate(&params)?;
        Ok(Self::new(params))
    }
}

/// Every record must be buildable: dimensions finite and positive.
/// Records are checked even when inactive; any of them can become active.
fn validate(params: &ModeParams) -> Result<(), ParamsError> {
    if !params.shapes.shape.is_renderable() {
        let ShapeSpec { width, height, depth, .. } = params.shapes.shape;
        return Err(ParamsError::Invalid(format!(
            "shape dimensions must be positive (width {width}, height {height}, depth {depth})"
        )));
    }
    for (name, text) in [
        ("text", &params.text),
        ("plaque text", &params.shapes.plaque_text),
        ("base text", &params.shapes.base_text),
    ] {
        if !text.is_renderable() {
            return Err(ParamsError::Invalid(format!(
                "{name} size and depth must be positive (size {}, depth {})",
                text.size, text.depth
            )));
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("cannot read parameters: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid parameters: {0}")]
    Invalid(String),
}

/// Combined application state
pub struct AppState {
    pub modes: ModeState,
    pub settings: AppSettings,
    pub fonts: FontLibrary,
    pub generation: GenerationState,
    pub preview: PreviewCache,
    pub export: ExportTrigger,
    /// Blocking notice shown as a modal window
    pub notice: Option<String>,
    /// Show settings window
    pub show_settings_window: bool,
}

impl AppState {
    pub fn new(runtime: Handle, settings: AppSettings, modes: ModeState) -> Self {
        Self {
            generation: GenerationState::new(runtime.clone(), &settings.backend_url, settings.quality),
            fonts: FontLibrary::new(runtime),
            modes,
            settings,
            preview: PreviewCache::new(),
            export: ExportTrigger::default(),
            notice: None,
            show_settings_window: false,
        }
    }

    pub fn params(&self) -> &ModeParams {
        &self.modes.params
    }

    pub fn params_mut(&mut self) -> &mut ModeParams {
        &mut self.modes.params
    }

    /// Switch the active mode, discarding the old mode's outstanding request
    pub fn set_mode(&mut self, mode: GenerationMode) {
        if self.modes.active() == mode {
            return;
        }
        let previous = self.modes.set_active(mode);
        self.generation.on_mode_switch(previous);
        tracing::debug!("mode {previous:?} -> {mode:?}");
    }

    /// Replace every record at once; whatever was outstanding is discarded
    pub fn replace_params(&mut self, params: ModeParams) {
        let previous = self.modes.active();
        self.modes.params = params;
        self.generation.on_mode_switch(previous);
    }

    /// Font references the active mode's scene needs
    pub fn required_fonts(&self) -> Vec<String> {
        use shared::{ActiveParams, ShapeKind};

        let mut fonts: Vec<String> = match self.modes.params.active_params() {
            ActiveParams::Text(text) => vec![text.font.clone()],
            ActiveParams::Shapes(shapes) if shapes.shape.kind == ShapeKind::Trophy => {
                let mut fonts = vec![shapes.plaque_text.font.clone()];
                if !shapes.base_text.is_blank() {
                    fonts.push(shapes.base_text.font.clone());
                }
                fonts
            }
            _ => Vec::new(),
        };
        fonts.dedup();
        fonts
    }

    /// Load every font the active mode needs on the calling thread.
    /// Failures are logged; the text then renders as nothing.
    pub fn load_fonts_blocking(&mut self) {
        for reference in self.required_fonts() {
            if let Err(e) = self.fonts.load_blocking(&reference) {
                tracing::warn!("font {reference} unavailable: {e}");
            }
        }
    }

    /// Generate is possible: inputs valid and nothing in flight for the mode
    pub fn can_generate(&self) -> bool {
        self.modes.params.can_generate() && !self.is_loading()
    }

    pub fn is_loading(&self) -> bool {
        self.generation.is_loading(self.modes.active())
    }

    /// Dispatch a backend request for the active mode
    pub fn generate(&mut self) -> Result<Option<Ticket>, GenerationError> {
        self.generation.generate(&self.modes.params)
    }

    /// Model reference accepted for the active mode
    pub fn model_reference(&self) -> Option<&str> {
        self.generation.model_reference(self.modes.active())
    }

    /// Ingest async results. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        for reference in self.required_fonts() {
            self.fonts.retry_if_due(&reference);
        }
        let fonts = self.fonts.poll();
        let results = self.generation.poll(self.modes.active());
        if self.notice.is_none() {
            self.notice = self.generation.take_notice();
        }
        fonts > 0 || results > 0
    }

    /// Current scene, rebuilt only when its inputs changed
    pub fn scene(&mut self) -> &SceneNode {
        let remote = self.generation.model_reference(self.modes.params.active);
        let revision = self.fonts.revision();
        self.preview
            .get_or_rebuild(&self.modes.params, &self.fonts as &dyn GlyphSource, remote, revision)
    }

    /// Binary STL of the current scene
    pub fn export_bytes(&mut self) -> Result<Vec<u8>, ExportError> {
        let bytes = export_stl(self.scene())?;
        tracing::info!("exported {} bytes ({:?} mode)", bytes.len(), self.modes.active());
        Ok(bytes)
    }

    /// Run the export once per trigger
    pub fn take_export(&mut self) -> Option<Result<Vec<u8>, ExportError>> {
        self.export.take().then(|| self.export_bytes())
    }

    /// Apply edited settings to the live services and persist them
    pub fn apply_settings(&mut self) {
        self.generation.set_backend(&self.settings.backend_url);
        self.generation.set_quality(self.settings.quality);
        self.settings.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AiParams, GenerationMode::*};

    fn app(rt: &tokio::runtime::Runtime) -> AppState {
        AppState::new(rt.handle().clone(), AppSettings::default(), ModeState::default())
    }

    #[test]
    fn switching_modes_preserves_records() {
        let mut modes = ModeState::default();
        modes.params.ai.prompt = "a cup".into();
        modes.params.text.content = "Hello".into();
        assert_eq!(modes.set_active(Text), Ai);
        assert_eq!(modes.set_active(Ai), Text);
        assert_eq!(modes.params.ai.prompt, "a cup");
        assert_eq!(modes.params.text.content, "Hello");
    }

    #[test]
    fn load_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"active": "shapes", "shapes": {"shape": {"kind": "cylinder", "width": 4, "height": 6, "depth": 4}, "plaque_text": {"content": "", "font": "f", "size": 1, "depth": 0.2}, "base_text": {"content": "", "font": "f", "size": 1, "depth": 0.2}}}"#).unwrap();
        let modes = ModeState::load_from(&path).unwrap();
        assert_eq!(modes.active(), Shapes);
        assert_eq!(modes.params.shapes.shape.width, 4.0);

        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(ModeState::load_from(&path), Err(ParamsError::Json(_))));
    }

    #[test]
    fn params_file_with_bad_dimensions_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"active": "shapes", "shapes": {"shape": {"kind": "cube", "width": -10, "height": 6, "depth": 4}, "plaque_text": {"content": "", "font": "f", "size": 1, "depth": 0.2}, "base_text": {"content": "", "font": "f", "size": 1, "depth": 0.2}}}"#).unwrap();
        let err = ModeState::load_from(&path).unwrap_err();
        assert!(matches!(err, ParamsError::Invalid(_)));
        assert!(err.to_string().contains("-10"), "{err}");

        // an inactive record is checked too
        assert!(matches!(
            ModeState::from_json(r#"{"active": "ai", "text": {"content": "Hi", "font": "f", "size": 0, "depth": 1}}"#),
            Err(ParamsError::Invalid(_))
        ));
        assert!(ModeState::from_json(r#"{"active": "ai"}"#).is_ok());
    }

    #[test]
    fn export_runs_once_per_trigger() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt);
        app.set_mode(Shapes);
        assert!(app.take_export().is_none());
        app.export.fire();
        let first = app.take_export().unwrap().unwrap();
        assert!(app.take_export().is_none());
        app.export.fire();
        assert_eq!(app.take_export().unwrap().unwrap(), first);
    }

    #[test]
    fn required_fonts_follow_active_mode() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt);
        assert!(app.required_fonts().is_empty());

        app.set_mode(Text);
        assert_eq!(app.required_fonts(), vec![app.params().text.font.clone()]);

        app.set_mode(Shapes);
        app.params_mut().shapes.shape.kind = shared::ShapeKind::Trophy;
        // default base text is blank and both texts share the default font
        assert_eq!(app.required_fonts().len(), 1);
    }

    #[test]
    fn ai_mode_shows_placeholder_and_cannot_generate_without_prompt() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt);
        assert!(!app.can_generate());
        assert!(app.scene().find("placeholder").is_some());

        app.params_mut().ai = AiParams { prompt: "vase".into() };
        assert!(app.can_generate());
    }
}
