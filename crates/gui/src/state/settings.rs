//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::generation::GenerationQuality;

/// Environment variable overriding `backend_url`
pub const BACKEND_URL_ENV: &str = "FAST3D_BACKEND_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "fast3dprint_model.stl";

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Model color RGB
    pub model_color: [u8; 3],
    /// Show the ground grid
    pub show_grid: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [15, 23, 42],
            model_color: [0, 204, 217],
            show_grid: true,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Generation backend base address
    pub backend_url: String,
    /// Suggested name in the export dialog
    pub export_file_name: String,
    /// Quality parameters sent with text-to-3D requests
    pub quality: GenerationQuality,
    pub ui: UiSettings,
    pub viewport: ViewportSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            quality: GenerationQuality::default(),
            ui: UiSettings::default(),
            viewport: ViewportSettings::default(),
        }
    }
}

impl AppSettings {
    /// `settings.json` in the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "fast3dprint", "fast3dprint")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found.
    /// Environment overrides are applied on top.
    pub fn load() -> Self {
        let mut settings = Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Read `path`; a missing or corrupt file yields defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("ignoring corrupt settings {}: {e}", path.display());
            Self::default()
        })
    }

    /// Apply overrides from `lookup` (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.trim().is_empty()) {
            tracing::info!("backend url overridden by {BACKEND_URL_ENV}: {url}");
            self.backend_url = url;
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("failed to save settings: {e}");
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.backend_url, "http://localhost:8000");
        assert_eq!(settings.export_file_name, "fast3dprint_model.stl");
        assert_eq!(settings.quality.steps, 64);
        assert_eq!(settings.quality.guidance, 15.0);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            backend_url: "http://gpu-box:9000".into(),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn missing_or_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"export_file_name": "model.stl"}"#).unwrap();
        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.export_file_name, "model.stl");
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn env_override_replaces_backend() {
        let mut settings = AppSettings::default();
        settings.apply_overrides(|key| {
            (key == BACKEND_URL_ENV).then(|| "http://10.0.0.2:8000".to_string())
        });
        assert_eq!(settings.backend_url, "http://10.0.0.2:8000");

        settings.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(settings.backend_url, "http://10.0.0.2:8000");
    }
}
