//! Image inputs for the image-to-3D mode

use std::path::Path;

/// File extensions accepted by the image pickers
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Which picker an image goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Front,
    Back,
}

impl ImageSlot {
    pub fn label(&self) -> &'static str {
        match self {
            ImageSlot::Front => "Front image",
            ImageSlot::Back => "Back image (optional)",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ImageSlot::Front)
    }

    /// The params field this slot writes to
    pub fn field<'a>(&self, params: &'a mut shared::ImageParams) -> &'a mut Option<String> {
        match self {
            ImageSlot::Front => &mut params.front_image,
            ImageSlot::Back => &mut params.back_image,
        }
    }
}

/// Whether `path` looks like a supported image
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Short name shown next to a picker
pub fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
