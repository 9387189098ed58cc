//! Extruded 3D text: typeface parsing, outline triangulation, extrusion and
//! asynchronous font loading.

pub mod extrude;
pub mod fonts;
pub mod triangulate;
pub mod typeface;

use std::collections::HashMap;
use std::sync::Arc;

pub use extrude::{extrude, extrude_contours, BevelProfile, TextExtrusion, TEXT_BEVEL};
pub use fonts::{FontChoice, FontLibrary, FONT_CHOICES};
pub use triangulate::{group_contours, triangulate, Polygon};
pub use typeface::{Contour, Typeface};

/// Font loading/parsing failure
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("font file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("font is not valid typeface JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid typeface: {0}")]
    Invalid(String),
}

/// Resolution state of a font reference
#[derive(Debug, Clone)]
pub enum FontStatus {
    Ready(Arc<Typeface>),
    /// Still loading; render nothing until resolved
    Pending,
    Failed(String),
}

/// Font lookup used by the assemblers.
///
/// Implementations may start a load as a side effect of a lookup miss.
pub trait GlyphSource {
    fn font_status(&self, reference: &str) -> FontStatus;
}

/// Fonts resolved up front; unknown references report `Failed`.
#[derive(Default, Clone)]
pub struct StaticFonts {
    fonts: HashMap<String, Arc<Typeface>>,
}

impl StaticFonts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, reference: impl Into<String>, typeface: Typeface) -> Self {
        self.insert(reference, typeface);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, typeface: Typeface) {
        self.fonts.insert(reference.into(), Arc::new(typeface));
    }
}

impl GlyphSource for StaticFonts {
    fn font_status(&self, reference: &str) -> FontStatus {
        match self.fonts.get(reference) {
            Some(tf) => FontStatus::Ready(Arc::clone(tf)),
            None => FontStatus::Failed(format!("font {reference} not loaded")),
        }
    }
}
