//! Factory functions for creating test data.
//!
//! Provides a tiny block-letter typeface, ready-made glyph sources and
//! parameter records used by unit tests, integration tests and the harness.

use shared::*;

use crate::text::{FontStatus, GlyphSource, StaticFonts, Typeface};

// ── Fonts ───────────────────────────────────────────────────────

/// Reference under which the block typeface is registered
pub const BLOCK_FONT: &str = "fixtures://block.typeface.json";

/// Typeface JSON with rectangular glyphs (resolution 1000).
///
/// - `I`: 200 x 700 bar, advance 400
/// - `O`: 600 x 700 ring with a 200 x 300 counter, advance 700
/// - `L`: concave 500 x 700, advance 600
/// - `?`: 300 x 300 square, advance 400
/// - space: no outline, advance 300
pub fn block_typeface_json() -> String {
    serde_json::json!({
        "familyName": "Block",
        "resolution": 1000,
        "ascender": 800,
        "descender": -200,
        "underlineThickness": 50,
        "boundingBox": { "xMin": 0, "xMax": 700, "yMin": -200, "yMax": 800 },
        "glyphs": {
            "I": { "ha": 400, "x_min": 0, "x_max": 200, "o": "m 0 0 l 200 0 l 200 700 l 0 700 z" },
            "O": {
                "ha": 700, "x_min": 0, "x_max": 600,
                "o": "m 0 0 l 600 0 l 600 700 l 0 700 z m 200 200 l 200 500 l 400 500 l 400 200 z"
            },
            "L": { "ha": 600, "x_min": 0, "x_max": 500, "o": "m 0 0 l 500 0 l 500 200 l 200 200 l 200 700 l 0 700 z" },
            "?": { "ha": 400, "x_min": 0, "x_max": 300, "o": "m 0 0 l 300 0 l 300 300 l 0 300 z" },
            " ": { "ha": 300, "x_min": 0, "x_max": 0, "o": "" }
        }
    })
    .to_string()
}

/// Parsed block typeface
pub fn block_typeface() -> Typeface {
    Typeface::from_json(&block_typeface_json()).expect("block fixture font parses")
}

/// Glyph source with the block typeface registered as `BLOCK_FONT`
pub fn block_fonts() -> StaticFonts {
    StaticFonts::new().with_font(BLOCK_FONT, block_typeface())
}

/// Glyph source whose fonts never finish loading
pub struct PendingFonts;

impl GlyphSource for PendingFonts {
    fn font_status(&self, _reference: &str) -> FontStatus {
        FontStatus::Pending
    }
}

// ── Parameter factories ─────────────────────────────────────────

/// Text spec using the block font
pub fn block_text(content: &str) -> TextSpec {
    TextSpec {
        font: BLOCK_FONT.to_string(),
        ..TextSpec::new(content)
    }
}

/// Shape spec in centimeters
pub fn shape(kind: ShapeKind, width: f64, height: f64, depth: f64) -> ShapeSpec {
    ShapeSpec {
        kind,
        width,
        height,
        depth,
    }
}

/// Mode params for the shapes mode with block-font trophy texts
pub fn shapes_params(spec: ShapeSpec, plaque: &str, base: &str) -> ModeParams {
    ModeParams {
        active: GenerationMode::Shapes,
        shapes: ShapesParams {
            shape: spec,
            plaque_text: block_text(plaque),
            base_text: block_text(base),
        },
        ..Default::default()
    }
}

/// Mode params for the 3D text mode
pub fn text_params(content: &str) -> ModeParams {
    ModeParams {
        active: GenerationMode::Text,
        text: block_text(content),
        ..Default::default()
    }
}
