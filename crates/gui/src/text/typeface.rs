//! Typeface JSON fonts (the format produced by facetype.js and used by three.js).
//!
//! Each glyph carries an advance (`ha`) and an outline string of drawing
//! commands in font units:
//!
//! - `m x y`: move to
//! - `l x y`: line to
//! - `q x y cpx cpy`: quadratic curve, end point first
//! - `b x y c1x c1y c2x c2y`: cubic curve, end point first
//!
//! Font units are scaled by `size / resolution`.

use std::collections::HashMap;

use kurbo::{Affine, BezPath, CubicBez, ParamCurve, PathEl, Point, QuadBez};
use serde::Deserialize;

use super::FontError;

/// Flattened closed outline, in layout units
pub type Contour = Vec<Point>;

#[derive(Deserialize)]
struct TypefaceFile {
    glyphs: HashMap<String, GlyphFile>,
    resolution: f64,
    #[serde(rename = "familyName", default)]
    family_name: String,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f64,
}

#[derive(Deserialize)]
struct BoundingBox {
    #[serde(rename = "yMin")]
    y_min: f64,
    #[serde(rename = "yMax")]
    y_max: f64,
}

#[derive(Deserialize)]
struct GlyphFile {
    ha: f64,
    #[serde(default)]
    o: Option<String>,
}

/// A single glyph: advance width and outline in font units
#[derive(Debug, Clone)]
pub struct Glyph {
    pub advance: f64,
    pub outline: BezPath,
}

/// Parsed typeface
#[derive(Debug, Clone)]
pub struct Typeface {
    pub family: String,
    pub resolution: f64,
    /// Distance between baselines, in font units
    pub line_height: f64,
    glyphs: HashMap<char, Glyph>,
}

impl Typeface {
    /// Parse a typeface JSON document.
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let file: TypefaceFile = serde_json::from_str(json)?;
        if !(file.resolution.is_finite() && file.resolution > 0.0) {
            return Err(FontError::Invalid(format!(
                "resolution must be positive, got {}",
                file.resolution
            )));
        }

        let mut glyphs = HashMap::with_capacity(file.glyphs.len());
        for (key, glyph) in file.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                // Ligature keys and the like are not addressable by a single char
                continue;
            };
            let outline = match glyph.o.as_deref() {
                Some(o) => parse_outline(o).map_err(|e| {
                    FontError::Invalid(format!("glyph {key:?}: {e}"))
                })?,
                None => BezPath::new(),
            };
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha,
                    outline,
                },
            );
        }

        Ok(Self {
            family: file.family_name,
            resolution: file.resolution,
            line_height: file.bounding_box.y_max - file.bounding_box.y_min
                + file.underline_thickness,
            glyphs,
        })
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph for `ch`, falling back to `?`
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&'?'))
    }

    /// Lay out `text` and flatten it into closed contours.
    ///
    /// `size` is the em size and `letter_spacing` the extra advance per glyph,
    /// both in output units. Each curve is flattened into `curve_segments` lines.
    pub fn layout(
        &self,
        text: &str,
        size: f64,
        letter_spacing: f64,
        curve_segments: u32,
    ) -> Vec<Contour> {
        let scale = size / self.resolution;
        let line_height = self.line_height * scale;
        let mut contours = Vec::new();
        let mut offset_x = 0.0;
        let mut offset_y = 0.0;

        for ch in text.chars() {
            if ch == '\n' {
                offset_x = 0.0;
                offset_y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else {
                continue;
            };
            let mut path = glyph.outline.clone();
            path.apply_affine(Affine::translate((offset_x, offset_y)) * Affine::scale(scale));
            contours.extend(flatten(&path, curve_segments));
            offset_x += glyph.advance * scale + letter_spacing;
        }

        contours
    }
}

fn parse_outline(outline: &str) -> Result<BezPath, String> {
    let tokens: Vec<&str> = outline.split_whitespace().collect();
    let mut path = BezPath::new();
    let mut i = 0;

    let number = |i: &mut usize| -> Result<f64, String> {
        let tok = tokens
            .get(*i)
            .ok_or_else(|| "outline ended mid-command".to_string())?;
        *i += 1;
        tok.parse::<f64>()
            .map_err(|_| format!("bad number {tok:?}"))
    };

    while i < tokens.len() {
        let cmd = tokens[i];
        i += 1;
        match cmd {
            "m" => {
                let (x, y) = (number(&mut i)?, number(&mut i)?);
                path.move_to((x, y));
            }
            "l" => {
                let (x, y) = (number(&mut i)?, number(&mut i)?);
                path.line_to((x, y));
            }
            "q" => {
                let (x, y) = (number(&mut i)?, number(&mut i)?);
                let (cx, cy) = (number(&mut i)?, number(&mut i)?);
                path.quad_to((cx, cy), (x, y));
            }
            "b" => {
                let (x, y) = (number(&mut i)?, number(&mut i)?);
                let (c1x, c1y) = (number(&mut i)?, number(&mut i)?);
                let (c2x, c2y) = (number(&mut i)?, number(&mut i)?);
                path.curve_to((c1x, c1y), (c2x, c2y), (x, y));
            }
            "z" => path.close_path(),
            other => return Err(format!("unknown outline command {other:?}")),
        }
    }

    Ok(path)
}

/// Flatten a path into closed contours with a fixed number of segments per curve.
fn flatten(path: &BezPath, curve_segments: u32) -> Vec<Contour> {
    let steps = curve_segments.max(1);
    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();
    let mut last = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish_contour(&mut current, &mut contours);
                current.push(p);
                last = p;
            }
            PathEl::LineTo(p) => {
                current.push(p);
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                let quad = QuadBez::new(last, c, p);
                for s in 1..=steps {
                    current.push(quad.eval(s as f64 / steps as f64));
                }
                last = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                let cubic = CubicBez::new(last, c1, c2, p);
                for s in 1..=steps {
                    current.push(cubic.eval(s as f64 / steps as f64));
                }
                last = p;
            }
            PathEl::ClosePath => finish_contour(&mut current, &mut contours),
        }
    }
    finish_contour(&mut current, &mut contours);

    contours
}

fn finish_contour(current: &mut Contour, contours: &mut Vec<Contour>) {
    let mut contour = std::mem::take(current);
    contour.dedup_by(|a, b| a.distance(*b) < 1e-9);
    while contour.len() > 1 && contour[0].distance(contour[contour.len() - 1]) < 1e-9 {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}
