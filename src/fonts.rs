//! Font measurement using `ttf-parser`.
//!
//! The preview layout only needs advance widths and line heights. When a
//! real face is loaded we measure glyph advances; otherwise a proportional
//! heuristic keeps the layout deterministic without any font files on disk.
//! The export rasterizer does its own glyph work and does not go through
//! this module.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct FaceKey {
    bold: bool,
    italic: bool,
}

struct FaceMetrics {
    bytes: Vec<u8>,
    units_per_em: f32,
}

/// Measures text for the layout engine. One family, four faces.
#[derive(Default)]
pub struct FontManager {
    faces: HashMap<FaceKey, FaceMetrics>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TTF/OTF face for one weight/style pairing.
    pub fn load_face(&mut self, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<(), String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("failed to parse font: {e}"))?;
        self.faces.insert(
            FaceKey { bold, italic },
            FaceMetrics {
                units_per_em: face.units_per_em() as f32,
                bytes,
            },
        );
        Ok(())
    }

    /// Measure the width of a string at a given font size (px). Falls back
    /// to an average-advance heuristic when no face is loaded; bold runs
    /// about 10% wider.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool, italic: bool) -> f32 {
        let key = FaceKey { bold, italic };
        let data = self
            .faces
            .get(&key)
            .or_else(|| self.faces.get(&FaceKey { bold: false, italic: false }));

        if let Some(data) = data {
            if let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) {
                let scale = font_size / data.units_per_em;
                return text
                    .chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => font_size * 0.5,
                    })
                    .sum();
            }
        }

        let avg = if bold { 0.55 } else { 0.5 };
        text.chars().count() as f32 * font_size * avg
    }

    /// Line height in px.
    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }
}

/// Word-wrap text to fit within `max_width` px. Existing newlines are kept
/// as hard breaks.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    italic: bool,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in &words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            let w = fonts.measure_text_width(&candidate, font_size, bold, italic);
            if w > max_width && !current.is_empty() {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
