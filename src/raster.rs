//! Rasterizer – paints settled layout boxes into a single RGB bitmap at
//! elevated pixel density for print sharpness.
//!
//! Rectangles (backgrounds, rules, underlines) are filled directly; text
//! runs go through cosmic-text for shaping and glyph rasterization. A
//! missing system font library degrades text fidelity but never fails the
//! export – the bitmap keeps its dimensions and backdrop either way.

use cosmic_text::{
    Attrs, Buffer, Color as GlyphColor, Family, FontSystem, Metrics, Shaping, Style as GlyphStyle,
    SwashCache, Weight,
};
use image::{Rgb, RgbImage};

use crate::error::ExportError;
use crate::layout::{content_height, BoxContent, PositionedBox};
use crate::style::{Color, ComputedStyle, FontStyle, FontWeight, TextDecoration};

/// Gutter between a list item's box and its bullet, in content px.
const MARKER_GUTTER_PX: f32 = 14.0;

/// Owns the font system and glyph cache for one export call.
pub struct Rasterizer {
    font_system: FontSystem,
    cache: SwashCache,
}

impl Rasterizer {
    pub fn new() -> Self {
        let font_system = FontSystem::new();
        if font_system.db().faces().next().is_none() {
            log::warn!("no system fonts found; exported text will not be painted");
        }
        Self {
            font_system,
            cache: SwashCache::new(),
        }
    }

    /// Capture the laid-out boxes as one bitmap of `width_px × content
    /// height`, scaled by `density`, over an opaque white backdrop.
    pub fn rasterize(
        &mut self,
        boxes: &[PositionedBox],
        width_px: f32,
        density: f32,
    ) -> Result<RgbImage, ExportError> {
        if width_px <= 0.0 || density <= 0.0 {
            return Err(ExportError::Raster(format!(
                "invalid capture geometry: width {width_px}px, density {density}"
            )));
        }
        let height_px = content_height(boxes);
        if height_px <= 0.0 {
            return Err(ExportError::Raster("nothing to rasterize".to_string()));
        }

        let w = (width_px * density).ceil() as u32;
        let h = (height_px * density).ceil() as u32;
        let mut img = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));

        for pbox in boxes {
            self.draw_box(&mut img, pbox, density);
        }
        Ok(img)
    }

    fn draw_box(&mut self, img: &mut RgbImage, pbox: &PositionedBox, density: f32) {
        let s = &pbox.style;

        if !s.background_color.is_transparent() {
            fill_rect(
                img,
                pbox.x * density,
                pbox.y * density,
                pbox.width * density,
                pbox.height * density,
                s.background_color,
            );
        }

        if s.border_bottom > 0.0 {
            fill_rect(
                img,
                pbox.x * density,
                (pbox.y + pbox.height - s.border_bottom) * density,
                pbox.width * density,
                (s.border_bottom * density).max(1.0),
                s.border_color,
            );
        }

        if let BoxContent::Text { lines, marker } = &pbox.content {
            self.draw_text(img, pbox, lines, density);
            if let Some(marker) = marker {
                self.draw_run(
                    img,
                    marker,
                    s,
                    (pbox.x - MARKER_GUTTER_PX) * density,
                    pbox.y * density,
                    density,
                );
            }
        }

        for child in &pbox.children {
            self.draw_box(img, child, density);
        }
    }

    fn draw_text(&mut self, img: &mut RgbImage, pbox: &PositionedBox, lines: &[String], density: f32) {
        let s = &pbox.style;
        let line_height = s.font_size * s.line_height;

        // Lines were wrapped at layout time; joining with hard breaks keeps
        // them, and an unbounded buffer width prevents re-wrapping.
        let text = lines.join("\n");
        self.draw_run(img, &text, s, pbox.x * density, pbox.y * density, density);

        if s.text_decoration == TextDecoration::Underline {
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                fill_rect(
                    img,
                    pbox.x * density,
                    (pbox.y + (i as f32 + 1.0) * line_height - 1.5) * density,
                    pbox.width * density,
                    density.max(1.0),
                    s.color,
                );
            }
        }
    }

    /// Shape and paint one text run at a pixel position.
    fn draw_run(
        &mut self,
        img: &mut RgbImage,
        text: &str,
        style: &ComputedStyle,
        origin_x: f32,
        origin_y: f32,
        density: f32,
    ) {
        if text.is_empty() {
            return;
        }
        let metrics = Metrics::new(
            style.font_size * density,
            style.font_size * style.line_height * density,
        );
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);

        let mut attrs = Attrs::new().family(Family::SansSerif);
        if style.font_weight == FontWeight::Bold {
            attrs = attrs.weight(Weight::BOLD);
        }
        if style.font_style == FontStyle::Italic {
            attrs = attrs.style(GlyphStyle::Italic);
        }
        buffer.set_text(&mut self.font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let color = to_glyph_color(style.color);
        let (ox, oy) = (origin_x, origin_y);
        let (img_w, img_h) = (img.width() as i32, img.height() as i32);
        buffer.draw(
            &mut self.font_system,
            &mut self.cache,
            color,
            |x, y, w, h, c| {
                let alpha = c.a() as f32 / 255.0;
                if alpha <= 0.0 {
                    return;
                }
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        let px = ox as i32 + x + dx;
                        let py = oy as i32 + y + dy;
                        if px < 0 || py < 0 || px >= img_w || py >= img_h {
                            continue;
                        }
                        let pixel = img.get_pixel_mut(px as u32, py as u32);
                        for (chan, src) in pixel.0.iter_mut().zip([c.r(), c.g(), c.b()]) {
                            *chan = (*chan as f32 * (1.0 - alpha) + src as f32 * alpha) as u8;
                        }
                    }
                }
            },
        );
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_glyph_color(c: Color) -> GlyphColor {
    GlyphColor::rgba(
        (c.r * 255.0) as u8,
        (c.g * 255.0) as u8,
        (c.b * 255.0) as u8,
        (c.a * 255.0) as u8,
    )
}

/// Fill an axis-aligned rectangle, clamped to the image bounds.
fn fill_rect(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Color) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).ceil().max(0.0) as u32).min(img.width());
    let y1 = ((y + h).ceil().max(0.0) as u32).min(img.height());
    let rgb = Rgb([
        (color.r * 255.0) as u8,
        (color.g * 255.0) as u8,
        (color.b * 255.0) as u8,
    ]);
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, rgb);
        }
    }
}
