use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use kurbo::{RoundedRect, Shape};

use crate::foundation::core::{Affine, FrameSize, Point, Rect, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::color::ColorDef;
use crate::model::element::{TextAlign, TextElement};
use crate::raster::layer::{Layer, PixelBounds};
use crate::raster::paint::Paint;
use crate::raster::surface::{MaskCanvas, surface_dims};
use crate::text::fonts::FontBook;
use crate::text::shaper::{LineStyle, ShapedLine, TextShaper};

/// Flattening tolerance for rounded background boxes, in pixels.
const PATH_TOLERANCE: f64 = 0.1;

/// Transparent, frame-sized, premultiplied RGBA8 rendering of one text element.
#[derive(Clone, PartialEq, Eq)]
pub struct OverlayRaster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for OverlayRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRaster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint()))
            .finish()
    }
}

impl OverlayRaster {
    fn from_layer(layer: Layer) -> Self {
        Self {
            width: layer.width,
            height: layer.height,
            data: layer.data,
        }
    }

    /// Stable digest of dimensions and pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = xxhash_rust::xxh3::Xxh3::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&self.data);
        hasher.digest()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y)[3]
    }

    /// Sum of all alpha values; a coarse measure of how much the overlay covers.
    pub fn alpha_sum(&self) -> u64 {
        self.data.chunks_exact(4).map(|px| u64::from(px[3])).sum()
    }

    pub fn painted_pixel_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn alpha_bounds(&self) -> Option<PixelBounds> {
        Layer::from_parts(self.width, self.height, self.data.clone()).alpha_bounds()
    }

    /// Straight (non-premultiplied) RGBA8 copy, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Lossless PNG encoding.
    pub fn to_png(&self) -> ReelResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba())
            .ok_or_else(|| ReelError::raster("overlay buffer does not match its dimensions"))?;
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode overlay png")?;
        Ok(buf)
    }
}

/// Renders text elements into transparent frame-sized overlays.
///
/// Stateless apart from the shared font book; safe to call from many threads at once.
#[derive(Clone, Debug)]
pub struct OverlayRasterizer {
    fonts: Arc<FontBook>,
}

impl Default for OverlayRasterizer {
    fn default() -> Self {
        Self::new(FontBook::shared())
    }
}

struct LinePlan {
    shaped: ShapedLine,
    /// Left edge of the line in local space.
    x: f64,
    top: f64,
    baseline: f64,
}

impl LinePlan {
    fn box_rect(&self, line_height: f64) -> Rect {
        Rect::new(
            self.x,
            self.top,
            self.x + self.shaped.width,
            self.top + line_height,
        )
    }
}

/// Per-element drawing state shared by every line.
struct ElementScene<'a> {
    element: &'a TextElement,
    frame: FrameSize,
    font: Option<vello_cpu::peniko::FontData>,
    line_height: f64,
    /// Local (anchor-relative, rotated) space to device pixels.
    transform: Affine,
    local_from_device: Affine,
}

impl OverlayRasterizer {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// Render `element` onto a transparent `frame`-sized surface.
    ///
    /// Missing fonts and invalid colors degrade (fallback face, black) with a warning;
    /// only structural input problems and surface failures are errors.
    #[tracing::instrument(skip_all, fields(id = %element.id, frame = %frame))]
    pub fn rasterize(&self, element: &TextElement, frame: FrameSize) -> ReelResult<OverlayRaster> {
        if !element.visible {
            return Err(ReelError::validation(format!(
                "text element '{}' is hidden and cannot be rasterized",
                element.id
            )));
        }
        element.check_structure()?;
        surface_dims(frame)?;

        let resolved = self
            .fonts
            .resolve(&element.font_family, element.bold, element.italic);
        let mut shaper = TextShaper::new(resolved);
        let style = LineStyle {
            font_size: element.font_size as f32,
            letter_spacing: element.letter_spacing as f32,
            bold: element.bold,
            italic: element.italic,
        };

        let line_height = element.font_size * element.line_height;
        let texts: Vec<&str> = element.text.split('\n').collect();
        let total_height = texts.len() as f64 * line_height;
        let lines: Vec<LinePlan> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let shaped = shaper.shape_line(text, &style);
                let x = match element.text_align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => -shaped.width / 2.0,
                    TextAlign::Right => -shaped.width,
                };
                let top = i as f64 * line_height - total_height / 2.0;
                let glyph_height = shaped.ascent + shaped.descent;
                let baseline = top + (line_height - glyph_height) / 2.0 + shaped.ascent;
                LinePlan {
                    shaped,
                    x,
                    top,
                    baseline,
                }
            })
            .collect();

        let anchor = Point::new(
            element.position.x / 100.0 * f64::from(frame.width),
            element.position.y / 100.0 * f64::from(frame.height),
        );
        let transform =
            Affine::translate(anchor.to_vec2()) * Affine::rotate(element.rotation.to_radians());
        let scene = ElementScene {
            element,
            frame,
            font: shaper.font_data(),
            line_height,
            transform,
            local_from_device: transform.inverse(),
        };

        let mut out = Layer::transparent(frame.width, frame.height);
        for line in &lines {
            if element.background.enabled {
                scene.draw_background(&mut out, line)?;
            }
            scene.draw_text(&mut out, line)?;
        }
        out.scale_opacity(element.opacity.clamp(0.0, 1.0));

        let raster = OverlayRaster::from_layer(out);
        tracing::debug!(
            lines = lines.len(),
            digest = %format_args!("{:016x}", raster.fingerprint()),
            "overlay rasterized"
        );
        Ok(raster)
    }
}

impl ElementScene<'_> {
    fn canvas(&self) -> ReelResult<MaskCanvas> {
        let mut canvas = MaskCanvas::new(self.frame)?;
        canvas.set_transform(self.transform);
        Ok(canvas)
    }

    /// Shadow, fill and stroke of one line's rounded box.
    fn draw_background(&self, out: &mut Layer, line: &LinePlan) -> ReelResult<()> {
        let bg = &self.element.background;
        let rect = line
            .box_rect(self.line_height)
            .inflate(bg.padding, bg.padding);
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Ok(());
        }
        let radius = bg
            .border_radius
            .clamp(0.0, rect.width().min(rect.height()) / 2.0);
        let path = RoundedRect::from_rect(rect, radius).to_path(PATH_TOLERANCE);
        let alpha = bg.opacity.clamp(0.0, 1.0);

        let mut canvas = self.canvas()?;
        canvas.fill_path(&path);
        let coverage = canvas.finish();
        let fill = Paint::from_style(&bg.color, &bg.gradient, rect).tint(
            &coverage,
            self.local_from_device,
            alpha,
        );

        if bg.shadow.enabled {
            let shadow = fill.drop_shadow(
                ColorDef::parse_or_black(&bg.shadow.color),
                bg.shadow.blur,
                bg.shadow.offset_x,
                bg.shadow.offset_y,
            )?;
            out.over(&shadow);
        }
        out.over(&fill);

        if bg.stroke.enabled && bg.stroke.width > 0.0 {
            let mut canvas = self.canvas()?;
            canvas.stroke_path(&path, bg.stroke.width);
            let stroke = Paint::solid(&bg.stroke.color).tint(
                &canvas.finish(),
                self.local_from_device,
                alpha,
            );
            out.over(&stroke);
        }
        Ok(())
    }

    /// Glyph shadow, halo stroke and fill of one line.
    fn draw_text(&self, out: &mut Layer, line: &LinePlan) -> ReelResult<()> {
        let element = self.element;
        let has_glyphs = self.font.is_some() && !line.shaped.glyphs.is_empty();
        let has_underline = element.underline && line.shaped.width > 0.0;
        if !has_glyphs && !has_underline {
            return Ok(());
        }

        let halo = if element.glyph_stroke_active() {
            let width = element.stroke.width;
            let samples = halo_samples(width);
            let mut canvas = self.canvas()?;
            for k in 0..samples {
                let angle = std::f64::consts::TAU * k as f64 / samples as f64;
                self.draw_text_geometry(
                    &mut canvas,
                    line,
                    Vec2::new(angle.cos() * width, angle.sin() * width),
                );
            }
            Some(Paint::solid(&element.stroke.color).tint(
                &canvas.finish(),
                self.local_from_device,
                1.0,
            ))
        } else {
            None
        };

        let mut canvas = self.canvas()?;
        self.draw_text_geometry(&mut canvas, line, Vec2::ZERO);
        let fill = Paint::from_style(
            &element.color,
            &element.gradient,
            line.box_rect(self.line_height),
        )
        .tint(&canvas.finish(), self.local_from_device, 1.0);

        if element.glyph_shadow_active() {
            let mut silhouette = halo
                .clone()
                .unwrap_or_else(|| Layer::transparent(fill.width, fill.height));
            silhouette.over(&fill);
            let shadow = silhouette.drop_shadow(
                ColorDef::parse_or_black(&element.shadow.color),
                element.shadow.blur,
                element.shadow.offset_x,
                element.shadow.offset_y,
            )?;
            out.over(&shadow);
        }
        if let Some(halo) = &halo {
            out.over(halo);
        }
        out.over(&fill);
        Ok(())
    }

    /// Glyph outlines plus underline, shifted by `offset` in local space.
    fn draw_text_geometry(&self, canvas: &mut MaskCanvas, line: &LinePlan, offset: Vec2) {
        let shaped = &line.shaped;
        let x = line.x + offset.x;
        let baseline = line.baseline + offset.y;

        if let Some(font) = &self.font {
            canvas.fill_glyphs(font, shaped, x, baseline);
            if shaped.synthetic_bold {
                let d = f64::from(shaped.font_size) / 48.0;
                for (dx, dy) in [(d, 0.0), (-d, 0.0), (0.0, d), (0.0, -d)] {
                    canvas.fill_glyphs(font, shaped, x + dx, baseline + dy);
                }
            }
        }

        if self.element.underline && shaped.width > 0.0 {
            let y = baseline + shaped.underline_offset;
            canvas.fill_rect(Rect::new(
                x,
                y,
                x + shaped.width,
                y + shaped.underline_thickness,
            ));
        }
    }
}

/// Offset copies drawn for a halo stroke of `width` pixels.
pub(crate) fn halo_samples(width: f64) -> usize {
    ((width * 3.0).round() as usize).max(8)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterizer.rs"]
mod tests;
