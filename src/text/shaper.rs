use std::borrow::Cow;

use crate::text::fonts::ResolvedFont;

/// Horizontal skew applied to glyphs when italic is requested but the face is upright.
const SYNTHETIC_ITALIC_SKEW: f64 = 0.2;

/// Parley needs a brush type; glyph color is applied later by the rasterizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBrush;

/// Typographic settings for one line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub font_size: f32,
    pub letter_spacing: f32,
    pub bold: bool,
    pub italic: bool,
}

/// Glyph position relative to the start of the line and its baseline (y grows down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// One shaped line, owned and independent of the parley contexts that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedLine {
    /// Advance width including letter spacing.
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
    pub font_size: f32,
    pub glyphs: Vec<PlacedGlyph>,
    /// Underline top, relative to the baseline.
    pub underline_offset: f64,
    pub underline_thickness: f64,
    /// Face lacks the requested slant; the renderer should skew glyphs.
    pub synthetic_italic: bool,
    /// Face lacks the requested weight; the renderer should embolden glyphs.
    pub synthetic_bold: bool,
}

impl ShapedLine {
    /// Metrics used when no face is available: no glyphs, approximate vertical extents.
    pub fn empty(style: &LineStyle) -> Self {
        let size = f64::from(style.font_size);
        Self {
            width: 0.0,
            ascent: size * 0.8,
            descent: size * 0.2,
            font_size: style.font_size,
            glyphs: Vec::new(),
            underline_offset: size * 0.08,
            underline_thickness: (size / 15.0).max(1.0),
            synthetic_italic: false,
            synthetic_bold: false,
        }
    }

    pub fn italic_skew(&self) -> f64 {
        if self.synthetic_italic {
            SYNTHETIC_ITALIC_SKEW
        } else {
            0.0
        }
    }
}

/// Shapes single lines of text with one resolved face.
///
/// Each rasterizer call owns its shaper, so parley's mutable contexts are never shared
/// between threads.
pub struct TextShaper {
    font: Option<ResolvedFont>,
    family_name: Option<String>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
}

impl TextShaper {
    pub fn new(font: Option<ResolvedFont>) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let family_name = font.as_ref().and_then(|f| {
            let families = font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::new(f.data.clone()), None);
            let ids: Vec<_> = families.iter().map(|(id, _)| *id).collect();
            let names: Vec<String> = ids
                .iter()
                .filter_map(|id| font_ctx.collection.family_name(*id).map(str::to_string))
                .collect();
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(&f.family))
                .or_else(|| names.first())
                .cloned()
        });

        if font.is_some() && family_name.is_none() {
            tracing::warn!("font bytes registered no family; glyphs will be empty");
        }

        Self {
            font,
            family_name,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    pub fn font(&self) -> Option<&ResolvedFont> {
        self.font.as_ref()
    }

    /// Font handle for vello_cpu glyph runs.
    pub fn font_data(&self) -> Option<vello_cpu::peniko::FontData> {
        let font = self.font.as_ref()?;
        self.family_name.as_ref()?;
        Some(vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::new(font.data.clone()),
            font.index,
        ))
    }

    /// Shape `text` as one unwrapped line.
    pub fn shape_line(&mut self, text: &str, style: &LineStyle) -> ShapedLine {
        let Some(family_name) = self.family_name.clone() else {
            return ShapedLine::empty(style);
        };
        if text.is_empty() {
            return self.empty_metrics(style);
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.font_size));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            style.letter_spacing,
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(if style.bold {
            parley::style::FontWeight::BOLD
        } else {
            parley::style::FontWeight::NORMAL
        }));
        if style.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut shaped = self.empty_metrics(style);
        let mut first_line = true;
        for line in layout.lines() {
            let metrics = line.metrics();
            if first_line {
                shaped.ascent = f64::from(metrics.ascent);
                shaped.descent = f64::from(metrics.descent);
                first_line = false;
            }

            let baseline = metrics.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let run_metrics = run.run().metrics();
                shaped.underline_offset = f64::from(-run_metrics.underline_offset);
                shaped.underline_thickness = f64::from(run_metrics.underline_size).max(1.0);

                for glyph in run.positioned_glyphs() {
                    shaped.glyphs.push(PlacedGlyph {
                        id: glyph.id,
                        x: glyph.x,
                        y: glyph.y - baseline,
                    });
                }
            }
        }
        shaped.width = f64::from(layout.width());
        shaped
    }

    fn empty_metrics(&self, style: &LineStyle) -> ShapedLine {
        let mut line = ShapedLine::empty(style);
        if let Some(font) = &self.font {
            line.synthetic_bold = style.bold && font.weight < 600;
            line.synthetic_italic = style.italic && !font.italic;
        }
        line
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
