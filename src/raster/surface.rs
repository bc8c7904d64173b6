use crate::foundation::core::{Affine, BezPath, FrameSize, Rect};
use crate::foundation::error::{ReelError, ReelResult};
use crate::raster::layer::Layer;
use crate::text::shaper::ShapedLine;

/// Offscreen vello_cpu canvas that records coverage only: every shape is drawn opaque
/// white, so the result's alpha is the shape's anti-aliased coverage.
pub struct MaskCanvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl MaskCanvas {
    pub fn new(frame: FrameSize) -> ReelResult<Self> {
        let (width, height) = surface_dims(frame)?;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint(vello_cpu::peniko::Color::WHITE);
        Ok(Self {
            ctx,
            width,
            height,
        })
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(transform));
    }

    pub fn fill_path(&mut self, path: &BezPath) {
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub fn stroke_path(&mut self, path: &BezPath, width: f64) {
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    /// Draw a shaped line with its origin at `(x, baseline)` in the current transform.
    pub fn fill_glyphs(
        &mut self,
        font: &vello_cpu::peniko::FontData,
        line: &ShapedLine,
        x: f64,
        baseline: f64,
    ) {
        if line.glyphs.is_empty() {
            return;
        }
        let (x, baseline) = (x as f32, baseline as f32);
        let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: x + g.x,
            y: baseline + g.y,
        });
        self.ctx
            .glyph_run(font)
            .font_size(line.font_size)
            .glyph_transform(vello_cpu::kurbo::Affine::skew(-line.italic_skew(), 0.0))
            .fill_glyphs(glyphs);
    }

    /// Rasterize everything drawn so far into a frame-sized coverage layer.
    pub fn finish(mut self) -> Layer {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        Layer::from_parts(
            u32::from(self.width),
            u32::from(self.height),
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

/// vello_cpu surfaces are addressed with `u16` dimensions.
pub(crate) fn surface_dims(frame: FrameSize) -> ReelResult<(u16, u16)> {
    let width: u16 = frame.width.try_into().map_err(|_| {
        ReelError::raster(format!("frame width {} exceeds surface limit", frame.width))
    })?;
    let height: u16 = frame.height.try_into().map_err(|_| {
        ReelError::raster(format!(
            "frame height {} exceeds surface limit",
            frame.height
        ))
    })?;
    if width == 0 || height == 0 {
        return Err(ReelError::raster("surface width/height must be > 0"));
    }
    Ok((width, height))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: crate::foundation::core::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
