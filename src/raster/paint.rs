use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::math::unit_to_u8;
use crate::model::color::ColorDef;
use crate::model::element::GradientStyle;
use crate::raster::layer::{Layer, mask_px};

/// Two-stop linear gradient in local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub from: ColorDef,
    pub to: ColorDef,
}

impl LinearGradient {
    /// CSS `linear-gradient(<angle>, from, to)` over `rect`.
    ///
    /// 0deg points up and 90deg points right; the gradient line runs through the box center
    /// and is long enough for the box corners to land exactly on the end stops.
    pub fn css(rect: Rect, angle_deg: f64, from: ColorDef, to: ColorDef) -> Self {
        let a = angle_deg.to_radians();
        let dir = Vec2::new(a.sin(), -a.cos());
        let len = (rect.width() * a.sin()).abs() + (rect.height() * a.cos()).abs();
        let half = dir * (len / 2.0);
        let center = rect.center();
        Self {
            start: center - half,
            end: center + half,
            from,
            to,
        }
    }

    /// Position of `p` along the gradient line, clamped to the stops.
    pub fn param_at(&self, p: Point) -> f64 {
        let axis = self.end - self.start;
        let len2 = axis.hypot2();
        if len2 <= f64::EPSILON {
            return 0.0;
        }
        ((p - self.start).dot(axis) / len2).clamp(0.0, 1.0)
    }

    pub fn color_at(&self, p: Point) -> ColorDef {
        self.from.lerp(self.to, self.param_at(p))
    }
}

/// How a coverage mask gets colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(ColorDef),
    Linear(LinearGradient),
}

impl Paint {
    /// Solid `color`, or the gradient when enabled, spanning `rect`.
    pub fn from_style(color: &str, gradient: &GradientStyle, rect: Rect) -> Self {
        if gradient.enabled {
            let [from, to] = &gradient.colors;
            Self::Linear(LinearGradient::css(
                rect,
                gradient.angle,
                ColorDef::parse_or_black(from),
                ColorDef::parse_or_black(to),
            ))
        } else {
            Self::Solid(ColorDef::parse_or_black(color))
        }
    }

    pub fn solid(color: &str) -> Self {
        Self::Solid(ColorDef::parse_or_black(color))
    }

    /// Color `coverage` (white mask alpha) with this paint.
    ///
    /// `local_from_device` maps pixel centers into the coordinate space the gradient was
    /// defined in. `alpha` scales the result.
    pub fn tint(&self, coverage: &Layer, local_from_device: Affine, alpha: f64) -> Layer {
        let mut out = Layer::transparent(coverage.width, coverage.height);
        let Some(b) = coverage.alpha_bounds() else {
            return out;
        };
        let w = coverage.width as usize;

        match self {
            Self::Solid(color) => {
                let premul = color.with_alpha_scaled(alpha).to_rgba8_premul();
                if premul.a == 0 {
                    return out;
                }
                for y in b.y0..b.y1 {
                    for x in b.x0..b.x1 {
                        let idx = (y as usize * w + x as usize) * 4;
                        let cov = coverage.data[idx + 3];
                        if cov != 0 {
                            out.data[idx..idx + 4].copy_from_slice(&mask_px(premul, cov));
                        }
                    }
                }
            }
            Self::Linear(gradient) => {
                for y in b.y0..b.y1 {
                    for x in b.x0..b.x1 {
                        let idx = (y as usize * w + x as usize) * 4;
                        let cov = coverage.data[idx + 3];
                        if cov == 0 {
                            continue;
                        }
                        let device = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                        let c = gradient.color_at(local_from_device * device);
                        let a = (c.a * alpha).clamp(0.0, 1.0) * f64::from(cov) / 255.0;
                        out.data[idx] = unit_to_u8(c.r * a);
                        out.data[idx + 1] = unit_to_u8(c.g * a);
                        out.data[idx + 2] = unit_to_u8(c.b * a);
                        out.data[idx + 3] = unit_to_u8(a);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/paint.rs"]
mod tests;
