use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::ReelResult;
use crate::foundation::math::{mul_div255_u8, mul_div255_u16, scale_u8};
use crate::model::color::ColorDef;
use crate::raster::blur::{blur_plane, radius_for_sigma};

/// Inclusive-exclusive pixel rectangle inside a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Frame-sized premultiplied RGBA8 buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Layer {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }

    /// Tightest rectangle holding every non-transparent pixel.
    pub fn alpha_bounds(&self) -> Option<PixelBounds> {
        let w = self.width as usize;
        let mut bounds: Option<PixelBounds> = None;
        for (y, row) in self.data.chunks_exact(w * 4).enumerate() {
            let first = row.chunks_exact(4).position(|px| px[3] != 0);
            let Some(first) = first else {
                continue;
            };
            let last = row.chunks_exact(4).rposition(|px| px[3] != 0).unwrap_or(first);
            let row_bounds = PixelBounds {
                x0: first as u32,
                y0: y as u32,
                x1: last as u32 + 1,
                y1: y as u32 + 1,
            };
            bounds = Some(match bounds {
                Some(b) => b.union(row_bounds),
                None => row_bounds,
            });
        }
        bounds
    }

    /// Source-over `src` onto `self` inside `src`'s painted bounds.
    pub fn over(&mut self, src: &Layer) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));
        let Some(b) = src.alpha_bounds() else {
            return;
        };
        let w = self.width as usize;
        for y in b.y0..b.y1 {
            let start = (y as usize * w + b.x0 as usize) * 4;
            let end = (y as usize * w + b.x1 as usize) * 4;
            for (d, s) in self.data[start..end]
                .chunks_exact_mut(4)
                .zip(src.data[start..end].chunks_exact(4))
            {
                over_px(d, s);
            }
        }
    }

    /// Multiply every channel by a unit opacity.
    pub fn scale_opacity(&mut self, opacity: f64) {
        if opacity >= 1.0 {
            return;
        }
        let opacity = opacity.max(0.0) as f32;
        for c in &mut self.data {
            *c = scale_u8(*c, opacity);
        }
    }

    /// Canvas-style drop shadow of this layer's content.
    ///
    /// The shadow is `color` masked by the content alpha, blurred with `sigma = blur / 2`
    /// and shifted by the (device space) offset.
    pub fn drop_shadow(&self, color: ColorDef, blur: f64, dx: f64, dy: f64) -> ReelResult<Layer> {
        let mut out = Layer::transparent(self.width, self.height);
        let Some(b) = self.alpha_bounds() else {
            return Ok(out);
        };
        let tint = color.to_rgba8_premul();
        if tint.a == 0 {
            return Ok(out);
        }

        let sigma = blur.max(0.0) / 2.0;
        let radius = radius_for_sigma(sigma);
        let pad = radius as i64;

        // Blur region: content bounds grown by the kernel radius, may extend past the frame.
        let rx0 = i64::from(b.x0) - pad;
        let ry0 = i64::from(b.y0) - pad;
        let rw = i64::from(b.width()) + 2 * pad;
        let rh = i64::from(b.height()) + 2 * pad;

        let mut plane = vec![0u8; (rw * rh) as usize];
        for y in b.y0..b.y1 {
            for x in b.x0..b.x1 {
                let px = (i64::from(x) - rx0) as usize;
                let py = (i64::from(y) - ry0) as usize;
                plane[py * rw as usize + px] = self.alpha_at(x, y);
            }
        }
        let plane = blur_plane(&plane, rw as u32, rh as u32, radius, sigma as f32)?;

        let ox = dx.round() as i64;
        let oy = dy.round() as i64;
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        for py in 0..rh {
            let ty = ry0 + py + oy;
            if ty < 0 || ty >= h {
                continue;
            }
            for px in 0..rw {
                let tx = rx0 + px + ox;
                if tx < 0 || tx >= w {
                    continue;
                }
                let a = plane[(py * rw + px) as usize];
                if a == 0 {
                    continue;
                }
                let idx = ((ty * w + tx) as usize) * 4;
                out.data[idx..idx + 4].copy_from_slice(&mask_px(tint, a));
            }
        }
        Ok(out)
    }
}

/// Premultiplied `color` scaled by an 8-bit coverage.
pub(crate) fn mask_px(color: Rgba8Premul, coverage: u8) -> [u8; 4] {
    let cov = u16::from(coverage);
    [
        mul_div255_u8(u16::from(color.r), cov),
        mul_div255_u8(u16::from(color.g), cov),
        mul_div255_u8(u16::from(color.b), cov),
        mul_div255_u8(u16::from(color.a), cov),
    ]
}

fn over_px(dst: &mut [u8], src: &[u8]) {
    let sa = src[3];
    if sa == 0 {
        return;
    }
    if sa == 255 {
        dst.copy_from_slice(src);
        return;
    }
    let inv = 255u16 - u16::from(sa);
    for i in 0..4 {
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        dst[i] = (u16::from(src[i]) + dc).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/layer.rs"]
mod tests;
