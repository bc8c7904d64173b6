use crate::foundation::core::Rgba8Premul;
use crate::foundation::math::unit_to_u8;

/// Straight-alpha sRGB color with unit channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDef {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorDef {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color string, falling back to opaque black (what a 2D canvas keeps when
    /// handed an invalid style).
    pub fn parse_or_black(s: &str) -> Self {
        match parse_css_color(s) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(color = s, error = %e, "unparseable color, drawing with black");
                Self::BLACK
            }
        }
    }

    pub fn with_alpha_scaled(self, factor: f64) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Interpolate in straight-alpha space.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let a = self.a.clamp(0.0, 1.0);
        Rgba8Premul {
            r: unit_to_u8(self.r.clamp(0.0, 1.0) * a),
            g: unit_to_u8(self.g.clamp(0.0, 1.0) * a),
            b: unit_to_u8(self.b.clamp(0.0, 1.0) * a),
            a: unit_to_u8(a),
        }
    }
}

/// Parse the CSS color syntaxes the editor emits.
pub fn parse_css_color(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some((name, rest)) = lower.split_once('(') {
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("unterminated color function \"{s}\""))?;
        let parts = split_args(args);
        return match name.trim() {
            "rgb" | "rgba" => parse_rgb_fn(&parts),
            "hsl" | "hsla" => parse_hsl_fn(&parts),
            other => Err(format!("unsupported color function \"{other}\"")),
        };
    }

    named_color(&lower).ok_or_else(|| format!("unknown color \"{s}\""))
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };

    Ok(ColorDef::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_number(p: &str) -> Result<f64, String> {
    p.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid number \"{p}\""))
}

/// Channel value: `0..255` or a percentage.
fn parse_channel(p: &str) -> Result<f64, String> {
    match p.strip_suffix('%') {
        Some(pct) => Ok(parse_number(pct)? / 100.0),
        None => Ok(parse_number(p)? / 255.0),
    }
}

/// Alpha value: `0..1` or a percentage.
fn parse_alpha(p: &str) -> Result<f64, String> {
    match p.strip_suffix('%') {
        Some(pct) => Ok(parse_number(pct)? / 100.0),
        None => parse_number(p),
    }
}

fn parse_rgb_fn(parts: &[&str]) -> Result<ColorDef, String> {
    if parts.len() != 3 && parts.len() != 4 {
        return Err("rgb()/rgba() takes 3 or 4 arguments".to_owned());
    }
    let a = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 1.0,
    };
    Ok(ColorDef::rgba(
        parse_channel(parts[0])?.clamp(0.0, 1.0),
        parse_channel(parts[1])?.clamp(0.0, 1.0),
        parse_channel(parts[2])?.clamp(0.0, 1.0),
        a.clamp(0.0, 1.0),
    ))
}

fn parse_hsl_fn(parts: &[&str]) -> Result<ColorDef, String> {
    if parts.len() != 3 && parts.len() != 4 {
        return Err("hsl()/hsla() takes 3 or 4 arguments".to_owned());
    }
    let h = parse_number(parts[0].trim_end_matches("deg"))?;
    let pct = |p: &str| -> Result<f64, String> {
        Ok(parse_number(p.trim_end_matches('%'))? / 100.0)
    };
    let a = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 1.0,
    };
    Ok(hsla_to_rgba(h, pct(parts[1])?, pct(parts[2])?, a.clamp(0.0, 1.0)))
}

fn named_color(name: &str) -> Option<ColorDef> {
    let rgb = |r: u8, g: u8, b: u8| {
        ColorDef::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    };
    Some(match name {
        "transparent" => ColorDef::TRANSPARENT,
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "green" => rgb(0, 128, 0),
        "blue" => rgb(0, 0, 255),
        "yellow" => rgb(255, 255, 0),
        "cyan" | "aqua" => rgb(0, 255, 255),
        "magenta" | "fuchsia" => rgb(255, 0, 255),
        "gray" | "grey" => rgb(128, 128, 128),
        "orange" => rgb(255, 165, 0),
        "purple" => rgb(128, 0, 128),
        "pink" => rgb(255, 192, 203),
        _ => return None,
    })
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    ColorDef::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/model/color.rs"]
mod tests;
