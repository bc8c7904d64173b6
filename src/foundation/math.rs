pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Map a unit interval value to `0..=255`.
pub(crate) fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scale a premultiplied channel by a unit opacity.
pub(crate) fn scale_u8(c: u8, opacity: f32) -> u8 {
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    mul_div255_u8(u16::from(c), op)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
