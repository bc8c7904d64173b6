use super::*;

fn layer_with_square(w: u32, h: u32, x0: u32, y0: u32, size: u32, px: [u8; 4]) -> Layer {
    let mut layer = Layer::transparent(w, h);
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            let idx = ((y * w + x) * 4) as usize;
            layer.data[idx..idx + 4].copy_from_slice(&px);
        }
    }
    layer
}

#[test]
fn alpha_bounds_tracks_painted_pixels() {
    let layer = Layer::transparent(8, 8);
    assert_eq!(layer.alpha_bounds(), None);
    assert!(layer.data.iter().all(|&b| b == 0));

    let layer = layer_with_square(8, 8, 2, 3, 2, [0, 0, 0, 255]);
    assert_eq!(
        layer.alpha_bounds(),
        Some(PixelBounds {
            x0: 2,
            y0: 3,
            x1: 4,
            y1: 5
        })
    );
}

#[test]
fn over_replaces_with_opaque_and_blends_translucent() {
    let mut dst = layer_with_square(4, 4, 0, 0, 4, [0, 0, 255, 255]);
    let src = layer_with_square(4, 4, 1, 1, 1, [255, 0, 0, 255]);
    dst.over(&src);
    assert_eq!(&dst.data[(5 * 4)..(5 * 4 + 4)], &[255, 0, 0, 255]);
    assert_eq!(&dst.data[0..4], &[0, 0, 255, 255]);

    let mut dst = layer_with_square(4, 4, 0, 0, 4, [0, 0, 255, 255]);
    let half = layer_with_square(4, 4, 0, 0, 1, [128, 0, 0, 128]);
    dst.over(&half);
    assert_eq!(&dst.data[0..4], &[128, 0, 127, 255]);
}

#[test]
fn scale_opacity_is_monotonic() {
    let base = layer_with_square(4, 4, 0, 0, 4, [200, 100, 50, 200]);
    let mut half = base.clone();
    half.scale_opacity(0.5);
    let mut zero = base.clone();
    zero.scale_opacity(0.0);
    let mut full = base.clone();
    full.scale_opacity(1.0);

    assert_eq!(full, base);
    assert_eq!(zero.alpha_bounds(), None);
    assert!(half.alpha_at(0, 0) < base.alpha_at(0, 0));
    assert!(half.alpha_at(0, 0) > 0);
}

#[test]
fn drop_shadow_offsets_and_blurs() {
    let layer = layer_with_square(32, 32, 8, 8, 4, [255, 255, 255, 255]);
    let red = ColorDef::rgba(1.0, 0.0, 0.0, 1.0);

    let hard = layer.drop_shadow(red, 0.0, 5.0, 3.0).unwrap();
    assert_eq!(hard.alpha_at(13, 11), 255);
    assert_eq!(hard.alpha_at(8, 8), 0);
    assert_eq!(&hard.data[((11 * 32 + 13) * 4) as usize..][..4], &[255, 0, 0, 255]);

    let soft = layer.drop_shadow(red, 4.0, 0.0, 0.0).unwrap();
    assert!(soft.alpha_at(9, 9) < 255);
    assert!(soft.alpha_at(6, 9) > 0);
    assert_eq!(soft.alpha_at(0, 0), 0);
}

#[test]
fn drop_shadow_of_empty_or_transparent_color_is_empty() {
    let empty = Layer::transparent(8, 8);
    assert!(empty
        .drop_shadow(ColorDef::BLACK, 4.0, 1.0, 1.0)
        .unwrap()
        .alpha_bounds()
        .is_none());

    let layer = layer_with_square(8, 8, 2, 2, 2, [255, 255, 255, 255]);
    assert!(layer
        .drop_shadow(ColorDef::TRANSPARENT, 4.0, 1.0, 1.0)
        .unwrap()
        .alpha_bounds()
        .is_none());
}

#[test]
fn shadow_alpha_follows_content_alpha() {
    let layer = layer_with_square(8, 8, 2, 2, 2, [64, 64, 64, 64]);
    let shadow = layer.drop_shadow(ColorDef::BLACK, 0.0, 0.0, 0.0).unwrap();
    assert_eq!(shadow.alpha_at(2, 2), 64);
}
