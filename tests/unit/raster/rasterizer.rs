use super::*;

const FRAME: FrameSize = FrameSize {
    width: 200,
    height: 100,
};

fn fontless() -> OverlayRasterizer {
    OverlayRasterizer::new(Arc::new(FontBook::empty()))
}

fn boxed(text: &str) -> TextElement {
    let mut e = TextElement::new("box", text);
    e.font_size = 20.0;
    e.line_height = 1.0;
    e.background.enabled = true;
    e.background.color = "#ff0000".to_string();
    e.background.padding = 10.0;
    e.background.border_radius = 0.0;
    e
}

#[test]
fn hidden_element_is_rejected() {
    let mut e = boxed("x");
    e.visible = false;
    let err = fontless().rasterize(&e, FRAME).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn oversized_frame_is_a_surface_error() {
    let frame = FrameSize {
        width: 70_000,
        height: 10,
    };
    let err = fontless().rasterize(&boxed("x"), frame).unwrap_err();
    assert!(matches!(err, ReelError::Raster(_)));
}

#[test]
fn output_matches_frame_size() {
    let raster = fontless().rasterize(&TextElement::new("t", "HELLO"), FRAME).unwrap();
    assert_eq!((raster.width, raster.height), (200, 100));
    assert_eq!(raster.data.len(), 200 * 100 * 4);
}

#[test]
fn background_box_is_centered_on_anchor() {
    let raster = fontless().rasterize(&boxed(""), FRAME).unwrap();
    // Empty line: zero width, line box 20px tall, padding 10 on each side.
    let b = raster.alpha_bounds().expect("box drawn");
    assert_eq!((b.x0, b.x1), (90, 110));
    assert_eq!((b.y0, b.y1), (30, 70));
    assert_eq!(raster.pixel(100, 50), [255, 0, 0, 255]);
}

#[test]
fn background_opacity_and_element_opacity_multiply() {
    let mut e = boxed("");
    e.background.opacity = 0.5;
    e.opacity = 0.5;
    let raster = fontless().rasterize(&e, FRAME).unwrap();
    let a = raster.alpha_at(100, 50);
    assert!((62..=66).contains(&a), "alpha {a}");
}

#[test]
fn background_stroke_and_shadow_extend_the_box() {
    let plain = fontless().rasterize(&boxed(""), FRAME).unwrap();

    let mut e = boxed("");
    e.background.stroke.enabled = true;
    e.background.stroke.width = 4.0;
    e.background.stroke.color = "#00ff00".to_string();
    let stroked = fontless().rasterize(&e, FRAME).unwrap();
    assert!(stroked.alpha_bounds().unwrap().x0 < plain.alpha_bounds().unwrap().x0);
    assert_eq!(stroked.pixel(100, 50), [255, 0, 0, 255]);

    let mut e = boxed("");
    e.background.shadow.enabled = true;
    e.background.shadow.blur = 0.0;
    e.background.shadow.offset_x = 15.0;
    e.background.shadow.offset_y = 0.0;
    e.background.shadow.color = "#0000ff".to_string();
    let shadowed = fontless().rasterize(&e, FRAME).unwrap();
    assert_eq!(shadowed.pixel(115, 50), [0, 0, 255, 255]);
    assert_eq!(shadowed.pixel(100, 50), [255, 0, 0, 255]);
}

#[test]
fn multi_line_boxes_stack_vertically() {
    let raster = fontless().rasterize(&boxed("\n"), FRAME).unwrap();
    let b = raster.alpha_bounds().unwrap();
    // Two 20px lines centered on y=50, each padded by 10.
    assert_eq!((b.y0, b.y1), (20, 80));
}

#[test]
fn rotation_turns_the_box() {
    let mut e = boxed("");
    e.font_size = 60.0;
    e.background.padding = 5.0;
    let flat = fontless().rasterize(&e, FRAME).unwrap().alpha_bounds().unwrap();
    e.rotation = 90.0;
    let turned = fontless().rasterize(&e, FRAME).unwrap().alpha_bounds().unwrap();
    assert_eq!(flat.width(), turned.height());
    assert_eq!(flat.height(), turned.width());
}

#[test]
fn png_encoding_round_trips_dimensions() {
    let raster = fontless().rasterize(&boxed(""), FRAME).unwrap();
    let png = raster.to_png().unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (200, 100));
    assert_eq!(decoded.get_pixel(100, 50).0, [255, 0, 0, 255]);
}

#[test]
fn fingerprint_is_stable_and_content_sensitive() {
    let a = fontless().rasterize(&boxed(""), FRAME).unwrap();
    let b = fontless().rasterize(&boxed(""), FRAME).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());

    let mut e = boxed("");
    e.background.color = "#00ff00".to_string();
    let c = fontless().rasterize(&e, FRAME).unwrap();
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn halo_sample_count_grows_with_width() {
    assert_eq!(halo_samples(0.5), 8);
    assert_eq!(halo_samples(2.0), 8);
    assert_eq!(halo_samples(2.7), 8);
    assert_eq!(halo_samples(3.0), 9);
    assert_eq!(halo_samples(4.0), 12);
    assert_eq!(halo_samples(10.2), 31);
}
