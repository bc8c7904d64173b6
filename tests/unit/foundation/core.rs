use super::*;

#[test]
fn frame_size_parses_wxh() {
    let f: FrameSize = "1080x1920".parse().unwrap();
    assert_eq!(f, FrameSize::PORTRAIT_1080);

    let f: FrameSize = " 64X32 ".parse().unwrap();
    assert_eq!(f, FrameSize::new(64, 32).unwrap());
}

#[test]
fn frame_size_rejects_zero_and_garbage() {
    assert!("0x10".parse::<FrameSize>().is_err());
    assert!("10".parse::<FrameSize>().is_err());
    assert!("ax10".parse::<FrameSize>().is_err());
    assert!(FrameSize::new(10, 0).is_err());
}

#[test]
fn frame_size_default_is_portrait_and_displays() {
    assert_eq!(FrameSize::default().to_string(), "1080x1920");
    assert_eq!(FrameSize::default().byte_len(), 1080 * 1920 * 4);
}

#[test]
fn premul_scales_color_channels() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.g, 64);
    assert_eq!(c.b, 0);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
