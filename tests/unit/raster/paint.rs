use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn css_angle_90_runs_left_to_right() {
    let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
    let g = LinearGradient::css(rect, 90.0, ColorDef::BLACK, ColorDef::rgba(1.0, 1.0, 1.0, 1.0));
    assert!(close(g.start.x, 0.0));
    assert!(close(g.end.x, 100.0));
    assert!(close(g.param_at(Point::new(0.0, 10.0)), 0.0));
    assert!(close(g.param_at(Point::new(50.0, 3.0)), 0.5));
    assert!(close(g.param_at(Point::new(150.0, 3.0)), 1.0));
}

#[test]
fn css_angle_0_points_up_and_180_down() {
    let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
    let up = LinearGradient::css(rect, 0.0, ColorDef::BLACK, ColorDef::BLACK);
    assert!(close(up.start.y, 40.0));
    assert!(close(up.end.y, 0.0));

    let down = LinearGradient::css(rect, 180.0, ColorDef::BLACK, ColorDef::BLACK);
    assert!(close(down.start.y, 0.0));
    assert!(close(down.end.y, 40.0));
}

#[test]
fn diagonal_gradient_reaches_corners() {
    let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    let g = LinearGradient::css(rect, 45.0, ColorDef::BLACK, ColorDef::BLACK);
    assert!(close(g.param_at(Point::new(0.0, 50.0)), 0.0));
    assert!(close(g.param_at(Point::new(100.0, 0.0)), 1.0));
}

#[test]
fn from_style_picks_gradient_only_when_enabled() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    let mut gradient = GradientStyle::default();
    assert!(matches!(
        Paint::from_style("#ff0000", &gradient, rect),
        Paint::Solid(_)
    ));
    gradient.enabled = true;
    assert!(matches!(
        Paint::from_style("#ff0000", &gradient, rect),
        Paint::Linear(_)
    ));
}

#[test]
fn tint_colors_coverage() {
    let mut coverage = Layer::transparent(4, 1);
    for x in 0..4usize {
        coverage.data[x * 4..x * 4 + 4].copy_from_slice(&[255, 255, 255, 255]);
    }
    coverage.data[3 * 4 + 3] = 0;

    let solid = Paint::Solid(ColorDef::rgba(1.0, 0.0, 0.0, 1.0)).tint(&coverage, Affine::IDENTITY, 0.5);
    assert_eq!(&solid.data[0..4], &[128, 0, 0, 128]);
    assert_eq!(&solid.data[12..16], &[0, 0, 0, 0]);

    let rect = Rect::new(0.0, 0.0, 4.0, 1.0);
    let grad = Paint::Linear(LinearGradient::css(
        rect,
        90.0,
        ColorDef::rgba(1.0, 0.0, 0.0, 1.0),
        ColorDef::rgba(0.0, 0.0, 1.0, 1.0),
    ))
    .tint(&coverage, Affine::IDENTITY, 1.0);
    assert!(grad.data[0] > grad.data[2]);
    assert!(grad.data[2 * 4] < grad.data[2 * 4 + 2]);
    assert_eq!(grad.data[3], 255);
}
