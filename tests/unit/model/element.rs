use super::*;
use serde_json::json;

#[test]
fn minimal_editor_record_fills_defaults() {
    let v = json!([{
        "id": "t1",
        "text": "HELLO",
        "fontSize": 48,
        "position": {"x": 50, "y": 50}
    }]);
    let els = TextElement::list_from_json(&v.to_string()).unwrap();
    assert_eq!(els.len(), 1);
    let e = &els[0];
    assert!(e.visible);
    assert_eq!(e.opacity, 1.0);
    assert_eq!(e.text_align, TextAlign::Center);
    assert!(!e.gradient.enabled);
    assert!(!e.background.enabled);
    assert_eq!(e.animation.kind, AnimationType::None);
}

#[test]
fn full_record_round_trips_camel_case_fields() {
    let v = json!({
        "id": "t2",
        "text": "a\nb",
        "fontFamily": "Inter",
        "fontSize": 32,
        "bold": true,
        "italic": false,
        "underline": true,
        "letterSpacing": -1.5,
        "lineHeight": 1.4,
        "textAlign": "right",
        "color": "#ff0000",
        "position": {"x": 10, "y": 90},
        "rotation": -15,
        "width": 400,
        "opacity": 0.8,
        "visible": false,
        "shadow": {"enabled": true, "color": "#000", "blur": 6, "offsetX": 1, "offsetY": 3},
        "stroke": {"enabled": true, "color": "#fff", "width": 2},
        "background": {
            "enabled": true, "color": "#222", "padding": 12, "borderRadius": 10, "opacity": 0.7,
            "gradient": {"enabled": true, "colors": ["#f00", "#00f"], "angle": 45},
            "stroke": {"enabled": true, "color": "#fff", "width": 1},
            "shadow": {"enabled": true, "color": "#000", "blur": 8, "offsetX": 0, "offsetY": 4}
        },
        "gradient": {"enabled": false, "colors": ["#fff", "#000"], "angle": 180},
        "animation": {"type": "marqueeLeft", "duration": 3, "distance": 120}
    });
    let e: TextElement = serde_json::from_value(v).unwrap();
    assert_eq!(e.text_align, TextAlign::Right);
    assert_eq!(e.background.border_radius, 10.0);
    assert_eq!(e.background.shadow.offset_y, 4.0);
    assert!(e.animation.kind.is_marquee());
    assert!(!e.visible);

    let back = serde_json::to_value(&e).unwrap();
    assert_eq!(back["background"]["borderRadius"], json!(10.0));
    assert_eq!(back["animation"]["type"], json!("marqueeLeft"));
}

#[test]
fn missing_required_fields_are_rejected() {
    let v = json!([{ "id": "t1", "text": "x" }]);
    let err = TextElement::list_from_json(&v.to_string()).unwrap_err();
    assert!(err.to_string().contains("invalid text element list"));
}

#[test]
fn gradient_disables_glyph_stroke_and_shadow() {
    let mut e = TextElement::new("t", "x");
    e.stroke.enabled = true;
    e.shadow.enabled = true;
    assert!(e.glyph_stroke_active());
    assert!(e.glyph_shadow_active());

    e.gradient.enabled = true;
    assert!(!e.glyph_stroke_active());
    assert!(!e.glyph_shadow_active());
}

#[test]
fn structure_check_flags_non_finite_and_non_positive() {
    let mut e = TextElement::new("bad", "x");
    assert!(e.check_structure().is_ok());

    e.font_size = 0.0;
    let err = e.check_structure().unwrap_err();
    assert!(err.to_string().contains("'bad'"));

    let mut e = TextElement::new("nan", "x");
    e.rotation = f64::NAN;
    assert!(e.check_structure().unwrap_err().to_string().contains("rotation"));

    let mut e = TextElement::new("lh", "x");
    e.line_height = -1.0;
    assert!(e.check_structure().is_err());
}
