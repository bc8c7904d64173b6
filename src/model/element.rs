use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};

/// Horizontal alignment of each line relative to the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Anchor position in percent of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

/// Drop shadow settings, shared by glyphs and background boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowStyle {
    pub enabled: bool,
    pub color: String,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "rgba(0, 0, 0, 0.5)".to_string(),
            blur: 4.0,
            offset_x: 2.0,
            offset_y: 2.0,
        }
    }
}

/// Outline settings, shared by glyphs and background boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub enabled: bool,
    pub color: String,
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            width: 2.0,
        }
    }
}

/// Two-stop linear gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientStyle {
    pub enabled: bool,
    pub colors: [String; 2],
    /// CSS `linear-gradient` angle in degrees (0 points up, 90 points right).
    pub angle: f64,
}

impl Default for GradientStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            colors: ["#FFFFFF".to_string(), "#000000".to_string()],
            angle: 90.0,
        }
    }
}

/// Rounded box drawn behind each line, with its own effect stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundStyle {
    pub enabled: bool,
    pub color: String,
    pub padding: f64,
    pub border_radius: f64,
    pub opacity: f64,
    pub gradient: GradientStyle,
    pub stroke: StrokeStyle,
    pub shadow: ShadowStyle,
}

impl Default for BackgroundStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            padding: 8.0,
            border_radius: 4.0,
            opacity: 1.0,
            gradient: GradientStyle::default(),
            stroke: StrokeStyle::default(),
            shadow: ShadowStyle::default(),
        }
    }
}

/// Preview-only animation kinds. Export renders every element as a static frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationType {
    #[default]
    None,
    FadeIn,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ZoomIn,
    Bounce,
    Typewriter,
    MarqueeLeft,
    MarqueeRight,
}

impl AnimationType {
    pub fn is_marquee(self) -> bool {
        matches!(self, Self::MarqueeLeft | Self::MarqueeRight)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    #[serde(rename = "type")]
    pub kind: AnimationType,
    /// Seconds.
    pub duration: f64,
    /// Percent of the frame.
    pub distance: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            kind: AnimationType::None,
            duration: 1.0,
            distance: 100.0,
        }
    }
}

/// One styled text overlay as produced by the editor.
///
/// `id`, `text`, `fontSize` and `position` are required; every other field falls back to the
/// editor's defaults when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    pub text: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub letter_spacing: f64,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default = "default_color")]
    pub color: String,

    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    /// Advisory box width from the editor; lines never wrap at it.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default = "yes")]
    pub visible: bool,

    #[serde(default)]
    pub shadow: ShadowStyle,
    #[serde(default)]
    pub stroke: StrokeStyle,
    #[serde(default)]
    pub background: BackgroundStyle,
    #[serde(default)]
    pub gradient: GradientStyle,
    #[serde(default)]
    pub animation: Animation,
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_line_height() -> f64 {
    1.2
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

impl TextElement {
    /// Element with editor defaults: centered white 48px text in the middle of the frame.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            font_family: default_font_family(),
            font_size: 48.0,
            bold: false,
            italic: false,
            underline: false,
            letter_spacing: 0.0,
            line_height: default_line_height(),
            text_align: TextAlign::Center,
            color: default_color(),
            position: Position::default(),
            rotation: 0.0,
            width: None,
            opacity: 1.0,
            visible: true,
            shadow: ShadowStyle::default(),
            stroke: StrokeStyle::default(),
            background: BackgroundStyle::default(),
            gradient: GradientStyle::default(),
            animation: Animation::default(),
        }
    }

    /// Parse an ordered element list from editor JSON.
    pub fn list_from_json(json: &str) -> ReelResult<Vec<Self>> {
        serde_json::from_str(json)
            .map_err(|e| ReelError::validation(format!("invalid text element list: {e}")))
    }

    /// Glyph stroke applies only without a fill gradient.
    pub fn glyph_stroke_active(&self) -> bool {
        self.stroke.enabled && !self.gradient.enabled && self.stroke.width > 0.0
    }

    /// Glyph shadow applies only without a fill gradient.
    pub fn glyph_shadow_active(&self) -> bool {
        self.shadow.enabled && !self.gradient.enabled
    }

    /// Check the numeric fields drawing depends on. Business-level bounds are not enforced.
    pub fn check_structure(&self) -> ReelResult<()> {
        let fail = |what: &str| {
            Err(ReelError::validation(format!(
                "text element '{}': {what}",
                self.id
            )))
        };

        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return fail("fontSize must be finite and > 0");
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return fail("lineHeight must be finite and > 0");
        }

        let finite = [
            ("letterSpacing", self.letter_spacing),
            ("position.x", self.position.x),
            ("position.y", self.position.y),
            ("rotation", self.rotation),
            ("opacity", self.opacity),
            ("shadow.blur", self.shadow.blur),
            ("shadow.offsetX", self.shadow.offset_x),
            ("shadow.offsetY", self.shadow.offset_y),
            ("stroke.width", self.stroke.width),
            ("gradient.angle", self.gradient.angle),
            ("background.padding", self.background.padding),
            ("background.borderRadius", self.background.border_radius),
            ("background.opacity", self.background.opacity),
            ("background.gradient.angle", self.background.gradient.angle),
            ("background.stroke.width", self.background.stroke.width),
            ("background.shadow.blur", self.background.shadow.blur),
            ("background.shadow.offsetX", self.background.shadow.offset_x),
            ("background.shadow.offsetY", self.background.shadow.offset_y),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return fail(&format!("{name} must be finite"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/element.rs"]
mod tests;
