//! Draw options: the style snapshot attached to every object.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Clean sans-serif font (default).
    #[default]
    SansSerif,
    /// Serif font.
    Serif,
    /// Fixed-width font.
    Monospace,
}

impl FontFamily {
    /// Get the font family name as used by the renderer.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
        }
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    /// Regular weight (default).
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

/// Horizontal text alignment within the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font settings for text objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    /// Font size in pixels.
    pub size: f64,
    pub weight: FontWeight,
    pub align: TextAlign,
}

impl FontSpec {
    /// Default font size.
    pub const DEFAULT_SIZE: f64 = 20.0;
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: FontFamily::default(),
            size: Self::DEFAULT_SIZE,
            weight: FontWeight::default(),
            align: TextAlign::default(),
        }
    }
}

/// Drop-shadow settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Style properties copied by value into each object at creation time, so
/// later global tool changes never retroactively mutate existing objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Stroke color.
    pub stroke_color: Rgba,
    /// Fill color (None = no fill).
    pub fill_color: Option<Rgba>,
    /// Stroke width.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Line dash pattern (empty = solid).
    #[serde(default)]
    pub line_dash: Vec<f64>,
    /// Drop shadow (None = no shadow).
    #[serde(default)]
    pub shadow: Option<Shadow>,
    /// Hand-drawn jitter amplitude (0 = clean lines).
    #[serde(default)]
    pub roughness: f64,
    /// Random seed for the hand-drawn effect. Frozen at creation so the
    /// jitter of a committed object is stable across renders.
    #[serde(default = "generate_seed")]
    pub seed: u32,
    /// Font settings for text objects.
    #[serde(default)]
    pub font: FontSpec,
}

fn default_opacity() -> f64 {
    1.0
}

/// Generate a random seed for new objects.
/// Uses a counter + hash approach that works on all platforms including WASM.
pub fn generate_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    // Mix the counter with constants for better distribution (splitmix32-like)
    let mut x = counter.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

impl DrawOptions {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Clone these options for a new object, re-freezing the jitter seed.
    pub fn for_new_object(&self) -> Self {
        let mut options = self.clone();
        options.seed = generate_seed();
        options
    }
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            stroke_color: Rgba::new(229, 62, 62, 255),
            fill_color: None,
            stroke_width: 2.0,
            opacity: 1.0,
            line_dash: Vec::new(),
            shadow: None,
            roughness: 1.0,
            seed: generate_seed(),
            font: FontSpec::default(),
        }
    }
}

/// Partial update for [`DrawOptions`], as received from the host's
/// `setOptions` command. Absent fields leave the target untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsPatch {
    pub stroke_color: Option<Rgba>,
    pub fill_color: Option<Rgba>,
    pub fill_enabled: Option<bool>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub line_dash: Option<Vec<f64>>,
    pub shadow: Option<Shadow>,
    pub shadow_enabled: Option<bool>,
    pub roughness: Option<f64>,
    pub font_family: Option<FontFamily>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub text_align: Option<TextAlign>,
}

impl OptionsPatch {
    /// Apply this patch to a set of options.
    pub fn apply(&self, options: &mut DrawOptions) {
        if let Some(color) = self.stroke_color {
            options.stroke_color = color;
        }
        if let Some(color) = self.fill_color {
            options.fill_color = Some(color);
        }
        if let Some(enabled) = self.fill_enabled {
            if enabled {
                options.fill_color.get_or_insert(options.stroke_color);
            } else {
                options.fill_color = None;
            }
        }
        if let Some(width) = self.stroke_width {
            options.stroke_width = width.max(0.1);
        }
        if let Some(opacity) = self.opacity {
            options.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(dash) = &self.line_dash {
            options.line_dash = dash.clone();
        }
        if let Some(shadow) = self.shadow {
            options.shadow = Some(shadow);
        }
        if self.shadow_enabled == Some(false) {
            options.shadow = None;
        }
        if let Some(roughness) = self.roughness {
            options.roughness = roughness.max(0.0);
        }
        if let Some(family) = self.font_family {
            options.font.family = family;
        }
        if let Some(size) = self.font_size {
            options.font.size = size.max(1.0);
        }
        if let Some(weight) = self.font_weight {
            options.font.weight = weight;
        }
        if let Some(align) = self.text_align {
            options.font.align = align;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_uniqueness() {
        let a = generate_seed();
        let b = generate_seed();
        assert_ne!(a, b);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut options = DrawOptions::default();
        let patch = OptionsPatch {
            stroke_width: Some(6.0),
            opacity: Some(0.5),
            ..Default::default()
        };
        patch.apply(&mut options);

        assert!((options.stroke_width - 6.0).abs() < f64::EPSILON);
        assert!((options.opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(options.stroke_color, DrawOptions::default().stroke_color);
    }

    #[test]
    fn test_patch_fill_toggle() {
        let mut options = DrawOptions::default();
        assert!(options.fill_color.is_none());

        let patch = OptionsPatch {
            fill_enabled: Some(true),
            ..Default::default()
        };
        patch.apply(&mut options);
        assert_eq!(options.fill_color, Some(options.stroke_color));

        let patch = OptionsPatch {
            fill_enabled: Some(false),
            ..Default::default()
        };
        patch.apply(&mut options);
        assert!(options.fill_color.is_none());
    }

    #[test]
    fn test_opacity_clamped() {
        let mut options = DrawOptions::default();
        let patch = OptionsPatch {
            opacity: Some(2.5),
            ..Default::default()
        };
        patch.apply(&mut options);
        assert!((options.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_object_options_refreeze_seed() {
        let options = DrawOptions::default();
        let copy = options.for_new_object();
        assert_ne!(options.seed, copy.seed);
        assert_eq!(options.stroke_color, copy.stroke_color);
    }
}
