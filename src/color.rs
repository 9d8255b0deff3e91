use anyhow::{bail, Result};
use palette::{FromColor, Hsl, IntoColor, Lab, Oklch, Srgb};
use serde::{Serialize, Serializer};

/// Core color type used throughout the pipeline.
///
/// An immutable sRGB triple. Every other representation (CIELAB, Oklch, HSL)
/// is computed on demand through an explicitly named conversion, and the
/// reverse conversions clamp back into the sRGB gamut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            bail!("invalid hex color: non-ASCII input");
        }
        if hex.len() != 6 {
            bail!(
                "invalid hex color: expected 6 hex digits, got {}",
                hex.len()
            );
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self::new(srgb.red, srgb.green, srgb.blue)
    }

    /// Normalized sRGB, used by RGB-space clustering.
    pub fn to_srgb_f32(self) -> Srgb<f32> {
        self.to_srgb_u8().into_format()
    }

    /// Clamp an `Srgb<f32>` to [0, 1] and quantize.
    pub fn from_srgb_f32(srgb: Srgb<f32>) -> Self {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(quantize(srgb.red), quantize(srgb.green), quantize(srgb.blue))
    }

    /// Convert to CIELAB (perceptual clustering and ΔE distances).
    pub fn to_lab(self) -> Lab {
        self.to_srgb_f32().into_color()
    }

    pub fn from_lab(lab: Lab) -> Self {
        Self::from_srgb_f32(Srgb::from_color(lab))
    }

    /// Convert to Oklch (hue-preserving lightness and chroma adjustments).
    pub fn to_oklch(self) -> Oklch {
        self.to_srgb_f32().into_color()
    }

    pub fn from_oklch(oklch: Oklch) -> Self {
        Self::from_srgb_f32(Srgb::from_color(oklch))
    }

    /// Convert to HSL with saturation and lightness in [0, 1].
    pub fn to_hsl(self) -> Hsl {
        self.to_srgb_f32().into_color()
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        Self::from_srgb_f32(Srgb::from_color(hsl))
    }

    /// HSL hue in degrees, [0, 360).
    pub fn hsl_hue(self) -> f32 {
        self.to_hsl().hue.into_positive_degrees()
    }

    /// HSL saturation in [0, 1].
    pub fn hsl_saturation(self) -> f32 {
        self.to_hsl().saturation
    }

    /// HSL lightness in [0, 1].
    pub fn hsl_lightness(self) -> f32 {
        self.to_hsl().lightness
    }

    /// Oklch hue in degrees, [0, 360).
    pub fn hue(self) -> f32 {
        self.to_oklch().hue.into_positive_degrees()
    }

    /// Oklch chroma.
    pub fn chroma(self) -> f32 {
        self.to_oklch().chroma
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }

    /// WCAG 2.0 contrast ratio between two colors, in [1, 21].
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// True when white text reads better on this color than black text.
    pub fn is_dark(self) -> bool {
        Color::contrast_ratio(&self, &Color::WHITE) > Color::contrast_ratio(&self, &Color::BLACK)
    }

    /// CIE76 ΔE between two colors.
    pub fn delta_e(self, other: Color) -> f32 {
        let a = self.to_lab();
        let b = other.to_lab();
        ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
    }

    /// Adjust Oklch lightness by `delta`. Positive = lighter, negative = darker.
    /// Lightness is clamped to [0, 1]; hue and chroma are kept.
    pub fn adjust_lightness(self, delta: f32) -> Color {
        let mut oklch = self.to_oklch();
        oklch.l = (oklch.l + delta).clamp(0.0, 1.0);
        Color::from_oklch(oklch)
    }

    /// Set Oklch lightness to an absolute value in [0, 1].
    pub fn with_lightness(self, l: f32) -> Color {
        let mut oklch = self.to_oklch();
        oklch.l = l.clamp(0.0, 1.0);
        Color::from_oklch(oklch)
    }

    /// Adjust Oklch chroma by `delta`. Chroma is clamped to [0, 0.4].
    pub fn adjust_chroma(self, delta: f32) -> Color {
        let mut oklch = self.to_oklch();
        oklch.chroma = (oklch.chroma + delta).clamp(0.0, 0.4);
        Color::from_oklch(oklch)
    }

    /// Replace the Oklch hue, keeping lightness and chroma.
    pub fn with_hue(self, degrees: f32) -> Color {
        let oklch = self.to_oklch();
        Color::from_oklch(Oklch::new(oklch.l, oklch.chroma, degrees.rem_euclid(360.0)))
    }

    /// Rotate the Oklch hue by `degrees`.
    pub fn rotate_hue(self, degrees: f32) -> Color {
        self.with_hue(self.hue() + degrees)
    }

    /// Rotate the HSL hue by `degrees`. Used by the template harmony filters.
    pub fn rotate_hsl_hue(self, degrees: f32) -> Color {
        let mut hsl = self.to_hsl();
        hsl.hue = (hsl.hue.into_positive_degrees() + degrees).rem_euclid(360.0).into();
        Color::from_hsl(hsl)
    }

    /// Shift HSL lightness by `amount` (a fraction of the full range).
    pub fn shift_hsl_lightness(self, amount: f32) -> Color {
        let mut hsl = self.to_hsl();
        hsl.lightness = (hsl.lightness + amount).clamp(0.0, 1.0);
        Color::from_hsl(hsl)
    }

    /// Shift HSL saturation by `amount` (a fraction of the full range).
    pub fn shift_hsl_saturation(self, amount: f32) -> Color {
        let mut hsl = self.to_hsl();
        hsl.saturation = (hsl.saturation + amount).clamp(0.0, 1.0);
        Color::from_hsl(hsl)
    }

    /// Linear sRGB-channel mix: `ratio` 0 keeps `self`, 1 yields `other`.
    pub fn mix(self, other: Color, ratio: f32) -> Color {
        let t = ratio.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;
        Color::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Smallest angle between two hues, in [0, 180].
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}
