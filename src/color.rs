use palette::color_difference::Ciede2000;
use palette::{FromColor, IntoColor, Lab, Mix, Oklab, Oklch, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseColorError;

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components and provides conversions to perceptual color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseColorError::InvalidLength(hex.to_string()));
        }
        // from_str_radix alone would let a sign through ("+f+f+f").
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidDigit(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ParseColorError::InvalidDigit(hex.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Convert to CIELAB (for K-means clustering and color differences).
    pub fn to_lab(self) -> Lab {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Create from CIELAB.
    pub fn from_lab(lab: Lab) -> Self {
        let srgb_f32: Srgb<f32> = Srgb::from_color(lab);
        Self::from_srgb_f32_clamped(srgb_f32)
    }

    /// Convert to Oklch (for hue matching, lightness/chroma adjustments).
    pub fn to_oklch(self) -> Oklch {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Create from Oklch. Colors outside sRGB give up chroma, keeping
    /// lightness and hue, until they fit.
    pub fn from_oklch(oklch: Oklch) -> Self {
        let l = oklch.l.clamp(0.0, 1.0);
        let to_srgb =
            |chroma: f32| -> Srgb<f32> { Srgb::from_color(Oklch::new(l, chroma, oklch.hue)) };

        let chroma = oklch.chroma.max(0.0);
        let srgb = to_srgb(chroma);
        if in_gamut(srgb) {
            return Self::from_srgb_f32_clamped(srgb);
        }

        let (mut lo, mut hi) = (0.0f32, chroma);
        for _ in 0..GAMUT_SEARCH_STEPS {
            let mid = (lo + hi) / 2.0;
            if in_gamut(to_srgb(mid)) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Self::from_srgb_f32_clamped(to_srgb(lo))
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// Oklch lightness in [0, 1].
    pub fn lightness(self) -> f32 {
        self.to_oklch().l.clamp(0.0, 1.0)
    }

    /// Oklch chroma, 0 for neutral grays.
    pub fn chroma(self) -> f32 {
        self.to_oklch().chroma.max(0.0)
    }

    /// Oklch hue angle in degrees, normalized to [0, 360).
    ///
    /// Meaningless for near-neutral colors; callers check [`Color::chroma`] first.
    pub fn hue(self) -> f32 {
        self.to_oklch().hue.into_positive_degrees()
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
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG 2.0 contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// CIEDE2000 color difference. Roughly 1.0 is a just-noticeable difference.
    pub fn perceptual_distance(c1: &Color, c2: &Color) -> f32 {
        c1.to_lab().difference(c2.to_lab())
    }

    /// Replace the Oklch lightness, keeping hue and chroma.
    pub fn with_lightness(self, l: f32) -> Color {
        let mut oklch = self.to_oklch();
        oklch.l = l.clamp(0.0, 1.0);
        Color::from_oklch(oklch)
    }

    /// Adjust Oklch lightness by `delta`. Positive = lighter, negative = darker.
    /// Lightness is clamped to [0, 1].
    pub fn adjust_lightness(self, delta: f32) -> Color {
        let mut oklch = self.to_oklch();
        oklch.l = (oklch.l + delta).clamp(0.0, 1.0);
        Color::from_oklch(oklch)
    }

    /// Interpolate towards `other` in Oklab. `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(self, other: Color, t: f32) -> Color {
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        let a: Oklab = self.to_oklch().into_color();
        let b: Oklab = other.to_oklch().into_color();
        Color::from_oklch(a.mix(b, t).into_color())
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

const GAMUT_SEARCH_STEPS: usize = 16;
const GAMUT_EPSILON: f32 = 1e-4;

fn in_gamut(srgb: Srgb<f32>) -> bool {
    [srgb.red, srgb.green, srgb.blue]
        .iter()
        .all(|c| (-GAMUT_EPSILON..=1.0 + GAMUT_EPSILON).contains(c))
}

/// Shortest angular distance between two hue angles, in [0, 180].
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}
