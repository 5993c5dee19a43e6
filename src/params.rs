//! Galaxy generation parameters and colors.
//!
//! [`GalaxyParameters`] is an immutable snapshot: the panel and presets
//! build a new one and hand it over whole, nothing edits it in place.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ColorParseError;

/// An sRGB-encoded color with channels in `0.0..=1.0`.
///
/// Channels hold the encoded values (`#ff6030` is `1.0, 0.376, 0.188`);
/// the shader decodes them to linear. Serialized as a `#rrggbb` string so
/// presets stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Create a color from raw channels. Channels are not clamped.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional, hex digits are
    /// case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: hex.to_string(),
        };
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        Ok(Self::from_srgb8([channel(0)?, channel(2)?, channel(4)?]))
    }

    /// Render as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_srgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// 8-bit sRGB channels, rounded.
    pub fn to_srgb8(self) -> [u8; 3] {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_u8(self.r), to_u8(self.g), to_u8(self.b)]
    }

    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0] as f32 / 255.0, rgb[1] as f32 / 255.0, rgb[2] as f32 / 255.0)
    }

    /// Per-channel linear interpolation, `self + (other - self) * t`.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Channels clamped into `0.0..=1.0`.
    pub fn clamped(self) -> Color {
        Color::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Inclusive bounds and step for one panel control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

/// Panel bounds for every numeric parameter.
///
/// The panel enforces these; the generator does not.
pub struct ParamBounds;

impl ParamBounds {
    pub const COUNT: Bound<u32> = Bound { min: 100, max: 1_000_000, step: 100 };
    pub const SIZE: Bound<f32> = Bound { min: 0.001, max: 0.1, step: 0.001 };
    pub const RADIUS: Bound<f32> = Bound { min: 0.01, max: 20.0, step: 0.1 };
    pub const BRANCHES: Bound<u32> = Bound { min: 2, max: 15, step: 1 };
    pub const SPIN: Bound<f32> = Bound { min: -5.0, max: 5.0, step: 0.1 };
    pub const RANDOMNESS: Bound<f32> = Bound { min: 0.0, max: 2.0, step: 0.001 };
    pub const RANDOMNESS_POWER: Bound<f32> = Bound { min: 1.0, max: 10.0, step: 0.001 };
}

/// Inputs to one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyParameters {
    /// Number of points.
    pub count: u32,
    /// Rendered point size. Not used by the generator.
    pub size: f32,
    /// Maximum sampling radius.
    pub radius: f32,
    /// Number of spiral arms.
    pub branches: u32,
    /// Radians of twist per unit radius.
    pub spin: f32,
    /// Jitter magnitude.
    pub randomness: f32,
    /// Jitter concentration exponent. Higher keeps points near the arms.
    pub randomness_power: f32,
    /// Color at the center.
    pub inside_color: Color,
    /// Color at `radius`.
    pub outside_color: Color,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: 100_000,
            size: 0.01,
            radius: 5.0,
            branches: 4,
            spin: 1.0,
            randomness: 1.0,
            randomness_power: 3.0,
            inside_color: Color::new(1.0, 96.0 / 255.0, 48.0 / 255.0),
            outside_color: Color::new(27.0 / 255.0, 57.0 / 255.0, 132.0 / 255.0),
        }
    }
}

impl GalaxyParameters {
    /// A copy pinned into [`ParamBounds`], with colors clamped to `0..=1`.
    pub fn clamped(&self) -> Self {
        let clamp_u32 = |v: u32, b: Bound<u32>| v.clamp(b.min, b.max);
        let clamp_f32 = |v: f32, b: Bound<f32>| {
            if v.is_nan() {
                b.min
            } else {
                v.clamp(b.min, b.max)
            }
        };
        Self {
            count: clamp_u32(self.count, ParamBounds::COUNT),
            size: clamp_f32(self.size, ParamBounds::SIZE),
            radius: clamp_f32(self.radius, ParamBounds::RADIUS),
            branches: clamp_u32(self.branches, ParamBounds::BRANCHES),
            spin: clamp_f32(self.spin, ParamBounds::SPIN),
            randomness: clamp_f32(self.randomness, ParamBounds::RANDOMNESS),
            randomness_power: clamp_f32(self.randomness_power, ParamBounds::RANDOMNESS_POWER),
            inside_color: self.inside_color.clamped(),
            outside_color: self.outside_color.clamped(),
        }
    }
}
