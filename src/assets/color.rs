use std::fmt;

use crate::foundation::math::clamp01;

/// An sRGB color with channels in `0..=255`, kept as floats so mixes do not accumulate
/// rounding.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(255.0, 255.0, 255.0);
    /// Pure black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Build from raw channel values.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(f64::from(r), f64::from(g), f64::from(b))
    }

    /// Parse `#rrggbb` or `rrggbb` (surrounding whitespace allowed, case-insensitive).
    pub fn parse_hex(input: &str) -> Option<Self> {
        let s = input.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let v = u32::from_str_radix(s, 16).ok()?;
        Some(Self::from_u8((v >> 16) as u8, (v >> 8) as u8, v as u8))
    }

    /// Lowercase `#rrggbb`, channels rounded and clamped.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels rounded and clamped to `0..=255`.
    pub fn to_u8(&self) -> [u8; 3] {
        let q = |c: f64| {
            if c.is_finite() {
                c.round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        };
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Linear mix toward `other` by `t` (clamped to `[0, 1]`).
    pub fn mix(&self, other: Rgb, t: f64) -> Rgb {
        let t = clamp01(t);
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Opaque vello_cpu paint color.
    pub(crate) fn to_paint(self) -> vello_cpu::peniko::Color {
        let [r, g, b] = self.to_u8();
        vello_cpu::peniko::Color::from_rgba8(r, g, b, 255)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("invalid hex color {value:?}"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
