//! A simple RGBA color type used for client borders and other minimal drawing
use crate::Error;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGBA color, stored as four 0.0-1.0 range floats.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

macro_rules! _f2u {
    { $f:expr, $s:expr } => { (($f * 255.0) as u32) << $s }
}

impl Color {
    /// Create a new [Color] from a hex encoded u32: 0xRRGGBB or 0xRRGGBBAA
    pub fn new_from_hex(hex: u32) -> Self {
        let bytes = hex.to_be_bytes();
        let floats: Vec<f64> = bytes.iter().map(|n| *n as f64 / 255.0).collect();

        Self {
            r: floats[0],
            g: floats[1],
            b: floats[2],
            a: floats[3],
        }
    }

    /// The RGB information of this color as 0.0-1.0 range floats
    pub fn rgb(&self) -> (f64, f64, f64) {
        (self.r, self.g, self.b)
    }

    /// The RGBA information of this color as 0.0-1.0 range floats
    pub fn rgba(&self) -> (f64, f64, f64, f64) {
        (self.r, self.g, self.b, self.a)
    }

    /// Render this color as a `#RRGGBB` hex color string
    pub fn as_rgb_hex_string(&self) -> String {
        format!("#{:06x}", self.rgb_u32())
    }

    /// 0xRRGGBB representation of this color (no alpha information)
    pub fn rgb_u32(&self) -> u32 {
        _f2u!(self.r, 16) + _f2u!(self.g, 8) + _f2u!(self.b, 0)
    }

    /// 0xAARRGGBB representation of this color, as used when setting window
    /// border pixel values on the X server.
    pub fn argb_u32(&self) -> u32 {
        _f2u!(self.a, 24) + _f2u!(self.r, 16) + _f2u!(self.g, 8) + _f2u!(self.b, 0)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::new_from_hex(hex)
    }
}

impl From<(f64, f64, f64)> for Color {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl From<(f64, f64, f64, f64)> for Color {
    fn from((r, g, b, a): (f64, f64, f64, f64)) -> Self {
        Self { r, g, b, a }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.as_str().try_into()
    }
}

impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Error> {
        let stripped = s.strip_prefix('#').unwrap_or(s);
        let hex = u32::from_str_radix(stripped, 16)
            .map_err(|_| Error::Custom(format!("invalid hex color: {s}")))?;

        match s.len() {
            7 => Ok(Self::new_from_hex((hex << 8) + 0xFF)),
            9 => Ok(Self::new_from_hex(hex)),
            _ => Err(Error::Custom(format!("invalid hex color: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_without_alpha_round_trips_rgb() {
        let c: Color = "#3c3836".try_into().unwrap();
        assert_eq!(c.as_rgb_hex_string(), "#3c3836");
    }

    #[test]
    fn hex_string_with_alpha_parses() {
        let c: Color = "#cc241dff".try_into().unwrap();
        assert_eq!(c.rgb_u32(), 0xcc241d);
    }

    #[test]
    fn invalid_hex_strings_are_rejected() {
        assert!(Color::try_from("not-a-color").is_err());
        assert!(Color::try_from("#abc").is_err());
    }
}
