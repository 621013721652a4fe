use bytemuck::{Pod, Zeroable};

use crate::{Error, Result};

/// RGBA color, byte order matches the memory layout expected by png encoders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 255, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn grey(val: u8) -> Self {
        Color {
            r: val,
            g: val,
            b: val,
            a: 255,
        }
    }

    /// Packs the color as 0xAARRGGBB
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub const fn from_argb(bits: u32) -> Self {
        Color {
            a: ((bits >> 24) & 0xFF) as u8,
            r: ((bits >> 16) & 0xFF) as u8,
            g: ((bits >> 8) & 0xFF) as u8,
            b: (bits & 0xFF) as u8,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Parses a `#RRGGBB` or `#RRGGBBAA` color literal
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(Error::InvalidArgument(format!("Invalid color literal: {}", hex)));
        }

        let parse = |range: std::ops::Range<usize>| -> Result<u8> {
            let channel = digits
                .get(range)
                .ok_or_else(|| Error::InvalidArgument(format!("Invalid color literal: {}", hex)))?;
            u8::from_str_radix(channel, 16).map_err(Error::from)
        };

        Ok(Color {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
            a: if digits.len() == 8 { parse(6..8)? } else { 255 },
        })
    }
}

impl From<u32> for Color {
    fn from(bits: u32) -> Self {
        Color::from_argb(bits)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> u32 {
        color.to_argb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_round_trip() {
        let color = Color::rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(color.to_argb(), 0x78123456);
        assert_eq!(Color::from_argb(color.to_argb()), color);
    }

    #[test]
    fn hex_parsing() -> Result {
        assert_eq!(Color::from_hex("#FF0000")?, RED);
        assert_eq!(Color::from_hex("00FF00")?, GREEN);
        assert_eq!(Color::from_hex("#0000FF80")?, BLUE.with_alpha(128));
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        Ok(())
    }
}
