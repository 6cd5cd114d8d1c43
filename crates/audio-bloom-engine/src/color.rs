//! RGBA color type shared by the renderers and surfaces

use serde::{Deserialize, Serialize};

/// Color with straight (non-premultiplied) alpha, channels in 0.0-1.0
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels (alpha stays in 0.0-1.0)
    pub fn rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        match digits.len() {
            6 => Some(Self::rgb8(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Some(Self::rgb8(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)? as f32 / 255.0,
            )),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Multiply the alpha channel, clamped to 0.0-1.0
    pub fn scale_alpha(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        let c = Rgba::from_hex("#fde725").unwrap();
        assert_eq!(c, Rgba::rgb8(0xfd, 0xe7, 0x25, 1.0));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_from_hex_with_alpha() {
        let c = Rgba::from_hex("64ff64cc").unwrap();
        assert!((c.a - 0.8).abs() < 1e-6);
        assert!((c.g - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Rgba::from_hex("#12345").is_none());
        assert!(Rgba::from_hex("#gggggg").is_none());
        assert!(Rgba::from_hex("#ééé").is_none());
    }

    #[test]
    fn test_scale_alpha_clamps() {
        let c = Rgba::rgba(1.0, 0.0, 0.0, 0.8);
        assert!((c.scale_alpha(0.5).a - 0.4).abs() < 1e-6);
        assert_eq!(c.scale_alpha(-1.0).a, 0.0);
        assert_eq!(c.scale_alpha(5.0).a, 1.0);
    }
}
