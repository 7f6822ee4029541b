//! Colors
//!
//! Opaque RGB colors as the palette sees them. The draw engine converts to
//! its native pixel format; animation frames are already RGB565.

use serde::{Deserialize, Serialize};

/// An opaque 24-bit color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Color {
    /// Pure white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Pure black
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Create a color from RGB components
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` literal
    ///
    /// ```
    /// use chatface_core::Color;
    ///
    /// assert_eq!(Color::from_hex(0x1A6C37), Color::rgb(0x1A, 0x6C, 0x37));
    /// ```
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Pack into 16-bit RGB565, the panel's native format
    #[must_use]
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 & 0xF8) << 8) | ((self.g as u16 & 0xFC) << 3) | (self.b as u16 >> 3)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
