//! Theme and Colors
//!
//! The palette every widget is painted from. Exactly one [`ThemeColors`]
//! is active at a time; it lives in the [`ThemeStore`] owned by the surface,
//! so it is only ever read or replaced under the render lock.
//!
//! Widgets never store "which color they are". They store a
//! [`WidgetRole`] and ask the palette for their style, which is what
//! makes a theme switch exact: repainting is a lookup per role tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chat::ChatRole;
use crate::color::Color;
use crate::error::DisplayError;
use crate::surface::{WidgetRole, WidgetStyle};

// ============================================================================
// Palettes
// ============================================================================

/// Named colors of one theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Screen and status bar background
    pub background: Color,
    /// Default text
    pub text: Color,
    /// Content (chat) area background
    pub chat_background: Color,
    /// User bubble fill
    pub user_bubble: Color,
    /// Assistant bubble fill
    pub assistant_bubble: Color,
    /// System bubble fill
    pub system_bubble: Color,
    /// System message text
    pub system_text: Color,
    /// Borders
    pub border: Color,
    /// Low-battery banner fill
    pub low_battery: Color,
}

impl ThemeColors {
    /// Light palette (WeChat-like greens on white)
    pub const LIGHT: Self = Self {
        background: Color::WHITE,
        text: Color::BLACK,
        chat_background: Color::from_hex(0xE0E0E0),
        user_bubble: Color::from_hex(0x95EC69),
        assistant_bubble: Color::WHITE,
        system_bubble: Color::from_hex(0xE0E0E0),
        system_text: Color::from_hex(0x666666),
        border: Color::from_hex(0xE0E0E0),
        low_battery: Color::BLACK,
    };

    /// Dark palette
    pub const DARK: Self = Self {
        background: Color::from_hex(0x121212),
        text: Color::WHITE,
        chat_background: Color::from_hex(0x1E1E1E),
        user_bubble: Color::from_hex(0x1A6C37),
        assistant_bubble: Color::from_hex(0x333333),
        system_bubble: Color::from_hex(0x2A2A2A),
        system_text: Color::from_hex(0xAAAAAA),
        border: Color::from_hex(0x333333),
        low_battery: Color::from_hex(0xFF0000),
    };

    /// Palette for a theme name
    #[must_use]
    pub const fn for_theme(name: ThemeName) -> Self {
        match name {
            ThemeName::Light => Self::LIGHT,
            ThemeName::Dark => Self::DARK,
        }
    }

    /// Resolve the style of a widget from its role tag
    #[must_use]
    pub fn style_for(&self, role: WidgetRole) -> WidgetStyle {
        match role {
            WidgetRole::Screen | WidgetRole::StatusBar => WidgetStyle {
                background: Some(self.background),
                text: Some(self.text),
                border: None,
            },
            WidgetRole::Container => WidgetStyle {
                background: Some(self.background),
                text: None,
                border: Some(self.border),
            },
            WidgetRole::ContentArea => WidgetStyle {
                background: Some(self.chat_background),
                text: None,
                border: Some(self.border),
            },
            WidgetRole::StatusText | WidgetRole::Emotion | WidgetRole::ChatLabel => WidgetStyle {
                background: None,
                text: Some(self.text),
                border: None,
            },
            WidgetRole::Bubble(role) => {
                let (fill, text) = match role {
                    ChatRole::User => (self.user_bubble, self.text),
                    ChatRole::Assistant => (self.assistant_bubble, self.text),
                    ChatRole::System => (self.system_bubble, self.system_text),
                };
                WidgetStyle {
                    background: Some(fill),
                    text: Some(text),
                    border: Some(self.border),
                }
            }
            // Banner text stays white on both palettes
            WidgetRole::LowBatteryBanner => WidgetStyle {
                background: Some(self.low_battery),
                text: Some(Color::WHITE),
                border: None,
            },
        }
    }
}

// ============================================================================
// Theme Names
// ============================================================================

/// The fixed set of selectable themes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Light palette
    #[default]
    Light,
    /// Dark palette
    Dark,
}

impl ThemeName {
    /// Name as persisted in settings
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for ThemeName {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(DisplayError::UnknownTheme(s.to_string())),
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Theme Store
// ============================================================================

/// Holder of the single active palette
#[derive(Clone, Debug)]
pub struct ThemeStore {
    name: ThemeName,
    colors: ThemeColors,
}

impl ThemeStore {
    /// Create a store with `name` active
    #[must_use]
    pub fn new(name: ThemeName) -> Self {
        Self {
            name,
            colors: ThemeColors::for_theme(name),
        }
    }

    /// Active theme name
    #[must_use]
    pub fn name(&self) -> ThemeName {
        self.name
    }

    /// Active palette
    #[must_use]
    pub fn colors(&self) -> &ThemeColors {
        &self.colors
    }

    /// Replace the active palette in one step
    pub fn activate(&mut self, name: ThemeName) -> &ThemeColors {
        self.name = name;
        self.colors = ThemeColors::for_theme(name);
        &self.colors
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(ThemeName::default())
    }
}
