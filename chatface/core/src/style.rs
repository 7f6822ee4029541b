//! UI Styles
//!
//! The three presentation modes of the surface, chosen once at start-up:
//!
//! | Style | Persisted name | Chat | Emotion |
//! |-------|----------------|------|---------|
//! | [`NormalStyle`] | `normal` | latest message in one label | glyph |
//! | [`TranscriptStyle`] | `wechat` | bounded bubble transcript | glyph in the status bar |
//! | [`AnimatedStyle`] | `animation` | latest message in one label | bitmap clip |
//!
//! Changing style at runtime is not a live re-layout; the display persists
//! the new choice and asks for a restart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chat::{AppendOutcome, ChatRole};
use crate::error::DisplayError;
use crate::surface::{EmotionPlacement, Layout, Surface};

/// Selectable style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleKind {
    /// Emotion glyph above a single chat line
    #[default]
    Normal,
    /// Scrolling chat bubbles
    Transcript,
    /// Animated emotion clip above a single chat line
    Animated,
}

impl StyleKind {
    /// Name as persisted in settings
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Transcript => "wechat",
            Self::Animated => "animation",
        }
    }

    /// Whether this style needs an animation frame store
    #[must_use]
    pub fn needs_frames(self) -> bool {
        matches!(self, Self::Animated)
    }
}

impl FromStr for StyleKind {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "wechat" | "transcript" => Ok(Self::Transcript),
            "animation" | "animated" => Ok(Self::Animated),
            _ => Err(DisplayError::UnknownStyle(s.to_string())),
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the emotion slot is driven
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmotionMode {
    /// One glyph from the static table
    Glyph,
    /// Bitmap clip through the animation player
    Animated,
}

/// Strategy for one presentation mode
pub trait UiStyle: Send + Sync + fmt::Debug {
    /// Which style this is
    fn kind(&self) -> StyleKind;

    /// How emotions are shown
    fn emotion_mode(&self) -> EmotionMode {
        EmotionMode::Glyph
    }

    /// Arrange the surface for this style
    fn setup(&self, surface: &mut Surface);

    /// Show a chat message; returns whether the surface changed
    fn set_chat_message(&self, surface: &mut Surface, role: ChatRole, text: &str) -> bool;
}

/// Strategy for `kind`
#[must_use]
pub fn style_for(kind: StyleKind) -> Box<dyn UiStyle> {
    match kind {
        StyleKind::Normal => Box::new(NormalStyle),
        StyleKind::Transcript => Box::new(TranscriptStyle),
        StyleKind::Animated => Box::new(AnimatedStyle),
    }
}

/// Emotion glyph with a single chat label
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalStyle;

impl UiStyle for NormalStyle {
    fn kind(&self) -> StyleKind {
        StyleKind::Normal
    }

    fn setup(&self, surface: &mut Surface) {
        surface.set_layout(Layout {
            emotion_placement: EmotionPlacement::Content,
            transcript: false,
        });
    }

    fn set_chat_message(&self, surface: &mut Surface, _role: ChatRole, text: &str) -> bool {
        surface.set_chat_label(text)
    }
}

/// Bubble transcript; the emotion moves into the status bar
#[derive(Clone, Copy, Debug, Default)]
pub struct TranscriptStyle;

impl UiStyle for TranscriptStyle {
    fn kind(&self) -> StyleKind {
        StyleKind::Transcript
    }

    fn setup(&self, surface: &mut Surface) {
        surface.set_layout(Layout {
            emotion_placement: EmotionPlacement::StatusBar,
            transcript: true,
        });
    }

    fn set_chat_message(&self, surface: &mut Surface, role: ChatRole, text: &str) -> bool {
        !matches!(surface.append_chat(role, text), AppendOutcome::Ignored)
    }
}

/// Normal layout with the emotion played as a bitmap clip
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimatedStyle;

impl UiStyle for AnimatedStyle {
    fn kind(&self) -> StyleKind {
        StyleKind::Animated
    }

    fn emotion_mode(&self) -> EmotionMode {
        EmotionMode::Animated
    }

    fn setup(&self, surface: &mut Surface) {
        NormalStyle.setup(surface);
    }

    fn set_chat_message(&self, surface: &mut Surface, role: ChatRole, text: &str) -> bool {
        NormalStyle.set_chat_message(surface, role, text)
    }
}
