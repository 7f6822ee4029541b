//! Emotions
//!
//! Symbolic emotion names as the assistant sends them ("happy", "sad", ...)
//! and the two ways the surface can express them:
//!
//! - a single glyph from [`glyph_for`] (normal and transcript styles)
//! - a looping bitmap clip described by an [`AnimationDescriptor`], played
//!   by the [`EmotionAnimationPlayer`] (animated style)
//!
//! Unknown names always fall back to neutral.

mod frames;
mod player;

use std::time::Duration;

pub use frames::{FrameBuffer, FramePool, FrameStore, FsFrameStore, MemoryFrameStore};
pub use player::{next_frame_delay, EmotionAnimationPlayer, PlayerState, MIN_FRAME_PERIOD};

/// Emotion used for unknown names
pub const DEFAULT_EMOTION: &str = "neutral";

// ============================================================================
// Glyphs
// ============================================================================

/// Emoji shown for each supported emotion
pub const EMOTION_GLYPHS: &[(&str, &str)] = &[
    ("neutral", "😶"),
    ("happy", "🙂"),
    ("laughing", "😆"),
    ("funny", "😂"),
    ("sad", "😔"),
    ("angry", "😠"),
    ("crying", "😭"),
    ("loving", "😍"),
    ("embarrassed", "😳"),
    ("surprised", "😯"),
    ("shocked", "😱"),
    ("thinking", "🤔"),
    ("winking", "😉"),
    ("cool", "😎"),
    ("relaxed", "😌"),
    ("delicious", "🤤"),
    ("kissy", "😘"),
    ("confident", "😏"),
    ("sleepy", "😴"),
    ("silly", "😜"),
    ("confused", "🙄"),
];

/// Glyph for an emotion name, neutral when unknown
#[must_use]
pub fn glyph_for(name: &str) -> &'static str {
    EMOTION_GLYPHS
        .iter()
        .find(|(emotion, _)| *emotion == name)
        .or_else(|| EMOTION_GLYPHS.iter().find(|(e, _)| *e == DEFAULT_EMOTION))
        .map_or("😶", |(_, glyph)| glyph)
}

// ============================================================================
// Animation Descriptors
// ============================================================================

/// Static metadata mapping a symbolic emotion to a playable clip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationDescriptor {
    /// Symbolic emotion name
    pub name: &'static str,
    /// Clip directory in the frame store
    pub clip: &'static str,
    /// Number of frames in the clip
    pub frame_count: usize,
    /// Target time each frame stays on screen
    pub frame_duration: Duration,
}

impl AnimationDescriptor {
    /// Whether the clip is a single still frame
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.frame_count <= 1
    }
}

/// Every playable clip. Neutral is a single still frame.
pub const ANIMATIONS: &[AnimationDescriptor] = &[
    AnimationDescriptor {
        name: "happy",
        clip: "happy",
        frame_count: 4,
        frame_duration: Duration::from_millis(150),
    },
    AnimationDescriptor {
        name: "sad",
        clip: "sad",
        frame_count: 3,
        frame_duration: Duration::from_millis(200),
    },
    AnimationDescriptor {
        name: "angry",
        clip: "angry",
        frame_count: 5,
        frame_duration: Duration::from_millis(120),
    },
    AnimationDescriptor {
        name: "neutral",
        clip: "neutral",
        frame_count: 1,
        frame_duration: Duration::ZERO,
    },
];

/// Descriptor for an emotion name, neutral when unknown
#[must_use]
pub fn descriptor_for(name: &str) -> &'static AnimationDescriptor {
    ANIMATIONS
        .iter()
        .find(|d| d.name == name)
        .or_else(|| ANIMATIONS.iter().find(|d| d.name == DEFAULT_EMOTION))
        .unwrap_or(&ANIMATIONS[0])
}

/// Pixel size of every animation frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl FrameGeometry {
    /// Create a geometry
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Byte size of one RGB565 frame
    #[must_use]
    pub fn frame_bytes(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) * 2
    }
}
