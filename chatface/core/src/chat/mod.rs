//! Chat History Log
//!
//! The transcript shown by the transcript style: a bounded, ordered list of
//! role-tagged bubbles. When the log is full the oldest bubble is destroyed
//! before the newest one is created, so the log never exceeds its capacity,
//! not even transiently.
//!
//! Each bubble keeps its [`ChatRole`] for its whole lifetime. Restyling
//! after a theme switch reads that tag; it never guesses the role back
//! from the bubble's current fill color.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::error::DisplayError;
use crate::surface::{WidgetRole, WidgetStyle};
use crate::theme::ThemeColors;

/// Default transcript capacity
pub const DEFAULT_CAPACITY: usize = 20;

/// Smallest bubble width in pixels
pub const DEFAULT_MIN_BUBBLE_WIDTH: u16 = 20;

/// Widest bubble as a percentage of the viewport
pub const DEFAULT_MAX_BUBBLE_PERCENT: u8 = 85;

/// Default horizontal advance of one text column in pixels
pub const DEFAULT_GLYPH_ADVANCE_PX: u16 = 14;

// ============================================================================
// Roles
// ============================================================================

/// Who a chat message came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person talking to the device
    User,
    /// The assistant
    Assistant,
    /// Device/system notices
    System,
}

impl ChatRole {
    /// Wire name of the role
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    /// Horizontal placement of this role's bubbles
    #[must_use]
    pub fn alignment(self) -> BubbleAlignment {
        match self {
            Self::User => BubbleAlignment::Right,
            Self::Assistant => BubbleAlignment::Left,
            Self::System => BubbleAlignment::Center,
        }
    }
}

impl FromStr for ChatRole {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(DisplayError::UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal placement of a bubble in the transcript
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleAlignment {
    /// Flush left, directly in the transcript flow
    Left,
    /// Right-aligned inside a full-width wrapper
    Right,
    /// Centered inside a full-width wrapper
    Center,
}

impl BubbleAlignment {
    /// Whether the bubble sits in its own alignment container
    #[must_use]
    pub fn is_wrapped(self) -> bool {
        !matches!(self, Self::Left)
    }
}

// ============================================================================
// Bubbles
// ============================================================================

/// Stable identifier of a bubble within one log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(u64);

impl BubbleId {
    /// Raw numeric value
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// One rendered chat message
#[derive(Clone, Debug)]
pub struct ChatBubble {
    id: BubbleId,
    role: ChatRole,
    text: String,
    width: u16,
    style: WidgetStyle,
}

impl ChatBubble {
    /// Bubble identifier
    #[must_use]
    pub fn id(&self) -> BubbleId {
        self.id
    }

    /// Role tag, fixed at creation
    #[must_use]
    pub fn role(&self) -> ChatRole {
        self.role
    }

    /// Message text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bubble width in pixels
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Placement derived from the role
    #[must_use]
    pub fn alignment(&self) -> BubbleAlignment {
        self.role.alignment()
    }

    /// Current colors
    #[must_use]
    pub fn style(&self) -> WidgetStyle {
        self.style
    }

    fn restyle(&mut self, palette: &ThemeColors) {
        self.style = palette.style_for(WidgetRole::Bubble(self.role));
    }
}

/// Geometry used to size bubbles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BubbleMetrics {
    /// Viewport width in pixels
    pub viewport_width: u16,
    /// Minimum bubble width in pixels
    pub min_width: u16,
    /// Maximum bubble width as a percentage of the viewport
    pub max_percent: u8,
    /// Pixels per text column
    pub glyph_advance_px: u16,
}

impl BubbleMetrics {
    /// Metrics for a viewport with default bubble bounds
    #[must_use]
    pub fn for_viewport(viewport_width: u16) -> Self {
        Self {
            viewport_width,
            min_width: DEFAULT_MIN_BUBBLE_WIDTH,
            max_percent: DEFAULT_MAX_BUBBLE_PERCENT,
            glyph_advance_px: DEFAULT_GLYPH_ADVANCE_PX,
        }
    }

    /// Largest width a bubble may take
    #[must_use]
    pub fn max_width(&self) -> u16 {
        let max = u32::from(self.viewport_width) * u32::from(self.max_percent) / 100;
        u16::try_from(max).unwrap_or(u16::MAX)
    }

    /// Width of the bubble for `text`: measured width clamped to
    /// `[min_width, max_width]`
    #[must_use]
    pub fn bubble_width(&self, text: &str) -> u16 {
        let columns = text
            .lines()
            .map(|line| line.width())
            .max()
            .unwrap_or(0);
        let measured = columns.saturating_mul(usize::from(self.glyph_advance_px));
        let measured = u16::try_from(measured).unwrap_or(u16::MAX);
        let max = self.max_width().max(self.min_width);
        measured.clamp(self.min_width, max)
    }
}

// ============================================================================
// Log
// ============================================================================

/// Result of an append
#[derive(Debug)]
pub enum AppendOutcome {
    /// Empty text; nothing was created
    Ignored,
    /// A bubble was created
    Appended {
        /// The new bubble
        id: BubbleId,
        /// The oldest bubble, destroyed to make room
        evicted: Option<ChatBubble>,
    },
}

impl AppendOutcome {
    /// Id of the appended bubble, if any
    #[must_use]
    pub fn id(&self) -> Option<BubbleId> {
        match self {
            Self::Ignored => None,
            Self::Appended { id, .. } => Some(*id),
        }
    }
}

/// Bounded transcript of chat bubbles, oldest first
#[derive(Debug)]
pub struct ChatHistoryLog {
    bubbles: VecDeque<ChatBubble>,
    capacity: usize,
    metrics: BubbleMetrics,
    scroll_target: Option<BubbleId>,
    next_id: u64,
}

impl ChatHistoryLog {
    /// Create an empty log; a zero capacity is raised to one
    #[must_use]
    pub fn new(capacity: usize, metrics: BubbleMetrics) -> Self {
        let capacity = capacity.max(1);
        Self {
            bubbles: VecDeque::with_capacity(capacity),
            capacity,
            metrics,
            scroll_target: None,
            next_id: 1,
        }
    }

    /// Append a message, evicting the oldest bubble when full
    ///
    /// Empty text is ignored. The new bubble is colored from `palette`
    /// and becomes the scroll target.
    pub fn append(&mut self, role: ChatRole, text: &str, palette: &ThemeColors) -> AppendOutcome {
        if text.is_empty() {
            return AppendOutcome::Ignored;
        }

        let evicted = if self.bubbles.len() >= self.capacity {
            let oldest = self.bubbles.pop_front();
            if let Some(ref bubble) = oldest {
                tracing::debug!(bubble = bubble.id.0, "Evicted oldest chat bubble");
            }
            oldest
        } else {
            None
        };

        let id = BubbleId(self.next_id);
        self.next_id += 1;

        self.bubbles.push_back(ChatBubble {
            id,
            role,
            text: text.to_string(),
            width: self.metrics.bubble_width(text),
            style: palette.style_for(WidgetRole::Bubble(role)),
        });
        self.scroll_target = Some(id);

        AppendOutcome::Appended { id, evicted }
    }

    /// Repaint every live bubble from `palette` using its role tag
    pub fn restyle(&mut self, palette: &ThemeColors) {
        for bubble in &mut self.bubbles {
            bubble.restyle(palette);
        }
    }

    /// Remove every bubble, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = ChatBubble> + '_ {
        self.scroll_target = None;
        self.bubbles.drain(..)
    }

    /// Bubbles in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &ChatBubble> {
        self.bubbles.iter()
    }

    /// Most recent bubble
    #[must_use]
    pub fn latest(&self) -> Option<&ChatBubble> {
        self.bubbles.back()
    }

    /// Bubble the view is scrolled to
    #[must_use]
    pub fn scroll_target(&self) -> Option<BubbleId> {
        self.scroll_target
    }

    /// Number of live bubbles
    #[must_use]
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    /// Whether the log holds no bubbles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Maximum number of bubbles
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sizing metrics
    #[must_use]
    pub fn metrics(&self) -> BubbleMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn log_with_capacity(capacity: usize) -> ChatHistoryLog {
        ChatHistoryLog::new(capacity, BubbleMetrics::for_viewport(240))
    }

    fn texts(log: &ChatHistoryLog) -> Vec<String> {
        log.iter().map(|b| b.text().to_string()).collect()
    }

    // ===================
    // Bounded eviction
    // ===================

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut log = log_with_capacity(3);
        for i in 0..10 {
            log.append(ChatRole::User, &format!("msg {i}"), &ThemeColors::LIGHT);
            assert!(log.len() <= 3);
        }
        assert_eq!(texts(&log), vec!["msg 7", "msg 8", "msg 9"]);
    }

    #[test]
    fn test_holds_most_recent_in_arrival_order() {
        let mut log = log_with_capacity(DEFAULT_CAPACITY);
        let roles = [ChatRole::User, ChatRole::Assistant, ChatRole::System];
        for i in 0..27 {
            log.append(roles[i % 3], &format!("m{i}"), &ThemeColors::LIGHT);
        }

        let expected: Vec<String> = (7..27).map(|i| format!("m{i}")).collect();
        assert_eq!(texts(&log), expected);
    }

    #[test]
    fn test_eviction_returns_oldest() {
        let mut log = log_with_capacity(2);
        log.append(ChatRole::User, "first", &ThemeColors::LIGHT);
        log.append(ChatRole::Assistant, "second", &ThemeColors::LIGHT);

        match log.append(ChatRole::User, "third", &ThemeColors::LIGHT) {
            AppendOutcome::Appended { evicted: Some(old), .. } => assert_eq!(old.text(), "first"),
            other => panic!("expected eviction, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut log = log_with_capacity(2);
        log.append(ChatRole::User, "hello", &ThemeColors::LIGHT);

        let outcome = log.append(ChatRole::Assistant, "", &ThemeColors::LIGHT);
        assert!(matches!(outcome, AppendOutcome::Ignored));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_scroll_follows_newest() {
        let mut log = log_with_capacity(5);
        let first = log.append(ChatRole::User, "a", &ThemeColors::LIGHT).id();
        assert_eq!(log.scroll_target(), first);
        let second = log.append(ChatRole::Assistant, "b", &ThemeColors::LIGHT).id();
        assert_eq!(log.scroll_target(), second);
    }

    // ===================
    // Styling
    // ===================

    #[test]
    fn test_restyle_uses_role_tags() {
        let mut log = log_with_capacity(5);
        log.append(ChatRole::User, "u", &ThemeColors::LIGHT);
        log.append(ChatRole::Assistant, "a", &ThemeColors::LIGHT);
        log.append(ChatRole::System, "s", &ThemeColors::LIGHT);

        log.restyle(&ThemeColors::DARK);
        log.restyle(&ThemeColors::LIGHT);

        for bubble in log.iter() {
            assert_eq!(
                bubble.style(),
                ThemeColors::LIGHT.style_for(WidgetRole::Bubble(bubble.role()))
            );
        }
    }

    #[test]
    fn test_alignment_by_role() {
        assert_eq!(ChatRole::User.alignment(), BubbleAlignment::Right);
        assert_eq!(ChatRole::Assistant.alignment(), BubbleAlignment::Left);
        assert_eq!(ChatRole::System.alignment(), BubbleAlignment::Center);
        assert!(!BubbleAlignment::Left.is_wrapped());
        assert!(BubbleAlignment::Center.is_wrapped());
    }

    // ===================
    // Width
    // ===================

    #[test]
    fn test_bubble_width_clamped() {
        let metrics = BubbleMetrics::for_viewport(240);
        assert_eq!(metrics.max_width(), 204);

        assert_eq!(metrics.bubble_width("a"), 20);
        assert_eq!(metrics.bubble_width("abcd"), 56);
        assert_eq!(metrics.bubble_width(&"x".repeat(100)), 204);
    }

    #[test]
    fn test_bubble_width_counts_wide_glyphs() {
        let metrics = BubbleMetrics::for_viewport(240);
        // Two CJK characters occupy four columns
        assert_eq!(metrics.bubble_width("你好"), 56);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("assistant".parse::<ChatRole>().unwrap(), ChatRole::Assistant);
        assert!(matches!(
            "robot".parse::<ChatRole>(),
            Err(DisplayError::UnknownRole(_))
        ));
    }
}
