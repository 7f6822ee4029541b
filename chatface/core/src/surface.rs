//! Surface
//!
//! The complete UI state of the one visible screen: the widget tree, the
//! active theme, the chat transcript, the status indicators and the
//! emotion slot. A [`Surface`] is only ever reachable through the
//! [`RenderCoordinator`](crate::RenderCoordinator), which hands out
//! `&mut Surface` for the duration of one critical section.
//!
//! # Design
//!
//! Mutators are plain synchronous methods that report whether they changed
//! anything. Each change bumps a revision counter, and the coordinator
//! presents the surface to the draw engine only when the revision moved.
//! Nothing here performs I/O or awaits, which keeps critical sections
//! short.
//!
//! Every widget carries a [`WidgetRole`]. Theme switches recolor by role,
//! and teardown reports each destroyed widget by role in a fixed order.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::chat::{AppendOutcome, ChatHistoryLog, ChatRole};
use crate::color::Color;
use crate::emotion::FrameGeometry;
use crate::icons;
use crate::status_bar::{BatteryIcon, StatusSnapshot};
use crate::theme::{ThemeColors, ThemeName, ThemeStore};

// ============================================================================
// Roles and Styles
// ============================================================================

/// What a widget is, independent of how it is colored
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetRole {
    /// Root screen
    Screen,
    /// Container holding the status bar and content area
    Container,
    /// Status bar strip
    StatusBar,
    /// Any text or icon label inside the status bar
    StatusText,
    /// Content area (emotion and chat)
    ContentArea,
    /// Emotion glyph or animation canvas
    Emotion,
    /// Single-message chat label
    ChatLabel,
    /// Transcript bubble of the given role
    Bubble(ChatRole),
    /// Low-battery banner
    LowBatteryBanner,
}

/// Resolved colors of one widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetStyle {
    /// Fill color
    pub background: Option<Color>,
    /// Text color
    pub text: Option<Color>,
    /// Border color
    pub border: Option<Color>,
}

// ============================================================================
// Widgets
// ============================================================================

/// A text widget
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    role: WidgetRole,
    text: String,
    visible: bool,
    style: WidgetStyle,
}

impl Label {
    fn new(role: WidgetRole, text: &str, visible: bool, palette: &ThemeColors) -> Self {
        Self {
            role,
            text: text.to_string(),
            visible,
            style: palette.style_for(role),
        }
    }

    /// Role tag
    #[must_use]
    pub fn role(&self) -> WidgetRole {
        self.role
    }

    /// Current text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the label is shown
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current colors
    #[must_use]
    pub fn style(&self) -> WidgetStyle {
        self.style
    }

    fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        text.clone_into(&mut self.text);
        true
    }

    fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    fn restyle(&mut self, palette: &ThemeColors) {
        self.style = palette.style_for(self.role);
    }
}

/// A container widget without text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panel {
    role: WidgetRole,
    style: WidgetStyle,
}

impl Panel {
    fn new(role: WidgetRole, palette: &ThemeColors) -> Self {
        Self {
            role,
            style: palette.style_for(role),
        }
    }

    /// Role tag
    #[must_use]
    pub fn role(&self) -> WidgetRole {
        self.role
    }

    /// Current colors
    #[must_use]
    pub fn style(&self) -> WidgetStyle {
        self.style
    }

    fn restyle(&mut self, palette: &ThemeColors) {
        self.style = palette.style_for(self.role);
    }
}

/// The single bitmap target animation frames are blitted into
#[derive(Clone, Debug)]
pub struct EmotionCanvas {
    geometry: FrameGeometry,
    pixels: Vec<u8>,
    clip: Option<&'static str>,
    frame_index: usize,
    visible: bool,
    blits: u64,
}

impl EmotionCanvas {
    fn new(geometry: FrameGeometry) -> Self {
        Self {
            geometry,
            // Allocated on the first blit; glyph-only styles never pay for it
            pixels: Vec::new(),
            clip: None,
            frame_index: 0,
            visible: false,
            blits: 0,
        }
    }

    /// Frame size this canvas accepts
    #[must_use]
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Pixels of the last blitted frame (empty before the first blit)
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Clip of the last blitted frame
    #[must_use]
    pub fn clip(&self) -> Option<&'static str> {
        self.clip
    }

    /// Index of the last blitted frame within its clip
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Whether the canvas is shown
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of frames blitted since creation
    #[must_use]
    pub fn blit_count(&self) -> u64 {
        self.blits
    }

    fn blit(&mut self, clip: &'static str, index: usize, pixels: &[u8]) -> bool {
        if pixels.len() != self.geometry.frame_bytes() {
            return false;
        }
        if self.pixels.len() != pixels.len() {
            self.pixels.resize(pixels.len(), 0);
        }
        self.pixels.copy_from_slice(pixels);
        self.clip = Some(clip);
        self.frame_index = index;
        self.visible = true;
        self.blits += 1;
        true
    }
}

/// Where the emotion widget sits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmotionPlacement {
    /// Centered in the content area
    #[default]
    Content,
    /// Left edge of the status bar (content area holds the transcript)
    StatusBar,
}

/// Arrangement chosen by the active UI style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    /// Emotion widget position
    pub emotion_placement: EmotionPlacement,
    /// Whether the content area shows the bubble transcript
    pub transcript: bool,
}

/// Transient notification bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotificationState {
    generation: u64,
    deadline: Option<Instant>,
}

impl NotificationState {
    /// Generation of the latest notification or status write
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Revert deadline of the visible notification, if any
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a transient notification is currently shown
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

// ============================================================================
// Surface
// ============================================================================

/// The whole UI state guarded by the render lock
#[derive(Debug)]
pub struct Surface {
    width: u16,
    height: u16,
    theme: ThemeStore,
    layout: Layout,
    revision: u64,

    screen: Panel,
    container: Panel,
    status_bar: Panel,
    content: Panel,

    notification_label: Label,
    status_label: Label,
    mute_label: Label,
    network_label: Label,
    battery_label: Label,
    low_battery_banner: Label,

    emotion_glyph: Label,
    emotion_canvas: EmotionCanvas,
    chat_label: Label,
    chat: ChatHistoryLog,

    indicators: StatusSnapshot,
    notice: NotificationState,
}

impl Surface {
    /// Build the widget tree, colored from `theme`
    #[must_use]
    pub fn new(
        width: u16,
        height: u16,
        theme: ThemeName,
        chat: ChatHistoryLog,
        frame_geometry: FrameGeometry,
    ) -> Self {
        let theme = ThemeStore::new(theme);
        let palette = *theme.colors();

        Self {
            width,
            height,
            theme,
            layout: Layout::default(),
            revision: 0,
            screen: Panel::new(WidgetRole::Screen, &palette),
            container: Panel::new(WidgetRole::Container, &palette),
            status_bar: Panel::new(WidgetRole::StatusBar, &palette),
            content: Panel::new(WidgetRole::ContentArea, &palette),
            notification_label: Label::new(WidgetRole::StatusText, "", false, &palette),
            status_label: Label::new(WidgetRole::StatusText, "", true, &palette),
            mute_label: Label::new(WidgetRole::StatusText, "", false, &palette),
            network_label: Label::new(WidgetRole::StatusText, "", true, &palette),
            battery_label: Label::new(WidgetRole::StatusText, "", true, &palette),
            low_battery_banner: Label::new(
                WidgetRole::LowBatteryBanner,
                icons::LOW_BATTERY_TEXT,
                false,
                &palette,
            ),
            emotion_glyph: Label::new(WidgetRole::Emotion, icons::AI_CHIP, true, &palette),
            emotion_canvas: EmotionCanvas::new(frame_geometry),
            chat_label: Label::new(WidgetRole::ChatLabel, "", true, &palette),
            chat,
            indicators: StatusSnapshot::default(),
            notice: NotificationState::default(),
        }
    }

    fn touch(&mut self, changed: bool) -> bool {
        if changed {
            self.revision = self.revision.wrapping_add(1);
        }
        changed
    }

    /// Counter bumped by every visible change
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Viewport size in pixels
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    // ------------------------------------------------------------------------
    // Theme and layout
    // ------------------------------------------------------------------------

    /// Active theme
    #[must_use]
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// Activate `name` and recolor every live widget in one pass
    pub fn apply_theme(&mut self, name: ThemeName) {
        let palette = *self.theme.activate(name);

        for panel in [
            &mut self.screen,
            &mut self.container,
            &mut self.status_bar,
            &mut self.content,
        ] {
            panel.restyle(&palette);
        }
        for label in [
            &mut self.notification_label,
            &mut self.status_label,
            &mut self.mute_label,
            &mut self.network_label,
            &mut self.battery_label,
            &mut self.low_battery_banner,
            &mut self.emotion_glyph,
            &mut self.chat_label,
        ] {
            label.restyle(&palette);
        }
        self.chat.restyle(&palette);

        self.touch(true);
    }

    /// Current arrangement
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Switch arrangement; the chat label is only shown outside transcript mode
    pub fn set_layout(&mut self, layout: Layout) {
        let changed = self.layout != layout;
        self.layout = layout;
        let label_changed = self.chat_label.set_visible(!layout.transcript);
        self.touch(changed || label_changed);
    }

    // ------------------------------------------------------------------------
    // Status line and notifications
    // ------------------------------------------------------------------------

    /// Persistent status label
    #[must_use]
    pub fn status_label(&self) -> &Label {
        &self.status_label
    }

    /// Transient notification label
    #[must_use]
    pub fn notification_label(&self) -> &Label {
        &self.notification_label
    }

    /// Notification bookkeeping
    #[must_use]
    pub fn notification_state(&self) -> NotificationState {
        self.notice
    }

    /// Set the persistent status and hide any transient notification
    ///
    /// Bumps the notification generation so a pending revert becomes a
    /// no-op.
    pub fn set_status_text(&mut self, text: &str) {
        let mut changed = self.status_label.set_text(text);
        changed |= self.status_label.set_visible(true);
        changed |= self.notification_label.set_visible(false);
        self.notice.generation += 1;
        self.notice.deadline = None;
        self.touch(changed);
    }

    /// Replace the status line with `text` until `deadline`
    ///
    /// Returns the generation a later [`expire_notification`] must match.
    ///
    /// [`expire_notification`]: Self::expire_notification
    pub fn show_notification(&mut self, text: &str, deadline: Instant) -> u64 {
        let mut changed = self.notification_label.set_text(text);
        changed |= self.notification_label.set_visible(true);
        changed |= self.status_label.set_visible(false);
        self.notice.generation += 1;
        self.notice.deadline = Some(deadline);
        self.touch(changed);
        self.notice.generation
    }

    /// Revert to the persistent status if `generation` is still current
    pub fn expire_notification(&mut self, generation: u64) -> bool {
        if generation != self.notice.generation || self.notice.deadline.is_none() {
            return false;
        }
        self.dismiss_notification();
        true
    }

    /// Hide the transient notification now
    pub fn dismiss_notification(&mut self) {
        let mut changed = self.notification_label.set_visible(false);
        changed |= self.status_label.set_visible(true);
        self.notice.generation += 1;
        self.notice.deadline = None;
        self.touch(changed);
    }

    // ------------------------------------------------------------------------
    // Indicators
    // ------------------------------------------------------------------------

    /// Last written indicator values
    #[must_use]
    pub fn indicators(&self) -> &StatusSnapshot {
        &self.indicators
    }

    /// Mute icon label
    #[must_use]
    pub fn mute_label(&self) -> &Label {
        &self.mute_label
    }

    /// Network icon label
    #[must_use]
    pub fn network_label(&self) -> &Label {
        &self.network_label
    }

    /// Battery icon label
    #[must_use]
    pub fn battery_label(&self) -> &Label {
        &self.battery_label
    }

    /// Low-battery banner
    #[must_use]
    pub fn low_battery_banner(&self) -> &Label {
        &self.low_battery_banner
    }

    /// Write the mute icon if the mute state changed
    pub fn apply_mute(&mut self, muted: bool) -> bool {
        if self.indicators.muted == muted && self.mute_label.is_visible() == muted {
            return false;
        }
        self.indicators.muted = muted;
        self.mute_label
            .set_text(if muted { icons::audio::MUTE } else { "" });
        self.mute_label.set_visible(muted);
        self.touch(true)
    }

    /// Write the battery icon if it changed
    pub fn apply_battery(&mut self, icon: BatteryIcon, charging: bool) -> bool {
        if self.indicators.battery == Some(icon) && self.indicators.charging == charging {
            return false;
        }
        self.indicators.battery = Some(icon);
        self.indicators.charging = charging;
        self.battery_label.set_text(icon.glyph());
        self.touch(true)
    }

    /// Show or hide the low-battery banner
    ///
    /// Returns the new visibility when it changed, `None` otherwise.
    pub fn apply_low_battery_banner(&mut self, show: bool) -> Option<bool> {
        if self.low_battery_banner.set_visible(show) {
            self.touch(true);
            Some(show)
        } else {
            None
        }
    }

    /// Write the network icon if it changed
    pub fn apply_network_icon(&mut self, icon: &str) -> bool {
        if self.indicators.network.as_deref() == Some(icon) {
            return false;
        }
        self.indicators.network = Some(icon.to_string());
        self.network_label.set_text(icon);
        self.touch(true)
    }

    // ------------------------------------------------------------------------
    // Emotion
    // ------------------------------------------------------------------------

    /// Emotion glyph label
    #[must_use]
    pub fn emotion_glyph(&self) -> &Label {
        &self.emotion_glyph
    }

    /// Animation canvas
    #[must_use]
    pub fn emotion_canvas(&self) -> &EmotionCanvas {
        &self.emotion_canvas
    }

    /// Show `glyph` in the emotion slot, hiding the canvas
    pub fn show_emotion_glyph(&mut self, glyph: &str) -> bool {
        let mut changed = self.emotion_glyph.set_text(glyph);
        changed |= self.emotion_glyph.set_visible(true);
        if self.emotion_canvas.visible {
            self.emotion_canvas.visible = false;
            changed = true;
        }
        self.touch(changed)
    }

    /// Copy one animation frame into the canvas and show it
    ///
    /// Frames of the wrong size are refused.
    pub fn blit_emotion_frame(&mut self, clip: &'static str, index: usize, pixels: &[u8]) -> bool {
        if !self.emotion_canvas.blit(clip, index, pixels) {
            return false;
        }
        self.emotion_glyph.set_visible(false);
        self.touch(true)
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    /// Single-message chat label
    #[must_use]
    pub fn chat_label(&self) -> &Label {
        &self.chat_label
    }

    /// Transcript
    #[must_use]
    pub fn chat(&self) -> &ChatHistoryLog {
        &self.chat
    }

    /// Replace the single-message chat label text
    pub fn set_chat_label(&mut self, text: &str) -> bool {
        let changed = self.chat_label.set_text(text);
        self.touch(changed)
    }

    /// Append a bubble to the transcript, colored from the active palette
    pub fn append_chat(&mut self, role: ChatRole, text: &str) -> AppendOutcome {
        let palette = *self.theme.colors();
        let outcome = self.chat.append(role, text, &palette);
        self.touch(!matches!(outcome, AppendOutcome::Ignored));
        outcome
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Destroy every widget, reporting each one by role
    ///
    /// Content area children go first (bubbles oldest first, chat label,
    /// emotion), then the content area, then the status bar children, the
    /// banner and the remaining containers up to the screen.
    pub fn teardown(mut self, mut destroyed: impl FnMut(WidgetRole)) {
        for bubble in self.chat.drain() {
            destroyed(WidgetRole::Bubble(bubble.role()));
        }
        destroyed(self.chat_label.role);
        destroyed(self.emotion_glyph.role);
        drop(self.emotion_canvas);
        destroyed(self.content.role);

        for label in [
            &self.notification_label,
            &self.status_label,
            &self.mute_label,
            &self.network_label,
            &self.battery_label,
            &self.low_battery_banner,
        ] {
            destroyed(label.role);
        }
        destroyed(self.status_bar.role);
        destroyed(self.container.role);
        destroyed(self.screen.role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::BubbleMetrics;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn surface() -> Surface {
        Surface::new(
            240,
            240,
            ThemeName::Light,
            ChatHistoryLog::new(3, BubbleMetrics::for_viewport(240)),
            FrameGeometry::new(2, 2),
        )
    }

    // ========================================================================
    // Theme
    // ========================================================================

    #[test]
    fn test_apply_theme_recolors_all_widgets() {
        let mut s = surface();
        s.append_chat(ChatRole::User, "hi");
        s.apply_theme(ThemeName::Dark);

        let dark = ThemeColors::DARK;
        assert_eq!(s.theme().name(), ThemeName::Dark);
        assert_eq!(s.status_label().style(), dark.style_for(WidgetRole::StatusText));
        assert_eq!(
            s.chat().latest().unwrap().style(),
            dark.style_for(WidgetRole::Bubble(ChatRole::User))
        );
    }

    #[test]
    fn test_widgets_created_after_switch_use_new_palette() {
        let mut s = surface();
        s.apply_theme(ThemeName::Dark);
        s.append_chat(ChatRole::System, "note");

        assert_eq!(
            s.chat().latest().unwrap().style(),
            ThemeColors::DARK.style_for(WidgetRole::Bubble(ChatRole::System))
        );
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_notification_generation_guard() {
        let mut s = surface();
        s.set_status_text("Idle");
        let deadline = Instant::now() + Duration::from_millis(500);

        let first = s.show_notification("X", deadline);
        let second = s.show_notification("Y", deadline);
        assert!(!s.status_label().is_visible());
        assert_eq!(s.notification_label().text(), "Y");

        assert!(!s.expire_notification(first));
        assert!(s.expire_notification(second));
        assert!(!s.expire_notification(second));
        assert!(s.status_label().is_visible());
        assert!(!s.notification_label().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_status_hides_notification() {
        let mut s = surface();
        let generation = s.show_notification("Saved", Instant::now());
        s.set_status_text("Listening");

        assert_eq!(s.status_label().text(), "Listening");
        assert!(s.status_label().is_visible());
        assert!(!s.notification_state().is_pending());
        assert!(!s.expire_notification(generation));
    }

    // ========================================================================
    // Indicators
    // ========================================================================

    #[test]
    fn test_indicators_write_only_on_change() {
        let mut s = surface();
        let before = s.revision();

        assert!(s.apply_battery(BatteryIcon::Level2, false));
        assert!(!s.apply_battery(BatteryIcon::Level2, false));
        assert!(s.apply_network_icon("wifi"));
        assert!(!s.apply_network_icon("wifi"));
        assert!(s.apply_mute(true));
        assert!(!s.apply_mute(true));

        assert_eq!(s.revision(), before + 3);
        assert_eq!(s.battery_label().text(), icons::battery::HALF);
        assert_eq!(s.mute_label().text(), icons::audio::MUTE);
    }

    #[test]
    fn test_banner_reports_transitions() {
        let mut s = surface();
        assert_eq!(s.apply_low_battery_banner(false), None);
        assert_eq!(s.apply_low_battery_banner(true), Some(true));
        assert_eq!(s.apply_low_battery_banner(true), None);
        assert_eq!(s.apply_low_battery_banner(false), Some(false));
    }

    // ========================================================================
    // Emotion
    // ========================================================================

    #[test]
    fn test_blit_swaps_glyph_for_canvas() {
        let mut s = surface();
        assert_eq!(s.emotion_glyph().text(), icons::AI_CHIP);
        assert!(s.emotion_canvas().pixels().is_empty());

        assert!(s.blit_emotion_frame("happy", 1, &[1; 8]));
        assert!(s.emotion_canvas().is_visible());
        assert!(!s.emotion_glyph().is_visible());
        assert_eq!(s.emotion_canvas().frame_index(), 1);

        assert!(!s.blit_emotion_frame("happy", 2, &[1; 3]));
        assert_eq!(s.emotion_canvas().frame_index(), 1);

        s.show_emotion_glyph("🙂");
        assert!(!s.emotion_canvas().is_visible());
        assert!(s.emotion_glyph().is_visible());
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    #[test]
    fn test_teardown_order() {
        let mut s = surface();
        s.append_chat(ChatRole::User, "a");
        s.append_chat(ChatRole::Assistant, "b");

        let mut order = Vec::new();
        s.teardown(|role| order.push(role));

        assert_eq!(
            order,
            vec![
                WidgetRole::Bubble(ChatRole::User),
                WidgetRole::Bubble(ChatRole::Assistant),
                WidgetRole::ChatLabel,
                WidgetRole::Emotion,
                WidgetRole::ContentArea,
                WidgetRole::StatusText,
                WidgetRole::StatusText,
                WidgetRole::StatusText,
                WidgetRole::StatusText,
                WidgetRole::StatusText,
                WidgetRole::LowBatteryBanner,
                WidgetRole::StatusBar,
                WidgetRole::Container,
                WidgetRole::Screen,
            ]
        );
    }
}
