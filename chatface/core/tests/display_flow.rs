//! End-to-end behavior of the public `Display` API
//!
//! Drives a display with recording collaborators and a recording draw
//! engine. Timing-sensitive tests run on a paused tokio clock.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chatface_core::emotion::ANIMATIONS;
use chatface_core::settings::{DISPLAY_NAMESPACE, STYLE_KEY, THEME_KEY};
use chatface_core::{
    ChatRole, Collaborators, DisplayConfig, DisplayError, Display, DrawEngine, FrameGeometry,
    LowBatteryAlert, MemoryFrameStore, MemorySettings, PowerSource, RestartHandle, StyleKind,
    Surface, ThemeColors, ThemeName, WidgetRole,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

// ============================================================================
// Recording Collaborators
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum EngineEvent {
    Frame { clip: &'static str, index: usize },
    Destroyed(WidgetRole),
    Released,
}

#[derive(Clone, Default)]
struct RecordingEngine {
    events: Arc<Mutex<Vec<EngineEvent>>>,
    last_blit: Arc<Mutex<u64>>,
}

impl RecordingEngine {
    fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().clone()
    }

    fn frames(&self) -> Vec<(&'static str, usize)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::Frame { clip, index } => Some((clip, index)),
                _ => None,
            })
            .collect()
    }
}

impl DrawEngine for RecordingEngine {
    fn present(&mut self, surface: &Surface) {
        let canvas = surface.emotion_canvas();
        let mut last = self.last_blit.lock();
        if canvas.blit_count() != *last {
            *last = canvas.blit_count();
            if let Some(clip) = canvas.clip() {
                self.events.lock().push(EngineEvent::Frame {
                    clip,
                    index: canvas.frame_index(),
                });
            }
        }
    }

    fn widget_destroyed(&mut self, role: WidgetRole) {
        self.events.lock().push(EngineEvent::Destroyed(role));
    }

    fn release(&mut self) {
        self.events.lock().push(EngineEvent::Released);
    }
}

#[derive(Default)]
struct FakePower {
    level: AtomicU8,
    charging: AtomicBool,
}

impl FakePower {
    fn set(&self, level: u8, charging: bool) {
        self.level.store(level, Ordering::SeqCst);
        self.charging.store(charging, Ordering::SeqCst);
    }
}

impl PowerSource for FakePower {
    fn battery_level(&self) -> Option<u8> {
        Some(self.level.load(Ordering::SeqCst))
    }

    fn is_charging(&self) -> bool {
        self.charging.load(Ordering::SeqCst)
    }

    fn is_discharging(&self) -> bool {
        !self.is_charging()
    }
}

#[derive(Default)]
struct Counter(AtomicU32);

impl Counter {
    fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

impl RestartHandle for Counter {
    fn request_restart(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl LowBatteryAlert for Counter {
    fn play_low_battery_alert(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

const GEOMETRY: FrameGeometry = FrameGeometry::new(4, 4);

fn config() -> DisplayConfig {
    let mut config = DisplayConfig::default();
    config.frame_width = GEOMETRY.width;
    config.frame_height = GEOMETRY.height;
    config
}

fn frame_store() -> MemoryFrameStore {
    let store = MemoryFrameStore::new();
    for descriptor in ANIMATIONS {
        store.fill_clip(descriptor, GEOMETRY);
    }
    store
}

async fn start_with_style(style: &str, engine: RecordingEngine) -> (Display, Arc<MemorySettings>) {
    let settings =
        Arc::new(MemorySettings::new().with_value(DISPLAY_NAMESPACE, STYLE_KEY, style));
    let collaborators =
        Collaborators::new(settings.clone()).with_frames(Arc::new(frame_store()));
    let display = Display::start(config(), collaborators, Box::new(engine)).await;
    (display, settings)
}

// ============================================================================
// Chat Transcript
// ============================================================================

#[tokio::test]
async fn transcript_keeps_most_recent_messages_in_order() {
    let (display, _) = start_with_style("wechat", RecordingEngine::default()).await;
    assert_eq!(display.style(), StyleKind::Transcript);

    for i in 0..25 {
        display
            .set_chat_message("user", &format!("message {i}"))
            .await
            .unwrap();
        let len = display.inspect(|s| s.chat().len()).await.unwrap();
        assert!(len <= 20);
    }

    let texts = display
        .inspect(|s| s.chat().iter().map(|b| b.text().to_string()).collect::<Vec<_>>())
        .await
        .unwrap();
    let expected: Vec<String> = (5..25).map(|i| format!("message {i}")).collect();
    assert_eq!(texts, expected);
    display.shutdown().await;
}

#[tokio::test]
async fn empty_chat_message_changes_nothing() {
    let (display, _) = start_with_style("wechat", RecordingEngine::default()).await;
    display.set_chat_message("assistant", "hi").await.unwrap();
    display.set_chat_message("assistant", "").await.unwrap();

    assert_eq!(display.inspect(|s| s.chat().len()).await.unwrap(), 1);
    display.shutdown().await;
}

#[tokio::test]
async fn unknown_chat_role_is_rejected() {
    let (display, _) = start_with_style("wechat", RecordingEngine::default()).await;
    let result = display.set_chat_message("narrator", "once upon a time").await;

    assert!(matches!(result, Err(DisplayError::UnknownRole(role)) if role == "narrator"));
    assert!(display.inspect(|s| s.chat().is_empty()).await.unwrap());
    display.shutdown().await;
}

// ============================================================================
// Theme
// ============================================================================

#[tokio::test]
async fn dark_then_light_restores_light_palette_on_every_bubble() {
    let (display, settings) = start_with_style("wechat", RecordingEngine::default()).await;
    display.set_chat_message("user", "question").await.unwrap();
    display.set_chat_message("assistant", "answer").await.unwrap();
    display.set_chat_message("system", "notice").await.unwrap();

    display.set_theme("dark").await.unwrap();
    display.set_theme("light").await.unwrap();

    let styles = display
        .inspect(|s| {
            s.chat()
                .iter()
                .map(|b| (b.role(), b.style()))
                .collect::<Vec<_>>()
        })
        .await
        .unwrap();
    for (role, style) in styles {
        assert_eq!(style, ThemeColors::LIGHT.style_for(WidgetRole::Bubble(role)));
    }
    assert_eq!(
        settings.value(DISPLAY_NAMESPACE, THEME_KEY).as_deref(),
        Some("light")
    );
    display.shutdown().await;
}

#[tokio::test]
async fn unknown_theme_keeps_previous_palette() {
    let (display, settings) = start_with_style("normal", RecordingEngine::default()).await;
    display.set_theme("dark").await.unwrap();

    let result = display.set_theme("neon").await;
    assert!(matches!(result, Err(DisplayError::UnknownTheme(_))));
    assert_eq!(display.theme().await.unwrap(), ThemeName::Dark);
    assert_eq!(
        settings.value(DISPLAY_NAMESPACE, THEME_KEY).as_deref(),
        Some("dark")
    );
    display.shutdown().await;
}

#[tokio::test]
async fn persisted_theme_is_restored_at_start() {
    let settings = Arc::new(MemorySettings::new().with_value(DISPLAY_NAMESPACE, THEME_KEY, "dark"));
    let display = Display::start(
        config(),
        Collaborators::new(settings),
        Box::new(RecordingEngine::default()),
    )
    .await;

    assert_eq!(display.theme().await.unwrap(), ThemeName::Dark);
    let status_style = display.inspect(|s| s.status_label().style()).await.unwrap();
    assert_eq!(
        status_style,
        ThemeColors::DARK.style_for(WidgetRole::StatusText)
    );
    display.shutdown().await;
}

// ============================================================================
// Style
// ============================================================================

#[tokio::test]
async fn set_style_persists_and_requests_restart() {
    let settings = Arc::new(MemorySettings::new());
    let restart = Arc::new(Counter::default());
    let collaborators = Collaborators::new(settings.clone())
        .with_restart(restart.clone())
        .with_frames(Arc::new(frame_store()));
    let display = Display::start(config(), collaborators, Box::new(RecordingEngine::default())).await;

    display.set_style("animation").await.unwrap();
    assert_eq!(
        settings.value(DISPLAY_NAMESPACE, STYLE_KEY).as_deref(),
        Some("animation")
    );
    assert_eq!(restart.get(), 1);

    assert!(matches!(
        display.set_style("retro").await,
        Err(DisplayError::UnknownStyle(_))
    ));
    assert_eq!(restart.get(), 1);
    display.shutdown().await;
}

// ============================================================================
// Notifications
// ============================================================================

async fn visible_status(display: &Display) -> String {
    display
        .inspect(|s| {
            if s.notification_label().is_visible() {
                s.notification_label().text().to_string()
            } else {
                s.status_label().text().to_string()
            }
        })
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn second_notification_replaces_first_and_reverts_once() {
    let (display, _) = start_with_style("normal", RecordingEngine::default()).await;
    display.set_status("Standby").await.unwrap();

    display
        .show_notification("X", Duration::from_millis(500))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    display
        .show_notification("Y", Duration::from_millis(500))
        .await
        .unwrap();
    assert_eq!(visible_status(&display).await, "Y");

    // The first deadline passes without effect
    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(visible_status(&display).await, "Y");

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(visible_status(&display).await, "Standby");

    let generation = display
        .inspect(|s| s.notification_state().generation())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    let after = display
        .inspect(|s| s.notification_state().generation())
        .await
        .unwrap();
    assert_eq!(generation, after, "no second revert");
    display.shutdown().await;
}

// ============================================================================
// Status Bar
// ============================================================================

#[tokio::test]
async fn low_battery_banner_follows_level_and_charging() {
    let power = Arc::new(FakePower::default());
    let alert = Arc::new(Counter::default());
    let collaborators = Collaborators::new(Arc::new(MemorySettings::new()))
        .with_power(power.clone())
        .with_low_battery_alert(alert.clone());
    let display = Display::start(config(), collaborators, Box::new(RecordingEngine::default())).await;

    let mut shown = Vec::new();
    for (level, charging) in [(25, false), (15, false), (5, false), (5, true)] {
        power.set(level, charging);
        display.update_status_bar(false).await.unwrap();
        shown.push(
            display
                .inspect(|s| s.low_battery_banner().is_visible())
                .await
                .unwrap(),
        );
    }

    assert_eq!(shown, vec![false, true, true, false]);
    assert_eq!(alert.get(), 1);
    display.shutdown().await;
}

// ============================================================================
// Animation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn switching_emotion_never_double_books_buffers() {
    let (display, _) = start_with_style("animation", RecordingEngine::default()).await;
    let player = display.player().expect("animated style has a player");

    display.set_emotion("happy").await.unwrap();
    display.set_emotion("sad").await.unwrap();

    assert_eq!(player.pool().live(), 3);
    assert!(player.pool().peak() <= 4);
    display.shutdown().await;
    assert_eq!(player.pool().live(), 0);
}

#[tokio::test(start_paused = true)]
async fn bad_frame_truncates_clip_and_loops_the_rest() {
    let engine = RecordingEngine::default();
    let store = frame_store();
    store.insert("angry", 3, vec![0; 7]);

    let settings =
        Arc::new(MemorySettings::new().with_value(DISPLAY_NAMESPACE, STYLE_KEY, "animation"));
    let collaborators = Collaborators::new(settings).with_frames(Arc::new(store));
    let display = Display::start(config(), collaborators, Box::new(engine.clone())).await;

    display.set_emotion("angry").await.unwrap();
    tokio::time::sleep(Duration::from_millis(120 * 7 + 60)).await;

    let indices: Vec<usize> = engine.frames().into_iter().map(|(_, i)| i).collect();
    assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0, 1]);
    display.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn set_icon_stops_animation() {
    let (display, _) = start_with_style("animation", RecordingEngine::default()).await;
    display.set_emotion("happy").await.unwrap();
    display.set_icon("\u{f0eb}").await.unwrap();

    let player = display.player().unwrap();
    assert_eq!(player.pool().live(), 0);
    let (glyph_visible, canvas_visible) = display
        .inspect(|s| (s.emotion_glyph().is_visible(), s.emotion_canvas().is_visible()))
        .await
        .unwrap();
    assert!(glyph_visible);
    assert!(!canvas_visible);
    display.shutdown().await;
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn shutdown_releases_content_then_status_then_engine() {
    let engine = RecordingEngine::default();
    let (display, _) = start_with_style("wechat", engine.clone()).await;
    display.set_chat_message("user", "one").await.unwrap();
    display.set_chat_message("assistant", "two").await.unwrap();

    display.shutdown().await;
    display.shutdown().await;

    let destroyed: Vec<EngineEvent> = engine
        .events()
        .into_iter()
        .filter(|e| !matches!(e, EngineEvent::Frame { .. }))
        .collect();
    assert_eq!(
        &destroyed[..5],
        &[
            EngineEvent::Destroyed(WidgetRole::Bubble(ChatRole::User)),
            EngineEvent::Destroyed(WidgetRole::Bubble(ChatRole::Assistant)),
            EngineEvent::Destroyed(WidgetRole::ChatLabel),
            EngineEvent::Destroyed(WidgetRole::Emotion),
            EngineEvent::Destroyed(WidgetRole::ContentArea),
        ]
    );
    assert_eq!(destroyed.last(), Some(&EngineEvent::Released));
    assert_eq!(
        destroyed
            .iter()
            .filter(|e| **e == EngineEvent::Released)
            .count(),
        1
    );

    assert!(matches!(
        display.set_status("late").await,
        Err(DisplayError::ShutDown)
    ));
}
