//! Chatface Core - Display State and Rendering Coordination
//!
//! The on-device presentation engine of a voice-assistant appliance. It
//! owns the one visible surface (status bar, chat transcript, emotion) and
//! keeps it consistent while the assistant's state machine, the power
//! manager, periodic housekeeping and the animation player all mutate it
//! concurrently.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │   assistant logic      power manager      timers / housekeeping  │
//! └──────────┬────────────────────┬────────────────────┬─────────────┘
//!            │                    │                    │
//! ┌──────────┴────────────────────┴────────────────────┴─────────────┐
//! │                           Display                                 │
//! │  ┌──────────────┐ ┌─────────────┐ ┌───────────────┐ ┌──────────┐  │
//! │  │ Notification │ │  StatusBar  │ │   Emotion     │ │ UiStyle  │  │
//! │  │  Scheduler   │ │   Updater   │ │   Player      │ │ strategy │  │
//! │  └──────┬───────┘ └──────┬──────┘ └───────┬───────┘ └────┬─────┘  │
//! │         └────────────────┴────────┬───────┴──────────────┘        │
//! │                          RenderCoordinator (lock, timeout)        │
//! │                                   │                               │
//! │               Surface { ThemeStore, ChatHistoryLog, widgets }     │
//! └───────────────────────────────────┼───────────────────────────────┘
//!                                     │ present(&Surface)
//!                               DrawEngine (external)
//! ```
//!
//! # Key Types
//!
//! - [`Display`]: handle exposing every operation to the rest of the firmware
//! - [`RenderCoordinator`]: the single serialization point over the [`Surface`]
//! - [`ChatHistoryLog`]: bounded, role-tagged transcript
//! - [`EmotionAnimationPlayer`]: preloads and plays emotion clips
//! - [`StatusBarUpdater`]: battery, mute and network indicators
//! - [`NotificationScheduler`]: transient status messages
//! - [`ThemeStore`]: the active palette
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chatface_core::{load_config, Collaborators, Display, MemorySettings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = load_config().unwrap();
//!     let collaborators = Collaborators::new(Arc::new(MemorySettings::new()));
//!     let display = Display::start(config, collaborators, Box::new(MyPanel::new())).await;
//!
//!     display.set_status("Standby").await.ok();
//!     display.set_emotion("happy").await.ok();
//!     display.show_notification("Volume 80", Duration::from_secs(3)).await.ok();
//!     display.set_chat_message("assistant", "Hello!").await.ok();
//!
//!     display.shutdown().await;
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chat;
pub mod collaborators;
pub mod color;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod emotion;
pub mod error;
pub mod icons;
pub mod notification;
pub mod screen;
pub mod settings;
pub mod status_bar;
pub mod style;
pub mod surface;
pub mod theme;

// Re-exports for convenience
pub use chat::{
    AppendOutcome, BubbleAlignment, BubbleId, BubbleMetrics, ChatBubble, ChatHistoryLog, ChatRole,
};
pub use collaborators::{
    AudioOutput, Backlight, Collaborators, DeviceState, DeviceStateSource, LowBatteryAlert,
    NetworkMonitor, PerformanceHold, PerformanceLock, PowerSource, RestartHandle,
};
pub use color::Color;
pub use coordinator::{DrawEngine, RenderCoordinator};
pub use display::Display;
pub use emotion::{
    AnimationDescriptor, EmotionAnimationPlayer, FrameBuffer, FrameGeometry, FramePool,
    FrameStore, FsFrameStore, MemoryFrameStore, PlayerState,
};
pub use error::{DisplayError, FrameError, SettingsError};
pub use notification::NotificationScheduler;
pub use screen::{ScreenCommand, ScreenControl, ScreenProperties};
pub use settings::{MemorySettings, SettingsStore, TomlSettingsFile};
pub use status_bar::{BatteryIcon, RefreshOutcome, StatusBarUpdater, StatusSnapshot};
pub use style::{EmotionMode, StyleKind, UiStyle};
pub use surface::{Label, Layout, Surface, WidgetRole, WidgetStyle};
pub use theme::{ThemeColors, ThemeName, ThemeStore};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, DisplayConfig, DisplayToml,
};
