//! Display
//!
//! The handle the rest of the firmware talks to. It wires the surface,
//! the render coordinator and the components together, restores the
//! persisted theme and style, and exposes every operation as an `async fn`
//! callable from any task.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::chat::{ChatHistoryLog, ChatRole};
use crate::collaborators::{Backlight, Collaborators, RestartHandle};
use crate::config::DisplayConfig;
use crate::coordinator::{DrawEngine, RenderCoordinator};
use crate::emotion::{glyph_for, EmotionAnimationPlayer, FrameStore, FsFrameStore};
use crate::error::DisplayError;
use crate::notification::NotificationScheduler;
use crate::settings::{SettingsStore, BRIGHTNESS_KEY, DISPLAY_NAMESPACE, STYLE_KEY, THEME_KEY};
use crate::status_bar::{RefreshOutcome, StatusBarUpdater};
use crate::style::{style_for, EmotionMode, StyleKind, UiStyle};
use crate::surface::Surface;
use crate::theme::ThemeName;

struct DisplayInner {
    coordinator: Arc<RenderCoordinator>,
    style: Box<dyn UiStyle>,
    notifications: NotificationScheduler,
    status_bar: Arc<StatusBarUpdater>,
    player: Option<EmotionAnimationPlayer>,
    settings: Arc<dyn SettingsStore>,
    restart: Option<Arc<dyn RestartHandle>>,
    backlight: Option<Arc<dyn Backlight>>,
    frames_available: bool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Cloneable handle to the display engine
#[derive(Clone)]
pub struct Display {
    inner: Arc<DisplayInner>,
}

/// Read a persisted name, falling back to `default` when absent or invalid
async fn restore<T>(settings: &dyn SettingsStore, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    match settings.get_string(DISPLAY_NAMESPACE, key).await {
        Ok(Some(value)) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, value = %value, fallback = %default, "Ignoring unknown persisted value");
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(key, error = %e, fallback = %default, "Settings unreadable, using default");
            default
        }
    }
}

/// Re-apply a persisted brightness; out-of-range values are ignored
async fn restore_brightness(settings: &dyn SettingsStore, backlight: &dyn Backlight) {
    match settings.get_string(DISPLAY_NAMESPACE, BRIGHTNESS_KEY).await {
        Ok(Some(value)) => match value.parse::<u8>() {
            Ok(level) if level <= 100 => backlight.set_brightness(level, false),
            _ => tracing::warn!(value = %value, "Ignoring persisted brightness"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Settings unreadable, brightness unchanged"),
    }
}

impl Display {
    /// Build the surface and start the draw engine's refresh loop
    ///
    /// Theme and style come from the settings store when persisted, from
    /// `config` otherwise. The animated style falls back to normal when no
    /// frame store is available (neither in `collaborators` nor as
    /// `config.frames_root`).
    pub async fn start(
        config: DisplayConfig,
        collaborators: Collaborators,
        engine: Box<dyn DrawEngine>,
    ) -> Self {
        let settings = Arc::clone(&collaborators.settings);
        let theme = restore(settings.as_ref(), THEME_KEY, config.default_theme).await;
        let mut kind = restore(settings.as_ref(), STYLE_KEY, config.default_style).await;

        let frames: Option<Arc<dyn FrameStore>> = collaborators.frames.clone().or_else(|| {
            config
                .frames_root
                .as_deref()
                .map(|root: &Path| Arc::new(FsFrameStore::new(root)) as Arc<dyn FrameStore>)
        });
        if kind.needs_frames() && frames.is_none() {
            tracing::warn!(style = %kind, "No frame store, falling back to normal style");
            kind = StyleKind::Normal;
        }
        let style = style_for(kind);

        let mut surface = Surface::new(
            config.width,
            config.height,
            theme,
            ChatHistoryLog::new(config.chat_capacity, config.bubble_metrics()),
            config.frame_geometry(),
        );
        style.setup(&mut surface);

        let coordinator = Arc::new(RenderCoordinator::new(surface, engine, config.lock_timeout));
        let refresh = coordinator.spawn_refresh_loop(config.refresh_interval);

        let player = match (style.emotion_mode(), &frames) {
            (EmotionMode::Animated, Some(store)) => Some(EmotionAnimationPlayer::new(
                Arc::clone(&coordinator),
                Arc::clone(store),
                config.frame_geometry(),
                config.join_timeout,
            )),
            _ => None,
        };

        if let Some(backlight) = &collaborators.backlight {
            restore_brightness(settings.as_ref(), backlight.as_ref()).await;
        }

        let status_bar = Arc::new(StatusBarUpdater::new(
            Arc::clone(&coordinator),
            &collaborators,
            config.network_poll_every,
        ));

        tracing::info!(
            theme = %theme,
            style = %kind,
            width = config.width,
            height = config.height,
            frames = frames.is_some(),
            "Display started"
        );

        Self {
            inner: Arc::new(DisplayInner {
                notifications: NotificationScheduler::new(Arc::clone(&coordinator)),
                coordinator,
                style,
                status_bar,
                player,
                settings,
                restart: collaborators.restart.clone(),
                backlight: collaborators.backlight.clone(),
                frames_available: frames.is_some(),
                tasks: Mutex::new(vec![refresh]),
            }),
        }
    }

    // ========================================================================
    // Status Line
    // ========================================================================

    /// Show `text` in the status line for `duration`, then revert
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown.
    pub async fn show_notification(&self, text: &str, duration: Duration) -> Result<(), DisplayError> {
        self.inner.notifications.show_notification(text, duration).await
    }

    /// Set the persistent status line
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown.
    pub async fn set_status(&self, text: &str) -> Result<(), DisplayError> {
        self.inner.notifications.set_status(text).await
    }

    // ========================================================================
    // Emotion
    // ========================================================================

    /// Express `name`: a glyph, or the clip in the animated style
    ///
    /// Unknown names show neutral.
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown in glyph styles. The animated style
    /// degrades to fewer (or no) frames instead of failing.
    pub async fn set_emotion(&self, name: &str) -> Result<(), DisplayError> {
        if let Some(player) = &self.inner.player {
            player.set_emotion(name).await;
            return Ok(());
        }
        let glyph = glyph_for(name);
        self.inner
            .coordinator
            .with_lock(|s| s.show_emotion_glyph(glyph))
            .await?;
        tracing::debug!(emotion = name, "Emotion glyph set");
        Ok(())
    }

    /// Put an arbitrary glyph into the emotion slot
    ///
    /// Stops a running animation first.
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown.
    pub async fn set_icon(&self, glyph: &str) -> Result<(), DisplayError> {
        if let Some(player) = &self.inner.player {
            player.stop().await;
        }
        self.inner
            .coordinator
            .with_lock(|s| s.show_emotion_glyph(glyph))
            .await
            .map(drop)
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Show a chat message from `role` ("user", "assistant" or "system")
    ///
    /// Empty text is ignored.
    ///
    /// # Errors
    ///
    /// [`DisplayError::UnknownRole`], lock timeout or teardown.
    pub async fn set_chat_message(&self, role: &str, text: &str) -> Result<(), DisplayError> {
        let role: ChatRole = role.parse().inspect_err(|e| {
            tracing::warn!(error = %e, "Chat message rejected");
        })?;
        let style = self.inner.style.as_ref();
        self.inner
            .coordinator
            .with_lock(|s| style.set_chat_message(s, role, text))
            .await
            .map(drop)
    }

    // ========================================================================
    // Theme and Style
    // ========================================================================

    /// Switch color theme and persist it
    ///
    /// An unknown name leaves the current theme untouched.
    ///
    /// # Errors
    ///
    /// [`DisplayError::UnknownTheme`], lock timeout, teardown, or a
    /// settings write failure (the theme is applied regardless).
    pub async fn set_theme(&self, name: &str) -> Result<(), DisplayError> {
        let theme: ThemeName = name.parse().inspect_err(|e| {
            tracing::warn!(error = %e, "Theme change rejected");
        })?;

        self.inner
            .coordinator
            .with_lock(|s| s.apply_theme(theme))
            .await?;
        tracing::info!(theme = %theme, "Theme applied");

        self.inner
            .settings
            .set_string(DISPLAY_NAMESPACE, THEME_KEY, theme.as_str())
            .await?;
        Ok(())
    }

    /// Active theme
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown.
    pub async fn theme(&self) -> Result<ThemeName, DisplayError> {
        self.inner.coordinator.inspect(|s| s.theme().name()).await
    }

    /// Persist a new style and request a restart to apply it
    ///
    /// # Errors
    ///
    /// [`DisplayError::UnknownStyle`], [`DisplayError::StyleUnavailable`]
    /// (nothing persisted), or a settings write failure (no restart).
    pub async fn set_style(&self, name: &str) -> Result<(), DisplayError> {
        let kind: StyleKind = name.parse().inspect_err(|e| {
            tracing::warn!(error = %e, "Style change rejected");
        })?;
        if kind.needs_frames() && !self.inner.frames_available {
            tracing::warn!(style = %kind, "Style needs animation frames, none available");
            return Err(DisplayError::StyleUnavailable(kind.as_str().to_string()));
        }

        self.inner
            .settings
            .set_string(DISPLAY_NAMESPACE, STYLE_KEY, kind.as_str())
            .await?;
        tracing::info!(style = %kind, "Style persisted, restarting");

        match &self.inner.restart {
            Some(restart) => restart.request_restart(),
            None => tracing::warn!("No restart handle, style applies on next start"),
        }
        Ok(())
    }

    /// Style this display was started with
    #[must_use]
    pub fn style(&self) -> StyleKind {
        self.inner.style.kind()
    }

    /// Whether the animated style can be selected
    #[must_use]
    pub fn frames_available(&self) -> bool {
        self.inner.frames_available
    }

    // ========================================================================
    // Status Bar
    // ========================================================================

    /// Refresh the status bar indicators
    ///
    /// # Errors
    ///
    /// Teardown only.
    pub async fn update_status_bar(&self, force_all: bool) -> Result<RefreshOutcome, DisplayError> {
        self.inner.status_bar.refresh(force_all).await
    }

    /// Refresh the status bar every `interval` until shutdown
    pub fn spawn_status_refresh(&self, interval: Duration) {
        let handle = self.inner.status_bar.spawn_periodic(interval);
        self.inner.tasks.lock().push(handle);
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Read the surface under the render lock
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown.
    pub async fn inspect<F, R>(&self, f: F) -> Result<R, DisplayError>
    where
        F: FnOnce(&Surface) -> R,
    {
        self.inner.coordinator.inspect(f).await
    }

    /// Animation player, present only in the animated style
    #[must_use]
    pub fn player(&self) -> Option<&EmotionAnimationPlayer> {
        self.inner.player.as_ref()
    }

    /// Panel backlight, if the board has one
    #[must_use]
    pub fn backlight(&self) -> Option<&Arc<dyn Backlight>> {
        self.inner.backlight.as_ref()
    }

    /// Durable settings store
    #[must_use]
    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.inner.settings
    }

    // ========================================================================
    // Shutdown
    // ========================================================================

    /// Stop all background work and tear the surface down
    ///
    /// The animation session is released first, then the revert timer is
    /// disarmed, then the surface is destroyed. Idempotent.
    pub async fn shutdown(&self) {
        if let Some(player) = &self.inner.player {
            player.stop().await;
        }
        self.inner.notifications.disarm().await;
        let tore_down = self.inner.coordinator.shutdown().await;

        let tasks: Vec<_> = self.inner.tasks.lock().drain(..).collect();
        for task in tasks {
            task.abort();
        }

        if tore_down {
            tracing::info!("Display shut down");
        }
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("style", &self.inner.style.kind())
            .field("coordinator", &self.inner.coordinator)
            .field("frames_available", &self.inner.frames_available)
            .finish_non_exhaustive()
    }
}
