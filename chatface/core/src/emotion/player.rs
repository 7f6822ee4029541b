//! Emotion Animation Player
//!
//! Plays the bitmap clip of an emotion into the surface's single canvas.
//!
//! ```text
//! Idle -> Preloading -> Playing -> (Idle | Preloading)
//! ```
//!
//! # Design
//!
//! One session at a time. A session is one spawned playback task that owns
//! its preloaded [`FrameBuffer`]s outright; they are freed when the task
//! ends. Starting a new emotion first stops the running task and waits
//! for it (bounded, then abort and await), so the previous session's
//! buffers are gone before the first new frame is read.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::frames::{preload, FrameBuffer, FramePool, FrameStore};
use super::{descriptor_for, AnimationDescriptor, FrameGeometry};
use crate::coordinator::RenderCoordinator;
use crate::error::DisplayError;

/// Shortest frame period the loop will run at (about 60 fps)
pub const MIN_FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Time left to sleep so that frames start `period` apart
///
/// Never negative: a frame that overran its period is followed immediately.
///
/// ```
/// use std::time::Duration;
/// use chatface_core::emotion::next_frame_delay;
///
/// let period = Duration::from_millis(150);
/// assert_eq!(next_frame_delay(period, Duration::from_millis(40)), Duration::from_millis(110));
/// assert_eq!(next_frame_delay(period, Duration::from_millis(200)), Duration::ZERO);
/// ```
#[must_use]
pub fn next_frame_delay(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

/// Player lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// No session
    #[default]
    Idle,
    /// Reading frames of a new session
    Preloading,
    /// Playback task running
    Playing,
}

/// Puts the state back to idle unless disarmed, so a caller that drops
/// `set_emotion` mid-switch does not leave a stale `Playing`/`Preloading`
struct IdleOnDrop<'a> {
    state: &'a watch::Sender<PlayerState>,
    armed: bool,
}

impl<'a> IdleOnDrop<'a> {
    fn new(state: &'a watch::Sender<PlayerState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_replace(PlayerState::Idle);
        }
    }
}

struct Session {
    emotion: &'static str,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Bitmap emotion player
pub struct EmotionAnimationPlayer {
    coordinator: Arc<RenderCoordinator>,
    store: Arc<dyn FrameStore>,
    pool: Arc<FramePool>,
    geometry: FrameGeometry,
    join_timeout: Duration,
    session: Mutex<Option<Session>>,
    state: watch::Sender<PlayerState>,
}

impl EmotionAnimationPlayer {
    /// Create an idle player
    #[must_use]
    pub fn new(
        coordinator: Arc<RenderCoordinator>,
        store: Arc<dyn FrameStore>,
        geometry: FrameGeometry,
        join_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(PlayerState::Idle);
        Self {
            coordinator,
            store,
            pool: FramePool::new(),
            geometry,
            join_timeout,
            session: Mutex::new(None),
            state,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> PlayerState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.state.subscribe()
    }

    /// Buffer accounting for every session of this player
    #[must_use]
    pub fn pool(&self) -> &Arc<FramePool> {
        &self.pool
    }

    /// Emotion of the running session
    pub async fn current_emotion(&self) -> Option<&'static str> {
        self.session.lock().await.as_ref().map(|s| s.emotion)
    }

    /// Switch to the clip of `name` (neutral when unknown)
    ///
    /// Returns once the previous session is fully released and the new one
    /// is playing, or back to idle if no frame could be loaded.
    pub async fn set_emotion(&self, name: &str) -> PlayerState {
        let descriptor = descriptor_for(name);
        let mut session = self.session.lock().await;
        let idle_on_drop = IdleOnDrop::new(&self.state);

        if let Some(previous) = session.take() {
            self.end_session(previous).await;
        }

        self.state.send_replace(PlayerState::Preloading);
        let frames = preload(self.store.as_ref(), &self.pool, descriptor, self.geometry).await;

        if frames.is_empty() {
            tracing::warn!(emotion = name, clip = descriptor.clip, "No frames loaded, playback not started");
            self.state.send_replace(PlayerState::Idle);
            return PlayerState::Idle;
        }

        tracing::info!(
            emotion = descriptor.name,
            frames = frames.len(),
            expected = descriptor.frame_count,
            "Emotion playback started"
        );

        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(playback_loop(
            Arc::clone(&self.coordinator),
            descriptor,
            frames,
            stop_rx,
        ));
        *session = Some(Session {
            emotion: descriptor.name,
            stop,
            handle,
        });

        idle_on_drop.disarm();
        self.state.send_replace(PlayerState::Playing);
        PlayerState::Playing
    }

    /// Stop the running session and free its frames
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        let _idle_on_drop = IdleOnDrop::new(&self.state);
        if let Some(previous) = session.take() {
            self.end_session(previous).await;
        }
    }

    async fn end_session(&self, session: Session) {
        let Session {
            emotion,
            stop,
            mut handle,
        } = session;

        let _ = stop.send(true);
        match tokio::time::timeout(self.join_timeout, &mut handle).await {
            Ok(Ok(())) => tracing::debug!(emotion, "Playback session ended"),
            Ok(Err(e)) => tracing::warn!(emotion, error = %e, "Playback task failed"),
            Err(_) => {
                tracing::warn!(emotion, "Playback task did not stop in time, aborting");
                handle.abort();
                let _ = handle.await;
            }
        }
        self.state.send_replace(PlayerState::Idle);
    }
}

impl std::fmt::Debug for EmotionAnimationPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionAnimationPlayer")
            .field("geometry", &self.geometry)
            .field("state", &self.state())
            .field("live_frames", &self.pool.live())
            .finish_non_exhaustive()
    }
}

/// Blit frames in a loop until stopped or the surface is torn down
async fn playback_loop(
    coordinator: Arc<RenderCoordinator>,
    descriptor: &'static AnimationDescriptor,
    frames: Vec<FrameBuffer>,
    mut stop: watch::Receiver<bool>,
) {
    let period = descriptor.frame_duration.max(MIN_FRAME_PERIOD);
    let mut torn_down = coordinator.teardown_signal();
    let mut index = 0;

    loop {
        if *stop.borrow() {
            break;
        }
        let frame_started = Instant::now();

        let pixels = frames[index].pixels();
        match coordinator
            .with_lock(|s| s.blit_emotion_frame(descriptor.clip, index, pixels))
            .await
        {
            Ok(_) => {}
            Err(DisplayError::ShutDown) => break,
            Err(e) => tracing::debug!(clip = descriptor.clip, index, error = %e, "Frame skipped"),
        }

        if frames.len() == 1 {
            // Still frame: shown once, held until stopped or torn down
            tokio::select! {
                _ = stop.changed() => {}
                _ = torn_down.wait_for(|done| *done) => {}
            }
            break;
        }

        index = (index + 1) % frames.len();
        let delay = next_frame_delay(period, frame_started.elapsed());
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = stop.changed() => break,
        }
    }

    tracing::trace!(clip = descriptor.clip, frames = frames.len(), "Playback loop exited");
}
