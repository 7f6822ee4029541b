//! Render Coordinator
//!
//! The single serialization point in front of the [`Surface`]. Every
//! mutation of UI state, from any task, runs as a closure passed to
//! [`RenderCoordinator::with_lock`]. The coordinator also owns the
//! [`DrawEngine`] and presents committed state to it from its own refresh
//! task.
//!
//! # Design
//!
//! - Acquisition is bounded by `lock_timeout`. A caller that cannot get the
//!   lock in time gets [`DisplayError::LockTimeout`]; its mutation is
//!   dropped and never retried.
//! - Closures are synchronous, so nothing can await (or do I/O) while the
//!   lock is held.
//! - After [`shutdown`](RenderCoordinator::shutdown) the surface is gone and
//!   every later call gets [`DisplayError::ShutDown`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::DisplayError;
use crate::surface::{Surface, WidgetRole};

/// The external, single-threaded rendering primitive library
pub trait DrawEngine: Send {
    /// Rasterize the committed surface
    fn present(&mut self, surface: &Surface);

    /// A widget was destroyed during teardown
    fn widget_destroyed(&mut self, role: WidgetRole) {
        let _ = role;
    }

    /// Release the panel handle; called once, last
    fn release(&mut self);
}

struct Guarded {
    surface: Surface,
    engine: Box<dyn DrawEngine>,
    presented: Option<u64>,
}

/// Clamp a zero ticker period to 1 ms; `tokio::time::interval` panics on zero
pub(crate) fn ticker_period(interval: Duration, task: &'static str) -> Duration {
    if interval.is_zero() {
        tracing::warn!(task, "Zero interval, ticking every millisecond instead");
        Duration::from_millis(1)
    } else {
        interval
    }
}

/// Mutual-exclusion gateway to the surface
pub struct RenderCoordinator {
    state: Mutex<Option<Guarded>>,
    lock_timeout: Duration,
    timeouts: AtomicU64,
    torn_down: watch::Sender<bool>,
}

impl RenderCoordinator {
    /// Take ownership of the surface and the draw engine
    #[must_use]
    pub fn new(surface: Surface, engine: Box<dyn DrawEngine>, lock_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(Some(Guarded {
                surface,
                engine,
                presented: None,
            })),
            lock_timeout,
            timeouts: AtomicU64::new(0),
            torn_down: watch::channel(false).0,
        }
    }

    /// Bound on lock acquisition
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Number of acquisitions that timed out
    #[must_use]
    pub fn timeout_count(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    async fn acquire(&self) -> Result<MutexGuard<'_, Option<Guarded>>, DisplayError> {
        if let Ok(guard) = tokio::time::timeout(self.lock_timeout, self.state.lock()).await {
            Ok(guard)
        } else {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
            let timeout_ms = u64::try_from(self.lock_timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(timeout_ms, "Display lock timed out, update dropped");
            Err(DisplayError::LockTimeout { timeout_ms })
        }
    }

    /// Run `f` against the surface while holding the render lock
    ///
    /// # Errors
    ///
    /// [`DisplayError::LockTimeout`] if the lock is not acquired in time,
    /// [`DisplayError::ShutDown`] after teardown. In both cases `f` does
    /// not run.
    pub async fn with_lock<F, R>(&self, f: F) -> Result<R, DisplayError>
    where
        F: FnOnce(&mut Surface) -> R,
    {
        let mut guard = self.acquire().await?;
        match guard.as_mut() {
            Some(state) => Ok(f(&mut state.surface)),
            None => {
                tracing::debug!("Update after teardown ignored");
                Err(DisplayError::ShutDown)
            }
        }
    }

    /// Read-only variant of [`with_lock`](Self::with_lock)
    ///
    /// # Errors
    ///
    /// Same as [`with_lock`](Self::with_lock).
    pub async fn inspect<F, R>(&self, f: F) -> Result<R, DisplayError>
    where
        F: FnOnce(&Surface) -> R,
    {
        let guard = self.acquire().await?;
        guard
            .as_ref()
            .map(|state| f(&state.surface))
            .ok_or(DisplayError::ShutDown)
    }

    /// Hand the surface to the draw engine if it changed since the last
    /// present. Returns whether a present happened.
    ///
    /// # Errors
    ///
    /// Same as [`with_lock`](Self::with_lock).
    pub async fn present_if_dirty(&self) -> Result<bool, DisplayError> {
        let mut guard = self.acquire().await?;
        let state = guard.as_mut().ok_or(DisplayError::ShutDown)?;

        let revision = state.surface.revision();
        if state.presented == Some(revision) {
            return Ok(false);
        }
        state.engine.present(&state.surface);
        state.presented = Some(revision);
        Ok(true)
    }

    /// Spawn the draw engine's refresh loop
    ///
    /// The loop ends by itself once the surface is torn down.
    pub fn spawn_refresh_loop(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ticker_period(interval, "refresh"));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match coordinator.present_if_dirty().await {
                    Ok(_) | Err(DisplayError::LockTimeout { .. }) => {}
                    Err(_) => break,
                }
            }
            tracing::debug!("Refresh loop stopped");
        })
    }

    /// Flips to `true` once the surface is torn down
    #[must_use]
    pub fn teardown_signal(&self) -> watch::Receiver<bool> {
        self.torn_down.subscribe()
    }

    /// Whether teardown already happened
    pub async fn is_shut_down(&self) -> bool {
        self.state.lock().await.is_none()
    }

    /// Tear the surface down and release the draw engine
    ///
    /// Waits for the lock without a bound: teardown must not be dropped.
    /// Returns `false` if teardown already happened.
    pub async fn shutdown(&self) -> bool {
        let mut guard = self.state.lock().await;
        let Some(Guarded {
            surface,
            mut engine,
            ..
        }) = guard.take()
        else {
            return false;
        };

        let mut destroyed = 0usize;
        surface.teardown(|role| {
            destroyed += 1;
            engine.widget_destroyed(role);
        });
        engine.release();
        self.torn_down.send_replace(true);

        tracing::info!(widgets = destroyed, "Display surface torn down");
        true
    }
}

impl std::fmt::Debug for RenderCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCoordinator")
            .field("lock_timeout", &self.lock_timeout)
            .field("timeouts", &self.timeout_count())
            .finish_non_exhaustive()
    }
}
