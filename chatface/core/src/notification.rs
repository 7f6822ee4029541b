//! Notification Scheduler
//!
//! Transient messages in the status line. A notification replaces the
//! persistent status until its deadline, then a one-shot timer task reverts
//! it. There is never more than one pending revert: a newer notification
//! aborts the previous timer, and the revert itself only applies if its
//! generation is still the surface's current one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::coordinator::RenderCoordinator;
use crate::error::DisplayError;

/// One-shot revert timer for the status line
#[derive(Debug)]
pub struct NotificationScheduler {
    coordinator: Arc<RenderCoordinator>,
    /// Held for the whole of each call, so calls never interleave
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationScheduler {
    /// Create a scheduler writing through `coordinator`
    #[must_use]
    pub fn new(coordinator: Arc<RenderCoordinator>) -> Self {
        Self {
            coordinator,
            pending: Mutex::new(None),
        }
    }

    /// Show `text` in place of the status line for `duration`
    ///
    /// Cancels and replaces any pending notification.
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown. The surface and any pending revert are
    /// left as they were.
    pub async fn show_notification(&self, text: &str, duration: Duration) -> Result<(), DisplayError> {
        let mut pending = self.pending.lock().await;

        // A failed write leaves the previous notification and its timer armed
        let deadline = Instant::now() + duration;
        let generation = self
            .coordinator
            .with_lock(|s| s.show_notification(text, deadline))
            .await?;
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        let coordinator = Arc::clone(&self.coordinator);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            match coordinator
                .with_lock(|s| s.expire_notification(generation))
                .await
            {
                Ok(true) => tracing::debug!(generation, "Notification reverted to status"),
                Ok(false) => tracing::debug!(generation, "Notification already superseded"),
                Err(e) => tracing::debug!(generation, error = %e, "Notification revert skipped"),
            }
        }));

        tracing::debug!(
            generation,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "Notification shown"
        );
        Ok(())
    }

    /// Set the persistent status line and drop any transient notification
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown; a pending revert stays armed.
    pub async fn set_status(&self, text: &str) -> Result<(), DisplayError> {
        let mut pending = self.pending.lock().await;
        self.coordinator.with_lock(|s| s.set_status_text(text)).await?;
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        Ok(())
    }

    /// Hide the current notification now and disarm its timer
    ///
    /// # Errors
    ///
    /// Lock timeout or teardown.
    pub async fn cancel(&self) -> Result<(), DisplayError> {
        let mut pending = self.pending.lock().await;
        if let Some(timer) = pending.take() {
            timer.abort();
            self.coordinator.with_lock(|s| s.dismiss_notification()).await?;
        }
        Ok(())
    }

    /// Abort the revert timer without touching the surface
    pub async fn disarm(&self) {
        if let Some(timer) = self.pending.lock().await.take() {
            timer.abort();
        }
    }

    /// Whether a revert timer is armed and has not fired yet
    pub async fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}
