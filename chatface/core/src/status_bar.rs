//! Status Bar Updater
//!
//! Recomputes the battery, mute and network indicators from the
//! collaborators and writes each one only when its derived value changed.
//! Driven externally, typically once a second.
//!
//! # Design
//!
//! Each indicator is its own short critical section. A lock timeout on one
//! of them skips that indicator for this cycle and the refresh moves on; the
//! previous value simply stays on screen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::collaborators::{
    AudioOutput, Collaborators, DeviceStateSource, LowBatteryAlert, NetworkMonitor,
    PerformanceHold, PerformanceLock, PowerSource,
};
use crate::coordinator::{ticker_period, RenderCoordinator};
use crate::error::DisplayError;
use crate::icons;
use crate::surface::Surface;

/// Default number of refreshes between network polls
pub const DEFAULT_NETWORK_POLL_EVERY: u64 = 10;

// ============================================================================
// Indicators
// ============================================================================

/// Battery glyph derived from a reading
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatteryIcon {
    /// Below 20%
    Empty,
    /// 20-39%
    Level1,
    /// 40-59%
    Level2,
    /// 60-79%
    Level3,
    /// 80% and above
    Full,
    /// Charging, any level
    Charging,
}

impl BatteryIcon {
    /// Map a level and charging flag to an icon
    #[must_use]
    pub fn from_reading(level: u8, charging: bool) -> Self {
        if charging {
            return Self::Charging;
        }
        match level.min(100) / 20 {
            0 => Self::Empty,
            1 => Self::Level1,
            2 => Self::Level2,
            3 => Self::Level3,
            _ => Self::Full,
        }
    }

    /// Glyph for this icon
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Empty => icons::battery::EMPTY,
            Self::Level1 => icons::battery::QUARTER,
            Self::Level2 => icons::battery::HALF,
            Self::Level3 => icons::battery::THREE_QUARTERS,
            Self::Full => icons::battery::FULL,
            Self::Charging => icons::battery::CHARGING,
        }
    }
}

/// Last written indicator values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Battery icon, `None` until first written
    pub battery: Option<BatteryIcon>,
    /// Charging flag at the last battery write
    pub charging: bool,
    /// Network icon, `None` until first written
    pub network: Option<String>,
    /// Mute icon shown
    pub muted: bool,
}

/// What one refresh did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Mute icon rewritten
    pub mute_written: bool,
    /// Battery icon rewritten
    pub battery_written: bool,
    /// Network layer queried
    pub network_polled: bool,
    /// Network icon rewritten
    pub network_written: bool,
    /// Low-battery banner transition, if any
    pub banner: Option<bool>,
}

// ============================================================================
// Updater
// ============================================================================

/// Periodic status bar refresher
pub struct StatusBarUpdater {
    coordinator: Arc<RenderCoordinator>,
    power: Option<Arc<dyn PowerSource>>,
    audio: Option<Arc<dyn AudioOutput>>,
    network: Option<Arc<dyn NetworkMonitor>>,
    device_state: Option<Arc<dyn DeviceStateSource>>,
    performance: Option<Arc<dyn PerformanceLock>>,
    alert: Option<Arc<dyn LowBatteryAlert>>,
    poll_every: u64,
    calls: AtomicU64,
}

impl StatusBarUpdater {
    /// Create an updater reading from `collaborators`
    ///
    /// `poll_every` is raised to 1 if zero.
    #[must_use]
    pub fn new(
        coordinator: Arc<RenderCoordinator>,
        collaborators: &Collaborators,
        poll_every: u64,
    ) -> Self {
        Self {
            coordinator,
            power: collaborators.power.clone(),
            audio: collaborators.audio.clone(),
            network: collaborators.network.clone(),
            device_state: collaborators.device_state.clone(),
            performance: collaborators.performance.clone(),
            alert: collaborators.low_battery_alert.clone(),
            poll_every: poll_every.max(1),
            calls: AtomicU64::new(0),
        }
    }

    /// Number of refreshes so far
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Run one indicator write; a lock timeout means "skipped"
    async fn write<F, R>(&self, indicator: &'static str, f: F) -> Result<Option<R>, DisplayError>
    where
        F: FnOnce(&mut Surface) -> R,
    {
        match self.coordinator.with_lock(f).await {
            Ok(value) => Ok(Some(value)),
            Err(DisplayError::LockTimeout { .. }) => {
                tracing::debug!(indicator, "Indicator update skipped");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn network_poll_allowed(&self) -> bool {
        match &self.device_state {
            Some(source) => source.device_state().allows_network_poll(),
            None => true,
        }
    }

    /// Recompute all indicators
    ///
    /// The network icon is only queried every `poll_every` calls, unless
    /// `force_all` is set, and only in states where the network layer may
    /// be asked.
    ///
    /// # Errors
    ///
    /// [`DisplayError::ShutDown`] once the surface is torn down. Lock
    /// timeouts are not errors here.
    pub async fn refresh(&self, force_all: bool) -> Result<RefreshOutcome, DisplayError> {
        let _hold = self.performance.as_deref().map(PerformanceHold::new);
        let tick = self.calls.fetch_add(1, Ordering::Relaxed);
        let mut outcome = RefreshOutcome::default();

        if let Some(audio) = &self.audio {
            let muted = audio.output_volume() == 0;
            outcome.mute_written = self
                .write("mute", |s| s.apply_mute(muted))
                .await?
                .unwrap_or(false);
        }

        if let Some(power) = &self.power {
            if let Some(level) = power.battery_level() {
                let charging = power.is_charging();
                let discharging = power.is_discharging();
                let icon = BatteryIcon::from_reading(level, charging);
                let show_banner = icon == BatteryIcon::Empty && discharging;

                if let Some((written, banner)) = self
                    .write("battery", |s| {
                        (
                            s.apply_battery(icon, charging),
                            s.apply_low_battery_banner(show_banner),
                        )
                    })
                    .await?
                {
                    outcome.battery_written = written;
                    outcome.banner = banner;
                }

                match outcome.banner {
                    Some(true) => {
                        tracing::info!(level, "Low battery banner shown");
                        if let Some(alert) = &self.alert {
                            alert.play_low_battery_alert();
                        }
                    }
                    Some(false) => tracing::info!(level, charging, "Low battery banner hidden"),
                    None => {}
                }
            }
        }

        if force_all || tick % self.poll_every == 0 {
            if let Some(network) = &self.network {
                if self.network_poll_allowed() {
                    outcome.network_polled = true;
                    if let Some(icon) = network.network_state_icon() {
                        outcome.network_written = self
                            .write("network", |s| s.apply_network_icon(&icon))
                            .await?
                            .unwrap_or(false);
                    }
                } else {
                    tracing::trace!("Network poll deferred in current device state");
                }
            }
        }

        Ok(outcome)
    }

    /// Refresh every `interval` until the surface is torn down
    ///
    /// The first refresh forces every indicator.
    pub fn spawn_periodic(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let updater = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ticker_period(interval, "status bar"));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut force_all = true;
            loop {
                ticker.tick().await;
                if let Err(e) = updater.refresh(force_all).await {
                    tracing::debug!(error = %e, "Status refresh loop stopped");
                    break;
                }
                force_all = false;
            }
        })
    }
}

impl std::fmt::Debug for StatusBarUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBarUpdater")
            .field("poll_every", &self.poll_every)
            .field("calls", &self.refresh_count())
            .finish_non_exhaustive()
    }
}
