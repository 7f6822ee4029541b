//! External Collaborators
//!
//! Boundary traits for everything the display reads from or signals to
//! outside the engine: power manager, audio codec, network layer, the
//! assistant state machine and a few platform hooks. Implementations live
//! with the board support code (or in the simulator).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::emotion::FrameStore;
use crate::settings::SettingsStore;

// ============================================================================
// Device State
// ============================================================================

/// Assistant state machine states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Not yet known
    #[default]
    Unknown,
    /// Booting
    Starting,
    /// Provisioning WiFi credentials
    WifiConfiguring,
    /// Waiting for the wake word
    Idle,
    /// Opening the assistant connection
    Connecting,
    /// Capturing speech
    Listening,
    /// Playing a reply
    Speaking,
    /// Firmware upgrade in progress
    Upgrading,
    /// Device activation
    Activating,
    /// Audio loopback test
    AudioTesting,
    /// Unrecoverable error
    FatalError,
}

impl DeviceState {
    /// Whether the network layer may be queried without contending with a
    /// transfer in flight
    #[must_use]
    pub fn allows_network_poll(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Starting | Self::WifiConfiguring | Self::Listening | Self::Activating
        )
    }
}

// ============================================================================
// Signals
// ============================================================================

/// Power manager
pub trait PowerSource: Send + Sync {
    /// Battery level in percent, `None` on boards without a gauge
    fn battery_level(&self) -> Option<u8>;

    /// Whether a charger is connected and charging
    fn is_charging(&self) -> bool;

    /// Whether the device runs from the battery
    fn is_discharging(&self) -> bool;
}

/// Audio codec
pub trait AudioOutput: Send + Sync {
    /// Output volume, 0-100
    fn output_volume(&self) -> u8;
}

/// Network layer
pub trait NetworkMonitor: Send + Sync {
    /// Glyph for the current connectivity, `None` while it is unsafe to ask
    fn network_state_icon(&self) -> Option<String>;
}

/// Assistant state machine
pub trait DeviceStateSource: Send + Sync {
    /// Current state
    fn device_state(&self) -> DeviceState;
}

// ============================================================================
// Platform Hooks
// ============================================================================

/// Power-management lock keeping clocks up during latency-sensitive work
pub trait PerformanceLock: Send + Sync {
    /// Take the lock
    fn acquire(&self);

    /// Give the lock back
    fn release(&self);
}

/// Scoped hold on a [`PerformanceLock`], released on drop
#[must_use = "the hold is released as soon as it is dropped"]
pub struct PerformanceHold<'a> {
    lock: &'a dyn PerformanceLock,
}

impl<'a> PerformanceHold<'a> {
    /// Acquire `lock` until the hold is dropped
    pub fn new(lock: &'a dyn PerformanceLock) -> Self {
        lock.acquire();
        Self { lock }
    }
}

impl Drop for PerformanceHold<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl fmt::Debug for PerformanceHold<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PerformanceHold")
    }
}

/// Controlled restart of the owning process
pub trait RestartHandle: Send + Sync {
    /// Schedule a restart
    fn request_restart(&self);
}

/// Audible low-battery warning
pub trait LowBatteryAlert: Send + Sync {
    /// Play the warning once
    fn play_low_battery_alert(&self);
}

/// Panel backlight
pub trait Backlight: Send + Sync {
    /// Current brightness, 0-100
    fn brightness(&self) -> u8;

    /// Set brightness, optionally persisting it
    fn set_brightness(&self, level: u8, persist: bool);
}

// ============================================================================
// Bundle
// ============================================================================

/// Everything a [`Display`](crate::Display) talks to
///
/// Only the settings store is mandatory. A missing signal source means the
/// corresponding indicator is never written.
#[derive(Clone)]
pub struct Collaborators {
    /// Durable settings
    pub settings: Arc<dyn SettingsStore>,
    /// Battery state
    pub power: Option<Arc<dyn PowerSource>>,
    /// Mute state
    pub audio: Option<Arc<dyn AudioOutput>>,
    /// Network icon
    pub network: Option<Arc<dyn NetworkMonitor>>,
    /// Gates network polling; absent means always allowed
    pub device_state: Option<Arc<dyn DeviceStateSource>>,
    /// Held for each status refresh
    pub performance: Option<Arc<dyn PerformanceLock>>,
    /// Asked to restart after a style change
    pub restart: Option<Arc<dyn RestartHandle>>,
    /// Played when the low-battery banner appears
    pub low_battery_alert: Option<Arc<dyn LowBatteryAlert>>,
    /// Panel backlight
    pub backlight: Option<Arc<dyn Backlight>>,
    /// Animation frames; the animated style needs one
    pub frames: Option<Arc<dyn FrameStore>>,
}

impl Collaborators {
    /// Bundle with only a settings store
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            power: None,
            audio: None,
            network: None,
            device_state: None,
            performance: None,
            restart: None,
            low_battery_alert: None,
            backlight: None,
            frames: None,
        }
    }

    /// Set the power source
    #[must_use]
    pub fn with_power(mut self, power: Arc<dyn PowerSource>) -> Self {
        self.power = Some(power);
        self
    }

    /// Set the audio output
    #[must_use]
    pub fn with_audio(mut self, audio: Arc<dyn AudioOutput>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Set the network monitor
    #[must_use]
    pub fn with_network(mut self, network: Arc<dyn NetworkMonitor>) -> Self {
        self.network = Some(network);
        self
    }

    /// Set the device state source
    #[must_use]
    pub fn with_device_state(mut self, device_state: Arc<dyn DeviceStateSource>) -> Self {
        self.device_state = Some(device_state);
        self
    }

    /// Set the performance lock
    #[must_use]
    pub fn with_performance_lock(mut self, lock: Arc<dyn PerformanceLock>) -> Self {
        self.performance = Some(lock);
        self
    }

    /// Set the restart handle
    #[must_use]
    pub fn with_restart(mut self, restart: Arc<dyn RestartHandle>) -> Self {
        self.restart = Some(restart);
        self
    }

    /// Set the low-battery alert
    #[must_use]
    pub fn with_low_battery_alert(mut self, alert: Arc<dyn LowBatteryAlert>) -> Self {
        self.low_battery_alert = Some(alert);
        self
    }

    /// Set the backlight
    #[must_use]
    pub fn with_backlight(mut self, backlight: Arc<dyn Backlight>) -> Self {
        self.backlight = Some(backlight);
        self
    }

    /// Set the frame store
    #[must_use]
    pub fn with_frames(mut self, frames: Arc<dyn FrameStore>) -> Self {
        self.frames = Some(frames);
        self
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("power", &self.power.is_some())
            .field("audio", &self.audio.is_some())
            .field("network", &self.network.is_some())
            .field("device_state", &self.device_state.is_some())
            .field("performance", &self.performance.is_some())
            .field("restart", &self.restart.is_some())
            .field("low_battery_alert", &self.low_battery_alert.is_some())
            .field("backlight", &self.backlight.is_some())
            .field("frames", &self.frames.is_some())
            .finish_non_exhaustive()
    }
}
