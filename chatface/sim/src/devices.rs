//! Simulated board peripherals
//!
//! Stand-ins for the power manager, codec, network layer and state machine
//! so the display engine can run on a development host.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use chatface_core::{
    AudioOutput, Backlight, DeviceState, DeviceStateSource, LowBatteryAlert, NetworkMonitor,
    PerformanceLock, PowerSource, RestartHandle,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Battery that loses one percent per [`drain`](Self::drain) call
#[derive(Debug)]
pub struct SimBattery {
    level: AtomicU8,
    charging: AtomicBool,
}

impl SimBattery {
    pub fn new(level: u8) -> Self {
        Self {
            level: AtomicU8::new(level.min(100)),
            charging: AtomicBool::new(false),
        }
    }

    /// Step the simulation: drain while unplugged, charge while plugged
    ///
    /// The charger is plugged in at 3% and pulled again at 100%.
    pub fn drain(&self) {
        let level = self.level.load(Ordering::SeqCst);
        if self.charging.load(Ordering::SeqCst) {
            let next = (level + 5).min(100);
            self.level.store(next, Ordering::SeqCst);
            if next == 100 {
                self.charging.store(false, Ordering::SeqCst);
                info!("Charger unplugged");
            }
        } else {
            let next = level.saturating_sub(1);
            self.level.store(next, Ordering::SeqCst);
            if next <= 3 {
                self.charging.store(true, Ordering::SeqCst);
                info!(level = next, "Charger plugged in");
            }
        }
    }
}

impl PowerSource for SimBattery {
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

/// Codec with a settable volume
#[derive(Debug)]
pub struct SimAudio {
    volume: AtomicU8,
}

impl SimAudio {
    pub fn new(volume: u8) -> Self {
        Self {
            volume: AtomicU8::new(volume),
        }
    }

    pub fn set_volume(&self, volume: u8) {
        self.volume.store(volume.min(100), Ordering::SeqCst);
    }
}

impl AudioOutput for SimAudio {
    fn output_volume(&self) -> u8 {
        self.volume.load(Ordering::SeqCst)
    }
}

/// Network layer cycling through signal strengths on every poll
#[derive(Debug, Default)]
pub struct SimNetwork {
    polls: AtomicUsize,
}

const WIFI_ICONS: [&str; 4] = ["\u{f0928}", "\u{f0925}", "\u{f0922}", "\u{f091f}"];

impl NetworkMonitor for SimNetwork {
    fn network_state_icon(&self) -> Option<String> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        Some(WIFI_ICONS[n % WIFI_ICONS.len()].to_string())
    }
}

/// State machine driven by the scripted session
#[derive(Debug, Default)]
pub struct SimStateMachine {
    state: Mutex<DeviceState>,
}

impl SimStateMachine {
    pub fn set(&self, state: DeviceState) {
        debug!(?state, "Device state");
        *self.state.lock() = state;
    }
}

impl DeviceStateSource for SimStateMachine {
    fn device_state(&self) -> DeviceState {
        *self.state.lock()
    }
}

/// Logs restart requests instead of rebooting
#[derive(Debug, Default)]
pub struct LoggingRestart {
    requested: AtomicBool,
}

impl LoggingRestart {
    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl RestartHandle for LoggingRestart {
    fn request_restart(&self) {
        self.requested.store(true, Ordering::SeqCst);
        warn!("Restart requested; rerun the simulator to apply the new style");
    }
}

/// Prints the low-battery chime
#[derive(Debug, Default)]
pub struct Chime;

impl LowBatteryAlert for Chime {
    fn play_low_battery_alert(&self) {
        warn!("*chime* battery low");
    }
}

/// Backlight kept in memory
#[derive(Debug)]
pub struct SimBacklight {
    level: AtomicU8,
}

impl SimBacklight {
    pub fn new(level: u8) -> Self {
        Self {
            level: AtomicU8::new(level),
        }
    }
}

impl Backlight for SimBacklight {
    fn brightness(&self) -> u8 {
        self.level.load(Ordering::SeqCst)
    }

    fn set_brightness(&self, level: u8, persist: bool) {
        self.level.store(level, Ordering::SeqCst);
        info!(level, persist, "Backlight");
    }
}

/// Counts holds so leaks show up in the shutdown log
#[derive(Debug, Default)]
pub struct CountingPerformanceLock {
    held: AtomicUsize,
}

impl CountingPerformanceLock {
    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }
}

impl PerformanceLock for CountingPerformanceLock {
    fn acquire(&self) {
        self.held.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.held.fetch_sub(1, Ordering::SeqCst);
    }
}
