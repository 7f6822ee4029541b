//! Chatface Simulator - Headless Display Engine Runner
//!
//! Runs the display engine on a development host with simulated
//! peripherals and a log-backed panel, then plays a scripted conversation.
//!
//! # Usage
//!
//! ```bash
//! # Scripted session with defaults
//! chatface-sim
//!
//! # Animated style with frames from disk
//! chatface-sim --style animation --frames ./frames
//!
//! # Dark theme, settings kept in memory only
//! chatface-sim --theme dark --ephemeral
//!
//! # Verbose logging
//! RUST_LOG=chatface_core=debug chatface-sim
//! ```
//!
//! Ctrl-C shuts the display down cleanly.

mod devices;
mod engine;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chatface_core::emotion::ANIMATIONS;
use chatface_core::{
    load_config_from_path, Collaborators, ConfigOverrides, DeviceState, Display, MemoryFrameStore,
    MemorySettings, ScreenControl, SettingsStore, StyleKind, ThemeName, TomlSettingsFile,
};
use clap::Parser;
use tracing::{info, warn};

use devices::{
    Chime, CountingPerformanceLock, LoggingRestart, SimAudio, SimBacklight, SimBattery,
    SimNetwork, SimStateMachine,
};
use engine::LogDrawEngine;

/// Chatface Simulator - run the display engine without hardware
#[derive(Parser, Debug)]
#[command(name = "chatface-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "CHATFACE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of raw emotion frames (<clip>/<index>.bin)
    #[arg(short = 'f', long, value_name = "DIR")]
    frames: Option<PathBuf>,

    /// Theme override (light, dark)
    #[arg(long)]
    theme: Option<String>,

    /// Style override (normal, wechat, animation)
    #[arg(long)]
    style: Option<String>,

    /// Keep settings in memory instead of the settings file
    #[arg(long)]
    ephemeral: bool,

    /// Pause between scripted steps, in milliseconds
    #[arg(long, default_value_t = 1500)]
    step_ms: u64,

    /// Status bar refresh interval, in milliseconds
    #[arg(long, default_value_t = 1000)]
    status_ms: u64,

    /// Exit after the script instead of waiting for Ctrl-C
    #[arg(long)]
    once: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "CHATFACE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("chatface_sim={level},chatface_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Peripherals the script pokes at while it runs
struct Board {
    battery: Arc<SimBattery>,
    audio: Arc<SimAudio>,
    state: Arc<SimStateMachine>,
    restart: Arc<LoggingRestart>,
    performance: Arc<CountingPerformanceLock>,
}

async fn run_script(display: &Display, board: &Board, step: Duration) -> Result<()> {
    let pause = || tokio::time::sleep(step);

    board.state.set(DeviceState::Starting);
    display.set_status("Starting").await?;
    display.set_emotion("neutral").await?;
    pause().await;

    board.state.set(DeviceState::Idle);
    display.set_status("Standby").await?;
    display.set_chat_message("system", "Say the wake word").await?;
    pause().await;

    board.state.set(DeviceState::Listening);
    display.set_status("Listening").await?;
    display.set_chat_message("user", "What's the weather like today?").await?;
    pause().await;

    board.state.set(DeviceState::Speaking);
    display.set_status("Speaking").await?;
    display.set_emotion("happy").await?;
    display
        .set_chat_message("assistant", "Sunny and 24 degrees, a good day for a walk.")
        .await?;
    pause().await;

    board.audio.set_volume(0);
    display
        .show_notification("Volume 0", Duration::from_secs(2))
        .await?;
    display.update_status_bar(true).await?;
    pause().await;

    board.audio.set_volume(80);
    display
        .show_notification("Volume 80", Duration::from_secs(2))
        .await?;
    display.set_emotion("thinking").await?;
    pause().await;

    display.set_theme("dark").await?;
    display.set_emotion("sad").await?;
    display
        .set_chat_message("assistant", "Rain is expected tomorrow though.")
        .await?;
    pause().await;

    let screen = ScreenControl::new(display.clone());
    screen
        .invoke_json(r#"{"method":"set_brightness","parameters":{"brightness":60}}"#)
        .await?;
    screen
        .invoke_json(r#"{"method":"set_theme","parameters":{"theme_name":"light"}}"#)
        .await?;
    info!(properties = %screen.properties_json().await, "Screen");

    board.state.set(DeviceState::Idle);
    display.set_status("Standby").await?;
    display.set_emotion("neutral").await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Chatface simulator starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config_from_path(args.config.clone()).context("Failed to load config")?;
    let mut overrides = ConfigOverrides::new();
    if let Some(theme) = &args.theme {
        overrides = overrides.with_theme(theme.parse::<ThemeName>()?);
    }
    if let Some(style) = &args.style {
        overrides = overrides.with_style(style.parse::<StyleKind>()?);
    }
    if let Some(frames) = &args.frames {
        overrides = overrides.with_frames_root(frames.clone());
    }
    overrides.apply(&mut config);
    info!(source = ?config.source(), "Configuration loaded");

    let settings: Arc<dyn SettingsStore> = match TomlSettingsFile::default_path() {
        Some(path) if !args.ephemeral => {
            info!(path = ?path, "Settings file");
            Arc::new(TomlSettingsFile::new(path))
        }
        _ => Arc::new(MemorySettings::new()),
    };

    let board = Board {
        battery: Arc::new(SimBattery::new(24)),
        audio: Arc::new(SimAudio::new(60)),
        state: Arc::new(SimStateMachine::default()),
        restart: Arc::new(LoggingRestart::default()),
        performance: Arc::new(CountingPerformanceLock::default()),
    };

    let mut collaborators = Collaborators::new(settings)
        .with_power(board.battery.clone())
        .with_audio(board.audio.clone())
        .with_network(Arc::new(SimNetwork::default()))
        .with_device_state(board.state.clone())
        .with_performance_lock(board.performance.clone())
        .with_restart(board.restart.clone())
        .with_low_battery_alert(Arc::new(Chime))
        .with_backlight(Arc::new(SimBacklight::new(100)));
    if config.frames_root.is_none() {
        // Synthetic clips so the animated style works without assets
        let store = MemoryFrameStore::new();
        for descriptor in ANIMATIONS {
            store.fill_clip(descriptor, config.frame_geometry());
        }
        collaborators = collaborators.with_frames(Arc::new(store));
    }

    let display = Display::start(config, collaborators, Box::new(LogDrawEngine::default())).await;
    display.spawn_status_refresh(Duration::from_millis(args.status_ms));

    let battery = Arc::clone(&board.battery);
    let drain = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(2));
        loop {
            ticker.tick().await;
            battery.drain();
        }
    });

    let step = Duration::from_millis(args.step_ms);
    tokio::select! {
        result = run_script(&display, &board, step) => {
            if let Err(e) = result {
                warn!(error = %e, "Script stopped early");
            }
            if !args.once {
                info!("Script finished, press Ctrl-C to exit");
                tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
        }
    }

    info!("Shutting down...");
    drain.abort();
    display.shutdown().await;

    if board.performance.held() != 0 {
        warn!(held = board.performance.held(), "Performance lock still held");
    }
    if board.restart.requested() {
        info!("A restart was requested during the session");
    }
    info!("Chatface simulator stopped cleanly");
    Ok(())
}
