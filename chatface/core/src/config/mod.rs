//! Display Configuration
//!
//! Panel geometry, timing and chat limits, read from
//! `~/.config/chatface/display.toml`.
//!
//! # Layering
//!
//! Later layers win:
//! 1. Built-in defaults
//! 2. The TOML file
//! 3. `CHATFACE_*` environment variables
//! 4. [`ConfigOverrides`] from the command line
//!
//! # Example
//!
//! ```toml
//! [surface]
//! width = 240
//! height = 240
//! lock_timeout_ms = 1000
//! refresh_interval_ms = 33
//!
//! [chat]
//! capacity = 20
//! min_bubble_width = 20
//! max_bubble_percent = 85
//! glyph_advance_px = 14
//!
//! [status_bar]
//! network_poll_every = 10
//!
//! [animation]
//! frames_root = "/sdcard/emoji"
//! frame_width = 240
//! frame_height = 240
//! join_timeout_ms = 500
//!
//! [defaults]
//! theme = "light"
//! style = "normal"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::{
    BubbleMetrics, DEFAULT_CAPACITY, DEFAULT_GLYPH_ADVANCE_PX, DEFAULT_MAX_BUBBLE_PERCENT,
    DEFAULT_MIN_BUBBLE_WIDTH,
};
use crate::emotion::FrameGeometry;
use crate::status_bar::DEFAULT_NETWORK_POLL_EVERY;
use crate::style::StyleKind;
use crate::theme::ThemeName;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Surface section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceToml {
    /// Viewport width in pixels
    pub width: Option<u16>,

    /// Viewport height in pixels
    pub height: Option<u16>,

    /// Render lock acquisition timeout in milliseconds
    pub lock_timeout_ms: Option<u64>,

    /// Draw engine refresh interval in milliseconds
    pub refresh_interval_ms: Option<u64>,
}

/// Chat section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Transcript capacity in bubbles
    pub capacity: Option<usize>,

    /// Minimum bubble width in pixels
    pub min_bubble_width: Option<u16>,

    /// Maximum bubble width as a percentage of the viewport
    pub max_bubble_percent: Option<u8>,

    /// Pixels per text column
    pub glyph_advance_px: Option<u16>,
}

/// Status bar section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarToml {
    /// Refreshes between network polls
    pub network_poll_every: Option<u64>,
}

/// Animation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Root directory of `<clip>/<index>.bin` frame files
    pub frames_root: Option<PathBuf>,

    /// Frame width in pixels
    pub frame_width: Option<u16>,

    /// Frame height in pixels
    pub frame_height: Option<u16>,

    /// Bound on waiting for a playback task to stop, in milliseconds
    pub join_timeout_ms: Option<u64>,
}

/// Defaults section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsToml {
    /// Theme used when none is persisted
    pub theme: Option<String>,

    /// Style used when none is persisted
    pub style: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Surface configuration section
    pub surface: SurfaceToml,

    /// Chat configuration section
    pub chat: ChatToml,

    /// Status bar configuration section
    pub status_bar: StatusBarToml,

    /// Animation configuration section
    pub animation: AnimationToml,

    /// Defaults configuration section
    pub defaults: DefaultsToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the display engine
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Viewport width in pixels
    pub width: u16,

    /// Viewport height in pixels
    pub height: u16,

    /// Render lock acquisition timeout
    pub lock_timeout: Duration,

    /// Draw engine refresh interval
    pub refresh_interval: Duration,

    /// Transcript capacity
    pub chat_capacity: usize,

    /// Minimum bubble width in pixels
    pub min_bubble_width: u16,

    /// Maximum bubble width as a percentage of the viewport
    pub max_bubble_percent: u8,

    /// Pixels per text column
    pub glyph_advance_px: u16,

    /// Refreshes between network polls
    pub network_poll_every: u64,

    /// Frame store root; the animated style is unavailable without one
    pub frames_root: Option<PathBuf>,

    /// Frame width in pixels
    pub frame_width: u16,

    /// Frame height in pixels
    pub frame_height: u16,

    /// Bound on waiting for a playback task to stop
    pub join_timeout: Duration,

    /// Theme used when none is persisted
    pub default_theme: ThemeName,

    /// Style used when none is persisted
    pub default_style: StyleKind,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            lock_timeout: Duration::from_millis(1000),
            refresh_interval: Duration::from_millis(33),
            chat_capacity: DEFAULT_CAPACITY,
            min_bubble_width: DEFAULT_MIN_BUBBLE_WIDTH,
            max_bubble_percent: DEFAULT_MAX_BUBBLE_PERCENT,
            glyph_advance_px: DEFAULT_GLYPH_ADVANCE_PX,
            network_poll_every: DEFAULT_NETWORK_POLL_EVERY,
            frames_root: None,
            frame_width: 240,
            frame_height: 240,
            join_timeout: Duration::from_millis(500),
            default_theme: ThemeName::Light,
            default_style: StyleKind::Normal,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl DisplayConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Bubble sizing derived from the viewport and chat settings
    #[must_use]
    pub fn bubble_metrics(&self) -> BubbleMetrics {
        BubbleMetrics {
            viewport_width: self.width,
            min_width: self.min_bubble_width,
            max_percent: self.max_bubble_percent,
            glyph_advance_px: self.glyph_advance_px,
        }
    }

    /// Animation frame size
    #[must_use]
    pub fn frame_geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.frame_width, self.frame_height)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(
                "surface width and height must be non-zero".to_string(),
            ));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::ValidationError(
                "animation frame_width and frame_height must be non-zero".to_string(),
            ));
        }
        if self.chat_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "chat capacity must be at least 1".to_string(),
            ));
        }
        if self.network_poll_every == 0 {
            return Err(ConfigError::ValidationError(
                "status_bar network_poll_every must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("surface lock_timeout_ms", self.lock_timeout),
            ("surface refresh_interval_ms", self.refresh_interval),
            ("animation join_timeout_ms", self.join_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        if !(1..=100).contains(&self.max_bubble_percent) {
            return Err(ConfigError::ValidationError(format!(
                "chat max_bubble_percent must be within 1..=100, got {}",
                self.max_bubble_percent
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Where [`load_config`] looks: `$XDG_CONFIG_HOME/chatface/display.toml` or
/// `~/.config/chatface/display.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("chatface").join("display.toml"))
}

/// Load defaults, the file at [`default_config_path`] and the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or
/// if the resulting values are out of range. A missing config file is not
/// an error (defaults are used).
pub fn load_config() -> Result<DisplayConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load defaults, the file at `path` (if any and if it exists) and the
/// environment, then validate
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if validation fails.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<DisplayConfig, ConfigError> {
    let mut config = DisplayConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: DisplayToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Copy every value present in the file over the defaults
fn apply_toml_config(config: &mut DisplayConfig, toml: &DisplayToml) -> Result<(), ConfigError> {
    // Surface settings
    if let Some(width) = toml.surface.width {
        config.width = width;
    }
    if let Some(height) = toml.surface.height {
        config.height = height;
    }
    if let Some(ms) = toml.surface.lock_timeout_ms {
        config.lock_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.surface.refresh_interval_ms {
        config.refresh_interval = Duration::from_millis(ms);
    }

    // Chat settings
    if let Some(capacity) = toml.chat.capacity {
        config.chat_capacity = capacity;
    }
    if let Some(width) = toml.chat.min_bubble_width {
        config.min_bubble_width = width;
    }
    if let Some(percent) = toml.chat.max_bubble_percent {
        config.max_bubble_percent = percent;
    }
    if let Some(advance) = toml.chat.glyph_advance_px {
        config.glyph_advance_px = advance;
    }

    // Status bar settings
    if let Some(every) = toml.status_bar.network_poll_every {
        config.network_poll_every = every;
    }

    // Animation settings
    if toml.animation.frames_root.is_some() {
        config.frames_root.clone_from(&toml.animation.frames_root);
    }
    if let Some(width) = toml.animation.frame_width {
        config.frame_width = width;
    }
    if let Some(height) = toml.animation.frame_height {
        config.frame_height = height;
    }
    if let Some(ms) = toml.animation.join_timeout_ms {
        config.join_timeout = Duration::from_millis(ms);
    }

    // Defaults
    if let Some(ref theme) = toml.defaults.theme {
        config.default_theme = theme
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("unknown default theme '{theme}'")))?;
    }
    if let Some(ref style) = toml.defaults.style {
        config.default_style = style
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("unknown default style '{style}'")))?;
    }

    Ok(())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = name, value = %value, "Ignoring unparsable environment override");
            None
        }
    }
}

/// Overwrite `slot` when `name` is set and parses, counting the hit
fn env_override<T: std::str::FromStr>(name: &str, slot: &mut T, hits: &mut usize) {
    if let Some(value) = env_parse(name) {
        *slot = value;
        *hits += 1;
    }
}

fn env_override_ms(name: &str, slot: &mut Duration, hits: &mut usize) {
    let mut ms = 0u64;
    let before = *hits;
    env_override(name, &mut ms, hits);
    if *hits > before {
        *slot = Duration::from_millis(ms);
    }
}

/// Overlay `CHATFACE_*` variables; any hit marks the config as env-sourced
fn apply_env_config(config: &mut DisplayConfig) {
    let mut hits = 0usize;

    env_override("CHATFACE_WIDTH", &mut config.width, &mut hits);
    env_override("CHATFACE_HEIGHT", &mut config.height, &mut hits);
    env_override_ms("CHATFACE_LOCK_TIMEOUT_MS", &mut config.lock_timeout, &mut hits);
    env_override_ms("CHATFACE_REFRESH_INTERVAL_MS", &mut config.refresh_interval, &mut hits);
    env_override("CHATFACE_CHAT_CAPACITY", &mut config.chat_capacity, &mut hits);
    env_override("CHATFACE_NETWORK_POLL_EVERY", &mut config.network_poll_every, &mut hits);
    env_override("CHATFACE_THEME", &mut config.default_theme, &mut hits);
    env_override("CHATFACE_STYLE", &mut config.default_style, &mut hits);
    if let Some(root) = env_parse::<PathBuf>("CHATFACE_FRAMES_ROOT") {
        config.frames_root = Some(root);
        hits += 1;
    }

    if hits > 0 {
        config.source = ConfigSource::Env;
        tracing::debug!(overrides = hits, "Applied environment overrides");
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Frame store root override
    pub frames_root: Option<PathBuf>,

    /// Default theme override
    pub theme: Option<ThemeName>,

    /// Default style override
    pub style: Option<StyleKind>,

    /// Lock timeout override (milliseconds)
    pub lock_timeout_ms: Option<u64>,

    /// Chat capacity override
    pub chat_capacity: Option<usize>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frame store root override
    #[must_use]
    pub fn with_frames_root(mut self, path: PathBuf) -> Self {
        self.frames_root = Some(path);
        self
    }

    /// Set default theme override
    #[must_use]
    pub fn with_theme(mut self, theme: ThemeName) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Set default style override
    #[must_use]
    pub fn with_style(mut self, style: StyleKind) -> Self {
        self.style = Some(style);
        self
    }

    /// Set lock timeout override
    #[must_use]
    pub fn with_lock_timeout_ms(mut self, ms: u64) -> Self {
        self.lock_timeout_ms = Some(ms);
        self
    }

    /// Set chat capacity override
    #[must_use]
    pub fn with_chat_capacity(mut self, capacity: usize) -> Self {
        self.chat_capacity = Some(capacity);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut DisplayConfig) {
        if self.frames_root.is_some()
            || self.theme.is_some()
            || self.style.is_some()
            || self.lock_timeout_ms.is_some()
            || self.chat_capacity.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref root) = self.frames_root {
            config.frames_root = Some(root.clone());
        }
        if let Some(theme) = self.theme {
            config.default_theme = theme;
        }
        if let Some(style) = self.style {
            config.default_style = style;
        }
        if let Some(ms) = self.lock_timeout_ms {
            config.lock_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = self.chat_capacity {
            config.chat_capacity = capacity;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Clean up all environment variables used by config loading.
    fn clear_config_env_vars() {
        for var in [
            "CHATFACE_WIDTH",
            "CHATFACE_HEIGHT",
            "CHATFACE_LOCK_TIMEOUT_MS",
            "CHATFACE_REFRESH_INTERVAL_MS",
            "CHATFACE_CHAT_CAPACITY",
            "CHATFACE_NETWORK_POLL_EVERY",
            "CHATFACE_FRAMES_ROOT",
            "CHATFACE_THEME",
            "CHATFACE_STYLE",
        ] {
            std::env::remove_var(var);
        }
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();

        assert_eq!((config.width, config.height), (240, 240));
        assert_eq!(config.lock_timeout, Duration::from_millis(1000));
        assert_eq!(config.chat_capacity, 20);
        assert_eq!(config.network_poll_every, 10);
        assert_eq!(config.join_timeout, Duration::from_millis(500));
        assert_eq!(config.default_theme, ThemeName::Light);
        assert_eq!(config.default_style, StyleKind::Normal);
        assert!(config.frames_root.is_none());
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("chatface"));
            assert!(p.to_string_lossy().ends_with("display.toml"));
        }
    }

    #[test]
    fn test_derived_metrics() {
        let config = DisplayConfig::default();
        assert_eq!(config.bubble_metrics().max_width(), 204);
        assert_eq!(config.frame_geometry().frame_bytes(), 240 * 240 * 2);
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_config(
            r#"
[surface]
width = 320
height = 240
lock_timeout_ms = 250

[chat]
capacity = 8
max_bubble_percent = 70

[status_bar]
network_poll_every = 5

[animation]
frames_root = "/sdcard/emoji"
join_timeout_ms = 200

[defaults]
theme = "dark"
style = "wechat"
"#,
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.width, 320);
        assert_eq!(config.lock_timeout, Duration::from_millis(250));
        assert_eq!(config.chat_capacity, 8);
        assert_eq!(config.max_bubble_percent, 70);
        assert_eq!(config.network_poll_every, 5);
        assert_eq!(config.frames_root, Some(PathBuf::from("/sdcard/emoji")));
        assert_eq!(config.join_timeout, Duration::from_millis(200));
        assert_eq!(config.default_theme, ThemeName::Dark);
        assert_eq!(config.default_style, StyleKind::Transcript);
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_config(
            r#"
[chat]
capacity = 5
"#,
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.chat_capacity, 5);
        assert_eq!(config.min_bubble_width, 20);
        assert_eq!(config.refresh_interval, Duration::from_millis(33));
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_config(
            r#"
[surface
width = "wide"
"#,
        );

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_graceful() {
        clear_config_env_vars();

        let path = PathBuf::from("/nonexistent/path/display.toml");
        let config = load_config_from_path(Some(path)).unwrap();

        assert!(config.config_file_path.is_none());
        assert!(
            config.source() == ConfigSource::Default || config.source() == ConfigSource::Env,
            "Expected Default or Env source, got: {:?}",
            config.source()
        );
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_rejects_zero_capacity() {
        let file = write_config("[chat]\ncapacity = 0\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = DisplayConfig::default();
        config.max_bubble_percent = 0;
        assert!(config.validate().is_err());

        let mut config = DisplayConfig::default();
        config.max_bubble_percent = 101;
        assert!(config.validate().is_err());

        let mut config = DisplayConfig::default();
        config.network_poll_every = 0;
        assert!(config.validate().is_err());

        let mut config = DisplayConfig::default();
        config.frame_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let file = write_config("[surface]\nrefresh_interval_ms = 0\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(
            matches!(result, Err(ConfigError::ValidationError(msg)) if msg.contains("refresh_interval_ms"))
        );

        let mut config = DisplayConfig::default();
        config.lock_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = DisplayConfig::default();
        config.join_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_default_theme() {
        let file = write_config("[defaults]\ntheme = \"neon\"\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(msg)) if msg.contains("neon")));
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_cli_overrides_env() {
        let mut config = DisplayConfig::default();
        config.default_theme = ThemeName::Light;
        config.set_source(ConfigSource::Env);

        let overrides = ConfigOverrides::new()
            .with_theme(ThemeName::Dark)
            .with_style(StyleKind::Animated)
            .with_frames_root(PathBuf::from("/tmp/frames"));
        overrides.apply(&mut config);

        assert_eq!(config.default_theme, ThemeName::Dark);
        assert_eq!(config.default_style, StyleKind::Animated);
        assert_eq!(config.frames_root, Some(PathBuf::from("/tmp/frames")));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = DisplayConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }
}
