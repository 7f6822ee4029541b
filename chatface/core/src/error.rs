//! Error Types
//!
//! Every failure in the engine is either rejected input (unknown theme,
//! unknown style, bad command) or an unavailable resource (lock timeout,
//! torn-down surface, unreadable frame). Neither kind is fatal: callers get
//! an `Err` and the engine logs it, the previous state is kept.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the public display operations
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The render lock was not acquired within the configured timeout
    #[error("Display lock not acquired within {timeout_ms}ms")]
    LockTimeout {
        /// The timeout that elapsed
        timeout_ms: u64,
    },

    /// The surface has been torn down; no further mutation is possible
    #[error("Display surface has been torn down")]
    ShutDown,

    /// Theme name outside the supported set
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// Style name outside the supported set
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    /// Style exists but cannot run on this device (e.g. no frame store)
    #[error("Style '{0}' is not available on this device")]
    StyleUnavailable(String),

    /// Chat role outside user/assistant/system
    #[error("Unknown chat role: {0}")]
    UnknownRole(String),

    /// Durable settings could not be read or written
    #[error("Settings store error: {0}")]
    Settings(#[from] SettingsError),

    /// A remote screen command was malformed
    #[error("Invalid screen command: {0}")]
    InvalidCommand(String),
}

impl DisplayError {
    /// Whether this error only means "skip this update" (lock contention)
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}

/// Errors produced while loading animation frames
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame blob does not exist in the backing store
    #[error("Frame {index} of clip '{clip}' is missing")]
    Missing {
        /// Clip name
        clip: String,
        /// Frame index within the clip
        index: usize,
    },

    /// The frame blob exists but has the wrong byte size
    #[error("Frame {index} of clip '{clip}' is {actual} bytes (expected {expected})")]
    WrongSize {
        /// Clip name
        clip: String,
        /// Frame index within the clip
        index: usize,
        /// Expected size (width * height * 2)
        expected: usize,
        /// Size actually read
        actual: usize,
    },

    /// The backing store failed for another reason
    #[error("Failed to read frame at {path}: {source}")]
    Io {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Errors from the durable settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("Failed to access settings file at {path}: {source}")]
    Io {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The settings file is not valid TOML
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized back to TOML
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
