//! Durable Settings
//!
//! Namespaced string settings that survive a restart. The display keeps
//! the theme and style here; the backlight keeps its brightness.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::SettingsError;

/// Namespace of every display setting
pub const DISPLAY_NAMESPACE: &str = "display";

/// Key of the persisted theme name
pub const THEME_KEY: &str = "theme";

/// Key of the persisted style name
pub const STYLE_KEY: &str = "style";

/// Key of the persisted backlight brightness
pub const BRIGHTNESS_KEY: &str = "brightness";

/// Key-value configuration storage
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a value; `None` when it was never written
    async fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, SettingsError>;

    /// Write a value durably
    async fn set_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), SettingsError>;
}

// ============================================================================
// In-Memory
// ============================================================================

/// Settings held in memory only
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<(String, String), String>>,
}

impl MemorySettings {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value
    #[must_use]
    pub fn with_value(self, namespace: &str, key: &str, value: &str) -> Self {
        self.values
            .write()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        self
    }

    /// Read a value without going through the async trait
    #[must_use]
    pub fn value(&self, namespace: &str, key: &str) -> Option<String> {
        self.values
            .read()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.value(namespace, key))
    }

    async fn set_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .write()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

// ============================================================================
// TOML File
// ============================================================================

type Tables = BTreeMap<String, BTreeMap<String, String>>;

/// Settings persisted as a TOML document of `[namespace]` tables
///
/// The file is read lazily on first access and rewritten on every write.
#[derive(Debug)]
pub struct TomlSettingsFile {
    path: PathBuf,
    tables: Mutex<Option<Tables>>,
}

impl TomlSettingsFile {
    /// Use the file at `path`; it need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tables: Mutex::new(None),
        }
    }

    /// Default location: `$XDG_CONFIG_HOME/chatface/settings.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chatface").join("settings.toml"))
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Tables, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tables::new()),
            Err(source) => Err(SettingsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[async_trait]
impl SettingsStore for TomlSettingsFile {
    async fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, SettingsError> {
        let mut tables = self.tables.lock().await;
        if tables.is_none() {
            *tables = Some(self.load().await?);
        }
        Ok(tables
            .as_ref()
            .and_then(|t| t.get(namespace))
            .and_then(|ns| ns.get(key))
            .cloned())
    }

    async fn set_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut guard = self.tables.lock().await;
        let mut tables = match guard.take() {
            Some(tables) => tables,
            None => self.load().await?,
        };
        tables
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        let serialized = toml::to_string(&tables);
        *guard = Some(tables);
        let serialized = serialized?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SettingsError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|source| SettingsError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(namespace, key, path = %self.path.display(), "Setting persisted");
        Ok(())
    }
}
