//! Screen Control
//!
//! The remotely invokable "Screen" thing. The assistant backend reads its
//! properties and calls its methods as JSON:
//!
//! ```json
//! { "method": "set_theme", "parameters": { "theme_name": "dark" } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::display::Display;
use crate::error::DisplayError;
use crate::settings::{BRIGHTNESS_KEY, DISPLAY_NAMESPACE};
use crate::theme::ThemeName;

/// Brightness reported when the board has no controllable backlight
pub const DEFAULT_BRIGHTNESS: u8 = 100;

/// Readable state of the screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenProperties {
    /// Active theme name
    pub theme: String,
    /// Active style name
    pub style: String,
    /// Backlight brightness, 0-100
    pub brightness: u8,
}

/// A remote method call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "parameters", rename_all = "snake_case")]
pub enum ScreenCommand {
    /// Switch color theme
    SetTheme {
        /// "light" or "dark"
        theme_name: String,
    },
    /// Switch style (restarts the device)
    SetStyle {
        /// "normal", "wechat" or "animation"
        theme_style: String,
    },
    /// Set backlight brightness
    SetBrightness {
        /// 0-100
        brightness: i64,
    },
}

impl ScreenCommand {
    /// Parse a JSON method call
    ///
    /// # Errors
    ///
    /// [`DisplayError::InvalidCommand`] for malformed JSON, unknown methods
    /// or missing parameters.
    pub fn from_json(json: &str) -> Result<Self, DisplayError> {
        serde_json::from_str(json).map_err(|e| DisplayError::InvalidCommand(e.to_string()))
    }
}

/// Remote control surface for the display
#[derive(Clone, Debug)]
pub struct ScreenControl {
    display: Display,
}

impl ScreenControl {
    /// Wrap a display
    #[must_use]
    pub fn new(display: Display) -> Self {
        Self { display }
    }

    /// Self-description advertised to the backend
    #[must_use]
    pub fn descriptor() -> Value {
        json!({
            "name": "Screen",
            "description": "Display panel",
            "properties": {
                "theme": { "description": "Color theme", "type": "string" },
                "style": { "description": "Presentation style", "type": "string" },
                "brightness": { "description": "Current brightness percentage", "type": "number" }
            },
            "methods": {
                "set_theme": {
                    "description": "Set the color theme",
                    "parameters": {
                        "theme_name": { "description": "light or dark", "type": "string" }
                    }
                },
                "set_style": {
                    "description": "Set the presentation style (restarts the device)",
                    "parameters": {
                        "theme_style": { "description": "normal, wechat or animation", "type": "string" }
                    }
                },
                "set_brightness": {
                    "description": "Set the brightness",
                    "parameters": {
                        "brightness": { "description": "An integer between 0 and 100", "type": "number" }
                    }
                }
            }
        })
    }

    /// Current property values
    ///
    /// The theme falls back to light once the surface is torn down.
    pub async fn properties(&self) -> ScreenProperties {
        let theme = self.display.theme().await.unwrap_or(ThemeName::Light);
        ScreenProperties {
            theme: theme.as_str().to_string(),
            style: self.display.style().as_str().to_string(),
            brightness: self
                .display
                .backlight()
                .map_or(DEFAULT_BRIGHTNESS, |b| b.brightness()),
        }
    }

    /// Current property values as JSON
    pub async fn properties_json(&self) -> Value {
        let properties = self.properties().await;
        json!({
            "theme": properties.theme,
            "style": properties.style,
            "brightness": properties.brightness,
        })
    }

    /// Execute a method call
    ///
    /// # Errors
    ///
    /// Whatever the underlying display operation returns, or
    /// [`DisplayError::InvalidCommand`] for an out-of-range brightness, or a
    /// settings write failure after the brightness was applied.
    pub async fn invoke(&self, command: ScreenCommand) -> Result<(), DisplayError> {
        match command {
            ScreenCommand::SetTheme { theme_name } => self.display.set_theme(&theme_name).await,
            ScreenCommand::SetStyle { theme_style } => self.display.set_style(&theme_style).await,
            ScreenCommand::SetBrightness { brightness } => {
                let level = u8::try_from(brightness)
                    .ok()
                    .filter(|level| *level <= 100)
                    .ok_or_else(|| {
                        DisplayError::InvalidCommand(format!(
                            "brightness must be within 0..=100, got {brightness}"
                        ))
                    })?;
                let Some(backlight) = self.display.backlight() else {
                    tracing::debug!(level, "No backlight, brightness ignored");
                    return Ok(());
                };
                // Persisted with the other display settings, not by the driver
                backlight.set_brightness(level, false);
                tracing::info!(level, "Brightness set");
                self.display
                    .settings()
                    .set_string(DISPLAY_NAMESPACE, BRIGHTNESS_KEY, &level.to_string())
                    .await?;
                Ok(())
            }
        }
    }

    /// Parse and execute a JSON method call
    ///
    /// # Errors
    ///
    /// See [`ScreenCommand::from_json`] and [`invoke`](Self::invoke).
    pub async fn invoke_json(&self, json: &str) -> Result<(), DisplayError> {
        self.invoke(ScreenCommand::from_json(json)?).await
    }
}
