use crate::nav::classify::{ExtensionMatch, MediaExtensions, DEFAULT_MEDIA_EXTENSIONS};
use crate::nav::format::DisplayConfig;
use crate::nav::path::SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tree-browser";

/// Largest UTC offset accepted for dates, in minutes
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

/// Which files open in the media player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Playable extensions, without the leading dot
    #[serde(default = "default_media_extensions")]
    pub extensions: Vec<String>,

    /// Compare extensions exactly instead of ignoring case
    #[serde(default = "default_false")]
    pub case_sensitive: bool,
}

fn default_media_extensions() -> Vec<String> {
    DEFAULT_MEDIA_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_false() -> bool {
    false
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            extensions: default_media_extensions(),
            case_sensitive: false,
        }
    }
}

impl MediaConfig {
    /// The extension set handed to the classifier
    pub fn extension_set(&self) -> MediaExtensions {
        let matching = if self.case_sensitive {
            ExtensionMatch::CaseSensitive
        } else {
            ExtensionMatch::CaseInsensitive
        };
        MediaExtensions::new(&self.extensions, matching)
    }
}

impl BrowserConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: BrowserConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::IoError(e.to_string()))?;
            }
        }
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Load the file at `path` if it exists, the defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.display.date_format_is_valid() {
            return Err(ConfigError::ValidationError(format!(
                "date_format {:?} is not a valid date pattern",
                self.display.date_format
            )));
        }

        if let Some(offset) = self.display.utc_offset_minutes {
            if offset.abs() >= MAX_UTC_OFFSET_MINUTES {
                return Err(ConfigError::ValidationError(format!(
                    "utc_offset_minutes must be within ±{} (got {})",
                    MAX_UTC_OFFSET_MINUTES - 1,
                    offset
                )));
            }
        }

        for ext in &self.media.extensions {
            if ext.is_empty() {
                return Err(ConfigError::ValidationError(
                    "media extension cannot be empty".to_string(),
                ));
            }
            if ext.contains('.') || ext.contains(SEPARATOR) {
                return Err(ConfigError::ValidationError(format!(
                    "media extension {:?} must not contain '.' or '{}'",
                    ext, SEPARATOR
                )));
            }
        }

        Ok(())
    }
}

/// Default location of the config file (e.g. ~/.config/tree-browser/config.json)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
}

/// Default location of the log file (e.g. ~/.local/share/tree-browser/tree-browser.log)
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join("tree-browser.log"))
}

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
