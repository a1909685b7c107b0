// Configuration module for Bingo Live

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::constants::PUSH_PATH;

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// Bingo server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// HTTP base URL; the push URL is derived from it
    #[serde(default = "default_url")]
    pub url: String,
    /// Path of the push endpoint
    #[serde(default = "default_push_path")]
    pub push_path: String,
    /// Timeout for a single HTTP request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_push_path() -> String {
    PUSH_PATH.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            push_path: default_push_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Write logs to stderr
    #[serde(default = "default_console")]
    pub console: bool,
    /// Log file path (relative to the config file or absolute). Empty = no file logging.
    #[serde(default)]
    pub log_file: String,
}

fn default_console() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            console: default_console(),
            log_file: String::new(),
        }
    }
}

/// Terminal display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Emit ANSI colours
    #[serde(default = "default_color")]
    pub color: bool,
    /// Number of board cells per row
    #[serde(default = "default_board_columns")]
    pub board_columns: usize,
    /// Spectator redraw interval in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

fn default_color() -> bool {
    true
}
fn default_board_columns() -> usize {
    15
}
fn default_frame_interval_ms() -> u64 {
    100
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            color: default_color(),
            board_columns: default_board_columns(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl DisplaySettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// Spectator behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpectatorSettings {
    /// Re-fetch the full settings over HTTP after every push reconnect
    #[serde(default)]
    pub resync_on_reconnect: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub spectator: SpectatorSettings,
    /// Directory the config was loaded from, for resolving relative paths
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    ReadError(std::io::Error),
    ParseError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            ConfigError::ReadError(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::ParseError(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Values given on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub no_color: bool,
}

impl Config {
    pub const CONFIG_FILENAME: &'static str = "bingo_live.toml";

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `bingo_live.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_file(path)
            }
            None => {
                let default_path = PathBuf::from(Self::CONFIG_FILENAME);
                debug!(
                    path = %default_path.display(),
                    "[config] Looking for local config"
                );
                if default_path.exists() {
                    Self::load_file(&default_path)
                } else {
                    debug!("[config] No local config found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let mut config: Config = toml::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.base_dir = path.parent().map(|p| p.to_path_buf());
        info!(path = %path.display(), "[config] Loaded config");
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.server_url {
            if !url.is_empty() {
                debug!(url = %url, "[config] Server URL overridden");
                self.server.url = url.clone();
            }
        }
        if overrides.no_color {
            self.display.color = false;
        }
    }

    /// Resolved log file path, if file logging is enabled
    pub fn log_file_path(&self) -> Option<PathBuf> {
        if self.logging.log_file.is_empty() {
            return None;
        }
        let path = PathBuf::from(&self.logging.log_file);
        if path.is_absolute() {
            return Some(path);
        }
        Some(match &self.base_dir {
            Some(dir) => dir.join(path),
            None => path,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
