// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player configuration.
//!
//! Settings are stored as RON, versioned like the show files. A missing file
//! is not an error for the CLI; it falls back to [`PlayerConfig::default`].

use crate::codec::ShowFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "sequence_player.ron";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV_VAR: &str = "ORDOPLAY_SEQUENCE_CONFIG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    Version {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// A setting is out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// How the tick loop is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockMode {
    /// Dedicated thread ticking at the configured frequency
    #[default]
    Threaded,
    /// The host calls `Player::update` itself
    Manual,
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Settings format version
    pub version: u32,
    /// Target tick frequency in Hz
    pub frequency: f64,
    /// Load an empty sequence when a show fails to load
    pub create_empty_on_load_failure: bool,
    /// Clock driving the tick loop
    pub clock: ClockMode,
    /// Keep sampling adapters while stopped
    #[serde(default)]
    pub sample_while_stopped: bool,
    /// Directory holding show files
    pub show_directory: PathBuf,
    /// Encoding of show files
    pub format: ShowFormat,
    /// Show loaded on init
    #[serde(default)]
    pub default_show: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            frequency: 1000.0,
            create_empty_on_load_failure: true,
            clock: ClockMode::Threaded,
            sample_while_stopped: false,
            show_directory: PathBuf::from("shows"),
            format: ShowFormat::Ron,
            default_show: None,
        }
    }
}

impl PlayerConfig {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PlayerConfig = ron::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::Version {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        config.validate()?;
        Ok(config)
    }

    /// Load settings, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Configuration path from the environment, or the default file name
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Tick period derived from the frequency
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.frequency)
    }

    /// Check the settings the tick loop depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let period = 1.0 / self.frequency;
        if !(self.frequency.is_finite()
            && self.frequency > 0.0
            && std::time::Duration::try_from_secs_f64(period).is_ok())
        {
            return Err(ConfigError::Invalid(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }
        Ok(())
    }
}
