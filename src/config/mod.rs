//! Configuration module for fsx
//!
//! Walk limits, default search criteria, display settings and shell aliases.
//! Configuration is stored as TOML in the user's config directory (or a file
//! given with `--config`); a default file is written on first run.

use crate::keybinds::KeybindConfig;
use crate::tree::{SearchCriteria, WalkOptions};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Path display format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathFormat {
    /// Display absolute paths
    #[default]
    Absolute,
    /// Display relative paths (relative to current directory)
    Relative,
}

/// Criteria enabled when a session starts
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SearchDefaults {
    #[serde(default = "default_true")]
    pub match_name: bool,
    #[serde(default)]
    pub match_extension: bool,
    #[serde(default)]
    pub match_content: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            match_name: true,
            match_extension: false,
            match_content: false,
        }
    }
}

impl SearchDefaults {
    /// Criteria with these flags and the given query
    #[must_use]
    pub fn criteria(self, query: impl Into<String>) -> SearchCriteria {
        SearchCriteria {
            match_name: self.match_name,
            match_extension: self.match_extension,
            match_content: self.match_content,
            query: query.into(),
        }
    }
}

/// How trees are printed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Default format for displaying paths (absolute or relative)
    #[serde(default)]
    pub path_format: PathFormat,
    /// Spaces per tree level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// Colorize output
    #[serde(default = "default_true")]
    pub colors: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            path_format: PathFormat::default(),
            indent_width: default_indent_width(),
            colors: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_indent_width() -> usize {
    2
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Directory walk limits
    #[serde(default)]
    pub walk: WalkOptions,

    /// Criteria active at startup
    #[serde(default)]
    pub search: SearchDefaults,

    /// Tree rendering
    #[serde(default)]
    pub display: DisplayConfig,

    /// Shell command aliases
    #[serde(default)]
    pub keybinds: KeybindConfig,
}

impl ExplorerConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("fsx").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, validated, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing the defaults there if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, validated, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the explorer unusable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` for an unknown keybind action, a duplicated
    /// alias, or a zero walk depth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.keybinds
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        if self.walk.max_depth == 0 {
            return Err(ConfigError::Message("walk.max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be determined or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the parent directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
