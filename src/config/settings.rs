//! TOML-based configuration for the composer.
//!
//! Supports a config file (composer.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [model]
//! source = "${MALLOY_HOME}/flights.source.json"
//! top_values = "./flights.top_values.json"
//!
//! [writer]
//! indent_width = 4
//!
//! [search]
//! max_results = 20
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::writer::WriterOptions;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where source definitions come from.
    pub model: ModelSettings,

    /// Query text formatting.
    pub writer: WriterOptions,

    /// Autocomplete.
    pub search: SearchSettings,

    /// Log output of the CLI.
    pub logging: LoggingSettings,
}

/// Model file locations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelSettings {
    /// JSON source definition (supports ${ENV_VAR} expansion).
    pub source: Option<String>,

    /// JSON list of precomputed top values.
    pub top_values: Option<String>,
}

impl ModelSettings {
    pub fn source_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        resolve_path(self.source.as_deref())
    }

    pub fn top_values_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        resolve_path(self.top_values.as_deref())
    }
}

/// Search settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results returned when the caller gives no limit.
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. "warn" or "composer=debug".
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `COMPOSER_CONFIG`
    /// 2. `./composer.toml`
    /// 3. `~/.config/composer/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("COMPOSER_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("composer.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("composer").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.writer.indent_width == 0 {
            return Err(SettingsError::InvalidConfig(
                "writer.indent_width must be at least 1".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(SettingsError::InvalidConfig(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_path(raw: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
    raw.map(|path| expand_env_vars(path).map(PathBuf::from))
        .transpose()
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next_if_eq(&'}');
            name
        } else {
            let name: String =
                std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_'))
                    .collect();
            if name.is_empty() {
                // lone $
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
