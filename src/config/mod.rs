//! Configuration module for the composer.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, LoggingSettings, ModelSettings, SearchSettings, Settings, SettingsError,
};
