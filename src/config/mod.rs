//! Configuration module for Quarry.
//!
//! Handles the `quarry.toml` settings file and environment variables.

mod settings;

pub use settings::{expand_env_vars, CompilerSettings, MetadataSettings, Settings, SettingsError};
