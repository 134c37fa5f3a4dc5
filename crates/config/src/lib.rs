//! Configuration management for the eSIM deactivation service
//!
//! This crate provides:
//! - Multiple config formats (TOML, YAML, JSON)
//! - Environment variable overrides and per-environment RSP credentials
//! - Config validation
//! - Conversion into the immutable values the engine is built from

mod config;
mod convert;
mod loader;
mod validation;

pub use config::*;
pub use loader::*;
pub use validation::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Config validation failed: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config library error: {0}")]
    ConfigLibError(#[from] ::config::ConfigError),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid eSIM range: {0}")]
    RangeError(#[from] esim_deactivation_types::RangeError),

    #[error("Invalid retry policy: {0}")]
    RetryError(#[from] esim_deactivation_retry::RetryPolicyError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
