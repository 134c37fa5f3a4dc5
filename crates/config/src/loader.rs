//! Configuration loading from multiple sources

use crate::{AppConfig, ConfigError, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;
use tracing::{debug, info};

/// Prefix of environment variable overrides, e.g. `ESIM_DEACTIVATION_RETRY__MAX_ATTEMPTS`.
pub const ENV_PREFIX: &str = "ESIM_DEACTIVATION";

const ENV_SEPARATOR: &str = "__";

/// Configuration loader with support for multiple formats and sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    ///
    /// Supports TOML, YAML, and JSON formats based on file extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading config file");

        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_json(content: &str) -> Result<AppConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from environment variables under [`ENV_PREFIX`]
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with custom prefix
    ///
    /// Sections and keys are separated by a double underscore:
    /// `PREFIX_RETRY__MAX_ATTEMPTS=5`, `PREFIX_ENVIRONMENT=test`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        let config = Config::builder()
            .add_source(env_source(prefix))
            .build()?;

        config.try_deserialize().map_err(ConfigError::from)
    }

    /// Merge two configurations, with overlay taking precedence
    ///
    /// Overlay sections still at their defaults leave the base section in place.
    pub fn merge(base: AppConfig, overlay: AppConfig) -> AppConfig {
        fn pick<T: Default + PartialEq>(base: T, overlay: T) -> T {
            if overlay == T::default() {
                base
            } else {
                overlay
            }
        }

        AppConfig {
            environment: pick(base.environment, overlay.environment),
            logging: pick(base.logging, overlay.logging),
            rsp: pick(base.rsp, overlay.rsp),
            esim_range: pick(base.esim_range, overlay.esim_range),
            retry: pick(base.retry, overlay.retry),
            batch: pick(base.batch, overlay.batch),
        }
    }

    /// Load a file, then apply environment overrides and credentials
    ///
    /// 1. Loads base configuration from file
    /// 2. Overlays `{prefix}_SECTION__KEY` variables
    /// 3. Fills empty RSP credentials from `{TEST|PROD}_*` variables
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        let mut config = Self::builder().add_file(path, true).add_env(env_prefix).build()?;
        resolve_credentials(&mut config);
        Ok(config)
    }

    /// Build configuration using the config crate's builder pattern
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
            defaults: Vec::new(),
        }
    }
}

fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
}

/// Builder for layered configuration sources; later sources win
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
    defaults: Vec<(String, String)>,
}

impl ConfigLoaderBuilder {
    /// Add a configuration file source
    pub fn add_file(mut self, path: &Path, required: bool) -> Self {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(env_source(prefix));
        self
    }

    /// Set a default value for a dotted key such as `retry.max_attempts`
    pub fn set_default(mut self, key: &str, value: &str) -> Self {
        self.defaults.push((key.to_string(), value.to_string()));
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        let mut builder = self.builder;
        for (key, value) in self.defaults {
            builder = builder.set_default(key, value)?;
        }
        let config = builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}

/// Fill empty RSP fields from `{TEST|PROD}_ACCESS_KEY`, `_SECRET_KEY` and `_URL`.
pub fn resolve_credentials(config: &mut AppConfig) {
    resolve_credentials_with(config, |name| std::env::var(name).ok());
}

/// [`resolve_credentials`] with a custom variable lookup.
pub fn resolve_credentials_with<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let prefix = config.environment.credential_prefix();
    let fields = [
        ("ACCESS_KEY", &mut config.rsp.access_key),
        ("SECRET_KEY", &mut config.rsp.secret_key),
        ("URL", &mut config.rsp.base_url),
    ];

    for (suffix, field) in fields {
        if !field.trim().is_empty() {
            continue;
        }
        let name = format!("{prefix}_{suffix}");
        if let Some(value) = lookup(&name).filter(|v| !v.trim().is_empty()) {
            info!(variable = %name, "RSP setting taken from environment");
            *field = value;
        }
    }
}
