//! Configuration model for the eSIM deactivation service

use esim_deactivation_rsp::FinalProfileStatus;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// RSP platform selected for this run (test or prod)
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// RSP endpoint and credentials
    #[serde(default)]
    pub rsp: RspConfig,

    /// Inclusive ICCID bounds identifying eSIM profiles
    #[serde(default)]
    pub esim_range: RangeConfig,

    /// Per-record retry of ExpireOrder
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

/// Environment types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    #[default]
    Prod,
}

impl Environment {
    /// Prefix of the credential variables for this environment.
    pub fn credential_prefix(&self) -> &'static str {
        match self {
            Environment::Test => "TEST",
            Environment::Prod => "PROD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per line instead of text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// RSP platform connection settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RspConfig {
    /// Base URL, e.g. "https://rsp.example.com"
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts made by the transport for timeouts, connection errors, 429 and 5xx
    #[serde(default = "default_transport_attempts")]
    pub transport_attempts: u32,
}

impl Default for RspConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            timeout_ms: default_timeout_ms(),
            transport_attempts: default_transport_attempts(),
        }
    }
}

impl std::fmt::Debug for RspConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RspConfig")
            .field("base_url", &self.base_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("transport_attempts", &self.transport_attempts)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    #[serde(default = "default_range_start")]
    pub start: String,

    #[serde(default = "default_range_end")]
    pub end: String,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: default_range_start(),
            end: default_range_end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in seconds
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: f64,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches, in seconds
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: f64,

    /// Minimum success rate for a file to be marked complete
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,

    /// Profile state requested by ExpireOrder
    #[serde(default)]
    pub final_profile_status: FinalProfileStatus,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
            success_threshold: default_success_threshold(),
            final_profile_status: FinalProfileStatus::default(),
        }
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_transport_attempts() -> u32 {
    3
}

fn default_range_start() -> String {
    "89238010000101000000".to_string()
}

fn default_range_end() -> String {
    "89238010000101999999".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_seconds() -> f64 {
    5.0
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_batch_size() -> usize {
    10
}

fn default_rate_limit_delay_secs() -> f64 {
    1.0
}

fn default_success_threshold() -> f64 {
    0.95
}
