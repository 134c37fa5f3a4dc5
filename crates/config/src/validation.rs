//! Configuration validation

use crate::{AppConfig, ConfigError, Result};

/// Validation error details
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
///
/// Every violation is collected and reported in a single
/// [`ConfigError::ValidationError`].
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let errors = collect_violations(config);

    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// All violations found in `config`, in section order.
pub fn collect_violations(config: &AppConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_log_level(&config.logging.level) {
        errors.push(e);
    }

    // RSP connection
    if let Err(e) = validate_url(&config.rsp.base_url) {
        errors.push(ValidationError::new("rsp.base_url", e));
    }
    let env = config.environment.credential_prefix();
    if config.rsp.access_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "rsp.access_key",
            format!("access key is required (or set {env}_ACCESS_KEY)"),
        ));
    }
    if config.rsp.secret_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "rsp.secret_key",
            format!("secret key is required (or set {env}_SECRET_KEY)"),
        ));
    }
    if config.rsp.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "rsp.timeout_ms",
            "must be greater than 0",
        ));
    }
    if config.rsp.transport_attempts == 0 {
        errors.push(ValidationError::new(
            "rsp.transport_attempts",
            "must be at least 1",
        ));
    }

    errors.extend(validate_range(
        config.esim_range.start.trim(),
        config.esim_range.end.trim(),
    ));

    // Retry policy
    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be at least 1"));
    }
    if !(config.retry.delay_seconds >= 0.0 && config.retry.delay_seconds.is_finite()) {
        errors.push(ValidationError::new(
            "retry.delay_seconds",
            "must be a finite number >= 0",
        ));
    }
    if !(config.retry.backoff_factor >= 1.0 && config.retry.backoff_factor.is_finite()) {
        errors.push(ValidationError::new(
            "retry.backoff_factor",
            "must be a finite number >= 1",
        ));
    }

    // Batching
    if config.batch.batch_size == 0 {
        errors.push(ValidationError::new("batch.batch_size", "must be at least 1"));
    }
    if !(config.batch.rate_limit_delay_secs >= 0.0 && config.batch.rate_limit_delay_secs.is_finite())
    {
        errors.push(ValidationError::new(
            "batch.rate_limit_delay_secs",
            "must be a finite number >= 0",
        ));
    }
    if !(0.0..=1.0).contains(&config.batch.success_threshold) {
        errors.push(ValidationError::new(
            "batch.success_threshold",
            "must be between 0 and 1",
        ));
    }

    errors
}

fn validate_range(start: &str, end: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [("esim_range.start", start), ("esim_range.end", end)] {
        if value.is_empty() {
            errors.push(ValidationError::new(field, "bound is required"));
        } else if !value.bytes().all(|b| b.is_ascii_digit()) {
            errors.push(ValidationError::new(
                field,
                format!("bound must be numeric, got '{value}'"),
            ));
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    if start.len() != end.len() {
        errors.push(ValidationError::new(
            "esim_range",
            format!(
                "bounds must have equal length ({} vs {} digits)",
                start.len(),
                end.len()
            ),
        ));
    } else if start > end {
        errors.push(ValidationError::new(
            "esim_range",
            format!("start {start} is greater than end {end}"),
        ));
    }

    errors
}

/// Validate a URL
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    Ok(())
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "logging.level",
            format!(
                "invalid log level '{level}', must be one of: trace, debug, info, warn, error"
            ),
        )),
    }
}
