//! Domain values built from a loaded [`AppConfig`].

use std::time::Duration;

use esim_deactivation_engine::BatchSettings;
use esim_deactivation_retry::{RetryPolicy, TransportBackoff};
use esim_deactivation_rsp::RspSettings;
use esim_deactivation_types::IdentifierRange;

use crate::{AppConfig, ConfigError, Result};

impl AppConfig {
    pub fn identifier_range(&self) -> Result<IdentifierRange> {
        Ok(IdentifierRange::new(
            self.esim_range.start.trim(),
            self.esim_range.end.trim(),
        )?)
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        Ok(RetryPolicy::new(
            self.retry.max_attempts,
            self.retry.delay_seconds,
            self.retry.backoff_factor,
        )?)
    }

    pub fn batch_settings(&self) -> Result<BatchSettings> {
        let delay = Duration::try_from_secs_f64(self.batch.rate_limit_delay_secs).map_err(|_| {
            ConfigError::ValidationError(format!(
                "batch.rate_limit_delay_secs: invalid delay {}",
                self.batch.rate_limit_delay_secs
            ))
        })?;

        Ok(BatchSettings::new(
            self.batch.batch_size,
            delay,
            self.batch.success_threshold,
        ))
    }

    /// Transport settings; the backoff floor keeps its default timings.
    pub fn rsp_settings(&self) -> RspSettings {
        let backoff = TransportBackoff::default().with_attempts(self.rsp.transport_attempts);

        RspSettings::new(
            self.rsp.base_url.clone(),
            self.rsp.access_key.clone(),
            self.rsp.secret_key.clone(),
        )
        .with_timeout(Duration::from_millis(self.rsp.timeout_ms))
        .with_backoff(backoff)
    }
}
