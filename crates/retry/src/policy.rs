use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryPolicyError {
    #[error("max_attempts must be at least 1")]
    NoAttempts,

    #[error("delay_seconds must be a finite, non-negative number, got {0}")]
    InvalidDelay(f64),

    #[error("backoff_factor must be a finite number >= 1, got {0}")]
    InvalidBackoffFactor(f64),
}

/// Attempt limit and delay schedule for business-level retries.
///
/// Attempt numbers are 1-based and count attempts already made. The delay
/// before attempt `n + 1` is `delay_seconds * backoff_factor^(n - 1)`, which
/// never decreases because `backoff_factor >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy", into = "RawPolicy")]
pub struct RetryPolicy {
    max_attempts: u32,
    delay_seconds: f64,
    backoff_factor: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPolicy {
    max_attempts: u32,
    delay_seconds: f64,
    backoff_factor: f64,
}

impl TryFrom<RawPolicy> for RetryPolicy {
    type Error = RetryPolicyError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        Self::new(raw.max_attempts, raw.delay_seconds, raw.backoff_factor)
    }
}

impl From<RetryPolicy> for RawPolicy {
    fn from(policy: RetryPolicy) -> Self {
        RawPolicy {
            max_attempts: policy.max_attempts,
            delay_seconds: policy.delay_seconds,
            backoff_factor: policy.backoff_factor,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        delay_seconds: f64,
        backoff_factor: f64,
    ) -> Result<Self, RetryPolicyError> {
        if max_attempts == 0 {
            return Err(RetryPolicyError::NoAttempts);
        }
        if !delay_seconds.is_finite() || delay_seconds < 0.0 {
            return Err(RetryPolicyError::InvalidDelay(delay_seconds));
        }
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(RetryPolicyError::InvalidBackoffFactor(backoff_factor));
        }

        Ok(Self {
            max_attempts,
            delay_seconds,
            backoff_factor,
        })
    }

    /// Policy that never waits between attempts.
    pub fn immediate(max_attempts: u32) -> Result<Self, RetryPolicyError> {
        Self::new(max_attempts, 0.0, 1.0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_seconds(&self) -> f64 {
        self.delay_seconds
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Whether another attempt is allowed after `attempt` attempts.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Seconds to wait after attempt number `attempt` (clamped to >= 1).
    pub fn next_delay(&self, attempt: u32) -> f64 {
        let exponent = attempt.max(1) - 1;
        let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
        self.delay_seconds * self.backoff_factor.powi(exponent)
    }

    /// [`next_delay`](Self::next_delay) as a `Duration`, saturating on overflow.
    pub fn next_delay_duration(&self, attempt: u32) -> Duration {
        Duration::try_from_secs_f64(self.next_delay(attempt)).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_seconds: 5.0,
            backoff_factor: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::new(3, 5.0, 2.0).unwrap();
        assert_eq!(policy.next_delay(1), 5.0);
        assert_eq!(policy.next_delay(2), 10.0);
        assert_eq!(policy.next_delay(3), 20.0);
    }

    #[test]
    fn test_can_retry() {
        let policy = RetryPolicy::new(3, 5.0, 2.0).unwrap();
        assert!(policy.can_retry(0));
        assert!(policy.can_retry(1));
        assert!(policy.can_retry(2));
        assert!(!policy.can_retry(3));
        assert!(!policy.can_retry(4));
    }

    #[test]
    fn test_attempt_is_clamped_to_one() {
        let policy = RetryPolicy::new(3, 5.0, 2.0).unwrap();
        assert_eq!(policy.next_delay(0), policy.next_delay(1));
    }

    #[test]
    fn test_delays_never_decrease() {
        let policy = RetryPolicy::new(10, 0.5, 1.5).unwrap();
        let delays: Vec<f64> = (1..=10).map(|a| policy.next_delay(a)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));

        let flat = RetryPolicy::new(5, 2.0, 1.0).unwrap();
        assert!((1..=5).all(|a| flat.next_delay(a) == 2.0));
    }

    #[test]
    fn test_duration_conversion() {
        let policy = RetryPolicy::new(3, 1.5, 2.0).unwrap();
        assert_eq!(policy.next_delay_duration(1), Duration::from_millis(1500));
        assert_eq!(policy.next_delay_duration(2), Duration::from_secs(3));

        let huge = RetryPolicy::new(u32::MAX, 1.0, 10.0).unwrap();
        assert_eq!(huge.next_delay_duration(400), Duration::MAX);
    }

    #[test]
    fn test_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_seconds(), 5.0);
        assert_eq!(policy.backoff_factor(), 2.0);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(RetryPolicy::new(0, 1.0, 1.0), Err(RetryPolicyError::NoAttempts));
        assert_eq!(
            RetryPolicy::new(1, -1.0, 1.0),
            Err(RetryPolicyError::InvalidDelay(-1.0))
        );
        assert!(matches!(
            RetryPolicy::new(1, f64::NAN, 1.0),
            Err(RetryPolicyError::InvalidDelay(_))
        ));
        assert_eq!(
            RetryPolicy::new(1, 1.0, 0.5),
            Err(RetryPolicyError::InvalidBackoffFactor(0.5))
        );
    }
}
