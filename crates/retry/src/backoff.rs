use std::time::Duration;

/// Resilience floor applied to a single HTTP request.
///
/// Independent of [`RetryPolicy`](crate::RetryPolicy): the state machine
/// still runs its own attempts on top of this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportBackoff {
    attempts: u32,
    initial: Duration,
    max: Duration,
    multiplier: f64,
}

impl TransportBackoff {
    pub fn new(attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial,
            max,
            multiplier: 2.0,
        }
    }

    /// Single attempt, no waiting.
    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before retry number `retry` (1 = the wait after the first failure).
    pub fn delay_before(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.max(1) - 1).unwrap_or(i32::MAX);
        let delay_ms = self.initial.as_millis() as f64 * self.multiplier.powi(exponent);
        let delay_ms = delay_ms.min(self.max.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

impl Default for TransportBackoff {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(10))
    }
}
