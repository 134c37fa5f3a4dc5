//! Retry timing for calls to the Remote SIM Provisioning platform.
//!
//! - `RetryPolicy`: business-level attempt limit and delay schedule, used by
//!   the deactivation state machine
//! - `TransportBackoff`: small fixed resilience floor applied to individual
//!   HTTP requests

pub mod backoff;
pub mod policy;

pub use backoff::TransportBackoff;
pub use policy::{RetryPolicy, RetryPolicyError};
