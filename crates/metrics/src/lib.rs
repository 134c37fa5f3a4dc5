//! Logging and Prometheus metrics for eSIM deactivation runs.
//!
//! # Features
//!
//! - Structured logging via `tracing-subscriber`, text or JSON
//! - Per-run correlation ids and per-file spans
//! - Counters for record outcomes, file verdicts and runs
//! - ERROR log events counted as a metric
//!
//! # Example
//!
//! ```no_run
//! use esim_deactivation_metrics::{init_tracing, MetricsCollector};
//!
//! init_tracing("info", true).unwrap();
//! let text = MetricsCollector::new().export_metrics().unwrap();
//! println!("{text}");
//! ```

pub mod collector;
pub mod metrics;
pub mod tracing;

pub use collector::{FileVerdict, MetricsCollector, MetricsError};
pub use self::tracing::{init_tracing, FileSpan, MetricsLayer, RunId, TracingError};
