use esim_deactivation_types::{BatchVerdict, ProcessingOutcome, RunSummary};
use prometheus::{Encoder, TextEncoder};

use crate::metrics::*;

/// Records deactivation activity into the process-wide Prometheus registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCollector;

/// File-level result recorded in `esim_deactivation_files_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVerdict {
    Met,
    BelowThreshold,
    LoadError,
    MoveError,
}

impl FileVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileVerdict::Met => "met",
            FileVerdict::BelowThreshold => "below_threshold",
            FileVerdict::LoadError => "load_error",
            FileVerdict::MoveError => "move_error",
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn record_outcome(&self, outcome: &ProcessingOutcome) {
        OUTCOMES_TOTAL
            .with_label_values(&[outcome.status.as_str()])
            .inc();

        if let Some(reason) = outcome.success_reason {
            SUCCESS_REASONS_TOTAL
                .with_label_values(&[reason.as_str()])
                .inc();
        }

        // INVALID and SKIPPED never reach the platform.
        if outcome.status.is_attempted() {
            RECORD_ATTEMPTS.observe(f64::from(outcome.attempts_used));
            RECORD_DURATION.observe(outcome.elapsed_millis as f64);
        }
    }

    /// Record the verdict of a fully processed file.
    pub fn record_verdict(&self, verdict: &BatchVerdict) {
        let label = if verdict.meets_threshold {
            FileVerdict::Met
        } else {
            FileVerdict::BelowThreshold
        };
        self.record_file(label);
        FILE_SUCCESS_RATE.set(verdict.success_rate);
    }

    pub fn record_file(&self, verdict: FileVerdict) {
        FILES_TOTAL.with_label_values(&[verdict.as_str()]).inc();
    }

    pub fn record_run(&self, summary: &RunSummary) {
        RUNS_TOTAL
            .with_label_values(&[summary.status().as_str()])
            .inc();
    }

    pub fn record_error_event(&self) {
        ERROR_EVENTS_TOTAL.inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }
}

/// Metrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use esim_deactivation_types::{
        DeactivationRecord, OutcomeStats, Resolution, SuccessReason,
    };
    use std::time::Duration;

    fn success(reason: SuccessReason) -> ProcessingOutcome {
        ProcessingOutcome::new(
            &DeactivationRecord::new("89238010000101000001"),
            Resolution::Success { reason },
            1,
            Duration::from_millis(120),
            None,
        )
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new();
        assert!(collector.export_metrics().is_ok());
    }

    #[test]
    fn test_record_outcome_metrics() {
        let collector = MetricsCollector::new();
        let before = OUTCOMES_TOTAL.with_label_values(&["SUCCESS"]).get();

        collector.record_outcome(&success(SuccessReason::AlreadyExpired));
        collector.record_outcome(&ProcessingOutcome::skipped(
            &DeactivationRecord::new("1"),
            "outside eSIM range",
        ));

        assert!(OUTCOMES_TOTAL.with_label_values(&["SUCCESS"]).get() >= before + 1);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("esim_deactivation_outcomes_total"));
        assert!(metrics.contains("ALREADY_EXPIRED"));
        assert!(metrics.contains("esim_deactivation_record_attempts"));
        assert!(metrics.contains("esim_deactivation_record_duration_ms"));
    }

    #[test]
    fn test_record_verdict_metrics() {
        let collector = MetricsCollector::new();
        let outcomes = vec![success(SuccessReason::Deactivated)];

        collector.record_verdict(&BatchVerdict::from_outcomes(&outcomes, 0.95));
        collector.record_file(FileVerdict::LoadError);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("esim_deactivation_files_total"));
        assert!(metrics.contains("load_error"));
        assert!(metrics.contains("esim_deactivation_file_success_rate"));
    }

    #[test]
    fn test_record_run_metrics() {
        let collector = MetricsCollector::new();
        let summary = RunSummary {
            run_id: "run".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            files_processed: vec!["a.xml".to_string()],
            files_failed: vec![],
            stats: OutcomeStats::default(),
        };

        collector.record_run(&summary);
        collector.record_error_event();

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("esim_deactivation_runs_total"));
        assert!(metrics.contains("completed"));
        assert!(metrics.contains("esim_deactivation_error_events_total"));
    }
}
