use esim_deactivation_metrics::MetricsCollector;
use esim_deactivation_rsp::SignedTransport;
use esim_deactivation_types::{
    BatchVerdict, DeactivationRecord, IdentifierRange, ProcessingOutcome,
};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::machine::DeactivationMachine;

/// Batching and pacing parameters for one file.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchSettings {
    /// Records per batch, at least 1.
    pub batch_size: usize,

    /// Pause between consecutive batches.
    pub rate_limit_delay: Duration,

    /// Minimum success rate for the file to be marked complete.
    pub success_threshold: f64,
}

impl BatchSettings {
    pub fn new(batch_size: usize, rate_limit_delay: Duration, success_threshold: f64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            rate_limit_delay,
            success_threshold,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            rate_limit_delay: Duration::from_secs(1),
            success_threshold: 0.95,
        }
    }
}

/// Records split into those to send and those rejected up front.
#[derive(Clone, Debug, Default)]
pub struct Screening {
    /// Unique eSIM records requesting deactivation, in input order.
    pub eligible: Vec<DeactivationRecord>,
    /// INVALID and SKIPPED outcomes, in input order.
    pub rejected: Vec<ProcessingOutcome>,
}

/// Processes the records of one file through the [`DeactivationMachine`].
pub struct BatchOrchestrator<T> {
    machine: DeactivationMachine<T>,
    range: IdentifierRange,
    settings: BatchSettings,
    metrics: MetricsCollector,
}

impl<T: SignedTransport> BatchOrchestrator<T> {
    pub fn new(
        machine: DeactivationMachine<T>,
        range: IdentifierRange,
        settings: BatchSettings,
    ) -> Self {
        Self {
            machine,
            range,
            settings,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn machine(&self) -> &DeactivationMachine<T> {
        &self.machine
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Reject malformed, non-deactivation, out-of-range and duplicate records.
    ///
    /// Eligible records carry the canonical ICCID, without a Luhn check
    /// digit. Deduplication keys on that value; the first occurrence wins.
    pub fn screen(&self, records: &[DeactivationRecord]) -> Screening {
        let mut screening = Screening::default();
        let mut seen = HashSet::new();

        for record in records {
            let iccid = record.iccid.trim();

            if iccid.is_empty() {
                screening
                    .rejected
                    .push(ProcessingOutcome::invalid(record, "ICCID is missing"));
                continue;
            }
            if !iccid.bytes().all(|b| b.is_ascii_digit()) {
                screening.rejected.push(ProcessingOutcome::invalid(
                    record,
                    format!("ICCID is not numeric: {iccid}"),
                ));
                continue;
            }
            if !record.requests_deactivation() {
                let action = record.action.as_deref().unwrap_or_default().trim();
                screening.rejected.push(ProcessingOutcome::skipped(
                    record,
                    format!("action {action} is not a deactivation"),
                ));
                continue;
            }
            let Some(iccid) = self.range.canonical(iccid) else {
                screening.rejected.push(ProcessingOutcome::skipped(
                    record,
                    format!("ICCID outside eSIM range {}", self.range),
                ));
                continue;
            };
            if !seen.insert(iccid.to_string()) {
                screening
                    .rejected
                    .push(ProcessingOutcome::skipped(record, "duplicate ICCID in file"));
                continue;
            }

            let mut eligible = record.clone();
            eligible.iccid = iccid.to_string();
            screening.eligible.push(eligible);
        }

        info!(
            total = records.len(),
            eligible = screening.eligible.len(),
            rejected = screening.rejected.len(),
            "screened records"
        );
        screening
    }

    /// Screen, deactivate in paced batches, and compute the file verdict.
    ///
    /// Returned outcomes list rejected records first, then processed records
    /// in processing order.
    pub async fn process_file(
        &self,
        records: &[DeactivationRecord],
    ) -> (BatchVerdict, Vec<ProcessingOutcome>) {
        let Screening { eligible, rejected } = self.screen(records);
        for outcome in &rejected {
            self.metrics.record_outcome(outcome);
        }
        let mut outcomes = rejected;

        if eligible.is_empty() {
            warn!("no eSIM deactivations found");
        }

        let batch_count = eligible.len().div_ceil(self.settings.batch_size);
        for (index, batch) in eligible.chunks(self.settings.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.rate_limit_delay).await;
            }

            info!(
                batch = index + 1,
                batches = batch_count,
                records = batch.len(),
                "processing batch"
            );
            for record in batch {
                outcomes.push(self.machine.expire(record).await);
            }
        }

        let verdict = BatchVerdict::from_outcomes(&outcomes, self.settings.success_threshold);
        info!(
            attempted = verdict.attempted,
            successes = verdict.successes,
            failures = verdict.failures,
            success_rate = verdict.success_rate,
            meets_threshold = verdict.meets_threshold,
            "file verdict"
        );
        (verdict, outcomes)
    }
}
