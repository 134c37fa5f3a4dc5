use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::{OutcomeStatus, ProcessingOutcome, SuccessReason};

/// Ratio of successes over attempted records; 0.0 when nothing was attempted.
fn rate(successes: usize, failures: usize) -> f64 {
    let attempted = successes + failures;
    if attempted == 0 {
        0.0
    } else {
        successes as f64 / attempted as f64
    }
}

/// Per-file success verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerdict {
    /// Records that reached the state machine (SUCCESS + FAILED).
    pub attempted: usize,
    pub successes: usize,
    pub failures: usize,
    pub invalid: usize,
    pub skipped: usize,
    pub success_rate: f64,
    pub threshold: f64,
    pub meets_threshold: bool,
}

impl BatchVerdict {
    pub fn from_outcomes(outcomes: &[ProcessingOutcome], threshold: f64) -> Self {
        let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();

        let successes = count(OutcomeStatus::Success);
        let failures = count(OutcomeStatus::Failed);
        let attempted = successes + failures;
        let success_rate = rate(successes, failures);

        Self {
            attempted,
            successes,
            failures,
            invalid: count(OutcomeStatus::Invalid),
            skipped: count(OutcomeStatus::Skipped),
            success_rate,
            threshold,
            // Nothing attempted is trivially successful.
            meets_threshold: attempted == 0 || success_rate >= threshold,
        }
    }
}

/// Aggregate counters over a set of outcomes, used in run summaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeStats {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub invalid: usize,
    pub skipped: usize,
    pub deactivated: usize,
    pub already_expired: usize,
    pub success_rate: f64,
    pub avg_processing_millis: f64,
}

impl OutcomeStats {
    pub fn from_outcomes(outcomes: &[ProcessingOutcome]) -> Self {
        let mut stats = OutcomeStats {
            total: outcomes.len(),
            ..Default::default()
        };

        let mut attempted_millis = 0u64;
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Success => stats.successes += 1,
                OutcomeStatus::Failed => stats.failures += 1,
                OutcomeStatus::Invalid => stats.invalid += 1,
                OutcomeStatus::Skipped => stats.skipped += 1,
            }
            match outcome.success_reason {
                Some(SuccessReason::Deactivated) => stats.deactivated += 1,
                Some(SuccessReason::AlreadyExpired) => stats.already_expired += 1,
                None => {}
            }
            if outcome.status.is_attempted() {
                attempted_millis = attempted_millis.saturating_add(outcome.elapsed_millis);
            }
        }

        let attempted = stats.successes + stats.failures;
        stats.success_rate = rate(stats.successes, stats.failures);
        if attempted > 0 {
            stats.avg_processing_millis = attempted_millis as f64 / attempted as f64;
        }
        stats
    }
}

/// Overall state of a run across all discovered files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NoFiles,
    Completed,
    Partial,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::NoFiles => "no_files",
            RunStatus::Completed => "completed",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files_processed: Vec<String>,
    pub files_failed: Vec<String>,
    pub stats: OutcomeStats,
}

impl RunSummary {
    pub fn files_total(&self) -> usize {
        self.files_processed.len() + self.files_failed.len()
    }

    pub fn status(&self) -> RunStatus {
        match (self.files_processed.is_empty(), self.files_failed.is_empty()) {
            (true, true) => RunStatus::NoFiles,
            (false, true) => RunStatus::Completed,
            (false, false) => RunStatus::Partial,
            (true, false) => RunStatus::Failed,
        }
    }

    /// Process exit code: non-zero only when every file failed.
    pub fn exit_code(&self) -> i32 {
        match self.status() {
            RunStatus::Failed => 1,
            _ => 0,
        }
    }
}
