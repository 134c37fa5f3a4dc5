use async_trait::async_trait;
use chrono::Utc;
use esim_deactivation_metrics::{FileSpan, FileVerdict, MetricsCollector, RunId};
use esim_deactivation_rsp::SignedTransport;
use esim_deactivation_types::{
    BatchVerdict, DeactivationRecord, OutcomeStats, ProcessingOutcome, RunStatus, RunSummary,
};
use thiserror::Error;
use tracing::{error, info, warn, Instrument};

use crate::batch::BatchOrchestrator;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("file discovery failed: {0}")]
    Discovery(String),

    #[error("failed to load {file}: {message}")]
    Load { file: String, message: String },

    #[error("failed to mark {file} complete: {message}")]
    Move { file: String, message: String },

    #[error("failed to publish outcomes: {0}")]
    Publish(String),
}

/// Supplies the files of a run and the records parsed from each.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn discover(&self) -> Result<Vec<String>, CollaboratorError>;

    async fn load(&self, file: &str) -> Result<Vec<DeactivationRecord>, CollaboratorError>;
}

/// Archives a file once its verdict meets the threshold.
#[async_trait]
pub trait FileMover: Send + Sync {
    async fn mark_complete(
        &self,
        file: &str,
        verdict: &BatchVerdict,
    ) -> Result<(), CollaboratorError>;
}

/// Receives every outcome of a run, e.g. for reports and notifications.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn publish(
        &self,
        summary: &RunSummary,
        outcomes: &[ProcessingOutcome],
    ) -> Result<(), CollaboratorError>;
}

/// One full pass over every file offered by the [`RecordSource`].
pub struct DeactivationRun<T, S, M, K> {
    orchestrator: BatchOrchestrator<T>,
    source: S,
    mover: M,
    sink: K,
    metrics: MetricsCollector,
}

impl<T, S, M, K> DeactivationRun<T, S, M, K>
where
    T: SignedTransport,
    S: RecordSource,
    M: FileMover,
    K: OutcomeSink,
{
    pub fn new(orchestrator: BatchOrchestrator<T>, source: S, mover: M, sink: K) -> Self {
        Self {
            orchestrator,
            source,
            mover,
            sink,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator<T> {
        &self.orchestrator
    }

    /// Process every discovered file, then publish all outcomes once.
    ///
    /// Only discovery failure is returned as an error. Load and move
    /// failures mark the file failed; a publish failure is logged.
    pub async fn execute(&self) -> Result<RunSummary, CollaboratorError> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        info!(run_id = %run_id, "starting deactivation run");

        let mut files = self.source.discover().await?;
        files.sort();
        if files.is_empty() {
            warn!(run_id = %run_id, "no files found to process");
        }

        let mut files_processed = Vec::new();
        let mut files_failed = Vec::new();
        let mut all_outcomes = Vec::new();

        for file in files {
            let span = FileSpan::new(run_id, file.as_str()).span();
            let (completed, outcomes) = self.process_one(&file).instrument(span).await;
            all_outcomes.extend(outcomes);

            if completed {
                files_processed.push(file);
            } else {
                files_failed.push(file);
            }
        }

        let summary = RunSummary {
            run_id: run_id.to_string(),
            started_at,
            finished_at: Utc::now(),
            files_processed,
            files_failed,
            stats: OutcomeStats::from_outcomes(&all_outcomes),
        };

        if let Err(err) = self.sink.publish(&summary, &all_outcomes).await {
            error!(run_id = %run_id, error = %err, "failed to publish run outcomes");
        }

        match summary.status() {
            RunStatus::Failed => {
                error!(run_id = %run_id, "run completed with errors, all files failed")
            }
            RunStatus::Partial => warn!(run_id = %run_id, "run completed with partial success"),
            RunStatus::Completed | RunStatus::NoFiles => {
                info!(run_id = %run_id, "run completed successfully")
            }
        }
        info!(
            run_id = %run_id,
            files_processed = summary.files_processed.len(),
            files_failed = summary.files_failed.len(),
            total = summary.stats.total,
            successes = summary.stats.successes,
            failures = summary.stats.failures,
            success_rate = summary.stats.success_rate,
            "run summary"
        );
        self.metrics.record_run(&summary);

        Ok(summary)
    }

    /// Returns whether the file was marked complete, plus its outcomes.
    async fn process_one(&self, file: &str) -> (bool, Vec<ProcessingOutcome>) {
        info!("processing file");

        let mut records = match self.source.load(file).await {
            Ok(records) => records,
            Err(err) => {
                error!(error = %err, "failed to load file");
                self.metrics.record_file(FileVerdict::LoadError);
                return (false, Vec::new());
            }
        };
        for record in records.iter_mut().filter(|r| r.source_file.is_empty()) {
            record.source_file = file.to_string();
        }

        let (verdict, outcomes) = self.orchestrator.process_file(&records).await;
        self.metrics.record_verdict(&verdict);

        if !verdict.meets_threshold {
            warn!(
                success_rate = verdict.success_rate,
                threshold = verdict.threshold,
                "file below success threshold, not moved"
            );
            return (false, outcomes);
        }

        match self.mover.mark_complete(file, &verdict).await {
            Ok(()) => {
                info!("file processed successfully");
                (true, outcomes)
            }
            Err(err) => {
                error!(error = %err, "failed to mark file complete");
                self.metrics.record_file(FileVerdict::MoveError);
                (false, outcomes)
            }
        }
    }
}
