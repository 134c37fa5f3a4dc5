//! Bulk eSIM profile deactivation against a Remote SIM Provisioning (RSP)
//! platform.
//!
//! Records whose ICCID falls inside the configured eSIM range are expired
//! through the RSP ExpireOrder operation, in paced batches, with per-record
//! retries. File transfer, reporting and notification are left to the
//! [`RecordSource`], [`FileMover`] and [`OutcomeSink`] collaborators.
//!
//! ```no_run
//! # use esim_deactivation::*;
//! # async fn run<S: RecordSource, M: FileMover, K: OutcomeSink>(
//! #     source: S, mover: M, sink: K,
//! # ) -> anyhow::Result<()> {
//! let config = load_config(std::path::Path::new("config/prod.toml"))?;
//! init_logging(&config)?;
//! let run = bootstrap(&config, source, mover, sink)?;
//! let summary = run.execute().await?;
//! std::process::exit(summary.exit_code());
//! # }
//! ```

use anyhow::Context;
use std::path::Path;
use tracing::info;

pub use esim_deactivation_config::{
    validate_config, AppConfig, ConfigError, ConfigLoader, Environment, ENV_PREFIX,
};
pub use esim_deactivation_engine::{
    BatchOrchestrator, BatchSettings, CollaboratorError, DeactivationMachine, DeactivationRun,
    FileMover, OutcomeSink, RecordSource,
};
pub use esim_deactivation_metrics::{init_tracing, MetricsCollector};
pub use esim_deactivation_retry::{RetryPolicy, TransportBackoff};
pub use esim_deactivation_rsp::{
    FinalProfileStatus, HttpTransport, RequestError, RspClient, RspSettings, SignedTransport,
};
pub use esim_deactivation_types::{
    BatchVerdict, DeactivationRecord, IdentifierRange, OutcomeStats, OutcomeStatus,
    ProcessingOutcome, RunStatus, RunSummary, SuccessReason,
};

/// Load `path` with environment overrides and credentials, then validate.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let config = ConfigLoader::from_file_with_env(path, ENV_PREFIX)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    validate_config(&config).context("invalid configuration")?;
    Ok(config)
}

/// Install the global tracing subscriber from the `logging` section.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    init_tracing(&config.logging.level, config.logging.json)
        .context("failed to initialise logging")
}

/// Build the batch orchestrator over `transport` from configuration.
pub fn build_orchestrator<T: SignedTransport>(
    config: &AppConfig,
    transport: T,
) -> anyhow::Result<BatchOrchestrator<T>> {
    let range = config.identifier_range()?;
    let policy = config.retry_policy()?;
    let settings = config.batch_settings()?;

    info!(
        environment = ?config.environment,
        esim_range = %range,
        batch_size = settings.batch_size,
        max_attempts = policy.max_attempts(),
        "deactivation run configured"
    );
    let machine = DeactivationMachine::new(RspClient::new(transport), policy)
        .with_final_status(config.batch.final_profile_status);
    Ok(BatchOrchestrator::new(machine, range, settings))
}

/// Wire the HTTP transport, client, state machine and orchestrator into a
/// run over the given collaborators.
pub fn bootstrap<S, M, K>(
    config: &AppConfig,
    source: S,
    mover: M,
    sink: K,
) -> anyhow::Result<DeactivationRun<HttpTransport, S, M, K>>
where
    S: RecordSource,
    M: FileMover,
    K: OutcomeSink,
{
    let transport =
        HttpTransport::new(config.rsp_settings()).context("failed to build RSP transport")?;
    let orchestrator = build_orchestrator(config, transport)?;
    Ok(DeactivationRun::new(orchestrator, source, mover, sink))
}
