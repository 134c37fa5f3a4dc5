//! Deactivation engine: drives the ExpireOrder operation per record,
//! processes files in paced batches and runs over every discovered file.

pub mod batch;
pub mod machine;
pub mod run;

#[cfg(test)]
mod testing;

pub use batch::{BatchOrchestrator, BatchSettings, Screening};
pub use machine::DeactivationMachine;
pub use run::{CollaboratorError, DeactivationRun, FileMover, OutcomeSink, RecordSource};
