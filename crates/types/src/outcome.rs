use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::record::DeactivationRecord;

/// Terminal status of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Invalid,
    Skipped,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "SUCCESS",
            OutcomeStatus::Failed => "FAILED",
            OutcomeStatus::Invalid => "INVALID",
            OutcomeStatus::Skipped => "SKIPPED",
        }
    }

    /// Whether the record reached the remote platform and counts toward the
    /// success rate.
    pub fn is_attempted(&self) -> bool {
        matches!(self, OutcomeStatus::Success | OutcomeStatus::Failed)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a SUCCESS outcome counts as a success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuccessReason {
    /// The platform executed the expire order.
    Deactivated,
    /// No active order existed; the profile is already in the target state.
    AlreadyExpired,
}

impl SuccessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessReason::Deactivated => "DEACTIVATED",
            SuccessReason::AlreadyExpired => "ALREADY_EXPIRED",
        }
    }
}

impl fmt::Display for SuccessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of processing a record, before it is stamped into a
/// [`ProcessingOutcome`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Success { reason: SuccessReason },
    Failed { message: String },
    Invalid { reason: String },
    Skipped { reason: String },
}

impl Resolution {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Resolution::Success { .. } => OutcomeStatus::Success,
            Resolution::Failed { .. } => OutcomeStatus::Failed,
            Resolution::Invalid { .. } => OutcomeStatus::Invalid,
            Resolution::Skipped { .. } => OutcomeStatus::Skipped,
        }
    }
}

/// Result of attempting deactivation for one record. Built once, at the
/// terminal state, and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    pub iccid: String,
    pub imsi: Option<String>,
    pub msisdn: Option<String>,
    pub source_file: String,
    pub status: OutcomeStatus,
    pub success_reason: Option<SuccessReason>,
    pub error_message: Option<String>,
    /// Last `subjectCode/reasonCode` reported by the platform. `None` after
    /// an executed ExpireOrder.
    pub business_code: Option<String>,
    pub attempts_used: u32,
    pub elapsed_millis: u64,
    pub processed_at: DateTime<Utc>,
}

impl ProcessingOutcome {
    pub fn new(
        record: &DeactivationRecord,
        resolution: Resolution,
        attempts_used: u32,
        elapsed: Duration,
        business_code: Option<String>,
    ) -> Self {
        let status = resolution.status();
        let (success_reason, error_message) = match resolution {
            Resolution::Success { reason } => (Some(reason), None),
            Resolution::Failed { message } => (None, Some(message)),
            Resolution::Invalid { reason } | Resolution::Skipped { reason } => {
                (None, Some(reason))
            }
        };

        Self {
            iccid: record.iccid.clone(),
            imsi: record.imsi.clone(),
            msisdn: record.msisdn.clone(),
            source_file: record.source_file.clone(),
            status,
            success_reason,
            error_message,
            business_code,
            attempts_used,
            elapsed_millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            processed_at: Utc::now(),
        }
    }

    /// Outcome for a record rejected before any remote call.
    pub fn invalid(record: &DeactivationRecord, reason: impl Into<String>) -> Self {
        Self::new(
            record,
            Resolution::Invalid {
                reason: reason.into(),
            },
            0,
            Duration::ZERO,
            None,
        )
    }

    /// Outcome for a well-formed record that is not eligible for deactivation.
    pub fn skipped(record: &DeactivationRecord, reason: impl Into<String>) -> Self {
        Self::new(
            record,
            Resolution::Skipped {
                reason: reason.into(),
            },
            0,
            Duration::ZERO,
            None,
        )
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
