use esim_deactivation_metrics::MetricsCollector;
use esim_deactivation_retry::RetryPolicy;
use esim_deactivation_rsp::{
    BusinessCode, ExpireOrderRequest, ExpireOrderStatus, FinalProfileStatus, RspClient,
    SignedTransport,
};
use esim_deactivation_types::{DeactivationRecord, ProcessingOutcome, Resolution, SuccessReason};
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Result of one ExpireOrder attempt.
enum Attempt {
    Terminal(Resolution),
    Retryable(String),
}

/// Drives ExpireOrder for one record to SUCCESS or FAILED.
///
/// Business failures and transport errors are retried under the
/// [`RetryPolicy`]. The already-expired business code ends the loop as a
/// success, and an unrecognized execution status ends it as a failure
/// without further attempts.
pub struct DeactivationMachine<T> {
    client: RspClient<T>,
    policy: RetryPolicy,
    final_status: FinalProfileStatus,
    metrics: MetricsCollector,
}

impl<T: SignedTransport> DeactivationMachine<T> {
    pub fn new(client: RspClient<T>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            final_status: FinalProfileStatus::default(),
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_final_status(mut self, final_status: FinalProfileStatus) -> Self {
        self.final_status = final_status;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &RspClient<T> {
        &self.client
    }

    pub async fn expire(&self, record: &DeactivationRecord) -> ProcessingOutcome {
        let started = Instant::now();
        let request = ExpireOrderRequest::new(record.iccid.clone(), self.final_status)
            .with_matching_id(record.matching_id.as_deref())
            .with_eid(record.eid.as_deref());

        let max_attempts = self.policy.max_attempts();
        let mut last_code: Option<BusinessCode> = None;
        let mut attempt = 0;

        let resolution = loop {
            attempt += 1;
            info!(iccid = %record.iccid, attempt, max_attempts, "attempting deactivation");

            let result = match self.client.expire_order(&request).await {
                Ok(body) => {
                    let status = ExpireOrderStatus::from_body(&body);
                    self.interpret(record, status, &mut last_code)
                }
                Err(err) => {
                    warn!(iccid = %record.iccid, attempt, error = %err, "RSP request failed");
                    Attempt::Retryable(format!("RSP Client Error: {err}"))
                }
            };

            match result {
                Attempt::Terminal(resolution) => break resolution,
                Attempt::Retryable(message) => {
                    if !self.policy.can_retry(attempt) {
                        error!(
                            iccid = %record.iccid,
                            attempts = attempt,
                            error = %message,
                            "deactivation failed, retries exhausted"
                        );
                        break Resolution::Failed { message };
                    }

                    let delay = self.policy.next_delay_duration(attempt);
                    warn!(
                        iccid = %record.iccid,
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        error = %message,
                        "retrying deactivation"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        };

        let outcome = ProcessingOutcome::new(
            record,
            resolution,
            attempt,
            started.elapsed(),
            last_code.map(|code| code.to_string()),
        );
        info!(
            iccid = %outcome.iccid,
            status = %outcome.status,
            reason = ?outcome.success_reason,
            attempts = outcome.attempts_used,
            elapsed_ms = outcome.elapsed_millis,
            "deactivation finished"
        );
        self.metrics.record_outcome(&outcome);
        outcome
    }

    fn interpret(
        &self,
        record: &DeactivationRecord,
        status: ExpireOrderStatus,
        last_code: &mut Option<BusinessCode>,
    ) -> Attempt {
        match status {
            ExpireOrderStatus::Executed => {
                *last_code = None;
                info!(iccid = %record.iccid, "profile marked as {:?}", self.final_status);
                Attempt::Terminal(Resolution::Success {
                    reason: SuccessReason::Deactivated,
                })
            }
            ExpireOrderStatus::Failed { code, message } => {
                let already_expired = code.is_already_expired();
                let business_code = code.to_string();
                *last_code = Some(code);

                if already_expired {
                    info!(
                        iccid = %record.iccid,
                        business_code = %business_code,
                        "no order to expire, profile already expired"
                    );
                    return Attempt::Terminal(Resolution::Success {
                        reason: SuccessReason::AlreadyExpired,
                    });
                }

                warn!(
                    iccid = %record.iccid,
                    business_code = %business_code,
                    message = %message,
                    "business error from RSP"
                );
                Attempt::Retryable(format!("[{business_code}] {message}"))
            }
            ExpireOrderStatus::Unrecognized { status } => {
                let status = status.as_deref().unwrap_or("None");
                error!(iccid = %record.iccid, status, "unexpected execution status");
                Attempt::Terminal(Resolution::Failed {
                    message: format!("Unexpected API status: {status}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{already_expired, business_failure, executed, ScriptedTransport};
    use esim_deactivation_rsp::RequestError;
    use esim_deactivation_types::OutcomeStatus;
    use serde_json::json;
    use std::time::Duration;

    fn machine(transport: ScriptedTransport) -> DeactivationMachine<ScriptedTransport> {
        DeactivationMachine::new(
            RspClient::new(transport),
            RetryPolicy::new(3, 5.0, 2.0).unwrap(),
        )
    }

    fn record() -> DeactivationRecord {
        DeactivationRecord::new("89238010000101567890").with_source_file("NGIN_DataFile_1.xml")
    }

    #[tokio::test(start_paused = true)]
    async fn test_executed_is_deactivated() {
        let machine = machine(ScriptedTransport::always(executed()));
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.success_reason, Some(SuccessReason::Deactivated));
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(outcome.elapsed_millis, 0);
        assert_eq!(outcome.source_file, "NGIN_DataFile_1.xml");
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_expired_is_success_without_retry() {
        let transport = ScriptedTransport::always(already_expired());
        let machine = machine(transport.clone());
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.success_reason, Some(SuccessReason::AlreadyExpired));
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(outcome.business_code.as_deref(), Some("8.2.1/3.3"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_business_failure_exhausts_attempts() {
        let transport = ScriptedTransport::always(business_failure("1.2", "4.5", "Profile busy"));
        let machine = machine(transport.clone());
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.attempts_used, 3);
        assert_eq!(outcome.error_message.as_deref(), Some("[1.2/4.5] Profile busy"));
        assert_eq!(outcome.business_code.as_deref(), Some("1.2/4.5"));
        assert_eq!(transport.calls(), 3);
        // Waited 5s then 10s between the three attempts.
        assert_eq!(outcome.elapsed_millis, 15_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_exhausts_attempts() {
        let transport = ScriptedTransport::always_err(RequestError::Connection {
            endpoint: "/redtea/rsp2/es2plus/order/expire".to_string(),
            message: "connection refused".to_string(),
        });
        let machine = machine(transport.clone());
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.attempts_used, 3);
        assert_eq!(transport.calls(), 3);
        assert!(outcome
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("RSP Client Error:"));
        assert_eq!(outcome.business_code, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_status_fails_immediately() {
        let transport = ScriptedTransport::always(json!({"header": {}}));
        let machine = machine(transport.clone());
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Unexpected API status: None")
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let transport = ScriptedTransport::sequence(vec![
            Err(RequestError::Timeout {
                endpoint: "/x".to_string(),
                timeout_ms: 10_000,
            }),
            Ok(business_failure("1.2", "4.5", "busy")),
            Ok(executed()),
        ]);
        let machine = machine(transport.clone());
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.success_reason, Some(SuccessReason::Deactivated));
        assert_eq!(outcome.attempts_used, 3);
        assert_eq!(outcome.error_message, None);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_drops_earlier_business_code() {
        let transport = ScriptedTransport::sequence(vec![
            Ok(business_failure("1.2", "4.5", "busy")),
            Ok(executed()),
        ]);
        let outcome = machine(transport).expire(&record()).await;

        assert_eq!(outcome.success_reason, Some(SuccessReason::Deactivated));
        assert_eq!(outcome.attempts_used, 2);
        assert_eq!(outcome.business_code, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_carries_optional_fields() {
        let transport = ScriptedTransport::always(executed());
        let machine = machine(transport.clone()).with_final_status(FinalProfileStatus::Available);
        let record = record().with_matching_id("MATCH-1").with_eid("");

        machine.expire(&record).await;

        let body = transport.last_body().unwrap();
        assert_eq!(body["iccid"], "89238010000101567890");
        assert_eq!(body["finalProfileStatusIndicator"], "Available");
        assert_eq!(body["matchingId"], "MATCH-1");
        assert!(body.get("eid").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy() {
        let transport = ScriptedTransport::always(business_failure("1.2", "4.5", "busy"));
        let machine = DeactivationMachine::new(
            RspClient::new(transport.clone()),
            RetryPolicy::new(1, 5.0, 2.0).unwrap(),
        );

        let started = Instant::now();
        let outcome = machine.expire(&record()).await;

        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(transport.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
