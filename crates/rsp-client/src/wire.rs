//! ES2+ request and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

pub mod endpoints {
    pub const EXPIRE_ORDER: &str = "/redtea/rsp2/es2plus/order/expire";
    pub const ORDER_INFO: &str = "/redtea/rsp2/es2plus/order/info";
    pub const PROFILE_INFO: &str = "/redtea/rsp2/es2plus/profile/info";
    pub const TRANSACTION_LIST: &str = "/redtea/rsp2/es2plus/transaction/list";
    pub const HEALTH_STATUS: &str = "/redtea/rsp2/es2plus/health/status";
}

/// Business code returned when no active order exists for the ICCID.
pub const ALREADY_EXPIRED_CODE: &str = "8.2.1/3.3";

pub const STATUS_EXECUTED_SUCCESS: &str = "Executed-Success";
pub const STATUS_FAILED: &str = "Failed";

/// The `header` object carried by every ES2+ request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionHeader {
    pub function_requester_identifier: String,
    pub function_call_identifier: String,
}

impl FunctionHeader {
    pub fn new(function_call_identifier: impl Into<String>) -> Self {
        Self {
            function_requester_identifier: Uuid::new_v4().to_string(),
            function_call_identifier: function_call_identifier.into(),
        }
    }
}

/// Final state requested for the profile when its order is expired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalProfileStatus {
    #[default]
    Unavailable,
    Available,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpireOrderRequest {
    pub iccid: String,
    pub final_profile_status_indicator: FinalProfileStatus,
    pub header: FunctionHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,
}

impl ExpireOrderRequest {
    pub fn new(iccid: impl Into<String>, final_status: FinalProfileStatus) -> Self {
        Self {
            iccid: iccid.into(),
            final_profile_status_indicator: final_status,
            header: FunctionHeader::new("expireOrder"),
            matching_id: None,
            eid: None,
        }
    }

    /// Blank values are treated as absent.
    pub fn with_matching_id(mut self, matching_id: Option<&str>) -> Self {
        self.matching_id = non_blank(matching_id);
        self
    }

    /// Blank values are treated as absent.
    pub fn with_eid(mut self, eid: Option<&str>) -> Self {
        self.eid = non_blank(eid);
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfoRequest {
    pub iccid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_id: Option<String>,
    pub header: FunctionHeader,
}

/// Body shared by requests keyed only on the ICCID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IccidRequest {
    pub iccid: String,
    pub header: FunctionHeader,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderOnlyRequest {
    pub header: FunctionHeader,
}

/// `subjectCode/reasonCode` pair reported with a failed execution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BusinessCode {
    pub subject_code: String,
    pub reason_code: String,
}

impl BusinessCode {
    pub fn new(subject_code: impl Into<String>, reason_code: impl Into<String>) -> Self {
        Self {
            subject_code: subject_code.into(),
            reason_code: reason_code.into(),
        }
    }

    /// No order to expire: the profile is already in the target state.
    pub fn is_already_expired(&self) -> bool {
        self.to_string() == ALREADY_EXPIRED_CODE
    }
}

impl fmt::Display for BusinessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject_code, self.reason_code)
    }
}

/// Interpretation of `functionExecutionStatus` in an expire-order reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpireOrderStatus {
    Executed,
    Failed { code: BusinessCode, message: String },
    /// Status absent or outside the known vocabulary.
    Unrecognized { status: Option<String> },
}

impl ExpireOrderStatus {
    /// Reads `header.functionExecutionStatus`, falling back to
    /// `response.header.functionExecutionStatus` for wrapped replies.
    pub fn from_body(body: &Value) -> Self {
        let execution = body
            .pointer("/header/functionExecutionStatus")
            .filter(|v| v.is_object())
            .or_else(|| body.pointer("/response/header/functionExecutionStatus"));

        let Some(execution) = execution else {
            return ExpireOrderStatus::Unrecognized { status: None };
        };

        let status = execution.get("status").and_then(Value::as_str);
        match status {
            Some(STATUS_EXECUTED_SUCCESS) => ExpireOrderStatus::Executed,
            Some(STATUS_FAILED) => {
                let data = execution.get("statusCodeData");
                let field = |name: &str| {
                    data.and_then(|d| d.get(name))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                let message = data
                    .and_then(|d| d.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string();

                ExpireOrderStatus::Failed {
                    code: BusinessCode::new(field("subjectCode"), field("reasonCode")),
                    message,
                }
            }
            other => ExpireOrderStatus::Unrecognized {
                status: other.map(str::to_string),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expire_request_body() {
        let request = ExpireOrderRequest::new("89238010000101567890", FinalProfileStatus::default())
            .with_matching_id(Some("MATCH-1"))
            .with_eid(Some("  "));

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["iccid"], "89238010000101567890");
        assert_eq!(body["finalProfileStatusIndicator"], "Unavailable");
        assert_eq!(body["header"]["functionCallIdentifier"], "expireOrder");
        assert_eq!(
            body["header"]["functionRequesterIdentifier"]
                .as_str()
                .unwrap()
                .len(),
            36
        );
        assert_eq!(body["matchingId"], "MATCH-1");
        assert!(body.get("eid").is_none());
    }

    #[test]
    fn test_status_executed() {
        let body = json!({"header": {"functionExecutionStatus": {"status": "Executed-Success"}}});
        assert_eq!(ExpireOrderStatus::from_body(&body), ExpireOrderStatus::Executed);
    }

    #[test]
    fn test_status_wrapped_in_response() {
        let body = json!({
            "response": {"header": {"functionExecutionStatus": {
                "status": "Failed",
                "statusCodeData": {"subjectCode": "8.2.1", "reasonCode": "3.3", "message": "Order not exist"}
            }}}
        });

        match ExpireOrderStatus::from_body(&body) {
            ExpireOrderStatus::Failed { code, message } => {
                assert!(code.is_already_expired());
                assert_eq!(code.to_string(), "8.2.1/3.3");
                assert_eq!(message, "Order not exist");
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_failed_without_code_data() {
        let body = json!({"header": {"functionExecutionStatus": {"status": "Failed"}}});
        assert_eq!(
            ExpireOrderStatus::from_body(&body),
            ExpireOrderStatus::Failed {
                code: BusinessCode::new("", ""),
                message: "Unknown error".to_string(),
            }
        );
    }

    #[test]
    fn test_unrecognized_status() {
        let absent = json!({"header": {}});
        assert_eq!(
            ExpireOrderStatus::from_body(&absent),
            ExpireOrderStatus::Unrecognized { status: None }
        );

        let odd = json!({"header": {"functionExecutionStatus": {"status": "Executed-WithWarning"}}});
        assert_eq!(
            ExpireOrderStatus::from_body(&odd),
            ExpireOrderStatus::Unrecognized {
                status: Some("Executed-WithWarning".to_string())
            }
        );

        // A bare string in place of the status object is not understood.
        let flat = json!({"header": {"functionExecutionStatus": "Executed-Success"}});
        assert_eq!(
            ExpireOrderStatus::from_body(&flat),
            ExpireOrderStatus::Unrecognized { status: None }
        );
    }
}
