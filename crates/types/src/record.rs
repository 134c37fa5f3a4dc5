use serde::{Deserialize, Serialize};

/// Action value marking a record as a deactivation request.
pub const DEACTIVATE_ACTION: &str = "DEACTIVATE";

/// One subscriber identifier to deactivate, as produced by file parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationRecord {
    pub iccid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imsi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msisdn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,

    /// Requested action, e.g. "DEACTIVATE". `None` means unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default)]
    pub source_file: String,
}

impl DeactivationRecord {
    pub fn new(iccid: impl Into<String>) -> Self {
        Self {
            iccid: iccid.into(),
            imsi: None,
            msisdn: None,
            matching_id: None,
            eid: None,
            action: None,
            source_file: String::new(),
        }
    }

    pub fn with_imsi(mut self, imsi: impl Into<String>) -> Self {
        self.imsi = Some(imsi.into());
        self
    }

    pub fn with_msisdn(mut self, msisdn: impl Into<String>) -> Self {
        self.msisdn = Some(msisdn.into());
        self
    }

    pub fn with_matching_id(mut self, matching_id: impl Into<String>) -> Self {
        self.matching_id = Some(matching_id.into());
        self
    }

    pub fn with_eid(mut self, eid: impl Into<String>) -> Self {
        self.eid = Some(eid.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    /// True when no action is given or the action is a deactivation.
    pub fn requests_deactivation(&self) -> bool {
        match &self.action {
            None => true,
            Some(action) => action.trim().eq_ignore_ascii_case(DEACTIVATE_ACTION),
        }
    }
}
