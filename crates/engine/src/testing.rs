//! Test doubles shared by the engine unit tests.

use async_trait::async_trait;
use esim_deactivation_rsp::{RequestError, SignedTransport};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Reply = Result<Value, RequestError>;

#[derive(Default)]
struct Script {
    fallback: Option<Reply>,
    queued: VecDeque<Reply>,
    per_iccid: HashMap<String, Reply>,
    bodies: Vec<Value>,
}

/// Transport returning scripted replies and counting calls.
///
/// Replies are taken from, in order: a per-ICCID override, the queued
/// sequence, then the fallback reply.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn always(body: Value) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().fallback = Some(Ok(body));
        transport
    }

    pub fn always_err(err: RequestError) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().fallback = Some(Err(err));
        transport
    }

    pub fn sequence(replies: Vec<Reply>) -> Self {
        let transport = Self::default();
        transport.script.lock().unwrap().queued = replies.into();
        transport
    }

    pub fn with_reply_for(self, iccid: &str, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .per_iccid
            .insert(iccid.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.lock().unwrap().bodies.len()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.script.lock().unwrap().bodies.last().cloned()
    }

    pub fn iccids(&self) -> Vec<String> {
        self.script
            .lock()
            .unwrap()
            .bodies
            .iter()
            .filter_map(|b| b["iccid"].as_str().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl SignedTransport for ScriptedTransport {
    async fn execute(&self, _endpoint: &str, body: &Value) -> Result<Value, RequestError> {
        let mut script = self.script.lock().unwrap();
        script.bodies.push(body.clone());

        let iccid = body["iccid"].as_str().unwrap_or_default();
        if let Some(reply) = script.per_iccid.get(iccid) {
            return reply.clone();
        }
        if let Some(reply) = script.queued.pop_front() {
            return reply;
        }
        script
            .fallback
            .clone()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

pub fn executed() -> Value {
    json!({"header": {"functionExecutionStatus": {"status": "Executed-Success"}}})
}

pub fn business_failure(subject: &str, reason: &str, message: &str) -> Value {
    json!({"header": {"functionExecutionStatus": {
        "status": "Failed",
        "statusCodeData": {"subjectCode": subject, "reasonCode": reason, "message": message}
    }}})
}

pub fn already_expired() -> Value {
    business_failure("8.2.1", "3.3", "Expire order not exist")
}
