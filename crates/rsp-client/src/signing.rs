use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Value of the `Sign-Method` header.
pub const SIGN_METHOD: &str = "SHA256";

/// Authentication metadata attached to one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    pub access_key: String,
    pub request_id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignedHeaders {
    /// Header name/value pairs in the order the platform documents them.
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("Content-Type", "application/json"),
            ("Access-Key", self.access_key.as_str()),
            ("Request-ID", self.request_id.as_str()),
            ("Timestamp", self.timestamp.as_str()),
            ("Sign-Method", SIGN_METHOD),
            ("Signature", self.signature.as_str()),
        ]
    }
}

/// Signs request bodies with the shared secret.
#[derive(Clone)]
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
}

impl RequestSigner {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Sign `body` with a fresh request id and the current time.
    pub fn sign(&self, body: &str) -> SignedHeaders {
        let request_id = Uuid::new_v4().to_string();
        let timestamp = current_timestamp_millis().to_string();
        let signature = self.digest(&timestamp, &request_id, body);

        SignedHeaders {
            access_key: self.access_key.clone(),
            request_id,
            timestamp,
            signature,
        }
    }

    /// `hex(sha256(timestamp ++ request_id ++ body ++ secret))`
    pub fn digest(&self, timestamp: &str, request_id: &str, body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(timestamp.as_bytes());
        hasher.update(request_id.as_bytes());
        hasher.update(body.as_bytes());
        hasher.update(self.secret_key.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
