use thiserror::Error;

/// Transport-level failure of a signed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request to {endpoint} timed out after {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status} | Response: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {endpoint}: {message}")]
    Decode {
        endpoint: String,
        message: String,
        body: String,
    },

    #[error("failed to serialize request body: {0}")]
    Serialize(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl RequestError {
    /// Response text returned by the platform, when one was received.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            RequestError::Status { body, .. } | RequestError::Decode { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    /// Whether the transport floor may repeat the request.
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx are transient. Other
    /// 4xx responses and local errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            RequestError::Timeout { .. } | RequestError::Connection { .. } => true,
            RequestError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> RequestError {
        RequestError::Status {
            endpoint: "/x".to_string(),
            status: code,
            body: "nope".to_string(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(status(429).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(401).is_transient());
        assert!(RequestError::Timeout {
            endpoint: "/x".to_string(),
            timeout_ms: 10,
        }
        .is_transient());
        assert!(!RequestError::Serialize("bad".to_string()).is_transient());
    }

    #[test]
    fn test_response_body() {
        assert_eq!(status(400).response_body(), Some("nope"));
        assert_eq!(RequestError::Client("tls".to_string()).response_body(), None);
        assert!(status(400).to_string().contains("Response: nope"));
    }
}
