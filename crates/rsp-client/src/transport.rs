use async_trait::async_trait;
use esim_deactivation_retry::TransportBackoff;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::RequestError;
use crate::signing::RequestSigner;

/// Executes a signed POST of a JSON body against an RSP endpoint path.
#[async_trait]
pub trait SignedTransport: Send + Sync {
    async fn execute(&self, endpoint: &str, body: &Value) -> Result<Value, RequestError>;
}

#[async_trait]
impl<T: SignedTransport + ?Sized> SignedTransport for Arc<T> {
    async fn execute(&self, endpoint: &str, body: &Value) -> Result<Value, RequestError> {
        (**self).execute(endpoint, body).await
    }
}

/// Connection settings for [`HttpTransport`].
#[derive(Clone)]
pub struct RspSettings {
    pub base_url: String,
    pub access_key: String,
    pub secret_key: String,
    /// Per-request bound, covering connect, send and body read.
    pub timeout: Duration,
    pub backoff: TransportBackoff,
}

impl RspSettings {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            timeout: Duration::from_secs(10),
            backoff: TransportBackoff::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: TransportBackoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl fmt::Debug for RspSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RspSettings")
            .field("base_url", &self.base_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .finish()
    }
}

/// reqwest-backed transport with a small retry floor for transient faults.
///
/// Every attempt, including floor retries, is signed anew.
#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    signer: RequestSigner,
    timeout: Duration,
    backoff: TransportBackoff,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: RspSettings) -> Result<Self, RequestError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RequestError::Client(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            signer: RequestSigner::new(settings.access_key, settings.secret_key),
            timeout: settings.timeout,
            backoff: settings.backoff,
            http_client,
        })
    }

    /// Construct endpoint URL
    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify(&self, endpoint: &str, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_builder() {
            RequestError::Client(err.to_string())
        } else {
            RequestError::Connection {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    async fn send_once(&self, endpoint: &str, payload: &str) -> Result<Value, RequestError> {
        let headers = self.signer.sign(payload);

        let mut request = self.http_client.post(self.endpoint_url(endpoint));
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        let response = request
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| self.classify(endpoint, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.classify(endpoint, e))?;

        if !status.is_success() {
            return Err(RequestError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| RequestError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
            body: text,
        })
    }
}

#[async_trait]
impl SignedTransport for HttpTransport {
    async fn execute(&self, endpoint: &str, body: &Value) -> Result<Value, RequestError> {
        // The signed string must be byte-identical to the one sent.
        let payload =
            serde_json::to_string(body).map_err(|e| RequestError::Serialize(e.to_string()))?;

        let attempts = self.backoff.attempts();
        let mut attempt = 1;
        loop {
            debug!(endpoint, attempt, "sending signed RSP request");

            match self.send_once(endpoint, &payload).await {
                Ok(value) => {
                    debug!(endpoint, attempt, "RSP request succeeded");
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = self.backoff.delay_before(attempt);
                    warn!(
                        endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient RSP failure, retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(endpoint, attempt, error = %err, "RSP request failed");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_debug_redacts_secret() {
        let settings = RspSettings::new("https://rsp.example", "ak", "top-secret");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("https://rsp.example"));
    }

    #[test]
    fn test_endpoint_url_joins_without_double_slash() {
        let transport =
            HttpTransport::new(RspSettings::new("https://rsp.example/", "ak", "sk")).unwrap();
        assert_eq!(
            transport.endpoint_url("/redtea/rsp2/es2plus/order/expire"),
            "https://rsp.example/redtea/rsp2/es2plus/order/expire"
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = RspSettings::new("https://rsp.example", "ak", "sk");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.backoff.attempts(), 3);
    }
}
