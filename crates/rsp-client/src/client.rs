use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::RequestError;
use crate::transport::SignedTransport;
use crate::wire::{
    endpoints, ExpireOrderRequest, FunctionHeader, HeaderOnlyRequest, IccidRequest,
    OrderInfoRequest,
};

/// Typed ES2+ operations over a [`SignedTransport`].
///
/// Replies are returned as raw JSON; interpreting them is left to callers,
/// e.g. [`ExpireOrderStatus::from_body`](crate::ExpireOrderStatus::from_body).
#[derive(Debug, Clone)]
pub struct RspClient<T> {
    transport: T,
}

impl<T: SignedTransport> RspClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<Value, RequestError> {
        let body = serde_json::to_value(body).map_err(|e| RequestError::Serialize(e.to_string()))?;
        self.transport.execute(endpoint, &body).await
    }

    pub async fn expire_order(&self, request: &ExpireOrderRequest) -> Result<Value, RequestError> {
        info!(
            iccid = %request.iccid,
            final_status = ?request.final_profile_status_indicator,
            "calling ExpireOrder"
        );
        self.post(endpoints::EXPIRE_ORDER, request).await
    }

    pub async fn order_info(
        &self,
        iccid: &str,
        eid: Option<&str>,
        matching_id: Option<&str>,
    ) -> Result<Value, RequestError> {
        let request = OrderInfoRequest {
            iccid: iccid.to_string(),
            eid: eid.map(str::to_string),
            matching_id: matching_id.map(str::to_string),
            header: FunctionHeader::new("getOrderInfo"),
        };
        self.post(endpoints::ORDER_INFO, &request).await
    }

    pub async fn profile_info(&self, iccid: &str) -> Result<Value, RequestError> {
        let request = IccidRequest {
            iccid: iccid.to_string(),
            header: FunctionHeader::new("profileInfo"),
        };
        self.post(endpoints::PROFILE_INFO, &request).await
    }

    pub async fn transaction_list(&self, iccid: &str) -> Result<Value, RequestError> {
        let request = IccidRequest {
            iccid: iccid.to_string(),
            header: FunctionHeader::new("listTransaction"),
        };
        self.post(endpoints::TRANSACTION_LIST, &request).await
    }

    pub async fn health_status(&self) -> Result<Value, RequestError> {
        let request = HeaderOnlyRequest {
            header: FunctionHeader::new("healthCheck"),
        };
        self.post(endpoints::HEALTH_STATUS, &request).await
    }
}
