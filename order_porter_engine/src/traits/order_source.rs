use std::sync::Arc;

use async_trait::async_trait;
use vivid_tools::{OrderRecord, OrderStatus, TransferRequest, TransferResult, VividApi, VividApiError, VividConfig};

/// Anything that can answer the four broker API calls.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self, status: OrderStatus) -> Result<Vec<OrderRecord>, VividApiError>;

    /// Every returned record carries the retransfer status.
    async fn fetch_retransfer_pending(&self) -> Result<Vec<OrderRecord>, VividApiError>;

    async fn fetch_order_detail(&self, order_id: &str) -> Result<OrderRecord, VividApiError>;

    async fn submit_transfer(&self, request: &TransferRequest) -> Result<TransferResult, VividApiError>;
}

#[async_trait]
impl OrderSource for VividApi {
    async fn fetch_orders(&self, status: OrderStatus) -> Result<Vec<OrderRecord>, VividApiError> {
        VividApi::fetch_orders(self, status).await
    }

    async fn fetch_retransfer_pending(&self) -> Result<Vec<OrderRecord>, VividApiError> {
        VividApi::fetch_retransfer_pending(self).await
    }

    async fn fetch_order_detail(&self, order_id: &str) -> Result<OrderRecord, VividApiError> {
        VividApi::fetch_order_detail(self, order_id).await
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> Result<TransferResult, VividApiError> {
        VividApi::submit_transfer(self, request).await
    }
}

/// Stands in for the vendor client when no API token has been configured. Every call fails with
/// [`VividApiError::MissingCredential`] before anything is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unauthenticated;

#[async_trait]
impl OrderSource for Unauthenticated {
    async fn fetch_orders(&self, _status: OrderStatus) -> Result<Vec<OrderRecord>, VividApiError> {
        Err(VividApiError::MissingCredential)
    }

    async fn fetch_retransfer_pending(&self) -> Result<Vec<OrderRecord>, VividApiError> {
        Err(VividApiError::MissingCredential)
    }

    async fn fetch_order_detail(&self, _order_id: &str) -> Result<OrderRecord, VividApiError> {
        Err(VividApiError::MissingCredential)
    }

    async fn submit_transfer(&self, _request: &TransferRequest) -> Result<TransferResult, VividApiError> {
        Err(VividApiError::MissingCredential)
    }
}

/// The live vendor client, or [`Unauthenticated`] if the configuration carries no token.
pub fn source_from_config(config: &VividConfig) -> Result<Arc<dyn OrderSource>, VividApiError> {
    match VividApi::new(config.clone()) {
        Ok(api) => Ok(Arc::new(api)),
        Err(VividApiError::MissingCredential) => Ok(Arc::new(Unauthenticated)),
        Err(e) => Err(e),
    }
}
