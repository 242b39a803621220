use std::fmt::Display;

use order_porter_engine::{transfers::TransferOrder, FetchJob, FetchTarget, RecordSource};
use serde::{Deserialize, Serialize};
use vivid_tools::{OrderRecord, OrderStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Body for `POST /fetch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchParams {
    /// Defaults to `PENDING_SHIPMENT`. Ignored when `retransfer` is set.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub retransfer: bool,
    #[serde(default)]
    pub enrich: bool,
    /// Block until the sweep has finished and return its report. Otherwise the sweep runs in the background.
    #[serde(default)]
    pub wait: bool,
}

impl FetchParams {
    pub fn job(&self) -> FetchJob {
        let target = if self.retransfer {
            FetchTarget::RetransferPending
        } else {
            FetchTarget::Status(self.status.unwrap_or_default())
        };
        FetchJob::new(target).with_enrichment(self.enrich)
    }
}

/// Body for `POST /orders/{order_id}/transfer`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferParams {
    pub urls: Vec<String>,
    #[serde(default)]
    pub order_token: Option<String>,
    #[serde(default)]
    pub transfer_source: Option<String>,
    #[serde(default)]
    pub transfer_source_url: Option<String>,
}

impl TransferParams {
    pub fn into_order(self, order_id: &str) -> TransferOrder {
        TransferOrder {
            order_token: self.order_token,
            transfer_source: self.transfer_source,
            transfer_source_url: self.transfer_source_url,
            ..TransferOrder::new(order_id, self.urls)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: OrderRecord,
    pub sources: Vec<RecordSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    pub path: Option<String>,
    pub rows: usize,
}
