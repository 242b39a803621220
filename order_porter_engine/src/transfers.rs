//! Re-listing orders by URL transfer.
//!
//! A transfer is built from what the store knows about the order. The order token comes from the merged record unless
//! the caller supplies one, and the order must not have been flagged as ineligible for URL transfers.
use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vivid_tools::{fields::TRANSFER_VIA_URL, OrderRecord, TransferRequest, TransferResult, VividApiError};

use crate::{
    store_actor::{StoreError, StoreHandle},
    traits::OrderSource,
};

#[derive(Debug, Clone, Error)]
pub enum TransferError {
    #[error("Order #{0} is not in the store")]
    UnknownOrder(String),
    #[error("Order #{0} cannot be transferred by URL")]
    NotTransferable(String),
    #[error("Order #{0} has no order token. Fetch its detail first or supply the token.")]
    MissingOrderToken(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Vendor(#[from] VividApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the operator wants to transfer. Blank URLs are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferOrder {
    pub order_id: String,
    #[serde(default)]
    pub urls: Vec<String>,
    /// Overrides the record's `orderToken`.
    #[serde(default)]
    pub order_token: Option<String>,
    /// Overrides the configured transfer source.
    #[serde(default)]
    pub transfer_source: Option<String>,
    #[serde(default)]
    pub transfer_source_url: Option<String>,
}

impl TransferOrder {
    pub fn new(order_id: &str, urls: Vec<String>) -> Self {
        Self { order_id: order_id.trim().to_string(), urls, ..Default::default() }
    }
}

/// An order is blocked only when the vendor has explicitly said it cannot take a URL transfer. Orders that have not
/// been enriched yet carry no flag and are allowed through; the vendor has the final say.
pub fn check_eligibility(order_id: &str, record: &OrderRecord) -> Result<(), TransferError> {
    match record.get(TRANSFER_VIA_URL) {
        Some(_) if !record.is_transferable() => Err(TransferError::NotTransferable(order_id.to_string())),
        _ => Ok(()),
    }
}

/// Builds the vendor request for `order` from the merged record.
pub fn build_request(order: &TransferOrder, record: &OrderRecord) -> Result<TransferRequest, TransferError> {
    let order_id = order.order_id.as_str();
    check_eligibility(order_id, record)?;
    let token = order
        .order_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| record.order_token())
        .ok_or_else(|| TransferError::MissingOrderToken(order_id.to_string()))?;
    let mut request = TransferRequest::new(order_id, token, order.urls.clone());
    if let Some(source) = order.transfer_source.as_deref().filter(|s| !s.trim().is_empty()) {
        request = request.with_source(source, order.transfer_source_url.clone());
    } else {
        request.transfer_source_url = order.transfer_source_url.clone();
    }
    request.validate().map_err(TransferError::InvalidRequest)?;
    Ok(request)
}

/// Looks the order up in the store, builds the request and submits it.
pub async fn submit_transfer(
    source: &dyn OrderSource,
    store: &StoreHandle,
    order: &TransferOrder,
) -> Result<TransferResult, TransferError> {
    let record =
        store.get(&order.order_id).await?.ok_or_else(|| TransferError::UnknownOrder(order.order_id.clone()))?;
    let request = build_request(order, &record)?;
    debug!("🎫️ Transferring order #{} to {} URL(s)", order.order_id, request.transfer_urls.len());
    let result = source.submit_transfer(&request).await?;
    Ok(result)
}
