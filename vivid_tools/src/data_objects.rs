use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status value attached to every order returned by the retransfer-pending endpoint.
pub const RETRANSFER_STATUS: &str = "PENDING_RETRANSFER";

/// The order statuses that can be requested from the `getOrders` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unconfirmed,
    #[default]
    PendingShipment,
    Completed,
    Verification,
    PendingReservation,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Unconfirmed,
        OrderStatus::PendingShipment,
        OrderStatus::Completed,
        OrderStatus::Verification,
        OrderStatus::PendingReservation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unconfirmed => "UNCONFIRMED",
            OrderStatus::PendingShipment => "PENDING_SHIPMENT",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Verification => "VERIFICATION",
            OrderStatus::PendingReservation => "PENDING_RESERVATION",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown order status: {0}. Expected one of UNCONFIRMED, PENDING_SHIPMENT, COMPLETED, VERIFICATION, PENDING_RESERVATION")]
pub struct UnknownOrderStatus(String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownOrderStatus(s.to_string()))
    }
}

/// A request to re-list an order by handing the vendor one or more transfer URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferRequest {
    pub order_id: String,
    pub order_token: String,
    pub transfer_urls: Vec<String>,
    /// Where the tickets were transferred from. Falls back to the configured default when empty.
    #[serde(default)]
    pub transfer_source: String,
    #[serde(default)]
    pub transfer_source_url: Option<String>,
}

impl TransferRequest {
    pub fn new(order_id: &str, order_token: &str, transfer_urls: Vec<String>) -> Self {
        Self {
            order_id: order_id.trim().to_string(),
            order_token: order_token.trim().to_string(),
            transfer_urls,
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: &str, source_url: Option<String>) -> Self {
        self.transfer_source = source.to_string();
        self.transfer_source_url = source_url;
        self
    }

    /// Blank URLs are dropped. At least one URL, the order id and the order token must remain.
    pub fn validate(&self) -> Result<Vec<&str>, String> {
        if self.order_id.is_empty() {
            return Err("An order id is required".to_string());
        }
        if self.order_token.is_empty() {
            return Err(format!("Order {} has no order token", self.order_id));
        }
        let urls = self.transfer_urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect::<Vec<&str>>();
        if urls.is_empty() {
            return Err("At least one transfer URL is required".to_string());
        }
        Ok(urls)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn statuses_parse_leniently() {
        assert_eq!("pending_shipment".parse::<OrderStatus>().unwrap(), OrderStatus::PendingShipment);
        assert_eq!("Pending-Reservation".parse::<OrderStatus>().unwrap(), OrderStatus::PendingReservation);
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn transfer_requests_need_urls_and_a_token() {
        let req = TransferRequest::new("123", "tok", vec![" ".into(), "https://tm.example/abc".into()]);
        assert_eq!(req.validate().unwrap(), vec!["https://tm.example/abc"]);
        let req = TransferRequest::new("123", "tok", vec!["".into()]);
        assert!(req.validate().is_err());
        let req = TransferRequest::new("123", "", vec!["https://tm.example/abc".into()]);
        assert_eq!(req.validate().unwrap_err(), "Order 123 has no order token");
    }
}
