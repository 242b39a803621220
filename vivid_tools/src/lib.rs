//! Client-side tools for the Vivid Seats broker web services.
//!
//! The broker API speaks XML. Every `<order>` node is flattened into an [`OrderRecord`]: a flat map of field name to
//! string value with a handful of well-known fields pulled out into typed slots.
mod api;
mod config;
mod data_objects;
mod error;
mod helpers;
mod order_record;
mod xml;

pub use api::{check_status, VividApi};
pub use config::{VividConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TRANSFER_SOURCE};
pub use data_objects::{OrderStatus, TransferRequest, TransferResult, UnknownOrderStatus, RETRANSFER_STATUS};
pub use error::VividApiError;
pub use helpers::parse_event_date;
pub use order_record::{fields, OrderRecord};
pub use xml::{parse_order_detail, parse_orders, parse_transfer_response};
