use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WarehouseError {
    #[error("Could not connect to the warehouse: {0}")]
    ConnectionError(String),
    #[error("Warehouse query failed: {0}")]
    QueryError(String),
    #[error("{0:?} is not a valid warehouse table name")]
    InvalidTable(String),
    #[error("The warehouse is not configured. Set PORTER_WAREHOUSE_URL to enable it.")]
    NotConfigured,
    #[error("Stored payload for order {order_id} is not valid JSON: {reason}")]
    CorruptPayload { order_id: String, reason: String },
}

impl From<sqlx::Error> for WarehouseError {
    fn from(e: sqlx::Error) -> Self {
        WarehouseError::QueryError(e.to_string())
    }
}
