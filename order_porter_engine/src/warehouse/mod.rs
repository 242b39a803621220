//! # Warehouse sink
//!
//! Pushes the in-memory orders into a SQL table keyed by order id. The core fields get their own columns so the
//! table can be queried directly; the complete flattened record is kept alongside as a JSON payload.
//!
//! Pushes are upserts. Re-pushing the same orders replaces their rows rather than duplicating them.
mod errors;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use errors::WarehouseError;
use porter_common::Secret;
use serde::{Deserialize, Serialize};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWarehouse;

pub const DEFAULT_WAREHOUSE_TABLE: &str = "vivid_orders";

#[derive(Debug, Clone, Default)]
pub struct WarehouseConfig {
    pub url: Secret<String>,
    pub table: String,
}

impl WarehouseConfig {
    pub fn new(url: &str, table: &str) -> Self {
        Self { url: Secret::new(url.to_string()), table: table.to_string() }
    }

    /// Table names are spliced into SQL, so only ASCII letters, digits and underscores are allowed, and the name may
    /// not start with a digit.
    pub fn validated_table(&self) -> Result<&str, WarehouseError> {
        let table = self.table.as_str();
        let valid = table.chars().next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false) &&
            table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(table)
        } else {
            Err(WarehouseError::InvalidTable(table.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSummary {
    /// Rows inserted or replaced.
    pub pushed: usize,
    /// Records without an order id.
    pub skipped: usize,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_names() {
        assert!(WarehouseConfig::new("sqlite::memory:", "vivid_orders").validated_table().is_ok());
        assert!(WarehouseConfig::new("sqlite::memory:", "_Orders2").validated_table().is_ok());
        for bad in ["", "2orders", "orders; DROP TABLE x", "vivid-orders", "\"quoted\""] {
            let config = WarehouseConfig::new("sqlite::memory:", bad);
            assert!(matches!(config.validated_table(), Err(WarehouseError::InvalidTable(_))), "{bad} should fail");
        }
    }

    #[test]
    fn url_is_not_printed() {
        let config = WarehouseConfig::new("sqlite://secret.db", "t");
        assert!(!format!("{config:?}").contains("secret"));
    }
}
