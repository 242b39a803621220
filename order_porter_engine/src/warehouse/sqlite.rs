use std::{fmt::Debug, str::FromStr};

use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqliteConnection,
    SqlitePool,
};
use vivid_tools::OrderRecord;

use crate::warehouse::{PushSummary, WarehouseConfig, WarehouseError};

#[derive(Clone)]
pub struct SqliteWarehouse {
    table: String,
    pool: SqlitePool,
}

impl Debug for SqliteWarehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteWarehouse ({}, {:?})", self.table, self.pool)
    }
}

impl SqliteWarehouse {
    /// Opens (creating if necessary) the database and makes sure the orders table exists.
    pub async fn connect(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let table = config.validated_table()?.to_string();
        let options = SqliteConnectOptions::from_str(config.url.reveal())
            .map_err(|e| WarehouseError::ConnectionError(e.to_string()))?
            .create_if_missing(true);
        // A single long-lived connection, so that in-memory databases survive between pushes
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| WarehouseError::ConnectionError(e.to_string()))?;
        let warehouse = Self { table, pool };
        let mut conn = warehouse.pool.acquire().await?;
        ensure_schema(&warehouse.table, &mut conn).await?;
        info!("🗃️ Connected to warehouse table {}", warehouse.table);
        Ok(warehouse)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Upserts every record in a single transaction. Either all rows land or none do.
    pub async fn push_orders(&self, records: &[OrderRecord]) -> Result<PushSummary, WarehouseError> {
        let mut summary = PushSummary::default();
        let mut tx = self.pool.begin().await?;
        for record in records {
            if upsert_order(&self.table, record, &mut tx).await? {
                summary.pushed += 1;
            } else {
                summary.skipped += 1;
            }
        }
        tx.commit().await?;
        info!("🗃️ Pushed {} orders to {} ({} without an order id)", summary.pushed, self.table, summary.skipped);
        Ok(summary)
    }

    pub async fn count(&self) -> Result<i64, WarehouseError> {
        let mut conn = self.pool.acquire().await?;
        count_orders(&self.table, &mut conn).await
    }

    /// Every stored order, rebuilt from its payload, by order id.
    pub async fn fetch_orders(&self) -> Result<Vec<OrderRecord>, WarehouseError> {
        let mut conn = self.pool.acquire().await?;
        fetch_orders(&self.table, &mut conn).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn ensure_schema(table: &str, conn: &mut SqliteConnection) -> Result<(), WarehouseError> {
    let q = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            order_id    TEXT PRIMARY KEY NOT NULL,
            status      TEXT,
            event       TEXT,
            event_date  TEXT,
            quantity    TEXT,
            payload     TEXT NOT NULL,
            pushed_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#
    );
    sqlx::query(&q).execute(conn).await?;
    Ok(())
}

/// Returns `false` if the record has no order id and was not written.
async fn upsert_order(table: &str, record: &OrderRecord, conn: &mut SqliteConnection) -> Result<bool, WarehouseError> {
    let Some(order_id) = record.order_id() else {
        return Ok(false);
    };
    let payload = serde_json::to_string(record).map_err(|e| WarehouseError::QueryError(e.to_string()))?;
    let q = format!(
        r#"
        INSERT INTO {table} (order_id, status, event, event_date, quantity, payload, pushed_at)
        VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)
        ON CONFLICT(order_id) DO UPDATE SET
            status = excluded.status,
            event = excluded.event,
            event_date = excluded.event_date,
            quantity = excluded.quantity,
            payload = excluded.payload,
            pushed_at = excluded.pushed_at;
        "#
    );
    sqlx::query(&q)
        .bind(order_id)
        .bind(record.status())
        .bind(record.event())
        .bind(record.event_date())
        .bind(record.quantity())
        .bind(payload)
        .execute(conn)
        .await?;
    trace!("🗃️ Order #{order_id} upserted into {table}");
    Ok(true)
}

async fn count_orders(table: &str, conn: &mut SqliteConnection) -> Result<i64, WarehouseError> {
    let q = format!("SELECT COUNT(*) FROM {table}");
    let count = sqlx::query_scalar::<_, i64>(&q).fetch_one(conn).await?;
    Ok(count)
}

async fn fetch_orders(table: &str, conn: &mut SqliteConnection) -> Result<Vec<OrderRecord>, WarehouseError> {
    let q = format!("SELECT order_id, payload FROM {table} ORDER BY order_id");
    let rows = sqlx::query_as::<_, (String, String)>(&q).fetch_all(conn).await?;
    rows.into_iter()
        .map(|(order_id, payload)| {
            serde_json::from_str::<OrderRecord>(&payload)
                .map_err(|e| WarehouseError::CorruptPayload { order_id, reason: e.to_string() })
        })
        .collect()
}
