//! # The order store
//!
//! An in-memory, insertion-ordered collection of orders keyed by order id. Each order keeps at most one *summary*
//! record (from a list fetch or a CSV reload) and at most one *enrichment* record (from the per-order detail call).
//! Views always merge the two, with the enrichment record winning on every field it defines.
//!
//! The store itself is a plain data structure with no interior mutability. Concurrent access is handled by
//! [`crate::store_actor::StoreActor`], which owns the store and applies every mutation on a single task.
use std::collections::{BTreeMap, HashMap};

use chrono::{Local, NaiveDate};
use log::*;
use serde::{Deserialize, Serialize};
use vivid_tools::{fields::ORDER_ID, OrderRecord};

/// A CSV row with more than this many populated fields is assumed to have come from an enriched export.
pub const DEFAULT_ENRICHMENT_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Summary,
    Enrichment,
}

/// Everything the store knows about one order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredOrder {
    summary: Option<OrderRecord>,
    enrichment: Option<OrderRecord>,
}

impl StoredOrder {
    pub fn summary(&self) -> Option<&OrderRecord> {
        self.summary.as_ref()
    }

    pub fn enrichment(&self) -> Option<&OrderRecord> {
        self.enrichment.as_ref()
    }

    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }

    pub fn sources(&self) -> Vec<RecordSource> {
        let mut sources = Vec::with_capacity(2);
        if self.summary.is_some() {
            sources.push(RecordSource::Summary);
        }
        if self.enrichment.is_some() {
            sources.push(RecordSource::Enrichment);
        }
        sources
    }

    /// The summary record overlaid with the enrichment record.
    pub fn merged(&self) -> OrderRecord {
        let mut result = self.summary.clone().unwrap_or_default();
        if let Some(enrichment) = &self.enrichment {
            result.merge_from(enrichment);
        }
        result
    }
}

/// The display-side filter applied by [`OrderStore::filtered_view`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    /// Case-insensitive substring of the order id. Empty matches everything.
    #[serde(default)]
    pub query: String,
    /// Keep only orders whose event is on the reference date.
    #[serde(default)]
    pub today_only: bool,
    /// Drop orders whose event date is before the reference date.
    #[serde(default)]
    pub hide_past: bool,
}

impl ViewFilter {
    pub fn new(query: &str, today_only: bool, hide_past: bool) -> Self {
        Self { query: query.to_string(), today_only, hide_past }
    }

    /// Orders without a parsable event date are never "today" and never "past".
    pub fn matches(&self, order_id: &str, record: &OrderRecord, today: NaiveDate) -> bool {
        let query = self.query.trim().to_lowercase();
        if !query.is_empty() && !order_id.to_lowercase().contains(&query) {
            return false;
        }
        let event_day = record.event_day();
        if self.today_only && event_day != Some(today) {
            return false;
        }
        if self.hide_past && matches!(event_day, Some(day) if day < today) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Orders that were not in the store before.
    pub inserted: usize,
    /// Records whose order id was already known. Their data was not used.
    pub duplicates: usize,
    /// Records without an order id.
    pub rejected: usize,
    /// Reloaded rows that were also registered as enrichment records.
    pub enriched: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub orders: usize,
    pub enriched: usize,
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct OrderStore {
    order: Vec<String>,
    entries: HashMap<String, StoredOrder>,
    revision: u64,
    enrichment_threshold: usize,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        Self::with_enrichment_threshold(DEFAULT_ENRICHMENT_THRESHOLD)
    }

    pub fn with_enrichment_threshold(enrichment_threshold: usize) -> Self {
        Self { order: Vec::new(), entries: HashMap::new(), revision: 0, enrichment_threshold }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Incremented every time the store is asked to ingest data, whether or not anything changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> StoreStats {
        let enriched = self.entries.values().filter(|e| e.is_enriched()).count();
        StoreStats { orders: self.len(), enriched, revision: self.revision }
    }

    pub fn order_ids(&self) -> &[String] {
        &self.order
    }

    pub fn entry(&self, order_id: &str) -> Option<&StoredOrder> {
        self.entries.get(order_id.trim())
    }

    pub fn get(&self, order_id: &str) -> Option<OrderRecord> {
        self.entry(order_id).map(StoredOrder::merged)
    }

    /// All orders, merged, in insertion order.
    pub fn records(&self) -> Vec<OrderRecord> {
        self.order.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Appends each record whose order id is not yet known. Any existing entry wins, including one that only holds
    /// an enrichment record. Records without an order id are dropped.
    pub fn ingest_summary<I>(&mut self, records: I) -> IngestSummary
    where I: IntoIterator<Item = OrderRecord> {
        let mut result = IngestSummary::default();
        for record in records {
            self.insert_summary(record, &mut result);
        }
        self.revision += 1;
        debug!(
            "🗃️ Ingested summaries. {} new, {} duplicates, {} rejected. Store holds {} orders.",
            result.inserted,
            result.duplicates,
            result.rejected,
            self.len()
        );
        result
    }

    fn insert_summary(&mut self, record: OrderRecord, result: &mut IngestSummary) -> Option<String> {
        let Some(order_id) = record.order_id().map(str::to_string) else {
            trace!("🗃️ Dropping record without an order id");
            result.rejected += 1;
            return None;
        };
        if self.entries.contains_key(&order_id) {
            trace!("🗃️ Order #{order_id} is already known. Keeping what the store has.");
            result.duplicates += 1;
            return None;
        }
        self.order.push(order_id.clone());
        self.entries.insert(order_id.clone(), StoredOrder { summary: Some(record), enrichment: None });
        result.inserted += 1;
        Some(order_id)
    }

    /// Merges `fields` into the enrichment record for `order_id`. Later values overwrite earlier ones field by
    /// field, and the enrichment record overrides the summary in every view. An unknown order id creates a new,
    /// enrichment-only entry. Returns false if the order id is blank.
    pub fn ingest_enrichment(&mut self, order_id: &str, fields: &OrderRecord) -> bool {
        let order_id = order_id.trim();
        self.revision += 1;
        if order_id.is_empty() {
            warn!("🗃️ Ignoring enrichment without an order id");
            return false;
        }
        if !self.entries.contains_key(order_id) {
            debug!("🗃️ Order #{order_id} was not fetched as a summary. Creating an enrichment-only entry.");
            self.order.push(order_id.to_string());
        }
        let entry = self.entries.entry(order_id.to_string()).or_default();
        let enrichment = entry.enrichment.get_or_insert_with(OrderRecord::new);
        enrichment.merge_from(fields);
        enrichment.set(ORDER_ID, order_id);
        trace!("🗃️ Order #{order_id} enriched with {} fields", fields.len());
        true
    }

    /// Reloads rows from a previous CSV export. Blank cells are treated as missing fields. Rows for orders that are
    /// already present are skipped. A row with more populated fields than the enrichment threshold is also
    /// registered as that order's enrichment record.
    pub fn load_from_csv<I>(&mut self, rows: I) -> IngestSummary
    where I: IntoIterator<Item = BTreeMap<String, String>> {
        let mut result = IngestSummary::default();
        for row in rows {
            let record = row.into_iter().filter(|(_, v)| !v.trim().is_empty()).collect::<OrderRecord>();
            let populated = record.populated_field_count();
            let enrichment = (populated > self.enrichment_threshold).then(|| record.clone());
            if let Some(order_id) = self.insert_summary(record, &mut result) {
                if let (Some(enrichment), Some(entry)) = (enrichment, self.entries.get_mut(&order_id)) {
                    entry.enrichment = Some(enrichment);
                    result.enriched += 1;
                }
            }
        }
        self.revision += 1;
        info!(
            "🗃️ Reloaded {} orders from CSV ({} treated as enriched, {} duplicates, {} without an order id)",
            result.inserted, result.enriched, result.duplicates, result.rejected
        );
        result
    }

    /// The merged records matching `filter`, in insertion order, judged against the current local date.
    pub fn filtered_view(&self, filter: &ViewFilter) -> Vec<OrderRecord> {
        self.filtered_view_on(filter, Local::now().date_naive())
    }

    /// As [`OrderStore::filtered_view`], with an explicit reference date.
    pub fn filtered_view_on(&self, filter: &ViewFilter, today: NaiveDate) -> Vec<OrderRecord> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id, entry.merged())))
            .filter(|(id, record)| filter.matches(id, record, today))
            .map(|(_, record)| record)
            .collect()
    }

    /// The merged records for the given ids, in the order given. Unknown ids are skipped.
    pub fn records_for(&self, order_ids: &[String]) -> Vec<OrderRecord> {
        order_ids.iter().filter_map(|id| self.get(id)).collect()
    }
}
