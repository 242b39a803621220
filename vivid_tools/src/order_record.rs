use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::helpers::parse_event_date;

/// Field names used by the broker API.
pub mod fields {
    pub const ORDER_ID: &str = "orderId";
    pub const STATUS: &str = "status";
    pub const EVENT: &str = "event";
    pub const EVENT_DATE: &str = "eventDate";
    pub const QUANTITY: &str = "quantity";
    pub const ORDER_TOKEN: &str = "orderToken";
    pub const TRANSFER_VIA_URL: &str = "transferViaURL";
    pub const SEATS: &str = "seats";
    pub const SEAT: &str = "seat";
}

use fields::*;

/// One flattened order, as returned by the broker API or reloaded from a CSV snapshot.
///
/// The fields every order carries are held in typed slots. Everything else lands in `extra`, so unknown tags survive
/// a round trip untouched. Serializes as a single flat `{field: value}` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct OrderRecord {
    order_id: Option<String>,
    status: Option<String>,
    event: Option<String>,
    event_date: Option<String>,
    quantity: Option<String>,
    extra: BTreeMap<String, String>,
}

impl OrderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`OrderRecord::set`].
    pub fn with_field<V: Into<String>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn set<V: Into<String>>(&mut self, name: &str, value: V) {
        let value = value.into();
        match self.core_slot_mut(name) {
            Some(slot) => *slot = Some(value),
            None => {
                self.extra.insert(name.to_string(), value);
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match self.core_slot(name) {
            Some(slot) => slot.as_deref(),
            None => self.extra.get(name).map(String::as_str),
        }
    }

    /// The order id, if present and not blank.
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn event_date(&self) -> Option<&str> {
        self.event_date.as_deref()
    }

    pub fn quantity(&self) -> Option<&str> {
        self.quantity.as_deref()
    }

    pub fn order_token(&self) -> Option<&str> {
        self.extra.get(ORDER_TOKEN).map(String::as_str).filter(|s| !s.trim().is_empty())
    }

    /// The event date parsed into a calendar date. Unparsable values are treated as having no date.
    pub fn event_day(&self) -> Option<NaiveDate> {
        self.event_date.as_deref().and_then(parse_event_date)
    }

    /// True when the vendor has flagged the order as eligible for a URL transfer.
    pub fn is_transferable(&self) -> bool {
        self.get(TRANSFER_VIA_URL).map(|v| v.trim().eq_ignore_ascii_case("true")).unwrap_or(false)
    }

    /// Copies every field of `other` into this record. Values in `other` win.
    pub fn merge_from(&mut self, other: &OrderRecord) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Iterates over all fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.to_fields().into_iter()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// The number of fields holding a non-blank value.
    pub fn populated_field_count(&self) -> usize {
        self.iter().filter(|(_, v)| !v.trim().is_empty()).count()
    }

    pub fn len(&self) -> usize {
        self.to_fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_fields(&self) -> BTreeMap<&str, &str> {
        let mut result = self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<BTreeMap<&str, &str>>();
        let core = [
            (ORDER_ID, &self.order_id),
            (STATUS, &self.status),
            (EVENT, &self.event),
            (EVENT_DATE, &self.event_date),
            (QUANTITY, &self.quantity),
        ];
        for (name, value) in core {
            if let Some(v) = value {
                result.insert(name, v.as_str());
            }
        }
        result
    }

    fn core_slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            ORDER_ID => Some(&self.order_id),
            STATUS => Some(&self.status),
            EVENT => Some(&self.event),
            EVENT_DATE => Some(&self.event_date),
            QUANTITY => Some(&self.quantity),
            _ => None,
        }
    }

    fn core_slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            ORDER_ID => Some(&mut self.order_id),
            STATUS => Some(&mut self.status),
            EVENT => Some(&mut self.event),
            EVENT_DATE => Some(&mut self.event_date),
            QUANTITY => Some(&mut self.quantity),
            _ => None,
        }
    }
}

impl From<BTreeMap<String, String>> for OrderRecord {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<OrderRecord> for BTreeMap<String, String> {
    fn from(record: OrderRecord) -> Self {
        record.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for OrderRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = OrderRecord::new();
        for (name, value) in iter {
            record.set(name.as_ref(), value);
        }
        record
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn core_and_extra_fields() {
        let record = OrderRecord::new()
            .with_field(ORDER_ID, "12345678")
            .with_field(EVENT, "Test Event")
            .with_field("section", "101")
            .with_field(ORDER_TOKEN, "tok-1");
        assert_eq!(record.order_id(), Some("12345678"));
        assert_eq!(record.get("section"), Some("101"));
        assert_eq!(record.order_token(), Some("tok-1"));
        assert_eq!(record.field_names(), vec!["event", "orderId", "orderToken", "section"]);
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn blank_order_ids_are_absent() {
        let record = OrderRecord::new().with_field(ORDER_ID, "  ");
        assert_eq!(record.order_id(), None);
        assert_eq!(record.get(ORDER_ID), Some("  "));
    }

    #[test]
    fn merging_overwrites_per_field() {
        let mut summary = OrderRecord::new().with_field(ORDER_ID, "1").with_field(STATUS, "PENDING_SHIPMENT");
        let detail = OrderRecord::new().with_field(STATUS, "COMPLETED").with_field(TRANSFER_VIA_URL, "TRUE");
        summary.merge_from(&detail);
        assert_eq!(summary.status(), Some("COMPLETED"));
        assert_eq!(summary.order_id(), Some("1"));
        assert!(summary.is_transferable());
    }

    #[test]
    fn serializes_as_a_flat_map() {
        let record = OrderRecord::new().with_field(ORDER_ID, "1").with_field("cost", "150.00");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"cost":"150.00","orderId":"1"}"#);
        let back: OrderRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn populated_fields_ignore_blanks() {
        let record = OrderRecord::new().with_field(ORDER_ID, "1").with_field("notes", "").with_field("row", " ");
        assert_eq!(record.populated_field_count(), 1);
        assert_eq!(record.len(), 3);
    }
}
