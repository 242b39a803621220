use vivid_tools::{
    fields::{EVENT, EVENT_DATE, ORDER_ID, ORDER_TOKEN, QUANTITY, STATUS, TRANSFER_VIA_URL},
    OrderRecord,
};

/// A single pending-shipment order as the list endpoint returns it.
pub const EXAMPLE_ORDERS_XML: &str = "<orders><order><orderId>12345678</orderId><status>PENDING_SHIPMENT</status><cost>150.00</cost><event>Test Event</event><eventDate>2026-05-20</eventDate><quantity>2</quantity></order></orders>";

pub fn summary(order_id: &str, event_date: &str) -> OrderRecord {
    OrderRecord::new()
        .with_field(ORDER_ID, order_id)
        .with_field(STATUS, "PENDING_SHIPMENT")
        .with_field(EVENT, format!("Event {order_id}"))
        .with_field(EVENT_DATE, event_date)
        .with_field(QUANTITY, "2")
}

/// The kind of record the detail endpoint returns: the summary fields plus buyer and transfer details.
pub fn detail(order_id: &str, transferable: bool) -> OrderRecord {
    OrderRecord::new()
        .with_field(ORDER_ID, order_id)
        .with_field(TRANSFER_VIA_URL, transferable.to_string())
        .with_field(ORDER_TOKEN, format!("token-{order_id}"))
        .with_field("firstName", "Ann")
        .with_field("lastName", "Buyer")
        .with_field("section", "101")
        .with_field("row", "F")
        .with_field("seats", "7, 8")
        .with_field("cost", "150.00")
}
