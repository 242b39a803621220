//! XML handling for broker API responses.
//!
//! Responses are small, so the document is read into a minimal element tree first and flattened afterwards. Only
//! element names and their leading text are kept; attributes are ignored.
use log::*;
use quick_xml::{events::Event, Reader};

use crate::{
    order_record::fields::{ORDER_ID, SEAT, SEATS},
    OrderRecord,
    TransferResult,
    VividApiError,
};

const ORDER: &str = "order";

#[derive(Debug, Clone, Default, PartialEq)]
struct XmlNode {
    name: String,
    /// Text that precedes the first child element, trimmed.
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn named(name: &[u8]) -> Self {
        Self { name: String::from_utf8_lossy(name).into_owned(), ..Default::default() }
    }

    fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn malformed<E: std::fmt::Display>(position: u64, e: E) -> VividApiError {
    VividApiError::MalformedResponse(format!("{e} (at byte {position})"))
}

fn parse_document(xml: &str) -> Result<XmlNode, VividApiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    fn attach(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) -> Result<(), VividApiError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => *root = Some(node),
            None => return Err(VividApiError::MalformedResponse("Document has more than one root element".into())),
        }
        Ok(())
    }

    fn append_text(text: &str, stack: &mut [XmlNode]) {
        if let Some(node) = stack.last_mut() {
            if node.children.is_empty() {
                node.text.push_str(text.trim());
            }
        }
    }

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(XmlNode::named(e.local_name().as_ref())),
            Ok(Event::Empty(e)) => attach(XmlNode::named(e.local_name().as_ref()), &mut stack, &mut root)?,
            Ok(Event::End(_)) => {
                let node = stack.pop().ok_or_else(|| malformed(position, "Unexpected closing tag"))?;
                attach(node, &mut stack, &mut root)?;
            },
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| malformed(position, e))?;
                append_text(&text, &mut stack);
            },
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                append_text(&text, &mut stack);
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(malformed(position, e)),
        }
    }
    if let Some(open) = stack.last() {
        return Err(VividApiError::MalformedResponse(format!("Document ended inside <{}>", open.name)));
    }
    root.ok_or_else(|| VividApiError::MalformedResponse("Document is empty".into()))
}

/// Every child of an `<order>` node becomes one field. `<seats>` is collapsed into a comma-separated list of its
/// `<seat>` values.
fn flatten_order(node: &XmlNode) -> OrderRecord {
    node.children.iter().fold(OrderRecord::new(), |mut record, child| {
        let value = if child.name == SEATS {
            child
                .children
                .iter()
                .filter(|seat| seat.name == SEAT && !seat.text.is_empty())
                .map(|seat| seat.text.as_str())
                .collect::<Vec<&str>>()
                .join(", ")
        } else {
            child.text.clone()
        };
        record.set(&child.name, value);
        record
    })
}

/// Parses a `getOrders`-style response: a root element holding zero or more `<order>` children.
pub fn parse_orders(xml: &str) -> Result<Vec<OrderRecord>, VividApiError> {
    let root = parse_document(xml)?;
    let orders = root.children.iter().filter(|c| c.name == ORDER).map(flatten_order).collect::<Vec<OrderRecord>>();
    trace!("🎫️ Parsed {} orders from <{}> document", orders.len(), root.name);
    Ok(orders)
}

/// Parses an order-detail response. The order may be the root element, a child of the root, or the root may hold the
/// order fields directly.
pub fn parse_order_detail(xml: &str) -> Result<OrderRecord, VividApiError> {
    let root = parse_document(xml)?;
    let node = if root.name == ORDER { &root } else { root.child(ORDER).unwrap_or(&root) };
    let record = flatten_order(node);
    if record.is_empty() {
        return Err(VividApiError::MalformedResponse(format!("<{}> holds no order fields", root.name)));
    }
    if record.get(ORDER_ID).is_none() {
        debug!("🎫️ Order detail response has no {ORDER_ID} field");
    }
    Ok(record)
}

fn message_of(root: &XmlNode) -> Option<String> {
    root.find("message").map(|n| n.text.clone()).filter(|m| !m.is_empty())
}

/// The text of the first `message` element in an arbitrary response body, if the body is XML and has one.
pub(crate) fn vendor_message(body: &str) -> Option<String> {
    parse_document(body).ok().as_ref().and_then(message_of)
}

/// Interprets the body of a transfer submission. The vendor reports the outcome in a `message` element; an explicit
/// `success` element of `false`, or a `status` of `ERROR`/`FAILURE`, marks the transfer as rejected.
pub fn parse_transfer_response(xml: &str) -> Result<TransferResult, VividApiError> {
    let root = parse_document(xml)?;
    let message = message_of(&root);
    let rejected = root.find("success").map(|n| n.text.eq_ignore_ascii_case("false")).unwrap_or(false) ||
        root.find("status")
            .map(|n| n.text.eq_ignore_ascii_case("error") || n.text.eq_ignore_ascii_case("failure"))
            .unwrap_or(false);
    let success = !rejected;
    let message = message.unwrap_or_else(|| {
        if success {
            "Transfer submitted".to_string()
        } else {
            "Transfer was rejected without a message".to_string()
        }
    });
    Ok(TransferResult { success, message })
}
