use std::fmt::Write;

use anyhow::Result;
use order_porter_engine::{
    events::WorkerEvent,
    export::RestoreSummary,
    order_store::StoreStats,
    warehouse::PushSummary,
    FetchReport,
    RecordSource,
};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use vivid_tools::{fields::TRANSFER_VIA_URL, OrderRecord, TransferResult};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_orders(orders: &[OrderRecord]) -> String {
    if orders.is_empty() {
        return "No orders match the current filter".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["Order id", "Status", "Event", "Event date", "Qty", "URL transfer"]);
    orders.iter().for_each(|order| {
        table.add_row(row![
            order.order_id().unwrap_or_default(),
            order.status().unwrap_or_default(),
            order.event().unwrap_or_default(),
            order.event_date().unwrap_or_default(),
            order.quantity().unwrap_or_default(),
            order.get(TRANSFER_VIA_URL).unwrap_or("?")
        ]);
    });
    markdown_style(&mut table);
    format!("{table}\n{} orders\n", orders.len())
}

/// Every field of one merged record, one per row.
pub fn format_order(order: &OrderRecord, sources: &[RecordSource]) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "===============================================================================")?;
    let sources = sources.iter().map(|s| format!("{s:?}")).collect::<Vec<String>>().join(" + ");
    writeln!(f, "Order #{} ({sources})", order.order_id().unwrap_or("?"))?;
    writeln!(f, "===============================================================================")?;
    let mut table = Table::new();
    table.set_titles(row!["Field", "Value"]);
    order.iter().for_each(|(name, value)| {
        table.add_row(row![name, value]);
    });
    markdown_style(&mut table);
    writeln!(f, "{table}")?;
    Ok(f)
}

pub fn format_fetch_report(report: &FetchReport) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "{} sweep", report.target)?;
    writeln!(f, "  Fetched:    {:>5}", report.fetched)?;
    writeln!(f, "  New:        {:>5}", report.inserted)?;
    writeln!(f, "  Duplicates: {:>5}", report.duplicates)?;
    writeln!(f, "  Enriched:   {:>5}", report.enriched)?;
    if !report.enrichment_failures.is_empty() {
        writeln!(f, "  Detail calls that failed:")?;
        for (order_id, reason) in &report.enrichment_failures {
            writeln!(f, "    #{order_id}: {reason}")?;
        }
    }
    match (&report.snapshot, &report.snapshot_error) {
        (Some(path), _) => writeln!(f, "  Snapshot:   {path}")?,
        (None, Some(e)) => writeln!(f, "  Snapshot failed: {e}")?,
        (None, None) => {},
    }
    Ok(f)
}

/// One-line progress text for the spinner.
pub fn format_worker_event(event: &WorkerEvent) -> String {
    match event {
        WorkerEvent::Started(target) => format!("Fetching {target} orders..."),
        WorkerEvent::Fetched { target, count } => format!("Received {count} {target} orders"),
        WorkerEvent::Enriched { order_id, done, total } => format!("Fetched detail for #{order_id} ({done}/{total})"),
        WorkerEvent::EnrichmentFailed { order_id, reason } => format!("Skipped #{order_id}: {reason}"),
        WorkerEvent::SnapshotWritten { path, rows } => format!("Saved {rows} orders to {path}"),
        WorkerEvent::SnapshotFailed(e) => format!("Could not save the snapshot: {e}"),
        WorkerEvent::Finished(report) => format!("{} sweep done", report.target),
        WorkerEvent::Failed { target, reason } => format!("{target} sweep failed: {reason}"),
    }
}

pub fn format_transfer_result(order_id: &str, result: &TransferResult) -> String {
    if result.success {
        format!("Transfer of order #{order_id} submitted. {}", result.message)
    } else {
        format!("Vivid Seats declined the transfer of order #{order_id}. {}", result.message)
    }
}

pub fn format_push_summary(summary: &PushSummary, table: &str) -> String {
    format!("Pushed {} orders to {table} ({} skipped without an order id)", summary.pushed, summary.skipped)
}

pub fn format_store_status(stats: &StoreStats, restored: &RestoreSummary) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "Orders in memory: {} ({} with detail)", stats.orders, stats.enriched)?;
    writeln!(f, "Refreshes:        {}", stats.revision)?;
    writeln!(f, "Reloaded at startup: {} orders from {} snapshot(s)", restored.orders.inserted, restored.files)?;
    for skipped in &restored.skipped {
        writeln!(f, "  skipped {skipped}")?;
    }
    Ok(f)
}

#[cfg(test)]
mod test {
    use order_porter_engine::FetchTarget;
    use vivid_tools::{fields::ORDER_ID, OrderStatus};

    use super::*;

    #[test]
    fn order_table() {
        let orders = vec![
            OrderRecord::new()
                .with_field(ORDER_ID, "ORD-1")
                .with_field("event", "Opera")
                .with_field(TRANSFER_VIA_URL, "true"),
            OrderRecord::new().with_field(ORDER_ID, "ORD-2"),
        ];
        let table = format_orders(&orders);
        assert!(table.contains("| Order id |"));
        assert!(table.contains("| ORD-1"));
        assert!(table.contains("Opera"));
        assert!(table.ends_with("2 orders\n"));
        assert_eq!(format_orders(&[]), "No orders match the current filter");
    }

    #[test]
    fn report_lists_failures() {
        let report = FetchReport {
            target: FetchTarget::Status(OrderStatus::Completed),
            fetched: 3,
            inserted: 2,
            duplicates: 1,
            enriched: 1,
            enrichment_failures: vec![("9".into(), "HTTP 500".into())],
            snapshot: None,
            snapshot_error: Some("disk full".into()),
        };
        let text = format_fetch_report(&report).unwrap();
        assert!(text.starts_with("COMPLETED sweep"));
        assert!(text.contains("#9: HTTP 500"));
        assert!(text.contains("Snapshot failed: disk full"));
    }

    #[test]
    fn progress_lines() {
        let ev = WorkerEvent::Enriched { order_id: "7".into(), done: 2, total: 5 };
        assert_eq!(format_worker_event(&ev), "Fetched detail for #7 (2/5)");
        let ev = WorkerEvent::Failed { target: FetchTarget::RetransferPending, reason: "Too many requests".into() };
        assert_eq!(format_worker_event(&ev), "PENDING_RETRANSFER sweep failed: Too many requests");
    }
}
