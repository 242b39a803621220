//! One-shot subcommands. Each one starts a session (reloading snapshots as configured), does one thing and returns
//! the text to print.
use anyhow::{anyhow, Result};
use order_porter_engine::{transfers::TransferOrder, FetchJob, FetchTarget, ViewFilter};

use crate::{
    interactive::formatting::{
        format_fetch_report,
        format_order,
        format_orders,
        format_push_summary,
        format_transfer_result,
    },
    progress::follow_sweep,
    session::Session,
    ExportParams,
    FetchParams,
    TransferParams,
    ViewParams,
};

pub async fn fetch(target: FetchTarget, params: FetchParams) -> Result<String> {
    let mut session = Session::start().await?;
    let job = FetchJob::new(target).with_enrichment(params.enrich).with_snapshot(!params.no_snapshot);
    session.drain_events();
    let handle = session.porter.start_fetch(job)?;
    let report = follow_sweep(handle, &mut session.events).await?;
    session.porter.shutdown().await;
    format_fetch_report(&report)
}

pub async fn detail(order_id: String) -> Result<String> {
    let session = Session::start().await?;
    let order_id = order_id.trim();
    session.porter.refresh_detail(order_id).await?;
    let entry = session.porter.entry(order_id).await?.ok_or_else(|| anyhow!("Order #{order_id} is not known"))?;
    format_order(&entry.merged(), &entry.sources())
}

pub async fn transfer(params: TransferParams) -> Result<String> {
    let session = Session::start().await?;
    let order = TransferOrder {
        order_token: params.token,
        transfer_source: params.source,
        transfer_source_url: params.source_url,
        ..TransferOrder::new(&params.order_id, params.urls)
    };
    let known = session.porter.entry(&order.order_id).await?;
    // The token and the transferViaURL flag only come with the detail call
    if order.order_token.is_none() && !known.is_some_and(|e| e.is_enriched()) {
        session.porter.refresh_detail(&order.order_id).await?;
    }
    let result = session.porter.transfer(&order).await?;
    Ok(format_transfer_result(&order.order_id, &result))
}

pub async fn view(params: ViewParams) -> Result<String> {
    let session = Session::start().await?;
    let records = session.porter.view(params.filter()).await?;
    if params.json {
        Ok(serde_json::to_string_pretty(&records)?)
    } else {
        Ok(format_orders(&records))
    }
}

pub async fn export(params: ExportParams) -> Result<String> {
    let session = Session::start().await?;
    let filter = ViewFilter::new(&params.query, params.today, params.hide_past);
    let rows = session.porter.export_csv(&params.output, filter).await?;
    if rows == 0 {
        Ok("Nothing to export".to_string())
    } else {
        Ok(format!("Exported {rows} orders to {}", params.output.display()))
    }
}

pub async fn warehouse() -> Result<String> {
    let session = Session::start().await?;
    let summary = session.porter.push_to_warehouse().await?;
    let table = session.porter.config().warehouse.as_ref().map(|w| w.table.clone()).unwrap_or_default();
    Ok(format_push_summary(&summary, &table))
}
