//! Request handler definitions
//!
//! Define each route and its handler here. Every handler gets the shared [`OrderPorter`] through `web::Data`, so
//! nothing here owns order state; the store task does.
//!
//! Handlers must not block the worker thread. A fetch sweep can take minutes when enrichment is on, so `POST /fetch`
//! starts the sweep in the background unless the caller explicitly asks to wait for it.
use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use order_porter_engine::{worker::join_sweep, OrderPorter, PorterError, ViewFilter};
use serde_json::json;

use crate::{
    data_objects::{ExportResult, FetchParams, JsonResponse, OrderDetail, TransferParams},
    errors::ServerError,
    sweeps::SweepLog,
};

pub const EXPORT_LABEL: &str = "EXPORT";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(stats)
        .service(orders)
        .service(order_by_id)
        .service(refresh_order)
        .service(fetch)
        .service(last_fetch)
        .service(transfer)
        .service(export)
        .service(warehouse);
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

#[get("/stats")]
pub async fn stats(porter: web::Data<OrderPorter>) -> Result<HttpResponse, ServerError> {
    let stats = porter.stats().await.map_err(ServerError::from)?;
    Ok(HttpResponse::Ok().json(json!({
        "orders": stats.orders,
        "enriched": stats.enriched,
        "revision": stats.revision,
        "busy": porter.is_busy(),
    })))
}

#[get("/orders")]
pub async fn orders(
    query: web::Query<ViewFilter>,
    porter: web::Data<OrderPorter>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner();
    debug!("💻️ GET orders. {filter:?}");
    let records = porter.view(filter).await.map_err(ServerError::from)?;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/orders/{order_id}")]
pub async fn order_by_id(
    path: web::Path<String>,
    porter: web::Data<OrderPorter>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id}");
    let entry = porter
        .entry(&order_id)
        .await
        .map_err(ServerError::from)?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order #{order_id} is not in the store")))?;
    Ok(HttpResponse::Ok().json(OrderDetail { order: entry.merged(), sources: entry.sources() }))
}

/// Fetches the order's detail from Vivid Seats and returns the merged record.
#[post("/orders/{order_id}/detail")]
pub async fn refresh_order(
    path: web::Path<String>,
    porter: web::Data<OrderPorter>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST detail refresh for order #{order_id}");
    let record = porter.refresh_detail(&order_id).await.map_err(ServerError::from)?;
    Ok(HttpResponse::Ok().json(record))
}

#[post("/fetch")]
pub async fn fetch(
    body: Option<web::Json<FetchParams>>,
    porter: web::Data<OrderPorter>,
    sweeps: web::Data<SweepLog>,
) -> Result<HttpResponse, ServerError> {
    let params = body.map(|b| b.into_inner()).unwrap_or_default();
    let job = params.job();
    debug!("💻️ POST fetch. {job:?}");
    let handle = porter.start_fetch(job).map_err(ServerError::from)?;
    if params.wait {
        let result = join_sweep(handle).await;
        sweeps.record_result(job.target, result.clone()).await;
        let report = result.map_err(|e| ServerError::from(PorterError::from(e)))?;
        return Ok(HttpResponse::Ok().json(report));
    }
    SweepLog::follow(sweeps, job.target, handle).await;
    Ok(HttpResponse::Accepted().json(JsonResponse::success(format!("{} sweep started", job.target))))
}

/// The most recent sweep: still running, its report, or the error that stopped it.
#[get("/fetch/last")]
pub async fn last_fetch(sweeps: web::Data<SweepLog>) -> Result<HttpResponse, ServerError> {
    let outcome = sweeps.last().await.ok_or_else(|| ServerError::NoRecordFound("No fetch has run yet".into()))?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/orders/{order_id}/transfer")]
pub async fn transfer(
    path: web::Path<String>,
    body: web::Json<TransferParams>,
    porter: web::Data<OrderPorter>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner().into_order(&path.into_inner());
    info!("💻️ POST transfer for order #{} with {} URL(s)", order.order_id, order.urls.len());
    let result = porter.transfer(&order).await.map_err(ServerError::from)?;
    if !result.success {
        warn!("💻️ Vivid Seats declined the transfer of order #{}. {}", order.order_id, result.message);
    }
    Ok(HttpResponse::Ok().json(result))
}

/// Writes the filtered view as a snapshot in the export directory.
#[post("/export")]
pub async fn export(
    body: Option<web::Json<ViewFilter>>,
    porter: web::Data<OrderPorter>,
) -> Result<HttpResponse, ServerError> {
    let filter = body.map(|b| b.into_inner()).unwrap_or_default();
    debug!("💻️ POST export. {filter:?}");
    let (path, rows) = porter.export_snapshot(EXPORT_LABEL, filter).await.map_err(ServerError::from)?;
    let path = path.map(|p| p.display().to_string());
    Ok(HttpResponse::Ok().json(ExportResult { path, rows }))
}

#[post("/warehouse")]
pub async fn warehouse(porter: web::Data<OrderPorter>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST warehouse push");
    let summary = porter.push_to_warehouse().await.map_err(ServerError::from)?;
    Ok(HttpResponse::Ok().json(summary))
}
