use std::time::Duration;

use actix_web::http::StatusCode;
use order_porter_engine::{
    test_utils::fixtures::{detail, summary},
    FetchReport,
    FetchTarget,
    Unauthenticated,
};
use serde_json::{json, Value};
use vivid_tools::{OrderRecord, OrderStatus, TransferResult, VividApiError};

use super::{
    helpers::{get_request, post_request, porter_for, TestDashboard},
    mocks::MockVendor,
};
use crate::{
    data_objects::{ExportResult, OrderDetail},
    sweeps::SweepOutcome,
};

/// Polls `GET /fetch/last` until the sweep is no longer running.
async fn last_sweep(dashboard: &TestDashboard) -> SweepOutcome {
    for _ in 0..200 {
        let (status, body) = get_request(dashboard, "/fetch/last").await;
        assert_eq!(status, StatusCode::OK);
        let outcome: SweepOutcome = serde_json::from_str(&body).unwrap();
        if !outcome.is_running() {
            return outcome;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("The sweep did not finish");
}

fn vendor_with_orders() -> MockVendor {
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().withf(|status| *status == OrderStatus::PendingShipment).returning(|_| {
        Ok(vec![
            summary("ORD-1234", "2020-01-01"),
            summary("ORD-5678", "2999-06-01"),
            summary("ORD-9999", "2999-06-02").with_field("event", "Bruce Springsteen"),
        ])
    });
    vendor
}

#[actix_web::test]
async fn fetch_and_wait_returns_the_report() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let porter = porter_for(vendor_with_orders(), dir.path()).await;
    let (status, body) = post_request(&porter, "/fetch", Some(json!({"wait": true}))).await;
    assert_eq!(status, StatusCode::OK);
    let report: FetchReport = serde_json::from_str(&body).unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.inserted, 3);
    assert!(report.snapshot.is_some());
}

#[actix_web::test]
async fn order_list_is_filtered() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let porter = porter_for(vendor_with_orders(), dir.path()).await;
    post_request(&porter, "/fetch", Some(json!({"wait": true, "status": "PENDING_SHIPMENT"}))).await;

    let (status, body) = get_request(&porter, "/orders").await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<OrderRecord> = serde_json::from_str(&body).unwrap();
    assert_eq!(all.len(), 3);

    let (_, body) = get_request(&porter, "/orders?hide_past=true").await;
    let upcoming: Vec<OrderRecord> = serde_json::from_str(&body).unwrap();
    assert_eq!(upcoming.len(), 2);

    let (_, body) = get_request(&porter, "/orders?query=9999").await;
    let found: Vec<OrderRecord> = serde_json::from_str(&body).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].order_id(), Some("ORD-9999"));
}

#[actix_web::test]
async fn single_order_and_missing_order() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let porter = porter_for(vendor_with_orders(), dir.path()).await;
    post_request(&porter, "/fetch", Some(json!({"wait": true}))).await;

    let (status, body) = get_request(&porter, "/orders/ORD-5678").await;
    assert_eq!(status, StatusCode::OK);
    let detail: OrderDetail = serde_json::from_str(&body).unwrap();
    assert_eq!(detail.order.event_date(), Some("2999-06-01"));
    assert_eq!(detail.sources.len(), 1);

    let (status, body) = get_request(&porter, "/orders/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert!(err["error"].as_str().unwrap().contains("NOPE"));
}

#[actix_web::test]
async fn rate_limited_fetch() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().returning(|_| Err(VividApiError::RateLimited));
    let porter = porter_for(vendor, dir.path()).await;
    let (status, body) = post_request(&porter, "/fetch", Some(json!({"wait": true}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body.contains("Too many requests"));
    let (_, body) = get_request(&porter, "/orders").await;
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn fetch_without_a_token() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let porter = porter_for(Unauthenticated, dir.path()).await;
    let (status, _) = post_request(&porter, "/fetch", Some(json!({"wait": true, "retransfer": true}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn background_fetch_is_accepted() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let porter = porter_for(vendor_with_orders(), dir.path()).await;
    let (status, _) = get_request(&porter, "/fetch/last").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = post_request(&porter, "/fetch", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.contains("PENDING_SHIPMENT sweep started"));
    match last_sweep(&porter).await {
        SweepOutcome::Finished { report } => assert_eq!(report.inserted, 3),
        other => panic!("Unexpected outcome: {other:?}"),
    }
}

#[actix_web::test]
async fn background_rate_limit_is_reported() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().returning(|_| Err(VividApiError::RateLimited));
    let porter = porter_for(vendor, dir.path()).await;
    let (status, _) = post_request(&porter, "/fetch", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    match last_sweep(&porter).await {
        SweepOutcome::Failed { target, status, error } => {
            assert_eq!(target, FetchTarget::Status(OrderStatus::PendingShipment));
            assert_eq!(status, 429);
            assert!(error.contains("Too many requests"));
        },
        other => panic!("Unexpected outcome: {other:?}"),
    }
}

#[actix_web::test]
async fn transfers() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let mut vendor = vendor_with_orders();
    vendor.expect_fetch_order_detail().returning(|id| Ok(detail(id, id != "ORD-1234")));
    vendor
        .expect_submit_transfer()
        .withf(|req| req.order_id == "ORD-5678" && req.order_token == "token-ORD-5678")
        .times(1)
        .returning(|_| Ok(TransferResult { success: true, message: "Transfer submitted".into() }));
    let porter = porter_for(vendor, dir.path()).await;
    post_request(&porter, "/fetch", Some(json!({"wait": true, "enrich": true}))).await;

    let body = json!({"urls": ["https://tickets.example/a"]});
    let (status, res) = post_request(&porter, "/orders/ORD-5678/transfer", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let result: TransferResult = serde_json::from_str(&res).unwrap();
    assert!(result.success);

    let (status, _) = post_request(&porter, "/orders/ORD-1234/transfer", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_request(&porter, "/orders/ORD-5678/transfer", Some(json!({"urls": [" "]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn detail_refresh() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let mut vendor = vendor_with_orders();
    vendor.expect_fetch_order_detail().times(1).returning(|id| Ok(detail(id, true)));
    let porter = porter_for(vendor, dir.path()).await;
    post_request(&porter, "/fetch", Some(json!({"wait": true}))).await;
    let (status, body) = post_request(&porter, "/orders/ORD-9999/detail", None).await;
    assert_eq!(status, StatusCode::OK);
    let record: OrderRecord = serde_json::from_str(&body).unwrap();
    assert_eq!(record.order_token(), Some("token-ORD-9999"));
    assert_eq!(record.event(), Some("Bruce Springsteen"));
}

#[actix_web::test]
async fn export_and_warehouse() {
    let _ = env_logger::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let porter = porter_for(vendor_with_orders(), dir.path()).await;

    let (status, body) = post_request(&porter, "/export", None).await;
    assert_eq!(status, StatusCode::OK);
    let empty: ExportResult = serde_json::from_str(&body).unwrap();
    assert_eq!(empty.rows, 0);
    assert!(empty.path.is_none());

    post_request(&porter, "/fetch", Some(json!({"wait": true}))).await;
    let (status, body) = post_request(&porter, "/export", Some(json!({"hide_past": true}))).await;
    assert_eq!(status, StatusCode::OK);
    let exported: ExportResult = serde_json::from_str(&body).unwrap();
    assert_eq!(exported.rows, 2);
    let path = exported.path.unwrap();
    assert!(path.contains("vivid_orders_EXPORT_"));
    assert!(std::path::Path::new(&path).exists());

    let (status, _) = post_request(&porter, "/warehouse", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
