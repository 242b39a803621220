use std::sync::{Arc, Mutex};

use order_porter_engine::{
    events::{EventHandlers, EventHooks, WorkerEvent},
    export::{read_csv_file, SnapshotStore, DEFAULT_SNAPSHOT_PATTERN},
    test_utils::{
        fixtures::{detail, summary},
        prepare_env::{empty_store, prepare_test_env},
    },
    FetchJob,
    FetchTarget,
    FetchWorker,
    WorkerError,
};
use vivid_tools::{parse_orders, OrderStatus, VividApiError, RETRANSFER_STATUS};

use crate::support::MockVendor;

mod support;

fn worker(vendor: MockVendor) -> FetchWorker {
    FetchWorker::new(Arc::new(vendor), empty_store(), Default::default())
}

#[tokio::test]
async fn rate_limited_fetch_leaves_the_store_alone() {
    prepare_test_env();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().times(1).returning(|_| Err(VividApiError::RateLimited));
    vendor.expect_fetch_order_detail().never();
    let worker = worker(vendor);
    let err = worker.run(FetchJob::new(OrderStatus::PendingShipment).with_enrichment(true)).await.unwrap_err();
    assert!(matches!(err, WorkerError::Vendor(VividApiError::RateLimited)));
    let stats = worker.store().stats().await.unwrap();
    assert_eq!(stats.orders, 0);
    assert_eq!(stats.revision, 0);
    assert!(!worker.is_busy());
}

#[tokio::test]
async fn example_document_flows_into_the_store() {
    prepare_test_env();
    let mut vendor = MockVendor::new();
    vendor
        .expect_fetch_orders()
        .withf(|status| *status == OrderStatus::PendingShipment)
        .returning(|_| parse_orders(order_porter_engine::test_utils::fixtures::EXAMPLE_ORDERS_XML));
    let worker = worker(vendor);
    let report = worker.run(FetchJob::new(OrderStatus::PendingShipment)).await.unwrap();
    assert_eq!(report.fetched, 1);
    assert_eq!(report.inserted, 1);
    let records = worker.store().records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].order_id(), Some("12345678"));
    assert_eq!(records[0].status(), Some("PENDING_SHIPMENT"));
    assert_eq!(records[0].event_date(), Some("2026-05-20"));
}

#[tokio::test]
async fn enrichment_is_sequential_and_skips_failures() {
    prepare_test_env();
    let mut vendor = MockVendor::new();
    vendor
        .expect_fetch_orders()
        .returning(|_| Ok(vec![summary("1", "2026-05-20"), summary("2", "2026-05-21"), summary("3", "2026-05-22")]));
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = calls.clone();
    vendor.expect_fetch_order_detail().times(3).returning(move |id| {
        seen.lock().unwrap().push(id.to_string());
        match id {
            "2" => Err(VividApiError::ApiError { status: 500, message: "boom".into() }),
            id => Ok(detail(id, id == "1")),
        }
    });
    let worker = worker(vendor);
    let report = worker.run(FetchJob::new(OrderStatus::PendingShipment).with_enrichment(true)).await.unwrap();
    assert_eq!(*calls.lock().unwrap(), vec!["1", "2", "3"]);
    assert_eq!(report.enriched, 2);
    assert_eq!(report.enrichment_failures.len(), 1);
    assert_eq!(report.enrichment_failures[0].0, "2");
    let store = worker.store();
    assert!(store.get("1").await.unwrap().unwrap().is_transferable());
    assert!(!store.get("3").await.unwrap().unwrap().is_transferable());
    let two = store.entry("2").await.unwrap().unwrap();
    assert!(!two.is_enriched());
    // The summary fields are still visible under the enrichment
    assert_eq!(store.get("1").await.unwrap().unwrap().event_date(), Some("2026-05-20"));
}

#[tokio::test]
async fn retransfer_sweeps_tag_their_records() {
    prepare_test_env();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().never();
    vendor.expect_fetch_retransfer_pending().returning(|| {
        Ok(vec![summary("R1", "2026-05-20").with_field("status", RETRANSFER_STATUS)])
    });
    let worker = worker(vendor);
    let report = worker.run(FetchJob::new(FetchTarget::RetransferPending)).await.unwrap();
    assert_eq!(report.target.label(), RETRANSFER_STATUS);
    assert_eq!(worker.store().get("R1").await.unwrap().unwrap().status(), Some(RETRANSFER_STATUS));
}

#[tokio::test]
async fn only_one_sweep_at_a_time() {
    prepare_test_env();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().returning(|_| Ok(vec![summary("1", "2026-05-20")]));
    vendor.expect_fetch_order_detail().returning(|id| Ok(detail(id, true)));
    let worker = worker(vendor);
    let first = worker.spawn(FetchJob::new(OrderStatus::Completed).with_enrichment(true)).unwrap();
    assert!(worker.is_busy());
    assert!(matches!(worker.spawn(FetchJob::new(OrderStatus::Completed)), Err(WorkerError::Busy)));
    assert!(matches!(worker.refresh_detail("1").await, Err(WorkerError::Busy)));
    first.await.unwrap().unwrap();
    assert!(!worker.is_busy());
    let refreshed = worker.refresh_detail("1").await.unwrap();
    assert_eq!(refreshed.order_token(), Some("token-1"));
}

#[tokio::test]
async fn sweeps_write_a_snapshot_of_the_merged_batch() {
    prepare_test_env();
    let dir = tempfile::tempdir().unwrap();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().returning(|_| Ok(vec![summary("1", "2026-05-20"), summary("2", "2026-05-20")]));
    vendor.expect_fetch_order_detail().returning(|id| Ok(detail(id, true)));
    let snapshots = SnapshotStore::new(dir.path(), DEFAULT_SNAPSHOT_PATTERN);
    let worker = worker(vendor).with_snapshots(snapshots.clone());
    let report = worker.run(FetchJob::new(OrderStatus::Completed).with_enrichment(true)).await.unwrap();
    let path = report.snapshot.expect("no snapshot written");
    assert!(path.contains("vivid_orders_COMPLETED_"));
    let rows = read_csv_file(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["orderToken"], "token-1");
    assert_eq!(rows[1]["eventDate"], "2026-05-20");
    assert_eq!(snapshots.discover().unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_orders_in_a_batch_are_handled_once() {
    prepare_test_env();
    let dir = tempfile::tempdir().unwrap();
    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().returning(|_| {
        Ok(vec![summary("1", "2026-05-20"), summary("2", "2026-05-20"), summary("1", "2026-05-21")])
    });
    vendor.expect_fetch_order_detail().times(2).returning(|id| Ok(detail(id, true)));
    let snapshots = SnapshotStore::new(dir.path(), DEFAULT_SNAPSHOT_PATTERN);
    let worker = worker(vendor).with_snapshots(snapshots);
    let report = worker.run(FetchJob::new(OrderStatus::Completed).with_enrichment(true)).await.unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.enriched, 2);
    let rows = read_csv_file(report.snapshot.unwrap()).unwrap();
    let ids = rows.iter().map(|r| r["orderId"].as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(rows[0]["eventDate"], "2026-05-20");
}

#[tokio::test]
async fn progress_is_published_in_order() {
    prepare_test_env();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let mut hooks = EventHooks::default();
    hooks.on_worker_event(move |ev| {
        let sink = sink.clone();
        Box::pin(async move { sink.lock().unwrap().push(ev) })
    });
    let handlers = EventHandlers::new(4, hooks);
    let producers = handlers.producers();
    let listener = handlers.on_worker_event.expect("hook was registered");

    let mut vendor = MockVendor::new();
    vendor.expect_fetch_orders().returning(|_| Ok(vec![summary("1", "2026-05-20"), summary("2", "2026-05-20")]));
    vendor.expect_fetch_order_detail().returning(|id| match id {
        "1" => Ok(detail(id, true)),
        _ => Err(VividApiError::NetworkError("timed out".into())),
    });
    let worker = FetchWorker::new(Arc::new(vendor), empty_store(), producers);
    let listening = tokio::spawn(listener.start_handler());
    worker.run(FetchJob::new(OrderStatus::Completed).with_enrichment(true)).await.unwrap();
    drop(worker);
    listening.await.unwrap();

    let events = events.lock().unwrap();
    let target = FetchTarget::Status(OrderStatus::Completed);
    assert_eq!(events[0], WorkerEvent::Started(target));
    assert_eq!(events[1], WorkerEvent::Fetched { target, count: 2 });
    assert_eq!(events[2], WorkerEvent::Enriched { order_id: "1".into(), done: 1, total: 2 });
    assert!(matches!(&events[3], WorkerEvent::EnrichmentFailed { order_id, .. } if order_id == "2"));
    assert!(matches!(&events[4], WorkerEvent::Finished(report) if report.enriched == 1));
    assert_eq!(events.len(), 5);
}
