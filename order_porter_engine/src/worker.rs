//! # The fetch worker
//!
//! A fetch sweep runs off the caller's task: list the orders for one status, hand them to the store, optionally
//! fetch the detail of every order one at a time, and finally write a CSV snapshot of the batch. The worker never
//! touches the store directly. Everything it learns is posted to the store task through a [`StoreHandle`], and its
//! progress is published as [`WorkerEvent`]s.
//!
//! Only one sweep may run at a time. Asking for another while one is in flight fails with [`WorkerError::Busy`].
use std::{
    collections::HashSet,
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use vivid_tools::{OrderRecord, OrderStatus, VividApiError, RETRANSFER_STATUS};

use crate::{
    events::{EventProducers, WorkerEvent},
    export::SnapshotStore,
    store_actor::{StoreError, StoreHandle},
    traits::OrderSource,
};

#[derive(Debug, Clone, Error)]
pub enum WorkerError {
    #[error("A fetch is already in progress. Wait for it to finish.")]
    Busy,
    #[error(transparent)]
    Vendor(#[from] VividApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("The worker task panicked or was cancelled: {0}")]
    Aborted(String),
}

/// Which list endpoint a sweep reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTarget {
    Status(OrderStatus),
    RetransferPending,
}

impl FetchTarget {
    /// The status string the fetched records will carry.
    pub fn label(&self) -> &'static str {
        match self {
            FetchTarget::Status(status) => status.as_str(),
            FetchTarget::RetransferPending => RETRANSFER_STATUS,
        }
    }
}

impl Display for FetchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<OrderStatus> for FetchTarget {
    fn from(status: OrderStatus) -> Self {
        FetchTarget::Status(status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJob {
    pub target: FetchTarget,
    /// Fetch the detail of every listed order after the list call.
    pub enrich: bool,
    /// Write a CSV snapshot of the batch once the sweep is done.
    pub snapshot: bool,
}

impl FetchJob {
    pub fn new<T: Into<FetchTarget>>(target: T) -> Self {
        Self { target: target.into(), enrich: false, snapshot: true }
    }

    pub fn with_enrichment(mut self, enrich: bool) -> Self {
        self.enrich = enrich;
        self
    }

    pub fn with_snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = snapshot;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub target: FetchTarget,
    /// Records returned by the list call.
    pub fetched: usize,
    /// Of those, orders the store had not seen before.
    pub inserted: usize,
    pub duplicates: usize,
    pub enriched: usize,
    /// Order ids whose detail call failed, with the reason.
    pub enrichment_failures: Vec<(String, String)>,
    pub snapshot: Option<String>,
    pub snapshot_error: Option<String>,
}

impl FetchReport {
    fn new(target: FetchTarget) -> Self {
        Self {
            target,
            fetched: 0,
            inserted: 0,
            duplicates: 0,
            enriched: 0,
            enrichment_failures: Vec::new(),
            snapshot: None,
            snapshot_error: None,
        }
    }
}

/// Clears the busy flag when dropped, however the sweep ends.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct FetchWorker {
    source: Arc<dyn OrderSource>,
    store: StoreHandle,
    snapshots: Option<SnapshotStore>,
    producers: EventProducers,
    busy: Arc<AtomicBool>,
}

impl FetchWorker {
    pub fn new(source: Arc<dyn OrderSource>, store: StoreHandle, producers: EventProducers) -> Self {
        Self { source, store, snapshots: None, producers, busy: Arc::new(AtomicBool::new(false)) }
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotStore) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn source(&self) -> &Arc<dyn OrderSource> {
        &self.source
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn producers(&self) -> &EventProducers {
        &self.producers
    }

    pub fn snapshots(&self) -> Option<&SnapshotStore> {
        self.snapshots.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Result<BusyGuard, WorkerError> {
        self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).map_err(|_| WorkerError::Busy)?;
        Ok(BusyGuard(Arc::clone(&self.busy)))
    }

    /// Starts a sweep in the background. The busy check happens before this returns, so a second call fails
    /// immediately. Do not hold the caller's UI loop on the returned handle; follow the worker events instead.
    pub fn spawn(&self, job: FetchJob) -> Result<JoinHandle<Result<FetchReport, WorkerError>>, WorkerError> {
        let guard = self.try_acquire()?;
        let worker = self.clone();
        Ok(tokio::spawn(async move {
            let _guard = guard;
            worker.sweep(job).await
        }))
    }

    /// Runs a sweep on the current task.
    pub async fn run(&self, job: FetchJob) -> Result<FetchReport, WorkerError> {
        let _guard = self.try_acquire()?;
        self.sweep(job).await
    }

    /// Fetches one order's detail and posts it to the store as enrichment. Shares the busy flag with sweeps, so
    /// detail calls are never issued concurrently.
    pub async fn refresh_detail(&self, order_id: &str) -> Result<OrderRecord, WorkerError> {
        let _guard = self.try_acquire()?;
        let detail = self.source.fetch_order_detail(order_id).await?;
        self.store.ingest_enrichment(order_id, detail).await?;
        let merged = self.store.get(order_id).await?;
        Ok(merged.unwrap_or_default())
    }

    async fn sweep(&self, job: FetchJob) -> Result<FetchReport, WorkerError> {
        let target = job.target;
        info!("👷️ Starting {target} sweep (enrich: {}, snapshot: {})", job.enrich, job.snapshot);
        self.publish(WorkerEvent::Started(target)).await;
        let fetched = match self.fetch(target).await {
            Ok(records) => records,
            Err(e) => {
                warn!("👷️ {target} sweep failed before anything was stored. {e}");
                self.publish(WorkerEvent::Failed { target, reason: e.to_string() }).await;
                return Err(e.into());
            },
        };
        let mut report = FetchReport::new(target);
        report.fetched = fetched.len();
        let order_ids = unique_order_ids(&fetched);
        let ingested = self.store.ingest_summary(fetched).await?;
        report.inserted = ingested.inserted;
        report.duplicates = ingested.duplicates;
        self.publish(WorkerEvent::Fetched { target, count: report.fetched }).await;

        if job.enrich {
            self.enrich(&order_ids, &mut report).await?;
        }
        if job.snapshot {
            self.snapshot(target, order_ids, &mut report).await?;
        }
        info!(
            "👷️ {target} sweep done. {} fetched, {} new, {} enriched, {} enrichment failures.",
            report.fetched,
            report.inserted,
            report.enriched,
            report.enrichment_failures.len()
        );
        self.publish(WorkerEvent::Finished(report.clone())).await;
        Ok(report)
    }

    async fn fetch(&self, target: FetchTarget) -> Result<Vec<OrderRecord>, VividApiError> {
        match target {
            FetchTarget::Status(status) => self.source.fetch_orders(status).await,
            FetchTarget::RetransferPending => self.source.fetch_retransfer_pending().await,
        }
    }

    /// Sequential, one detail call at a time. A failed call is logged and skipped.
    async fn enrich(&self, order_ids: &[String], report: &mut FetchReport) -> Result<(), WorkerError> {
        let total = order_ids.len();
        for (i, order_id) in order_ids.iter().enumerate() {
            match self.source.fetch_order_detail(order_id).await {
                Ok(detail) => {
                    self.store.post_enrichment(order_id, detail).await?;
                    report.enriched += 1;
                    trace!("👷️ Enriched order #{order_id} ({}/{total})", i + 1);
                    self.publish(WorkerEvent::Enriched { order_id: order_id.clone(), done: i + 1, total }).await;
                },
                Err(e) => {
                    warn!("👷️ Could not fetch detail for order #{order_id}. Skipping it. {e}");
                    report.enrichment_failures.push((order_id.clone(), e.to_string()));
                    let event = WorkerEvent::EnrichmentFailed { order_id: order_id.clone(), reason: e.to_string() };
                    self.publish(event).await;
                },
            }
        }
        Ok(())
    }

    async fn snapshot(
        &self,
        target: FetchTarget,
        order_ids: Vec<String>,
        report: &mut FetchReport,
    ) -> Result<(), WorkerError> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(());
        };
        let records = self.store.records_for(order_ids).await?;
        match snapshots.write_snapshot(target.label(), &records) {
            Ok(Some(path)) => {
                let path = path.display().to_string();
                self.publish(WorkerEvent::SnapshotWritten { path: path.clone(), rows: records.len() }).await;
                report.snapshot = Some(path);
            },
            Ok(None) => {},
            Err(e) => {
                error!("👷️ Could not write the {target} snapshot. {e}");
                self.publish(WorkerEvent::SnapshotFailed(e.to_string())).await;
                report.snapshot_error = Some(e.to_string());
            },
        }
        Ok(())
    }

    async fn publish(&self, event: WorkerEvent) {
        self.producers.publish_worker_event(event).await;
    }
}

/// The order ids in a batch, first occurrence only.
fn unique_order_ids(records: &[OrderRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records.iter().filter_map(OrderRecord::order_id).filter(|id| seen.insert(*id)).map(String::from).collect()
}

/// Waits for a spawned sweep, folding a panicked or cancelled task into [`WorkerError::Aborted`].
pub async fn join_sweep(handle: JoinHandle<Result<FetchReport, WorkerError>>) -> Result<FetchReport, WorkerError> {
    handle.await.map_err(|e| WorkerError::Aborted(e.to_string()))?
}
