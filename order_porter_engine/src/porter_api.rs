//! `OrderPorter` is the one object the front-ends hold. It starts the store task, reloads earlier snapshots, and
//! exposes every operator action (fetch, view, detail, transfer, export, warehouse push) as an async method.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::*;
use thiserror::Error;
use tokio::task::JoinHandle;
use vivid_tools::{OrderRecord, TransferResult, VividApiError};

use crate::{
    config::PorterConfig,
    events::{EventHandlers, EventHooks},
    export::{write_csv_file, ExportError, RestoreSummary, SnapshotStore},
    order_store::{OrderStore, StoreStats, StoredOrder, ViewFilter},
    store_actor::{StoreActor, StoreError, StoreHandle},
    traits::OrderSource,
    transfers::{submit_transfer, TransferError, TransferOrder},
    warehouse::{PushSummary, WarehouseError},
    worker::{join_sweep, FetchJob, FetchReport, FetchWorker, WorkerError},
};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Error)]
pub enum PorterError {
    #[error(transparent)]
    Vendor(#[from] VividApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

pub struct OrderPorter {
    config: PorterConfig,
    store: StoreHandle,
    worker: FetchWorker,
    snapshots: SnapshotStore,
    restored: RestoreSummary,
    store_task: JoinHandle<OrderStore>,
}

impl OrderPorter {
    /// Starts the store task and the event handlers for `hooks`, then reloads earlier snapshots if the configuration
    /// asks for it. A snapshot that cannot be read is skipped; an invalid snapshot pattern is an error.
    pub async fn start(
        config: PorterConfig,
        source: Arc<dyn OrderSource>,
        hooks: EventHooks,
    ) -> Result<Self, PorterError> {
        let handlers = EventHandlers::new(EVENT_BUFFER, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;
        let store = OrderStore::with_enrichment_threshold(config.enrichment_threshold);
        let (store, store_task) = StoreActor::spawn(store, producers.clone());
        let snapshots = SnapshotStore::new(&config.export_dir, &config.snapshot_pattern);
        let restored = if config.load_snapshots {
            snapshots.restore_into(&store).await?
        } else {
            debug!("🗃️ Snapshot reload is switched off");
            RestoreSummary::default()
        };
        let worker = FetchWorker::new(source, store.clone(), producers).with_snapshots(snapshots.clone());
        Ok(Self { config, store, worker, snapshots, restored, store_task })
    }

    pub fn config(&self) -> &PorterConfig {
        &self.config
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn worker(&self) -> &FetchWorker {
        &self.worker
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// What was reloaded from disk at startup.
    pub fn restored(&self) -> &RestoreSummary {
        &self.restored
    }

    pub fn is_busy(&self) -> bool {
        self.worker.is_busy()
    }

    /// Swaps the vendor client, e.g. after the operator has typed in a token. Fails if a sweep is running.
    pub fn replace_source(&mut self, source: Arc<dyn OrderSource>) -> Result<(), PorterError> {
        if self.worker.is_busy() {
            return Err(WorkerError::Busy.into());
        }
        let producers = self.worker.producers().clone();
        self.worker =
            FetchWorker::new(source, self.store.clone(), producers).with_snapshots(self.snapshots.clone());
        Ok(())
    }

    /// Starts a sweep in the background and returns immediately.
    pub fn start_fetch(&self, job: FetchJob) -> Result<JoinHandle<Result<FetchReport, WorkerError>>, PorterError> {
        Ok(self.worker.spawn(job)?)
    }

    /// Runs a sweep in the background and waits for it to finish.
    pub async fn fetch(&self, job: FetchJob) -> Result<FetchReport, PorterError> {
        let handle = self.worker.spawn(job)?;
        Ok(join_sweep(handle).await?)
    }

    pub async fn refresh_detail(&self, order_id: &str) -> Result<OrderRecord, PorterError> {
        Ok(self.worker.refresh_detail(order_id).await?)
    }

    pub async fn view(&self, filter: ViewFilter) -> Result<Vec<OrderRecord>, PorterError> {
        Ok(self.store.filtered_view(filter).await?)
    }

    pub async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, PorterError> {
        Ok(self.store.get(order_id).await?)
    }

    pub async fn entry(&self, order_id: &str) -> Result<Option<StoredOrder>, PorterError> {
        Ok(self.store.entry(order_id).await?)
    }

    pub async fn stats(&self) -> Result<StoreStats, PorterError> {
        Ok(self.store.stats().await?)
    }

    pub async fn transfer(&self, order: &TransferOrder) -> Result<TransferResult, PorterError> {
        Ok(submit_transfer(self.worker.source().as_ref(), &self.store, order).await?)
    }

    /// Writes the filtered view to `path`. Returns the number of rows written. An empty view leaves the disk alone.
    pub async fn export_csv<P: AsRef<Path>>(&self, path: P, filter: ViewFilter) -> Result<usize, PorterError> {
        let records = self.store.filtered_view(filter).await?;
        if records.is_empty() {
            info!("📤️ Nothing to export");
            return Ok(0);
        }
        let rows = write_csv_file(path.as_ref(), &records)?;
        info!("📤️ Exported {rows} orders to {}", path.as_ref().display());
        Ok(rows)
    }

    /// Writes the filtered view as a timestamped snapshot in the export directory. Nothing is written when the view is
    /// empty.
    pub async fn export_snapshot(
        &self,
        label: &str,
        filter: ViewFilter,
    ) -> Result<(Option<PathBuf>, usize), PorterError> {
        let records = self.store.filtered_view(filter).await?;
        let path = self.snapshots.write_snapshot(label, &records)?;
        match &path {
            Some(p) => info!("📤️ Exported {} orders to {}", records.len(), p.display()),
            None => info!("📤️ Nothing to export"),
        }
        Ok((path, records.len()))
    }

    /// Upserts every order in the store into the configured warehouse.
    #[cfg(feature = "sqlite")]
    pub async fn push_to_warehouse(&self) -> Result<PushSummary, PorterError> {
        let config = self.config.warehouse.as_ref().ok_or(WarehouseError::NotConfigured)?;
        let records = self.store.records().await?;
        let warehouse = crate::warehouse::SqliteWarehouse::connect(config).await?;
        let result = warehouse.push_orders(&records).await;
        warehouse.close().await;
        Ok(result?)
    }

    /// Drops the handles and waits for the store task to drain. Returns the final store.
    pub async fn shutdown(self) -> Option<OrderStore> {
        let Self { store, worker, store_task, .. } = self;
        drop(worker);
        drop(store);
        match store_task.await {
            Ok(store) => Some(store),
            Err(e) => {
                error!("🗃️ Order store task did not shut down cleanly. {e}");
                None
            },
        }
    }
}
