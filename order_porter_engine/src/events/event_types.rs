use serde::{Deserialize, Serialize};

use crate::worker::{FetchReport, FetchTarget};

/// Published by the store task after every ingest, whether or not any data changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    Refreshed { revision: u64, len: usize },
}

/// Progress reports from the fetch worker, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerEvent {
    Started(FetchTarget),
    /// The list call returned this many records. They have been handed to the store.
    Fetched { target: FetchTarget, count: usize },
    /// One order's detail was retrieved. `done` counts attempts so far, out of `total`.
    Enriched { order_id: String, done: usize, total: usize },
    EnrichmentFailed { order_id: String, reason: String },
    SnapshotWritten { path: String, rows: usize },
    SnapshotFailed(String),
    Finished(FetchReport),
    /// The sweep was abandoned before anything reached the store.
    Failed { target: FetchTarget, reason: String },
}

impl WorkerEvent {
    /// True for the events that end a sweep.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerEvent::Finished(_) | WorkerEvent::Failed { .. })
    }
}
