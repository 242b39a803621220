//! The outcome of the most recent fetch sweep.
//!
//! Sweeps started over HTTP run in the background, so their result can't go back in the `POST /fetch` response.
//! [`SweepLog`] keeps it instead, and `GET /fetch/last` hands it to the dashboard.
use actix_web::{web, ResponseError};
use log::*;
use order_porter_engine::{worker::join_sweep, FetchReport, FetchTarget, PorterError, WorkerError};
use serde::{Deserialize, Serialize};
use tokio::{sync::RwLock, task::JoinHandle};

use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SweepOutcome {
    Running { target: FetchTarget },
    Finished { report: FetchReport },
    /// `status` is the HTTP status the error would have had on a blocking fetch.
    Failed { target: FetchTarget, status: u16, error: String },
}

impl SweepOutcome {
    pub fn failed(target: FetchTarget, e: WorkerError) -> Self {
        let e = ServerError::from(PorterError::Worker(e));
        Self::Failed { target, status: e.status_code().as_u16(), error: e.to_string() }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

#[derive(Debug, Default)]
pub struct SweepLog {
    last: RwLock<Option<SweepOutcome>>,
}

impl SweepLog {
    pub async fn last(&self) -> Option<SweepOutcome> {
        self.last.read().await.clone()
    }

    pub async fn record(&self, outcome: SweepOutcome) {
        *self.last.write().await = Some(outcome);
    }

    pub async fn record_result(&self, target: FetchTarget, result: Result<FetchReport, WorkerError>) {
        let outcome = match result {
            Ok(report) => SweepOutcome::Finished { report },
            Err(e) => {
                warn!("📋️ {target} sweep failed. {e}");
                SweepOutcome::failed(target, e)
            },
        };
        self.record(outcome).await;
    }

    /// Marks the sweep as running, then records how it ends once the task completes.
    pub async fn follow(
        log: web::Data<SweepLog>,
        target: FetchTarget,
        handle: JoinHandle<Result<FetchReport, WorkerError>>,
    ) {
        log.record(SweepOutcome::Running { target }).await;
        tokio::spawn(async move {
            let result = join_sweep(handle).await;
            log.record_result(target, result).await;
        });
    }
}

#[cfg(test)]
mod test {
    use vivid_tools::{OrderStatus, VividApiError};

    use super::*;

    #[tokio::test]
    async fn failures_keep_their_status() {
        let log = SweepLog::default();
        assert_eq!(log.last().await, None);
        let target = FetchTarget::Status(OrderStatus::Completed);
        log.record_result(target, Err(WorkerError::Vendor(VividApiError::MissingCredential))).await;
        match log.last().await {
            Some(SweepOutcome::Failed { status, error, .. }) => {
                assert_eq!(status, 503);
                assert!(error.starts_with("Unavailable."));
            },
            other => panic!("Unexpected outcome: {other:?}"),
        }
    }
}
