//! The store task
//!
//! [`StoreActor`] owns the [`OrderStore`] and is the only code that ever touches it. Everyone else holds a
//! [`StoreHandle`] and sends [`StoreCommand`]s down a single channel. Mutations are applied in the order they arrive;
//! queries are answered on a oneshot channel carried by the command.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::*;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use vivid_tools::OrderRecord;

use crate::{
    events::{EventProducers, StoreEvent},
    order_store::{IngestSummary, OrderStore, StoreStats, StoredOrder, ViewFilter},
};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("The order store task is no longer running")]
    Closed,
}

type Reply<T> = oneshot::Sender<T>;

pub enum StoreCommand {
    IngestSummary { records: Vec<OrderRecord>, reply: Option<Reply<IngestSummary>> },
    IngestEnrichment { order_id: String, fields: OrderRecord, reply: Option<Reply<bool>> },
    LoadRows { rows: Vec<BTreeMap<String, String>>, reply: Option<Reply<IngestSummary>> },
    View { filter: ViewFilter, today: Option<NaiveDate>, reply: Reply<Vec<OrderRecord>> },
    Get { order_id: String, reply: Reply<Option<OrderRecord>> },
    Entry { order_id: String, reply: Reply<Option<StoredOrder>> },
    Records { reply: Reply<Vec<OrderRecord>> },
    RecordsFor { order_ids: Vec<String>, reply: Reply<Vec<OrderRecord>> },
    Stats { reply: Reply<StoreStats> },
}

pub struct StoreActor {
    store: OrderStore,
    commands: mpsc::Receiver<StoreCommand>,
    producers: EventProducers,
}

impl StoreActor {
    /// Creates the actor and a handle to it. Nothing happens until [`StoreActor::run`] is awaited, or the actor is
    /// handed to [`StoreActor::spawn`].
    pub fn new(store: OrderStore, producers: EventProducers) -> (Self, StoreHandle) {
        let (sender, commands) = mpsc::channel(COMMAND_BUFFER);
        (Self { store, commands, producers }, StoreHandle { sender })
    }

    /// Starts a store task on the tokio runtime. The task ends once every handle has been dropped.
    pub fn spawn(store: OrderStore, producers: EventProducers) -> (StoreHandle, JoinHandle<OrderStore>) {
        let (actor, handle) = Self::new(store, producers);
        (handle, tokio::spawn(actor.run()))
    }

    /// Processes commands until the channel closes, then hands back the store.
    pub async fn run(mut self) -> OrderStore {
        info!("🗃️ Order store task started with {} orders", self.store.len());
        while let Some(command) = self.commands.recv().await {
            self.handle(command).await;
        }
        info!("🗃️ Order store task stopped. {} orders in memory.", self.store.len());
        self.store
    }

    async fn handle(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::IngestSummary { records, reply } => {
                let result = self.store.ingest_summary(records);
                self.refreshed().await;
                respond(reply, result);
            },
            StoreCommand::IngestEnrichment { order_id, fields, reply } => {
                let result = self.store.ingest_enrichment(&order_id, &fields);
                self.refreshed().await;
                respond(reply, result);
            },
            StoreCommand::LoadRows { rows, reply } => {
                let result = self.store.load_from_csv(rows);
                self.refreshed().await;
                respond(reply, result);
            },
            StoreCommand::View { filter, today, reply } => {
                let view = match today {
                    Some(today) => self.store.filtered_view_on(&filter, today),
                    None => self.store.filtered_view(&filter),
                };
                respond(Some(reply), view);
            },
            StoreCommand::Get { order_id, reply } => respond(Some(reply), self.store.get(&order_id)),
            StoreCommand::Entry { order_id, reply } => respond(Some(reply), self.store.entry(&order_id).cloned()),
            StoreCommand::Records { reply } => respond(Some(reply), self.store.records()),
            StoreCommand::RecordsFor { order_ids, reply } => respond(Some(reply), self.store.records_for(&order_ids)),
            StoreCommand::Stats { reply } => respond(Some(reply), self.store.stats()),
        }
    }

    async fn refreshed(&self) {
        let event = StoreEvent::Refreshed { revision: self.store.revision(), len: self.store.len() };
        self.producers.publish_store_event(event).await;
    }
}

fn respond<T>(reply: Option<Reply<T>>, value: T) {
    if let Some(reply) = reply {
        if reply.send(value).is_err() {
            trace!("🗃️ Requester went away before the store replied");
        }
    }
}

/// A cheap, cloneable way to talk to the store task.
#[derive(Clone)]
pub struct StoreHandle {
    sender: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    async fn send(&self, command: StoreCommand) -> Result<(), StoreError> {
        self.sender.send(command).await.map_err(|_| StoreError::Closed)
    }

    async fn request<T>(&self, f: impl FnOnce(Reply<T>) -> StoreCommand) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.send(f(reply)).await?;
        response.await.map_err(|_| StoreError::Closed)
    }

    pub async fn ingest_summary(&self, records: Vec<OrderRecord>) -> Result<IngestSummary, StoreError> {
        self.request(|reply| StoreCommand::IngestSummary { records, reply: Some(reply) }).await
    }

    pub async fn ingest_enrichment(&self, order_id: &str, fields: OrderRecord) -> Result<bool, StoreError> {
        let order_id = order_id.to_string();
        self.request(|reply| StoreCommand::IngestEnrichment { order_id, fields, reply: Some(reply) }).await
    }

    /// Queues an enrichment without waiting for it to be applied.
    pub async fn post_enrichment(&self, order_id: &str, fields: OrderRecord) -> Result<(), StoreError> {
        self.send(StoreCommand::IngestEnrichment { order_id: order_id.to_string(), fields, reply: None }).await
    }

    pub async fn load_from_csv(&self, rows: Vec<BTreeMap<String, String>>) -> Result<IngestSummary, StoreError> {
        self.request(|reply| StoreCommand::LoadRows { rows, reply: Some(reply) }).await
    }

    pub async fn filtered_view(&self, filter: ViewFilter) -> Result<Vec<OrderRecord>, StoreError> {
        self.request(|reply| StoreCommand::View { filter, today: None, reply }).await
    }

    pub async fn filtered_view_on(&self, filter: ViewFilter, today: NaiveDate) -> Result<Vec<OrderRecord>, StoreError> {
        self.request(|reply| StoreCommand::View { filter, today: Some(today), reply }).await
    }

    pub async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError> {
        let order_id = order_id.to_string();
        self.request(|reply| StoreCommand::Get { order_id, reply }).await
    }

    pub async fn entry(&self, order_id: &str) -> Result<Option<StoredOrder>, StoreError> {
        let order_id = order_id.to_string();
        self.request(|reply| StoreCommand::Entry { order_id, reply }).await
    }

    pub async fn records(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.request(|reply| StoreCommand::Records { reply }).await
    }

    /// The merged records for the given ids, in the order given. Unknown ids are left out.
    pub async fn records_for(&self, order_ids: Vec<String>) -> Result<Vec<OrderRecord>, StoreError> {
        self.request(|reply| StoreCommand::RecordsFor { order_ids, reply }).await
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.request(|reply| StoreCommand::Stats { reply }).await
    }
}
