//! Order Porter Engine
//!
//! The engine behind the Vivid Seats order porter. It keeps the operator's working set of orders in memory, fills it
//! from the broker API and from earlier CSV snapshots, and writes it back out as CSV or into a SQL warehouse.
//!
//! The library is divided into a few parts:
//! 1. The order store ([`mod@order_store`]) and the task that owns it ([`mod@store_actor`]). All reads and writes
//!    go through a [`StoreHandle`], so the store never needs a lock.
//! 2. The fetch worker ([`mod@worker`]), which lists orders, enriches them one at a time and snapshots the batch.
//!    The vendor is reached only through the [`OrderSource`] trait.
//! 3. Exports ([`mod@export`]) and the warehouse sink ([`mod@warehouse`]).
//! 4. [`OrderPorter`], which wires the above together for the front-ends.
//!
//! The engine also publishes events: a [`events::StoreEvent`] whenever the store is refreshed and a
//! [`events::WorkerEvent`] for every step of a sweep. Front-ends subscribe through [`events::EventHooks`].
pub mod config;
pub mod events;
pub mod export;
pub mod order_store;
mod porter_api;
pub mod store_actor;
pub mod traits;
pub mod transfers;
pub mod warehouse;
pub mod worker;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use config::PorterConfig;
pub use order_store::{OrderStore, RecordSource, StoredOrder, ViewFilter};
pub use porter_api::{OrderPorter, PorterError};
pub use store_actor::{StoreActor, StoreError, StoreHandle};
pub use traits::{source_from_config, OrderSource, Unauthenticated};
pub use worker::{FetchJob, FetchReport, FetchTarget, FetchWorker, WorkerError};
