use log::*;

use crate::{events::EventProducers, OrderStore, StoreActor, StoreHandle};

/// Loads `.env.test` if there is one and switches on logging. Safe to call from every test.
pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// A fresh, empty store task with nobody listening to its events.
pub fn empty_store() -> StoreHandle {
    let (handle, _task) = StoreActor::spawn(OrderStore::new(), EventProducers::default());
    handle
}
