use anyhow::Result;
use log::*;
use order_porter_engine::{
    events::{EventHooks, WorkerEvent},
    source_from_config,
    OrderPorter,
    PorterConfig,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// A running engine plus the worker events it publishes.
pub struct Session {
    pub porter: OrderPorter,
    pub events: UnboundedReceiver<WorkerEvent>,
}

impl Session {
    pub async fn start() -> Result<Self> {
        let config = PorterConfig::new_from_env_or_default();
        Self::start_with(config).await
    }

    pub async fn start_with(config: PorterConfig) -> Result<Self> {
        let source = source_from_config(&config.vivid)?;
        let (tx, events) = unbounded_channel();
        let mut hooks = EventHooks::default();
        hooks.on_worker_event(move |ev| {
            let tx = tx.clone();
            Box::pin(async move {
                // Only fails once the session has been dropped
                let _ = tx.send(ev);
            })
        });
        let porter = OrderPorter::start(config, source, hooks).await?;
        let restored = porter.restored();
        if restored.files > 0 {
            info!("🗃️ Reloaded {} orders from {} snapshot(s)", restored.orders.inserted, restored.files);
        }
        Ok(Self { porter, events })
    }

    /// Throws away progress from earlier sweeps.
    pub fn drain_events(&mut self) {
        while self.events.try_recv().is_ok() {}
    }
}
