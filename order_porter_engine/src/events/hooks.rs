use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, StoreEvent, WorkerEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub store_refreshed_producer: Vec<EventProducer<StoreEvent>>,
    pub worker_producer: Vec<EventProducer<WorkerEvent>>,
}

impl EventProducers {
    pub async fn publish_store_event(&self, event: StoreEvent) {
        for producer in &self.store_refreshed_producer {
            producer.publish_event(event).await;
        }
    }

    pub async fn publish_worker_event(&self, event: WorkerEvent) {
        for producer in &self.worker_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_store_refreshed: Option<EventHandler<StoreEvent>>,
    pub on_worker_event: Option<EventHandler<WorkerEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_store_refreshed = hooks.on_store_refreshed.map(|f| EventHandler::new(buffer_size, f));
        let on_worker_event = hooks.on_worker_event.map(|f| EventHandler::new(buffer_size, f));
        Self { on_store_refreshed, on_worker_event }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_store_refreshed {
            result.store_refreshed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_worker_event {
            result.worker_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_store_refreshed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_worker_event {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_store_refreshed: Option<Handler<StoreEvent>>,
    pub on_worker_event: Option<Handler<WorkerEvent>>,
}

impl EventHooks {
    pub fn on_store_refreshed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(StoreEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_store_refreshed = Some(Arc::new(f));
        self
    }

    pub fn on_worker_event<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(WorkerEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_worker_event = Some(Arc::new(f));
        self
    }
}
