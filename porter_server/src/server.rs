use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use order_porter_engine::{events::EventHooks, source_from_config, OrderPorter};

use crate::{config::ServerConfig, errors::ServerError, routes::configure, sweeps::SweepLog};

/// Hooks for the dashboard. Progress of background sweeps goes to the log; their outcome is kept in [`SweepLog`].
pub fn dashboard_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_worker_event(|ev| {
        Box::pin(async move {
            if ev.is_terminal() {
                info!("📋️ {ev:?}");
            } else {
                debug!("📋️ {ev:?}");
            }
        })
    });
    hooks
}

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let source = source_from_config(&config.porter.vivid)?;
    let porter = OrderPorter::start(config.porter.clone(), source, dashboard_hooks()).await?;
    let restored = porter.restored();
    info!("🚀️ Reloaded {} orders from {} snapshot(s)", restored.orders.inserted, restored.files);
    let porter = web::Data::new(porter);
    let srv = create_server_instance(&config, porter)?;
    srv.await.map_err(ServerError::from)
}

pub fn create_server_instance(config: &ServerConfig, porter: web::Data<OrderPorter>) -> Result<Server, ServerError> {
    let sweeps = web::Data::new(SweepLog::default());
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("porter::access_log"))
            .app_data(porter.clone())
            .app_data(sweeps.clone())
            .configure(configure)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
