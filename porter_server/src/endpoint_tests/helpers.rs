use std::{path::Path, sync::Arc};

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use order_porter_engine::{events::EventHooks, OrderPorter, OrderSource, PorterConfig};

use crate::{routes::configure, sweeps::SweepLog};

/// The shared state a running dashboard hands to every request.
pub struct TestDashboard {
    pub porter: web::Data<OrderPorter>,
    pub sweeps: web::Data<SweepLog>,
}

/// Starts an engine over `source` that keeps its snapshots in `dir`.
pub async fn porter_for<S: OrderSource + 'static>(source: S, dir: &Path) -> TestDashboard {
    let config = PorterConfig { export_dir: dir.to_path_buf(), ..Default::default() };
    let porter = OrderPorter::start(config, Arc::new(source), EventHooks::default()).await.expect("engine did not start");
    TestDashboard { porter: web::Data::new(porter), sweeps: web::Data::new(SweepLog::default()) }
}

async fn send(dashboard: &TestDashboard, req: TestRequest) -> (StatusCode, String) {
    let app = App::new()
        .app_data(dashboard.porter.clone())
        .app_data(dashboard.sweeps.clone())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn get_request(dashboard: &TestDashboard, path: &str) -> (StatusCode, String) {
    send(dashboard, TestRequest::get().uri(path)).await
}

pub async fn post_request(
    dashboard: &TestDashboard,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path);
    let req = match body {
        Some(json) => req.set_json(json),
        None => req,
    };
    send(dashboard, req).await
}
