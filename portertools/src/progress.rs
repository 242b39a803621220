use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use order_porter_engine::{events::WorkerEvent, FetchReport, WorkerError};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::interactive::formatting::format_worker_event;

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    let style = ProgressStyle::with_template("{spinner:5} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["🕛 ", "🕐 ", "🕑 ", "🕒 ", "🕓 ", "🕔 ", "🕕 ", "🕖 ", "🕗 ", "🕘 ", "🕙 ", "🕚 "]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Shows the worker's progress on a spinner until the sweep ends, and returns its report.
pub async fn follow_sweep(
    mut handle: JoinHandle<Result<FetchReport, WorkerError>>,
    events: &mut UnboundedReceiver<WorkerEvent>,
) -> Result<FetchReport> {
    let pb = spinner("Starting sweep...");
    let joined = loop {
        tokio::select! {
            Some(ev) = events.recv() => pb.set_message(format_worker_event(&ev)),
            res = &mut handle => break res,
        }
    };
    while let Ok(ev) = events.try_recv() {
        pb.set_message(format_worker_event(&ev));
    }
    let result = joined.map_err(|e| WorkerError::Aborted(e.to_string())).and_then(|r| r);
    match result {
        Ok(report) => {
            pb.finish_with_message("Done!");
            Ok(report)
        },
        Err(e) => {
            pb.finish_with_message("Error!");
            Err(e.into())
        },
    }
}
