use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::*;
use order_porter_engine::{FetchTarget, ViewFilter};
use vivid_tools::OrderStatus;

mod commands;
mod interactive;
mod progress;
mod session;

use crate::{interactive::InteractiveApp, session::Session};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Fetch, inspect, transfer and export Vivid Seats broker orders")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "fetch", about = "Fetch the orders with the given status and save a snapshot")]
    Fetch {
        /// UNCONFIRMED, PENDING_SHIPMENT, COMPLETED, VERIFICATION or PENDING_RESERVATION
        #[arg(short = 's', long = "status", default_value = "PENDING_SHIPMENT")]
        status: OrderStatus,
        #[command(flatten)]
        params: FetchParams,
    },
    #[clap(name = "retransfer", about = "Fetch the orders waiting to be transferred again")]
    Retransfer(FetchParams),
    #[clap(name = "detail", about = "Fetch and print the full detail of one order")]
    Detail {
        order_id: String,
    },
    #[clap(name = "transfer", about = "Re-list an order by handing Vivid Seats one or more transfer URLs")]
    Transfer(TransferParams),
    #[clap(name = "view", about = "Print the orders from earlier snapshots")]
    View(ViewParams),
    #[clap(name = "export", about = "Write the orders from earlier snapshots to a single CSV file")]
    Export(ExportParams),
    #[clap(name = "warehouse", about = "Push the orders from earlier snapshots to the warehouse")]
    Warehouse,
    #[clap(name = "interactive", about = "Menu-driven session")]
    Interactive,
}

#[derive(Debug, Args)]
pub struct FetchParams {
    /// Also fetch the detail of every order, one call at a time
    #[arg(short = 'e', long = "enrich")]
    enrich: bool,
    /// Do not write a CSV snapshot of the batch
    #[arg(long = "no-snapshot")]
    no_snapshot: bool,
}

#[derive(Debug, Args)]
pub struct TransferParams {
    order_id: String,
    /// A transfer URL. Repeat for several.
    #[arg(short = 'u', long = "url", required = true)]
    urls: Vec<String>,
    /// Use this order token instead of the one from the order detail
    #[arg(short = 't', long = "token")]
    token: Option<String>,
    /// Where the tickets come from. Defaults to VIVID_TRANSFER_SOURCE.
    #[arg(long = "source")]
    source: Option<String>,
    #[arg(long = "source-url")]
    source_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct ViewParams {
    /// Only orders whose id contains this text
    #[arg(short = 'q', long = "query", default_value = "")]
    query: String,
    /// Only orders for events happening today
    #[arg(long = "today")]
    today: bool,
    /// Leave out orders for events that have already happened
    #[arg(long = "hide-past")]
    hide_past: bool,
    /// Print JSON instead of a table
    #[arg(long = "json")]
    json: bool,
}

impl ViewParams {
    pub fn filter(&self) -> ViewFilter {
        ViewFilter::new(&self.query, self.today, self.hide_past)
    }
}

#[derive(Debug, Args)]
pub struct ExportParams {
    /// The CSV file to write
    #[arg(short = 'o', long = "output")]
    output: PathBuf,
    #[arg(short = 'q', long = "query", default_value = "")]
    query: String,
    #[arg(long = "today")]
    today: bool,
    #[arg(long = "hide-past")]
    hide_past: bool,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let result = match cli.command {
        Command::Fetch { status, params } => commands::fetch(FetchTarget::Status(status), params).await,
        Command::Retransfer(params) => commands::fetch(FetchTarget::RetransferPending, params).await,
        Command::Detail { order_id } => commands::detail(order_id).await,
        Command::Transfer(params) => commands::transfer(params).await,
        Command::View(params) => commands::view(params).await,
        Command::Export(params) => commands::export(params).await,
        Command::Warehouse => commands::warehouse().await,
        Command::Interactive => run_interactive().await.map(|_| "Bye!".to_string()),
    };
    match result {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        },
    }
}

async fn run_interactive() -> anyhow::Result<()> {
    let session = Session::start().await?;
    let mut app = InteractiveApp::new(session);
    let result = app.run().await;
    if app.into_session().porter.shutdown().await.is_none() {
        warn!("🗃️ The order store did not shut down cleanly");
    }
    result
}
