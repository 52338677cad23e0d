use crate::cli::Cli;
use clap::Parser;
use csv::WriterBuilder;
use host_bridge::consts::REAP_INTERVAL;
use host_bridge::errors::{AppErrors, AppResult};
use host_bridge::models::csv_models::call::OutputRow;
use host_bridge::rpc::client::{ClientConfig, RpcClient};
use host_bridge::rpc::console::{Console, RemoteConsole};
use host_bridge::rpc::transport::LoopbackTransport;
use host_bridge::services::csv_service::run_from_csv_path;
use host_bridge::services::host_service::HostService;
use host_bridge::state::HostState;
use log::info;
use std::fs::File;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::LocalSet;

mod cli;

fn main() -> AppResult<()> {
    let args = Cli::parse();
    init_logger(&args.log_level, args.log_file.as_deref())?;
    info!("Application started");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| AppErrors::Io(format!("start runtime: {e}")))?;
    let rows = LocalSet::new().block_on(&runtime, run(args))?;

    emit_results_to_stdout(&rows)?;
    Ok(())
}

/// Logs to stderr, or to `log_file` when one is given.
fn init_logger(log_level: &str, log_file: Option<&str>) -> AppResult<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    if let Some(path) = log_file {
        let file =
            File::create(path).map_err(|e| AppErrors::Io(format!("create {path}: {e}")))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Wires the client to the in-process host and runs the input's calls.
async fn run(args: Cli) -> AppResult<Vec<OutputRow>> {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let transport = LoopbackTransport::new(HostService::new(HostState::default()), inbound_tx);
    let config = ClientConfig {
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let client = RpcClient::with_transport(config, Rc::new(transport));
    info!("call timeout: {:?}", client.config().timeout);

    let pump = tokio::task::spawn_local({
        let client = client.clone();
        async move { client.pump(inbound_rx).await }
    });

    let reaper = tokio::task::spawn_local({
        let client = client.clone();
        async move { client.reap_expired(REAP_INTERVAL).await }
    });

    let console = RemoteConsole::new(client.clone());
    console.log("host bridge ready");

    let rows = run_from_csv_path(&args.input, &client, &console).await;

    client.shutdown();
    pump.abort();
    reaper.abort();
    rows
}

pub fn emit_results_to_stdout(rows: &[OutputRow]) -> AppResult<()> {
    let out = io::stdout();
    let handle = out.lock();
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(handle);

    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AppErrors::Io(format!("write csv: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppErrors::Io(format!("flush csv: {e}")))?;
    Ok(())
}
