mod driver;
mod errors;
mod params;

use std::io;
use std::process::ExitCode;
use clap::CommandFactory;
use ebs_blocks::{EbsSnapshotStore, MemorySnapshotStore, SnapshotStores};
use tracing_subscriber::EnvFilter;
use crate::errors::CliError;
use crate::params::{parse_config, Args, RunConfig};

const SDK_TRACE_FILTER: &str = "info,aws_sdk_ebs=trace,aws_smithy_runtime=trace,aws_config=debug";

fn init_tracing(sdk_trace: bool) {
    let default_filter = if sdk_trace { SDK_TRACE_FILTER } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn build_store(config: &RunConfig) -> SnapshotStores {
    if config.dry_run {
        tracing::warn!("Dry run, writing to an in-memory store");
        SnapshotStores::Memory(MemorySnapshotStore::new())
    } else {
        SnapshotStores::Ebs(EbsSnapshotStore::from_config(&config.client).await)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match parse_config(std::env::args_os()) {
        Ok(config) => config,
        Err(CliError::Args(e)) => {
            // --help lands here as well and exits non-zero
            if let Err(print_err) = e.print() {
                eprintln!("Failed to print usage: {}", print_err);
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.sdk_trace);
    tracing::info!(
        snapshot = %config.snapshot,
        blocks = config.block_indices.len(),
        list = config.list,
        "Starting"
    );

    let stores = build_store(&config).await;
    let stdout = io::stdout();
    match driver::run(&config, stores.as_trait(), &mut stdout.lock()).await {
        Ok(summary) => summary.exit_code(),
        Err(e) => {
            tracing::error!("{}", CliError::from(e));
            ExitCode::FAILURE
        }
    }
}
