#![warn(missing_docs)]

//! `strayfind` binary entry point.

use anyhow::Result;
use clap::Parser;
use strayfind_cli::{Cli, Runner, StrayConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = StrayConfig::load(&cli)?.merge_cli(&cli).resolve(cli.do_move)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let report = Runner::new(config, cancel).run().await?;
    tracing::info!(
        mode = %report.mode,
        entries = report.entries_scanned,
        untracked = report.untracked.len(),
        moved = report.moves.moved,
        "strayfind finished"
    );
    Ok(())
}
