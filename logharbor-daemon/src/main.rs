use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use logharbor_daemon::cli::DaemonCli;
use logharbor_daemon::daemon::Daemon;
use logharbor_daemon::logging;
use logharbor_daemon::sink::JsonLinesHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();
    let config = cli.load_config().await?;

    if cli.validate {
        eprintln!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logharbor-daemon starting");

    let daemon = Daemon::build_from_config(config, Arc::new(JsonLinesHandler::stdout()))?;
    daemon.run().await
}
