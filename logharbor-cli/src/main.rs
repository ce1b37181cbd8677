//! logharbor command-line tool.
//!
//! Parses syslog messages, sends test traffic to a collector, and inspects
//! configuration files. Logs go to stderr so command output on stdout can
//! be piped.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use logharbor_cli::cli::{Cli, Commands};
use logharbor_cli::commands;
use logharbor_cli::error::CliError;
use logharbor_cli::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Parse(args) => commands::parse::execute(args, &writer).await,
        Commands::Send(args) => commands::send::execute(args, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
