//! CLI argument definitions for logharbor-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! Flags take precedence over environment variables, which take
//! precedence over the configuration file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use logharbor_core::config::LogharborConfig;

/// logharbor syslog collector daemon.
///
/// Receives RFC 3164 / RFC 5424 syslog over UDP and/or TCP and writes
/// every parsed message to stdout as one JSON object per line.
#[derive(Parser, Debug, Default)]
#[command(name = "logharbor-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logharbor.toml configuration file.
    ///
    /// When omitted, built-in defaults plus environment overrides are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override listen address (e.g. ":514", "127.0.0.1:5514").
    #[arg(short, long)]
    pub address: Option<String>,

    /// Override protocol (udp, tcp, both).
    #[arg(short, long)]
    pub protocol: Option<String>,

    /// Override TCP framing (auto, octet-counting, non-transparent).
    #[arg(long)]
    pub framing: Option<String>,

    /// Validate configuration and exit without starting the collector.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Load the configuration file (or defaults), then apply environment
    /// overrides and CLI flags, and validate the result.
    pub async fn load_config(&self) -> Result<LogharborConfig> {
        let mut config = match &self.config {
            Some(path) => LogharborConfig::load(path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
            None => {
                let mut config = LogharborConfig::default();
                config.apply_env_overrides();
                config
            }
        };

        self.apply_overrides(&mut config);
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        Ok(config)
    }

    /// Apply flags that were given on the command line.
    pub fn apply_overrides(&self, config: &mut LogharborConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.general.log_format.clone_from(format);
        }
        if let Some(address) = &self.address {
            config.collector.address.clone_from(address);
        }
        if let Some(protocol) = &self.protocol {
            config.collector.protocol.clone_from(protocol);
        }
        if let Some(framing) = &self.framing {
            config.collector.framing.clone_from(framing);
        }
    }
}
