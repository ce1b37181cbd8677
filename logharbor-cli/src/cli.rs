//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use logharbor_core::types::FramingMethod;

/// logharbor -- syslog parsing and delivery tools.
///
/// Use `logharbor <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logharbor", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logharbor.toml configuration file.
    #[arg(short, long, global = true, default_value = "logharbor.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse syslog messages and print their fields.
    Parse(ParseArgs),

    /// Send syslog messages to a collector.
    Send(SendArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- parse ----

/// Parse one message, or one message per stdin line.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Raw syslog message. Reads stdin line by line when omitted.
    pub message: Option<String>,

    /// Force a message format instead of auto-detection.
    #[arg(long, default_value = "auto")]
    pub format: MessageFormat,
}

/// Syslog message format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// Detect RFC 5424 by its VERSION field, otherwise RFC 3164.
    Auto,
    /// BSD syslog.
    Rfc3164,
    /// IETF syslog.
    Rfc5424,
}

// ---- send ----

/// Send messages over TCP (framed) or UDP (one datagram each).
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Collector address (HOST:PORT, or :PORT for localhost).
    #[arg(short, long, default_value = "127.0.0.1:514")]
    pub address: String,

    /// Transport protocol.
    #[arg(short, long, default_value = "tcp")]
    pub protocol: SendProtocol,

    /// TCP framing method (ignored for UDP).
    #[arg(short, long, default_value = "octet-counting")]
    pub framing: FramingArg,

    /// Messages to send, in order.
    #[arg(required = true, num_args = 1..)]
    pub messages: Vec<String>,
}

/// Transport for `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SendProtocol {
    /// Stream with RFC 6587 framing.
    Tcp,
    /// One datagram per message.
    Udp,
}

/// TCP framing for `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    /// `<length> <message>`
    OctetCounting,
    /// `<message>\n`
    NonTransparent,
}

impl From<FramingArg> for FramingMethod {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::OctetCounting => Self::OctetCounting,
            FramingArg::NonTransparent => Self::NonTransparent,
        }
    }
}

// ---- config ----

/// Manage logharbor configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, collector, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_message_argument() {
        let cli = Cli::try_parse_from(["logharbor", "parse", "<34>Oct 11 22:14:15 host su: x"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.message.as_deref(), Some("<34>Oct 11 22:14:15 host su: x"));
                assert_eq!(args.format, MessageFormat::Auto);
            }
            _ => panic!("expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parse_without_message_reads_stdin() {
        let cli = Cli::try_parse_from(["logharbor", "parse", "--format", "rfc5424"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Parse(args) => {
                assert!(args.message.is_none());
                assert_eq!(args.format, MessageFormat::Rfc5424);
            }
            _ => panic!("expected Parse command"),
        }
    }

    #[test]
    fn test_cli_send_defaults() {
        let cli = Cli::try_parse_from(["logharbor", "send", "hello"]).expect("parse succeeded");
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.address, "127.0.0.1:514");
                assert_eq!(args.protocol, SendProtocol::Tcp);
                assert_eq!(args.framing, FramingArg::OctetCounting);
                assert_eq!(args.messages, vec!["hello"]);
            }
            _ => panic!("expected Send command"),
        }
    }

    #[test]
    fn test_cli_send_udp_multiple_messages() {
        let cli = Cli::try_parse_from([
            "logharbor",
            "send",
            "--address",
            ":5514",
            "--protocol",
            "udp",
            "--framing",
            "non-transparent",
            "one",
            "two",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.protocol, SendProtocol::Udp);
                assert_eq!(FramingMethod::from(args.framing), FramingMethod::NonTransparent);
                assert_eq!(args.messages, vec!["one", "two"]);
            }
            _ => panic!("expected Send command"),
        }
    }

    #[test]
    fn test_cli_send_requires_message() {
        assert!(Cli::try_parse_from(["logharbor", "send"]).is_err());
    }

    #[test]
    fn test_cli_config_show_section() {
        let cli = Cli::try_parse_from([
            "logharbor",
            "--output",
            "json",
            "config",
            "show",
            "--section",
            "collector",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("collector")),
            _ => panic!("expected Config Show command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "logharbor",
            "config",
            "validate",
            "--config",
            "/etc/logharbor/logharbor.toml",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("/etc/logharbor/logharbor.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
