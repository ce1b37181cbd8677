//! CLI-specific error types and exit code mapping

use logharbor_collector::{CollectorError, FramingError};
use logharbor_core::error::LogharborError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// One or more messages could not be parsed.
    #[error("{failed} of {total} message(s) failed to parse")]
    Parse {
        /// Number of failed messages.
        failed: usize,
        /// Number of messages attempted.
        total: usize,
    },

    /// Sending to the collector failed.
    #[error("send error: {0}")]
    Send(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logharbor-core.
    #[error("{0}")]
    Core(#[from] LogharborError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                       |
    /// |------|-------------------------------|
    /// | 0    | Success                       |
    /// | 1    | General / command error       |
    /// | 2    | Configuration error           |
    /// | 3    | Parse failure                 |
    /// | 4    | Send failure                  |
    /// | 10   | IO error                      |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Core(LogharborError::Config(_)) => 2,
            Self::Parse { .. } => 3,
            Self::Send(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<CollectorError> for CliError {
    fn from(e: CollectorError) -> Self {
        match e {
            CollectorError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Command(other.to_string()),
        }
    }
}

impl From<FramingError> for CliError {
    fn from(e: FramingError) -> Self {
        Self::Send(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use logharbor_core::error::ConfigError;

    use super::*;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::from(LogharborError::Config(ConfigError::FileNotFound {
            path: "/missing.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_parse_error() {
        let err = CliError::Parse {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "1 of 3 message(s) failed to parse");
    }

    #[test]
    fn test_exit_code_send_error() {
        let err = CliError::from(FramingError::TooLarge {
            length: 10,
            max: 5,
        });
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_collector_config_error_maps_to_config() {
        let err = CliError::from(CollectorError::Config {
            field: "collector.protocol".to_owned(),
            reason: "unsupported".to_owned(),
        });
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_error_display_messages() {
        let err = CliError::Command("boom".to_owned());
        assert_eq!(err.to_string(), "boom");
        let err = CliError::Send("connection refused".to_owned());
        assert_eq!(err.to_string(), "send error: connection refused");
    }
}
