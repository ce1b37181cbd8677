//! `logharbor parse` command handler

use std::io::Write;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use logharbor_collector::parser;
use logharbor_core::error::ParseError;
use logharbor_core::types::SyslogMessage;

use crate::cli::{MessageFormat, ParseArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `parse` command.
///
/// Parses the message argument, or every non-empty stdin line when no
/// argument is given. Fails with `CliError::Parse` if any message fails.
pub async fn execute(args: ParseArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let inputs = match args.message {
        Some(message) => vec![message],
        None => read_stdin_lines().await?,
    };

    let report = parse_all(&inputs, args.format);
    writer.render(&report)?;

    let failed = report.failed();
    if failed > 0 {
        return Err(CliError::Parse {
            failed,
            total: report.results.len(),
        });
    }
    Ok(())
}

async fn read_stdin_lines() -> Result<Vec<String>, CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut inputs = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            inputs.push(line.to_owned());
        }
    }
    debug!(count = inputs.len(), "read messages from stdin");
    Ok(inputs)
}

/// Parse every input with the selected format.
pub fn parse_all(inputs: &[String], format: MessageFormat) -> ParseReport {
    let results = inputs
        .iter()
        .map(|raw| {
            let outcome = parse_one(raw, format);
            match outcome {
                Ok(message) => ParseOutcome {
                    input: raw.clone(),
                    format: Some(detected_format(raw, format)),
                    message: Some(message),
                    error: None,
                },
                Err(e) => ParseOutcome {
                    input: raw.clone(),
                    format: None,
                    message: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    ParseReport { results }
}

fn parse_one(raw: &str, format: MessageFormat) -> Result<SyslogMessage, ParseError> {
    match format {
        MessageFormat::Auto => parser::parse(raw),
        MessageFormat::Rfc3164 => parser::parse_rfc3164(raw),
        MessageFormat::Rfc5424 => parser::parse_rfc5424(raw),
    }
}

fn detected_format(raw: &str, format: MessageFormat) -> &'static str {
    match format {
        MessageFormat::Rfc3164 => "rfc3164",
        MessageFormat::Rfc5424 => "rfc5424",
        MessageFormat::Auto if parser::is_rfc5424(raw) => "rfc5424",
        MessageFormat::Auto => "rfc3164",
    }
}

/// Result of parsing a batch of messages.
#[derive(Serialize)]
pub struct ParseReport {
    /// One entry per input, in input order.
    pub results: Vec<ParseOutcome>,
}

impl ParseReport {
    /// Number of inputs that failed to parse.
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }
}

/// Result of parsing one message.
#[derive(Serialize)]
pub struct ParseOutcome {
    /// Raw input text
    pub input: String,
    /// Detected or forced format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    /// Parsed message on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<SyslogMessage>,
    /// Error text on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for (idx, outcome) in self.results.iter().enumerate() {
            if idx > 0 {
                writeln!(w)?;
            }
            outcome.render_text(w)?;
        }
        Ok(())
    }
}

impl Render for ParseOutcome {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Input: {}", self.input.bold())?;

        let Some(msg) = &self.message else {
            let error = self.error.as_deref().unwrap_or("unknown error");
            writeln!(w, "  Result:    {}", "FAILED".red().bold())?;
            writeln!(w, "  Error:     {}", error.red())?;
            return Ok(());
        };

        writeln!(
            w,
            "  Format:    {}",
            self.format.unwrap_or("unknown").green()
        )?;
        writeln!(w, "  Priority:  {}", msg.priority())?;
        writeln!(
            w,
            "  Facility:  {} ({})",
            msg.facility,
            msg.facility_name()
        )?;
        writeln!(
            w,
            "  Severity:  {} ({})",
            msg.severity,
            msg.severity_name()
        )?;
        writeln!(w, "  Timestamp: {}", msg.timestamp.to_rfc3339())?;
        writeln!(w, "  Hostname:  {}", msg.hostname)?;
        writeln!(w, "  Tag:       {}", msg.tag)?;

        let optional = [
            ("PID", &msg.pid),
            ("App name", &msg.app_name),
            ("Proc ID", &msg.proc_id),
            ("Msg ID", &msg.msg_id),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                writeln!(w, "  {:<10} {}", format!("{label}:"), value)?;
            }
        }

        for element in &msg.structured_data {
            write!(w, "  SD:        [{}", element.id.cyan())?;
            for (name, value) in &element.params {
                write!(w, " {name}=\"{value}\"")?;
            }
            writeln!(w, "]")?;
        }

        writeln!(w, "  Message:   {}", msg.message)?;
        Ok(())
    }
}
