//! `logharbor send` command handler

use std::io::Write;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use serde::Serialize;
use tokio::net::{TcpStream, UdpSocket};
use tracing::{debug, info};

use logharbor_collector::FramingWriter;
use logharbor_core::types::FramingMethod;

use crate::cli::{SendArgs, SendProtocol};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `send` command.
pub async fn execute(args: SendArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = send(&args).await?;
    writer.render(&report)
}

/// Deliver every message in `args` in order.
///
/// TCP writes all messages on one connection using the selected framing.
/// UDP sends one datagram per message.
///
/// # Errors
///
/// Returns `CliError::Send` if the address cannot be resolved or a write fails.
pub async fn send(args: &SendArgs) -> Result<SendReport, CliError> {
    let target = resolve(&args.address).await?;
    let framing = FramingMethod::from(args.framing);

    info!(
        address = %target,
        protocol = ?args.protocol,
        count = args.messages.len(),
        "sending syslog messages"
    );

    let bytes = match args.protocol {
        SendProtocol::Tcp => send_tcp(target, framing, &args.messages).await?,
        SendProtocol::Udp => send_udp(target, &args.messages).await?,
    };

    Ok(SendReport {
        address: target.to_string(),
        protocol: match args.protocol {
            SendProtocol::Tcp => "tcp",
            SendProtocol::Udp => "udp",
        },
        framing: (args.protocol == SendProtocol::Tcp).then(|| framing.as_str()),
        sent: args.messages.len(),
        bytes,
    })
}

/// Resolve `HOST:PORT`; a bare `:PORT` targets the local host.
async fn resolve(address: &str) -> Result<SocketAddr, CliError> {
    let address = if address.starts_with(':') {
        format!("127.0.0.1{address}")
    } else {
        address.to_owned()
    };

    tokio::net::lookup_host(&address)
        .await
        .map_err(|e| CliError::Send(format!("cannot resolve {address}: {e}")))?
        .next()
        .ok_or_else(|| CliError::Send(format!("no address found for {address}")))
}

async fn send_tcp(
    target: SocketAddr,
    framing: FramingMethod,
    messages: &[String],
) -> Result<usize, CliError> {
    let stream = TcpStream::connect(target)
        .await
        .map_err(|e| CliError::Send(format!("connect to {target}: {e}")))?;
    let mut writer = FramingWriter::new(stream, framing);

    let mut bytes = 0;
    for message in messages {
        writer.write_message(message).await?;
        bytes += message.len();
        debug!(len = message.len(), "message written");
    }
    Ok(bytes)
}

async fn send_udp(target: SocketAddr, messages: &[String]) -> Result<usize, CliError> {
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local)
        .await
        .map_err(|e| CliError::Send(format!("bind udp socket: {e}")))?;

    let mut bytes = 0;
    for message in messages {
        bytes += socket
            .send_to(message.as_bytes(), target)
            .await
            .map_err(|e| CliError::Send(format!("send to {target}: {e}")))?;
    }
    Ok(bytes)
}

/// Summary of a `send` run.
#[derive(Debug, Serialize)]
pub struct SendReport {
    /// Resolved target address
    pub address: String,
    /// `tcp` or `udp`
    pub protocol: &'static str,
    /// TCP framing, absent for UDP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framing: Option<&'static str>,
    /// Messages delivered
    pub sent: usize,
    /// Payload bytes delivered, framing excluded
    pub bytes: usize,
}

impl Render for SendReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let transport = match self.framing {
            Some(framing) => format!("{}, {}", self.protocol, framing),
            None => self.protocol.to_owned(),
        };
        writeln!(
            w,
            "{} {} message(s) ({} bytes) to {} ({})",
            "Sent".green().bold(),
            self.sent,
            self.bytes,
            self.address.bold(),
            transport
        )
    }
}
