//! UDP syslog 수신 루프
//!
//! 데이터그램 하나를 메시지 하나로 취급합니다. 최대 크기를 넘는 데이터그램은
//! 최대 크기에서 잘리며, 경고 로그와 메트릭을 남깁니다.

use std::sync::Arc;

use logharbor_core::handler::MessageHandler;
use logharbor_core::metrics as m;
use metrics::counter;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::process_message;
use crate::error::CollectorError;
use crate::framing::trim_delimiters;

const PROTOCOL: &str = "udp";

pub(super) async fn bind(address: &str) -> Result<UdpSocket, CollectorError> {
    UdpSocket::bind(address)
        .await
        .map_err(|source| CollectorError::Bind {
            protocol: PROTOCOL,
            address: address.to_owned(),
            source,
        })
}

/// 취소될 때까지 데이터그램을 수신합니다.
///
/// 수신 에러는 로그만 남기고 계속합니다.
pub(super) async fn receive_loop(
    socket: UdpSocket,
    max_message_size: usize,
    handler: Arc<dyn MessageHandler>,
    cancel: CancellationToken,
) {
    // 한 바이트 더 받아 최대 크기 초과 여부를 판별
    let mut buf = vec![0u8; max_message_size + 1];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("UDP receive loop cancelled");
                break;
            }
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, peer)) => {
                        let (datagram, truncated) = clip_datagram(&buf[..len], max_message_size);
                        if truncated {
                            warn!(
                                %peer,
                                max = max_message_size,
                                "UDP datagram exceeds maximum message size, truncated"
                            );
                            counter!(m::COLLECTOR_UDP_TRUNCATED_TOTAL).increment(1);
                        }
                        let raw = String::from_utf8_lossy(trim_delimiters(datagram));
                        process_message(handler.as_ref(), &raw, peer, PROTOCOL);
                    }
                    Err(e) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        warn!(error = %e, "UDP receive error");
                    }
                }
            }
        }
    }
}

/// 데이터그램을 최대 크기로 자릅니다. 잘렸으면 `true`를 함께 반환합니다.
fn clip_datagram(datagram: &[u8], max_message_size: usize) -> (&[u8], bool) {
    if datagram.len() > max_message_size {
        (&datagram[..max_message_size], true)
    } else {
        (datagram, false)
    }
}
