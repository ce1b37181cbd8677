//! TCP syslog 수락 루프와 연결 처리
//!
//! 연결마다 별도 태스크가 [`FramingReader`]를 소유합니다.
//! 한 연결의 프레이밍/I/O 에러는 그 연결만 닫습니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use logharbor_core::handler::MessageHandler;
use logharbor_core::metrics as m;
use logharbor_core::types::FramingMethod;
use metrics::{counter, gauge};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::process_message;
use crate::error::{CollectorError, FramingError};
use crate::framing::{FramingReader, SyslogFrameCodec};

const PROTOCOL: &str = "tcp";

/// accept 에러 후 재시도 전 대기 시간
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub(super) async fn bind(address: &str) -> Result<TcpListener, CollectorError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| CollectorError::Bind {
            protocol: PROTOCOL,
            address: address.to_owned(),
            source,
        })
}

/// 취소될 때까지 연결을 수락합니다.
///
/// `framing`이 `None`이면 연결마다 프레이밍 방식을 감지합니다.
pub(super) async fn accept_loop(
    listener: TcpListener,
    framing: Option<FramingMethod>,
    max_message_size: usize,
    handler: Arc<dyn MessageHandler>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("TCP accept loop cancelled");
                break;
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, peer)) => {
                        debug!(%peer, "accepted TCP connection");
                        counter!(m::COLLECTOR_TCP_CONNECTIONS_TOTAL).increment(1);

                        let codec = SyslogFrameCodec::for_method(framing).with_max_size(max_message_size);
                        tokio::spawn(handle_connection(
                            stream,
                            peer,
                            codec,
                            Arc::clone(&handler),
                            cancel.clone(),
                        ));
                    }
                    Err(e) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        warn!(error = %e, "TCP accept error");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }
        }
    }
}

/// 단일 TCP 연결을 처리합니다.
///
/// 스트림 종료, 프레이밍 에러, 취소 중 하나가 일어나면 반환합니다.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    codec: SyslogFrameCodec,
    handler: Arc<dyn MessageHandler>,
    cancel: CancellationToken,
) {
    gauge!(m::COLLECTOR_TCP_ACTIVE_CONNECTIONS).increment(1.0);

    let mut reader = FramingReader::with_codec(stream, codec);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%peer, "closing TCP connection on shutdown");
                break;
            }
            result = reader.read_message() => {
                match result {
                    Ok(Some(raw)) => process_message(handler.as_ref(), &raw, peer, PROTOCOL),
                    Ok(None) => {
                        debug!(%peer, "TCP connection closed by peer");
                        break;
                    }
                    Err(FramingError::Io(e)) => {
                        warn!(%peer, error = %e, "TCP read error, closing connection");
                        break;
                    }
                    Err(e) => {
                        warn!(
                            %peer,
                            framing = reader.method().map(|f| f.as_str()),
                            error = %e,
                            "framing error, closing connection"
                        );
                        counter!(m::COLLECTOR_FRAMING_ERRORS_TOTAL).increment(1);
                        break;
                    }
                }
            }
        }
    }

    gauge!(m::COLLECTOR_TCP_ACTIVE_CONNECTIONS).decrement(1.0);
    debug!(%peer, "TCP connection finished");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use logharbor_core::error::LogharborError;
    use logharbor_core::types::SyslogMessage;
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn bind_error_names_protocol() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap().to_string();

        let err = bind(&address).await.unwrap_err();
        assert!(matches!(err, CollectorError::Bind { protocol: "tcp", .. }));
    }

    #[tokio::test]
    async fn connection_delivers_until_framing_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: Arc<dyn MessageHandler> =
            Arc::new(move |msg: SyslogMessage| -> Result<(), LogharborError> {
                sink.lock().unwrap().push(msg.message);
                Ok(())
            });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        let cancel = CancellationToken::new();
        let codec = SyslogFrameCodec::new(FramingMethod::OctetCounting).with_max_size(64);
        let task = tokio::spawn(handle_connection(stream, peer, codec, handler, cancel));

        client
            .write_all(b"28 <13>Oct 11 22:14:15 h a: one9999 ")
            .await
            .unwrap();

        // 프레이밍 에러로 연결 태스크가 스스로 끝나야 함
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["one".to_owned()]);
    }
}
