//! Syslog 수집기 -- UDP/TCP 수신과 생명주기 관리
//!
//! # 아키텍처
//! - UDP: 소켓 하나, 데이터그램 하나가 메시지 하나
//! - TCP: 리스너 하나, 연결마다 별도 태스크가 [`FramingReader`](crate::framing::FramingReader)를 소유
//! - both: 두 루프를 동시에 실행하며, 복구 불가능한 에러가 나면 즉시 반환
//!
//! 수신한 원시 메시지는 파싱 후 주입된 [`MessageHandler`]로 전달됩니다.
//! 파싱 실패와 핸들러 에러는 로그만 남기고 수집은 계속됩니다.
//!
//! # 상태 전이
//! `Created → Running → Stopped`. `stop()`은 여러 번 호출해도 안전하며,
//! 실행 중인 `start()`를 반환시킵니다. 진행 중인 연결 태스크는 기다리지 않습니다.

mod tcp;
mod udp;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use logharbor_core::config::normalize_listen_address;
use logharbor_core::handler::MessageHandler;
use logharbor_core::metrics as m;
use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Protocol, SyslogCollectorConfig};
use crate::error::CollectorError;
use crate::parser;

const STATE_CREATED: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// 수집기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// 생성됨, 아직 시작 전
    Created,
    /// 수신 중
    Running,
    /// 종료됨 (다시 시작할 수 없음)
    Stopped,
}

impl CollectorState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_CREATED => Self::Created,
            STATE_RUNNING => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Syslog 수집기
///
/// `start()`는 `&self`를 받으므로 `Arc`로 감싸 한 태스크에서 실행하고
/// 다른 곳에서 `stop()`을 호출할 수 있습니다.
pub struct SyslogCollector {
    config: SyslogCollectorConfig,
    handler: Arc<dyn MessageHandler>,
    state: AtomicU8,
    cancel: CancellationToken,
    udp_addr: OnceLock<SocketAddr>,
    tcp_addr: OnceLock<SocketAddr>,
}

impl SyslogCollector {
    /// 설정을 검증하고 수집기를 생성합니다.
    ///
    /// `:PORT` 형식의 주소는 여기서 `0.0.0.0:PORT`로 정규화됩니다.
    pub fn new(
        mut config: SyslogCollectorConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self, CollectorError> {
        config.bind_addr = normalize_listen_address(&config.bind_addr)?;
        config.validate()?;

        Ok(Self {
            config,
            handler,
            state: AtomicU8::new(STATE_CREATED),
            cancel: CancellationToken::new(),
            udp_addr: OnceLock::new(),
            tcp_addr: OnceLock::new(),
        })
    }

    /// 수집기를 시작합니다.
    ///
    /// `stop()`이 호출되거나 바인드 같은 복구 불가능한 에러가 날 때까지 반환하지 않습니다.
    /// 이미 중지된 수집기면 즉시 `Ok(())`를 반환합니다.
    pub async fn start(&self) -> Result<(), CollectorError> {
        if self.cancel.is_cancelled() {
            debug!("collector already stopped, start is a no-op");
            return Ok(());
        }

        self.state
            .compare_exchange(
                STATE_CREATED,
                STATE_RUNNING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| CollectorError::AlreadyRunning)?;

        info!(
            address = %self.config.bind_addr,
            protocol = %self.config.protocol,
            framing = %self.config.framing,
            max_message_size = self.config.max_message_size,
            "starting syslog collector"
        );

        let result = match self.config.protocol {
            Protocol::Udp => self.run_udp().await,
            Protocol::Tcp => self.run_tcp().await,
            Protocol::Both => tokio::try_join!(self.run_udp(), self.run_tcp()).map(|_| ()),
        };

        // 에러로 끝난 경우에도 남은 연결 태스크를 정리
        self.cancel.cancel();
        self.state.store(STATE_STOPPED, Ordering::Release);

        match &result {
            Ok(()) => info!("syslog collector stopped"),
            Err(e) => warn!(error = %e, "syslog collector exited with error"),
        }
        result
    }

    /// 수집기를 중지합니다. 여러 번 호출해도 안전합니다.
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        info!("stopping syslog collector");
        self.cancel.cancel();

        // 시작 전에 중지된 경우. 실행 중이면 start()가 Stopped로 전이
        let _ = self.state.compare_exchange(
            STATE_CREATED,
            STATE_STOPPED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// 현재 상태
    pub fn state(&self) -> CollectorState {
        CollectorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 수집기 설정
    pub fn config(&self) -> &SyslogCollectorConfig {
        &self.config
    }

    /// 바인드된 UDP 주소. 아직 바인드 전이면 `None`.
    pub fn udp_local_addr(&self) -> Option<SocketAddr> {
        self.udp_addr.get().copied()
    }

    /// 바인드된 TCP 주소. 아직 바인드 전이면 `None`.
    pub fn tcp_local_addr(&self) -> Option<SocketAddr> {
        self.tcp_addr.get().copied()
    }

    async fn run_udp(&self) -> Result<(), CollectorError> {
        let socket = udp::bind(&self.config.bind_addr).await?;
        let local = socket.local_addr()?;
        let _ = self.udp_addr.set(local);
        info!(address = %local, "UDP syslog listener bound");

        udp::receive_loop(
            socket,
            self.config.max_message_size,
            Arc::clone(&self.handler),
            self.cancel.clone(),
        )
        .await;
        Ok(())
    }

    async fn run_tcp(&self) -> Result<(), CollectorError> {
        let listener = tcp::bind(&self.config.bind_addr).await?;
        let local = listener.local_addr()?;
        let _ = self.tcp_addr.set(local);
        info!(address = %local, framing = %self.config.framing, "TCP syslog listener bound");

        tcp::accept_loop(
            listener,
            self.config.framing.method(),
            self.config.max_message_size,
            Arc::clone(&self.handler),
            self.cancel.clone(),
        )
        .await;
        Ok(())
    }
}

impl Drop for SyslogCollector {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// 원시 메시지 하나를 파싱해 핸들러로 전달합니다.
///
/// 빈 메시지는 건너뜁니다. 파싱/핸들러 실패는 로그와 메트릭만 남깁니다.
pub(crate) fn process_message(
    handler: &dyn MessageHandler,
    raw: &str,
    peer: SocketAddr,
    protocol: &'static str,
) {
    if raw.is_empty() {
        debug!(%peer, protocol, "skipping empty syslog frame");
        return;
    }

    counter!(m::COLLECTOR_MESSAGES_RECEIVED_TOTAL, m::LABEL_PROTOCOL => protocol).increment(1);

    // 형식 판별은 한 번만 하고 메트릭 레이블에도 사용
    let rfc5424 = parser::is_rfc5424(raw);
    let parsed = if rfc5424 {
        parser::parse_rfc5424(raw)
    } else {
        parser::parse_rfc3164(raw)
    };

    let message = match parsed {
        Ok(message) => message,
        Err(e) => {
            warn!(%peer, protocol, error = %e, raw, "failed to parse syslog message");
            counter!(m::COLLECTOR_PARSE_ERRORS_TOTAL, m::LABEL_PROTOCOL => protocol).increment(1);
            return;
        }
    };

    let format = if rfc5424 { "rfc5424" } else { "rfc3164" };

    match handler.handle(message) {
        Ok(()) => {
            counter!(
                m::COLLECTOR_MESSAGES_HANDLED_TOTAL,
                m::LABEL_PROTOCOL => protocol,
                m::LABEL_FORMAT => format
            )
            .increment(1);
        }
        Err(e) => {
            warn!(%peer, protocol, error = %e, "message handler failed");
            counter!(m::COLLECTOR_HANDLER_ERRORS_TOTAL).increment(1);
        }
    }
}
