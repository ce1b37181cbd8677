//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 수집기는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logharbor_`
//! - 모듈명: `collector_`, `daemon_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use logharbor_core::metrics;
//! use metrics::counter;
//!
//! counter!(metrics::COLLECTOR_MESSAGES_RECEIVED_TOTAL, metrics::LABEL_PROTOCOL => "udp")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 프로토콜 레이블 키 (udp, tcp)
pub const LABEL_PROTOCOL: &str = "protocol";

/// 메시지 형식 레이블 키 (rfc3164, rfc5424)
pub const LABEL_FORMAT: &str = "format";

// ─── Collector 메트릭 ───────────────────────────────────────────────

/// Collector: 수신한 원시 메시지 수 (counter, label: protocol)
pub const COLLECTOR_MESSAGES_RECEIVED_TOTAL: &str = "logharbor_collector_messages_received_total";

/// Collector: 핸들러로 전달된 메시지 수 (counter, label: protocol)
pub const COLLECTOR_MESSAGES_HANDLED_TOTAL: &str = "logharbor_collector_messages_handled_total";

/// Collector: 파싱 실패 수 (counter, label: protocol)
pub const COLLECTOR_PARSE_ERRORS_TOTAL: &str = "logharbor_collector_parse_errors_total";

/// Collector: 핸들러 실패 수 (counter)
pub const COLLECTOR_HANDLER_ERRORS_TOTAL: &str = "logharbor_collector_handler_errors_total";

/// Collector: TCP 프레이밍 에러로 닫힌 연결 수 (counter)
pub const COLLECTOR_FRAMING_ERRORS_TOTAL: &str = "logharbor_collector_framing_errors_total";

/// Collector: 최대 크기를 넘어 잘린 UDP 데이터그램 수 (counter)
pub const COLLECTOR_UDP_TRUNCATED_TOTAL: &str = "logharbor_collector_udp_truncated_total";

/// Collector: 수락한 TCP 연결 수 (counter)
pub const COLLECTOR_TCP_CONNECTIONS_TOTAL: &str = "logharbor_collector_tcp_connections_total";

/// Collector: 현재 열린 TCP 연결 수 (gauge)
pub const COLLECTOR_TCP_ACTIVE_CONNECTIONS: &str = "logharbor_collector_tcp_active_connections";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "logharbor_daemon_uptime_seconds";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "logharbor_daemon_build_info";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logharbor-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    // Collector
    describe_counter!(
        COLLECTOR_MESSAGES_RECEIVED_TOTAL,
        "Total number of raw syslog messages received per protocol"
    );
    describe_counter!(
        COLLECTOR_MESSAGES_HANDLED_TOTAL,
        "Total number of parsed messages delivered to the handler"
    );
    describe_counter!(
        COLLECTOR_PARSE_ERRORS_TOTAL,
        "Total number of syslog messages that failed to parse"
    );
    describe_counter!(
        COLLECTOR_HANDLER_ERRORS_TOTAL,
        "Total number of handler invocations that returned an error"
    );
    describe_counter!(
        COLLECTOR_FRAMING_ERRORS_TOTAL,
        "Total number of TCP connections closed because of a framing error"
    );
    describe_counter!(
        COLLECTOR_UDP_TRUNCATED_TOTAL,
        "Total number of UDP datagrams cut to the maximum message size"
    );
    describe_counter!(
        COLLECTOR_TCP_CONNECTIONS_TOTAL,
        "Total number of accepted TCP connections"
    );
    describe_gauge!(
        COLLECTOR_TCP_ACTIVE_CONNECTIONS,
        "Number of TCP connections currently open"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "logharbor daemon uptime in seconds");
    describe_gauge!(DAEMON_BUILD_INFO, "Build information (always 1, with version label)");
}
