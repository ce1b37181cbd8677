//! 수집기 에러 타입
//!
//! [`CollectorError`]는 수집기 생성과 실행 중 발생하는 에러를,
//! [`FramingError`]는 TCP 스트림에서 프레임을 추출하거나 기록할 때의 에러를 표현합니다.
//! `From<CollectorError> for LogharborError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logharbor_core::error::{ConfigError, LogharborError};

/// 수집기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// 설정 에러 (생성 시점에 검출)
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 소켓 바인드 실패
    #[error("failed to bind {protocol} listener on {address}: {source}")]
    Bind {
        /// udp 또는 tcp
        protocol: &'static str,
        /// 바인드하려던 주소
        address: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// 이미 시작된 수집기를 다시 시작하려 함
    #[error("collector is already running")]
    AlreadyRunning,

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CollectorError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { field, reason } => Self::Config { field, reason },
            other => Self::Config {
                field: "collector".to_owned(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<CollectorError> for LogharborError {
    fn from(err: CollectorError) -> Self {
        match err {
            CollectorError::Config { field, reason } => {
                LogharborError::Config(ConfigError::InvalidValue { field, reason })
            }
            CollectorError::Io(e) => LogharborError::Io(e),
            other => LogharborError::Collector(other.to_string()),
        }
    }
}

/// RFC 6587 프레이밍 에러
///
/// 프레이밍 에러가 발생한 TCP 연결은 즉시 닫히며, 다른 연결에는 영향이 없습니다.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// octet-counting 길이 접두사가 숫자가 아니거나 0이거나 너무 김
    #[error("invalid octet-count length prefix '{prefix}'")]
    InvalidLength {
        /// 문제가 된 접두사
        prefix: String,
    },

    /// 메시지가 최대 크기를 초과
    #[error("message length {length} exceeds maximum {max}")]
    TooLarge {
        /// 선언되었거나 누적된 길이
        length: usize,
        /// 설정된 최대 크기
        max: usize,
    },

    /// 선언된 길이만큼 읽기 전에 스트림이 끝남
    #[error("stream ended mid-frame (expected {expected} bytes, got {received})")]
    Truncated {
        /// 선언된 길이
        expected: usize,
        /// 실제로 받은 바이트 수
        received: usize,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_display_includes_address() {
        let err = CollectorError::Bind {
            protocol: "udp",
            address: "0.0.0.0:514".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = err.to_string();
        assert!(msg.contains("udp"));
        assert!(msg.contains("0.0.0.0:514"));
    }

    #[test]
    fn config_error_converts_to_logharbor_config() {
        let err = CollectorError::Config {
            field: "collector.address".to_owned(),
            reason: "missing port".to_owned(),
        };
        let top: LogharborError = err.into();
        assert!(matches!(
            top,
            LogharborError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn already_running_converts_to_collector() {
        let top: LogharborError = CollectorError::AlreadyRunning.into();
        assert!(matches!(top, LogharborError::Collector(_)));
    }

    #[test]
    fn core_config_error_keeps_field() {
        let err: CollectorError = ConfigError::InvalidValue {
            field: "collector.max_message_size".to_owned(),
            reason: "must be 1-65535".to_owned(),
        }
        .into();
        assert!(err.to_string().contains("collector.max_message_size"));
    }

    #[test]
    fn framing_error_display() {
        let err = FramingError::TooLarge {
            length: 100_000,
            max: 8192,
        };
        let msg = err.to_string();
        assert!(msg.contains("100000"));
        assert!(msg.contains("8192"));

        let err = FramingError::Truncated {
            expected: 24,
            received: 10,
        };
        assert!(err.to_string().contains("expected 24"));
    }
}
