//! 에러 타입 — 도메인별 에러 정의

/// logharbor 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogharborError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 메시지 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 수집기 에러 (바인드 실패 등)
    #[error("collector error: {0}")]
    Collector(String),

    /// 핸들러(싱크) 전달 실패
    #[error("handler error: {0}")]
    Handler(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogharborError {
    /// 핸들러 에러를 생성합니다.
    ///
    /// 외부 싱크 구현체가 자신의 에러를 감싸서 반환할 때 사용합니다.
    pub fn handler(reason: impl std::fmt::Display) -> Self {
        Self::Handler(reason.to_string())
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Syslog 메시지 파싱 에러
///
/// 실패한 필드마다 별도의 variant를 가지므로, 호출자는 원본 메시지와 함께
/// 실패 사유를 그대로 로그에 남길 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 빈 입력
    #[error("empty syslog message")]
    Empty,

    /// `<PRI>` 필드가 없음
    #[error("missing priority")]
    MissingPriority,

    /// PRI 값이 음이 아닌 정수가 아님
    #[error("invalid priority '{value}'")]
    InvalidPriority { value: String },

    /// RFC 3164 메시지가 타임스탬프를 담기에 너무 짧음
    #[error("message too short: {len} bytes after priority")]
    TooShort { len: usize },

    /// RFC 3164 타임스탬프 뒤에 호스트명 또는 메시지가 없음
    #[error("missing hostname or message")]
    MissingHostnameOrMessage,

    /// RFC 5424 필드 개수 부족
    #[error("insufficient fields (got {got}, need 7)")]
    InsufficientFields { got: usize },

    /// RFC 5424 VERSION 필드가 정수가 아님
    #[error("invalid version '{value}'")]
    InvalidVersion { value: String },

    /// RFC 5424 TIMESTAMP 파싱 실패
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}
