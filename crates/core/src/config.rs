//! 설정 관리 — logharbor.toml 파싱 및 런타임 설정
//!
//! [`LogharborConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGHARBOR_COLLECTOR_PROTOCOL=tcp` 형식)
//! 3. 설정 파일 (`logharbor.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logharbor_core::error::LogharborError> {
//! use logharbor_core::config::LogharborConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogharborConfig::load("logharbor.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogharborConfig::parse("[collector]\nprotocol = \"both\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogharborError};

/// 기본 최대 메시지 크기 (8KB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

/// 허용하는 최대 메시지 크기 (UDP 데이터그램 최대 페이로드)
pub const MAX_MESSAGE_SIZE_LIMIT: usize = 65535;

/// 유효한 수집 프로토콜
pub const VALID_PROTOCOLS: [&str; 3] = ["udp", "tcp", "both"];

/// 유효한 TCP 프레이밍 설정값
pub const VALID_FRAMINGS: [&str; 3] = ["auto", "octet-counting", "non-transparent"];

/// logharbor 통합 설정
///
/// `logharbor.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogharborConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 수집기 설정
    #[serde(default)]
    pub collector: CollectorConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogharborConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogharborError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogharborError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogharborError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogharborError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogharborError> {
        toml::from_str(toml_str).map_err(|e| {
            LogharborError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGHARBOR_{SECTION}_{FIELD}`
    /// 예: `LOGHARBOR_COLLECTOR_ADDRESS=0.0.0.0:5514`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGHARBOR_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGHARBOR_GENERAL_LOG_FORMAT");

        // Collector
        override_string(&mut self.collector.address, "LOGHARBOR_COLLECTOR_ADDRESS");
        override_string(&mut self.collector.protocol, "LOGHARBOR_COLLECTOR_PROTOCOL");
        override_string(&mut self.collector.framing, "LOGHARBOR_COLLECTOR_FRAMING");
        override_usize(
            &mut self.collector.max_message_size,
            "LOGHARBOR_COLLECTOR_MAX_MESSAGE_SIZE",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGHARBOR_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGHARBOR_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "LOGHARBOR_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogharborError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.collector.validate()?;

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics.port".to_owned(),
                reason: "port must not be 0 when metrics are enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 수집기 설정
///
/// 문자열 값은 `validate()`에서 검증되고,
/// `logharbor-collector`에서 타입이 있는 설정으로 변환됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// 수신 주소 (`:514`는 모든 IPv4 인터페이스)
    pub address: String,
    /// 수집 프로토콜 (udp, tcp, both)
    pub protocol: String,
    /// TCP 프레이밍 (auto, octet-counting, non-transparent)
    pub framing: String,
    /// 최대 메시지 크기 (바이트)
    pub max_message_size: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            address: ":514".to_owned(),
            protocol: "udp".to_owned(),
            framing: "auto".to_owned(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl CollectorConfig {
    /// 수집기 섹션의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_listen_address(&self.address)?;

        let protocol = self.protocol.to_ascii_lowercase();
        if !VALID_PROTOCOLS.contains(&protocol.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "collector.protocol".to_owned(),
                reason: format!(
                    "unsupported protocol '{}', must be one of: {}",
                    self.protocol,
                    VALID_PROTOCOLS.join(", ")
                ),
            });
        }

        let framing = self.framing.to_ascii_lowercase();
        if !VALID_FRAMINGS.contains(&framing.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "collector.framing".to_owned(),
                reason: format!("must be one of: {}", VALID_FRAMINGS.join(", ")),
            });
        }

        if self.max_message_size == 0 || self.max_message_size > MAX_MESSAGE_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "collector.max_message_size".to_owned(),
                reason: format!("must be 1-{MAX_MESSAGE_SIZE_LIMIT}"),
            });
        }

        Ok(())
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 수신 IP
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
        }
    }
}

/// 수신 주소를 바인드 가능한 형태로 정규화합니다.
///
/// - `:514` → `0.0.0.0:514`
/// - `127.0.0.1:5514`, `[::1]:514`, `localhost:514`는 그대로 유지
///
/// 숫자 포트가 없으면 에러를 반환합니다.
pub fn normalize_listen_address(address: &str) -> Result<String, ConfigError> {
    let address = address.trim();
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: "collector.address".to_owned(),
        reason: format!("'{address}': {reason}"),
    };

    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("missing port"))?;

    port.parse::<u16>()
        .map_err(|_| invalid("port must be a number between 0 and 65535"))?;

    if host.is_empty() {
        return Ok(format!("0.0.0.0:{port}"));
    }
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return Err(invalid("IPv6 addresses must be enclosed in brackets"));
    }

    Ok(address.to_owned())
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}
