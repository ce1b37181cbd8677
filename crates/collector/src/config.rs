//! 수집기 설정
//!
//! [`SyslogCollectorConfig`]는 core의 문자열 기반
//! [`CollectorConfig`](logharbor_core::config::CollectorConfig)를 타입 있는 값으로 변환한 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use logharbor_core::config::LogharborConfig;
//! use logharbor_collector::config::SyslogCollectorConfig;
//!
//! let core_config = LogharborConfig::default();
//! let config = SyslogCollectorConfig::from_core(&core_config.collector)?;
//! ```

use std::fmt;
use std::str::FromStr;

use logharbor_core::config::{
    CollectorConfig, DEFAULT_MAX_MESSAGE_SIZE, MAX_MESSAGE_SIZE_LIMIT, normalize_listen_address,
};
use logharbor_core::types::FramingMethod;

use crate::error::CollectorError;

/// 수신 프로토콜
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// UDP만 수신 (기본값)
    #[default]
    Udp,
    /// TCP만 수신
    Tcp,
    /// UDP와 TCP를 같은 주소에서 동시에 수신
    Both,
}

impl Protocol {
    /// 설정 파일에서 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            "both" => Ok(Self::Both),
            _ => Err(CollectorError::Config {
                field: "collector.protocol".to_owned(),
                reason: format!("unsupported protocol '{s}' (use 'udp', 'tcp', or 'both')"),
            }),
        }
    }
}

/// TCP 프레이밍 설정
///
/// `Auto`는 연결마다 첫 바이트를 보고 방식을 한 번 결정합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FramingMode {
    /// 연결별 자동 감지 (기본값)
    #[default]
    Auto,
    /// octet-counting 고정
    OctetCounting,
    /// non-transparent 고정
    NonTransparent,
}

impl FramingMode {
    /// 고정된 프레이밍 방식. `Auto`면 `None`.
    pub fn method(&self) -> Option<FramingMethod> {
        match self {
            Self::Auto => None,
            Self::OctetCounting => Some(FramingMethod::OctetCounting),
            Self::NonTransparent => Some(FramingMethod::NonTransparent),
        }
    }

    /// 설정 파일에서 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::OctetCounting => FramingMethod::OctetCounting.as_str(),
            Self::NonTransparent => FramingMethod::NonTransparent.as_str(),
        }
    }
}

impl From<FramingMethod> for FramingMode {
    fn from(method: FramingMethod) -> Self {
        match method {
            FramingMethod::OctetCounting => Self::OctetCounting,
            FramingMethod::NonTransparent => Self::NonTransparent,
        }
    }
}

impl fmt::Display for FramingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FramingMode {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<FramingMethod>()
            .map(Self::from)
            .map_err(|reason| CollectorError::Config {
                field: "collector.framing".to_owned(),
                reason,
            })
    }
}

/// 수집기 설정
#[derive(Debug, Clone)]
pub struct SyslogCollectorConfig {
    /// 바인드 주소 (정규화됨, 예: "0.0.0.0:514")
    pub bind_addr: String,
    /// 수신 프로토콜
    pub protocol: Protocol,
    /// TCP 프레이밍
    pub framing: FramingMode,
    /// 최대 메시지 크기 (바이트). UDP 수신 버퍼와 TCP 프레임 상한에 모두 적용됩니다.
    pub max_message_size: usize,
}

impl Default for SyslogCollectorConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:514".to_owned(),
            protocol: Protocol::default(),
            framing: FramingMode::default(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl SyslogCollectorConfig {
    /// 빌더를 생성합니다.
    pub fn builder() -> SyslogCollectorConfigBuilder {
        SyslogCollectorConfigBuilder::new()
    }

    /// core의 `CollectorConfig`에서 수집기 설정을 생성합니다.
    pub fn from_core(core: &CollectorConfig) -> Result<Self, CollectorError> {
        let config = Self {
            bind_addr: normalize_listen_address(&core.address)?,
            protocol: core.protocol.parse()?,
            framing: core.framing.parse()?,
            max_message_size: core.max_message_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CollectorError> {
        normalize_listen_address(&self.bind_addr)?;

        if self.max_message_size == 0 || self.max_message_size > MAX_MESSAGE_SIZE_LIMIT {
            return Err(CollectorError::Config {
                field: "collector.max_message_size".to_owned(),
                reason: format!(
                    "{} is out of range (must be 1-{MAX_MESSAGE_SIZE_LIMIT})",
                    self.max_message_size
                ),
            });
        }

        Ok(())
    }
}

/// 수집기 설정 빌더
#[derive(Debug, Default)]
pub struct SyslogCollectorConfigBuilder {
    config: SyslogCollectorConfig,
}

impl SyslogCollectorConfigBuilder {
    /// 기본값으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 수신 주소를 설정합니다. `:PORT` 형식도 허용합니다.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.bind_addr = address.into();
        self
    }

    /// 수신 프로토콜을 설정합니다.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// TCP 프레이밍을 설정합니다.
    pub fn framing(mut self, framing: FramingMode) -> Self {
        self.config.framing = framing;
        self
    }

    /// 최대 메시지 크기를 설정합니다.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// 주소를 정규화하고 검증한 뒤 설정을 생성합니다.
    pub fn build(mut self) -> Result<SyslogCollectorConfig, CollectorError> {
        self.config.bind_addr = normalize_listen_address(&self.config.bind_addr)?;
        self.config.validate()?;
        Ok(self.config)
    }
}
