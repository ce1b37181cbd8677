#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: RFC 3164 / RFC 5424 파서와 형식 판별
//! - [`framing`]: TCP 스트림용 RFC 6587 프레이밍 코덱, 리더, 라이터
//! - [`collector`]: UDP/TCP 수집기와 생명주기 관리
//! - [`config`]: 수집기 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입
//!
//! # 사용 예시
//! ```no_run
//! use std::sync::Arc;
//!
//! use logharbor_collector::{Protocol, SyslogCollector, SyslogCollectorConfig};
//! use logharbor_core::{LogharborError, SyslogMessage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyslogCollectorConfig::builder()
//!     .address("127.0.0.1:5514")
//!     .protocol(Protocol::Both)
//!     .build()?;
//!
//! let handler = |msg: SyslogMessage| -> Result<(), LogharborError> {
//!     println!("{msg}");
//!     Ok(())
//! };
//!
//! let collector = Arc::new(SyslogCollector::new(config, Arc::new(handler))?);
//! let running = Arc::clone(&collector);
//! let task = tokio::spawn(async move { running.start().await });
//!
//! collector.stop();
//! task.await??;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod framing;
pub mod parser;

// --- 주요 타입 re-export ---

// 수집기
pub use collector::{CollectorState, SyslogCollector};

// 설정
pub use config::{FramingMode, Protocol, SyslogCollectorConfig, SyslogCollectorConfigBuilder};

// 에러
pub use error::{CollectorError, FramingError};

// 프레이밍
pub use framing::{FramingReader, FramingWriter, SyslogFrameCodec, detect_framing};

// 파서
pub use parser::{parse, parse_bytes, parse_rfc3164, parse_rfc5424};
