//! Syslog 파서 -- RFC 3164 (BSD) 및 RFC 5424 형식
//!
//! [`parse`]는 PRI 직후가 `VERSION` 정수와 공백이면 RFC 5424로,
//! 그렇지 않으면 RFC 3164로 판별합니다. 파서는 상태가 없는 순수 함수이므로
//! 여러 태스크에서 동시에 호출해도 안전합니다.
//!
//! # 사용 예시
//! ```
//! use logharbor_collector::parser;
//!
//! let msg = parser::parse("<34>Oct 11 22:14:15 mymachine su[1234]: 'su root' failed").unwrap();
//! assert_eq!(msg.facility, 4);
//! assert_eq!(msg.severity, 2);
//! assert_eq!(msg.tag, "su");
//! assert_eq!(msg.pid.as_deref(), Some("1234"));
//! ```

pub mod rfc3164;
pub mod rfc5424;

pub use rfc3164::parse_rfc3164;
pub use rfc5424::parse_rfc5424;

use logharbor_core::error::ParseError;
use logharbor_core::types::SyslogMessage;
use once_cell::sync::Lazy;
use regex::Regex;

/// `<PRI>VERSION ` 헤더 (RFC 5424 판별용)
static RFC5424_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<[0-9]+>([0-9]+)\s").expect("RFC 5424 header pattern is valid")
});

/// 원시 메시지를 파싱합니다. 형식은 자동으로 판별합니다.
pub fn parse(raw: &str) -> Result<SyslogMessage, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    if is_rfc5424(raw) {
        parse_rfc5424(raw)
    } else {
        parse_rfc3164(raw)
    }
}

/// 바이트 입력을 파싱합니다.
///
/// UDP 데이터그램처럼 인코딩이 보장되지 않는 입력용이며,
/// 잘못된 UTF-8 시퀀스는 U+FFFD로 치환됩니다.
pub fn parse_bytes(raw: &[u8]) -> Result<SyslogMessage, ParseError> {
    parse(&String::from_utf8_lossy(raw))
}

/// RFC 5424 헤더 여부
pub fn is_rfc5424(raw: &str) -> bool {
    RFC5424_HEADER.is_match(raw)
}

/// `<PRI>`를 해석해 `(facility, severity, PRI 이후 나머지)`를 반환합니다.
///
/// PRI는 `<`로 시작해 첫 번째 `>`까지이며, 음이 아닌 정수여야 합니다.
/// facility는 범위를 제한하지 않습니다.
fn parse_priority(raw: &str) -> Result<(u64, u8, &str), ParseError> {
    let pri_end = match raw.find('>') {
        Some(idx) if raw.starts_with('<') => idx,
        _ => return Err(ParseError::MissingPriority),
    };

    let pri_str = &raw[1..pri_end];
    let pri: u64 = pri_str.parse().map_err(|_| ParseError::InvalidPriority {
        value: pri_str.to_owned(),
    })?;

    // pri % 8은 항상 0~7이므로 u8 변환은 손실이 없음
    let severity = (pri % 8) as u8;
    Ok((pri / 8, severity, &raw[pri_end + 1..]))
}
