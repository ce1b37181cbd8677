//! RFC 3164 (BSD syslog) 파서
//!
//! 형식: `<PRI>TIMESTAMP HOSTNAME TAG[PID]: MESSAGE`
//!
//! 예: `<34>Oct 11 22:14:15 mymachine su[1234]: 'su root' failed`

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use logharbor_core::error::ParseError;
use logharbor_core::types::SyslogMessage;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::parse_priority;

/// BSD 타임스탬프 길이 (`Mmm dd hh:mm:ss`)
const TIMESTAMP_LEN: usize = 15;

/// 연도를 앞에 붙여 시도하는 형식 (공백 패딩 일자, 0 패딩 일자)
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y %b %e %H:%M:%S", "%Y %b %d %H:%M:%S"];

/// `TAG[PID]: MESSAGE`
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([^\s\[:]+)(?:\[([0-9]+)\])?:\s*(.*)$").expect("tag pattern is valid")
});

/// RFC 3164 메시지를 파싱합니다.
///
/// 타임스탬프는 로컬 시간대와 현재 연도로 해석한 뒤 UTC로 변환합니다.
/// 결과가 현재보다 24시간 이상 미래면 작년 메시지로 간주합니다.
/// 타임스탬프를 해석할 수 없으면 현재 시각을 사용합니다.
pub fn parse_rfc3164(raw: &str) -> Result<SyslogMessage, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let (facility, severity, after_pri) = parse_priority(raw)?;

    let rest = after_pri.trim();
    if rest.len() <= TIMESTAMP_LEN {
        return Err(ParseError::TooShort { len: rest.len() });
    }

    // 멀티바이트 문자가 걸치면 다음 문자 경계에서 자름
    let split = (TIMESTAMP_LEN..=rest.len())
        .find(|&idx| rest.is_char_boundary(idx))
        .unwrap_or(rest.len());
    let (timestamp_str, remainder) = rest.split_at(split);

    let now = Utc::now();
    let timestamp = parse_bsd_timestamp(timestamp_str, &Local, now).unwrap_or_else(|| {
        debug!(
            timestamp = timestamp_str,
            "unrecognized BSD timestamp, using receive time"
        );
        now
    });

    let (hostname, body) = remainder
        .trim()
        .split_once(' ')
        .ok_or(ParseError::MissingHostnameOrMessage)?;

    let (tag, pid, message) = split_tag(body);

    Ok(SyslogMessage {
        timestamp,
        hostname: hostname.to_owned(),
        facility,
        severity,
        tag,
        message,
        raw: raw.to_owned(),
        pid,
        app_name: None,
        proc_id: None,
        msg_id: None,
        structured_data: Vec::new(),
    })
}

/// BSD 타임스탬프를 `tz` 기준으로 해석해 UTC로 변환합니다.
///
/// 연도는 `now`의 (`tz` 기준) 연도를 사용합니다.
/// 해석에 실패하거나 해당 시각이 `tz`에 존재하지 않으면 `None`을 반환합니다.
pub(crate) fn parse_bsd_timestamp<Tz: TimeZone>(
    timestamp: &str,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let year = now.with_timezone(tz).year();
    let with_year = format!("{year} {timestamp}");

    let naive = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&with_year, fmt).ok())?;

    let parsed = tz.from_local_datetime(&naive).earliest()?.with_timezone(&Utc);
    if parsed <= now + TimeDelta::hours(24) {
        return Some(parsed);
    }

    // 연말에 수신한 연초 메시지가 아니라, 연초에 수신한 연말 메시지
    let last_year = naive.with_year(year - 1)?;
    Some(
        tz.from_local_datetime(&last_year)
            .earliest()?
            .with_timezone(&Utc),
    )
}

/// `TAG[PID]: MESSAGE`를 분리합니다.
///
/// 패턴이 맞지 않으면 첫 토큰을 태그, 나머지를 메시지로 사용합니다.
fn split_tag(body: &str) -> (String, Option<String>, String) {
    if let Some(caps) = TAG_PATTERN.captures(body) {
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let pid = caps.get(2).map(|m| m.as_str().to_owned());
        let message = caps.get(3).map_or("", |m| m.as_str());
        return (tag.to_owned(), pid, message.to_owned());
    }

    match body.split_once(' ') {
        Some((tag, message)) => (tag.to_owned(), None, message.to_owned()),
        None => (body.to_owned(), None, String::new()),
    }
}
