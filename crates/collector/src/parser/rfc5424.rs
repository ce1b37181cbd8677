//! RFC 5424 파서
//!
//! 형식: `<PRI>VERSION TIMESTAMP HOSTNAME APP-NAME PROCID MSGID STRUCTURED-DATA MSG`
//!
//! 예: `<165>1 2003-10-11T22:14:15.003Z mymachine.example.com evntslog - ID47
//! [exampleSDID@32473 iut="3" eventSource="Application"] An application event log entry`

use chrono::{DateTime, Utc};
use logharbor_core::error::ParseError;
use logharbor_core::types::{StructuredElement, SyslogMessage};
use tracing::debug;

use super::parse_priority;

/// RFC 5424 NILVALUE
const NIL: &str = "-";

/// RFC 3339 파싱 실패 시 시도하는 형식 (콜론 없는 오프셋 허용)
const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// RFC 5424 메시지를 파싱합니다.
///
/// - `TIMESTAMP`가 `-`이면 현재 시각을 사용하고, 해석에 실패하면 에러입니다.
/// - `HOSTNAME`, `APP-NAME`, `PROCID`, `MSGID`의 `-`는 값 없음입니다.
/// - `APP-NAME`은 `tag`에도, `PROCID`는 `pid`에도 복사됩니다.
pub fn parse_rfc5424(raw: &str) -> Result<SyslogMessage, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let (facility, severity, after_pri) = parse_priority(raw)?;

    let fields: Vec<&str> = after_pri.trim().splitn(7, ' ').collect();
    let &[version, timestamp, hostname, app_name, proc_id, msg_id, remainder] = fields.as_slice()
    else {
        return Err(ParseError::InsufficientFields { got: fields.len() });
    };

    // VERSION은 검증만 하고 저장하지 않음
    version
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidVersion {
            value: version.to_owned(),
        })?;

    let timestamp = if timestamp == NIL {
        Utc::now()
    } else {
        parse_timestamp(timestamp)?
    };

    let app_name = nil_to_option(app_name);
    let proc_id = nil_to_option(proc_id);
    let (structured_data, message) = split_structured_data(remainder);

    Ok(SyslogMessage {
        timestamp,
        hostname: nil_to_option(hostname).unwrap_or_default(),
        facility,
        severity,
        tag: app_name.clone().unwrap_or_default(),
        message,
        raw: raw.to_owned(),
        pid: proc_id.clone(),
        app_name,
        proc_id,
        msg_id: nil_to_option(msg_id),
        structured_data,
    })
}

fn nil_to_option(value: &str) -> Option<String> {
    (!value.is_empty() && value != NIL).then(|| value.to_owned())
}

/// RFC 3339 타임스탬프를 UTC로 변환합니다.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, FALLBACK_TIMESTAMP_FORMAT))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseError::InvalidTimestamp {
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

/// `STRUCTURED-DATA MSG` 구간을 구조화 데이터와 본문으로 나눕니다.
fn split_structured_data(remainder: &str) -> (Vec<StructuredElement>, String) {
    if remainder.starts_with('[') {
        return match find_structured_data_end(remainder) {
            Some(end) => (
                parse_structured_data(&remainder[..end]),
                remainder[end..].trim().to_owned(),
            ),
            // 닫히지 않은 SD는 전체를 본문으로 취급
            None => (Vec::new(), remainder.to_owned()),
        };
    }

    if remainder == NIL {
        return (Vec::new(), String::new());
    }

    let message = remainder.strip_prefix("- ").unwrap_or(remainder);
    (Vec::new(), message.to_owned())
}

/// 연속된 SD-ELEMENT 블록의 끝(마지막 `]` 다음 바이트 위치)을 찾습니다.
///
/// 대괄호 깊이를 세며, `\`는 위치에 관계없이 다음 문자를 이스케이프합니다.
/// 균형 잡힌 블록이 하나도 없으면 `None`입니다.
pub(crate) fn find_structured_data_end(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut end = None;

    for (idx, &byte) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }

        match byte {
            b'\\' => escaped = true,
            b'[' => depth += 1,
            b']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    end = Some(idx + 1);
                    // SD-ELEMENT 사이에는 공백이 없음
                    if bytes.get(idx + 1) != Some(&b'[') {
                        return end;
                    }
                }
            }
            _ => {}
        }
    }

    end
}

/// SD-ELEMENT 목록을 파싱합니다.
///
/// 형식이 잘못된 경우 에러 대신 빈 목록을 반환합니다.
fn parse_structured_data(sd: &str) -> Vec<StructuredElement> {
    parse_sd_elements(sd).unwrap_or_else(|| {
        debug!(structured_data = sd, "malformed structured data, skipping");
        Vec::new()
    })
}

fn parse_sd_elements(sd: &str) -> Option<Vec<StructuredElement>> {
    let mut elements = Vec::new();
    let mut chars = sd.chars().peekable();

    while let Some(open) = chars.next() {
        if open != '[' {
            return None;
        }

        // SD-ID (']' 또는 ' ' 전까지)
        let mut id = String::new();
        while let Some(&ch) = chars.peek() {
            if ch == ']' || ch == ' ' {
                break;
            }
            id.push(ch);
            chars.next();
        }
        if id.is_empty() {
            return None;
        }

        // SD-PARAM (name="value")
        let mut params = Vec::new();
        loop {
            match chars.next()? {
                ']' => break,
                ' ' => continue,
                first => {
                    let mut name = String::from(first);
                    loop {
                        match chars.next()? {
                            '=' => break,
                            ' ' | ']' | '"' => return None,
                            ch => name.push(ch),
                        }
                    }

                    if chars.next()? != '"' {
                        return None;
                    }

                    let mut value = String::new();
                    loop {
                        match chars.next()? {
                            '"' => break,
                            // '"', '\', ']'만 이스케이프 대상, 나머지는 '\'를 보존
                            '\\' => match chars.next()? {
                                ch @ ('"' | '\\' | ']') => value.push(ch),
                                ch => {
                                    value.push('\\');
                                    value.push(ch);
                                }
                            },
                            ch => value.push(ch),
                        }
                    }

                    params.push((name, value));
                }
            }
        }

        elements.push(StructuredElement { id, params });
    }

    Some(elements)
}
