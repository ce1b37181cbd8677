//! 도메인 타입 — 수집 파이프라인 전역에서 사용되는 공통 타입
//!
//! 파서가 생성하는 [`SyslogMessage`]와 TCP 프레이밍 방식을 나타내는
//! [`FramingMethod`]를 정의합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RFC 5424 facility 키워드 (코드 0~23)
///
/// 12~15번(ntp, security, console, solaris-cron)은 구현마다 이름이 달라
/// 이름 없이 `"unknown"`으로 표시합니다.
const FACILITY_NAMES: [Option<&str>; 24] = [
    Some("kern"),
    Some("user"),
    Some("mail"),
    Some("daemon"),
    Some("auth"),
    Some("syslog"),
    Some("lpr"),
    Some("news"),
    Some("uucp"),
    Some("cron"),
    Some("authpriv"),
    Some("ftp"),
    None,
    None,
    None,
    None,
    Some("local0"),
    Some("local1"),
    Some("local2"),
    Some("local3"),
    Some("local4"),
    Some("local5"),
    Some("local6"),
    Some("local7"),
];

/// RFC 5424 severity 키워드 (코드 0~7)
const SEVERITY_NAMES: [&str; 8] = [
    "emergency",
    "alert",
    "critical",
    "error",
    "warning",
    "notice",
    "info",
    "debug",
];

/// facility 코드를 사람이 읽을 수 있는 이름으로 변환합니다.
pub fn facility_name(facility: u64) -> &'static str {
    usize::try_from(facility)
        .ok()
        .and_then(|idx| FACILITY_NAMES.get(idx).copied().flatten())
        .unwrap_or("unknown")
}

/// severity 코드를 사람이 읽을 수 있는 이름으로 변환합니다.
pub fn severity_name(severity: u8) -> &'static str {
    SEVERITY_NAMES
        .get(usize::from(severity))
        .copied()
        .unwrap_or("unknown")
}

/// 파싱된 syslog 메시지
///
/// 파서가 원시 메시지 하나로부터 한 번 생성하며, 이후에는 변경되지 않습니다.
/// 소유권은 핸들러로 넘어가고, 저장 여부는 핸들러가 결정합니다.
///
/// `facility`와 `severity`는 하나의 PRI 정수에서 계산되므로
/// `priority() == facility * 8 + severity`가 항상 성립합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyslogMessage {
    /// 메시지 시각 (항상 UTC)
    pub timestamp: DateTime<Utc>,
    /// 호스트명 (NILVALUE면 빈 문자열)
    pub hostname: String,
    /// PRI / 8 — 범위를 제한하지 않음
    pub facility: u64,
    /// PRI % 8 — 항상 0~7
    pub severity: u8,
    /// 프로그램 이름 (RFC 3164 TAG, RFC 5424 APP-NAME)
    pub tag: String,
    /// 구조화 데이터와 NILVALUE 마커가 제거된 본문
    pub message: String,
    /// 수신한 원본 텍스트
    pub raw: String,
    /// 프로세스 ID (RFC 3164 `tag[pid]`, RFC 5424 PROCID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    /// RFC 5424 APP-NAME
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// RFC 5424 PROCID
    #[serde(
        default,
        rename = "procID",
        skip_serializing_if = "Option::is_none"
    )]
    pub proc_id: Option<String>,
    /// RFC 5424 MSGID
    #[serde(default, rename = "msgID", skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
    /// RFC 5424 STRUCTURED-DATA 요소
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structured_data: Vec<StructuredElement>,
}

impl SyslogMessage {
    /// PRI 값을 다시 계산합니다 (`facility * 8 + severity`).
    pub fn priority(&self) -> u64 {
        self.facility * 8 + u64::from(self.severity)
    }

    /// facility 이름 (예: `auth`, `local4`)
    pub fn facility_name(&self) -> &'static str {
        facility_name(self.facility)
    }

    /// severity 이름 (예: `critical`, `notice`)
    pub fn severity_name(&self) -> &'static str {
        severity_name(self.severity)
    }
}

impl fmt::Display for SyslogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}.{}] {} {}",
            self.facility_name(),
            self.severity_name(),
            self.hostname,
            self.tag,
        )?;
        if let Some(pid) = &self.pid {
            write!(f, "[{pid}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// RFC 5424 SD-ELEMENT 하나 (`[id name="value" ...]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredElement {
    /// SD-ID
    pub id: String,
    /// SD-PARAM 목록 (순서 유지)
    pub params: Vec<(String, String)>,
}

impl StructuredElement {
    /// 이름으로 파라미터 값을 찾습니다.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// RFC 6587 TCP 프레이밍 방식
///
/// 연결이 유지되는 동안 바뀌지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramingMethod {
    /// `<길이> <메시지>` 형식의 길이 접두사 프레이밍
    OctetCounting,
    /// LF로 끝나는 구분자 프레이밍
    NonTransparent,
}

impl FramingMethod {
    /// 설정 파일에서 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OctetCounting => "octet-counting",
            Self::NonTransparent => "non-transparent",
        }
    }
}

impl fmt::Display for FramingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FramingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "octet-counting" => Ok(Self::OctetCounting),
            "non-transparent" => Ok(Self::NonTransparent),
            other => Err(format!(
                "unknown framing method '{other}' (expected octet-counting or non-transparent)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyslogMessage {
        SyslogMessage {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            hostname: "mymachine".to_owned(),
            facility: 4,
            severity: 2,
            tag: "su".to_owned(),
            message: "'su root' failed".to_owned(),
            raw: "<34>Oct 11 22:14:15 mymachine su[1234]: 'su root' failed".to_owned(),
            pid: Some("1234".to_owned()),
            app_name: None,
            proc_id: None,
            msg_id: None,
            structured_data: Vec::new(),
        }
    }

    #[test]
    fn priority_recombines_facility_and_severity() {
        assert_eq!(sample().priority(), 34);
    }

    #[test]
    fn names_for_known_codes() {
        let msg = sample();
        assert_eq!(msg.facility_name(), "auth");
        assert_eq!(msg.severity_name(), "critical");
        assert_eq!(facility_name(20), "local4");
        assert_eq!(facility_name(12), "unknown");
        assert_eq!(facility_name(24), "unknown");
        assert_eq!(severity_name(7), "debug");
        assert_eq!(severity_name(8), "unknown");
    }

    #[test]
    fn display_includes_pid() {
        let line = sample().to_string();
        assert_eq!(line, "[auth.critical] mymachine su[1234]: 'su root' failed");
    }

    #[test]
    fn json_uses_wire_field_names() {
        let mut msg = sample();
        msg.proc_id = Some("8710".to_owned());
        msg.msg_id = Some("ID47".to_owned());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["procID"], "8710");
        assert_eq!(json["msgID"], "ID47");
        assert!(json.get("appName").is_none());
        assert!(json.get("structuredData").is_none());
    }

    #[test]
    fn framing_method_from_str() {
        assert_eq!(
            "octet-counting".parse::<FramingMethod>().unwrap(),
            FramingMethod::OctetCounting
        );
        assert_eq!(
            "Non-Transparent".parse::<FramingMethod>().unwrap(),
            FramingMethod::NonTransparent
        );
        assert!("lf".parse::<FramingMethod>().is_err());
    }

    #[test]
    fn structured_element_param_lookup() {
        let element = StructuredElement {
            id: "exampleSDID@32473".to_owned(),
            params: vec![("iut".to_owned(), "3".to_owned())],
        };
        assert_eq!(element.param("iut"), Some("3"));
        assert_eq!(element.param("missing"), None);
    }
}
