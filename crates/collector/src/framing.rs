//! RFC 6587 TCP 프레이밍
//!
//! TCP 스트림에서 syslog 메시지 경계를 찾아내고, 전송 시 프레임을 씌웁니다.
//!
//! - octet-counting: `<길이> <메시지>` (예: `24 <34>Oct 11 22:14:15 test`)
//! - non-transparent: `<메시지>\n`
//!
//! [`SyslogFrameCodec`]는 `tokio_util::codec`의 `Decoder`/`Encoder`를 구현하므로
//! `FramedRead`/`FramedWrite`에 그대로 쓸 수 있습니다. [`FramingReader`]와
//! [`FramingWriter`]는 메시지 단위 읽기/쓰기 API를 제공합니다.
//!
//! 프레이밍 방식을 고정하지 않으면 첫 바이트들을 보고 연결당 한 번 결정합니다.
//! 결정된 방식은 연결이 끝날 때까지 바뀌지 않습니다.

use bytes::{Buf, BytesMut};
use futures_util::{SinkExt, StreamExt};
use logharbor_core::config::DEFAULT_MAX_MESSAGE_SIZE;
use logharbor_core::types::FramingMethod;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite};
use tracing::debug;

use crate::error::FramingError;

/// 자동 감지 시 검사하는 최대 바이트 수이자 길이 접두사의 최대 자릿수
const MAX_LENGTH_DIGITS: usize = 10;

/// 스트림 앞부분으로 프레이밍 방식을 추정합니다.
///
/// 하나 이상의 숫자 바로 뒤에 공백이 오면 octet-counting, 그 외에는 non-transparent입니다.
/// 최대 10바이트만 검사하며, 숫자만 있고 판단하기에 바이트가 부족하면 `None`을 반환합니다.
pub fn detect_framing(prefix: &[u8]) -> Option<FramingMethod> {
    for (idx, &byte) in prefix.iter().take(MAX_LENGTH_DIGITS).enumerate() {
        match byte {
            b'0'..=b'9' => continue,
            b' ' if idx > 0 => return Some(FramingMethod::OctetCounting),
            _ => return Some(FramingMethod::NonTransparent),
        }
    }

    if prefix.len() >= MAX_LENGTH_DIGITS {
        Some(FramingMethod::NonTransparent)
    } else {
        None
    }
}

/// syslog TCP 프레임 코덱
#[derive(Debug, Clone)]
pub struct SyslogFrameCodec {
    /// 결정된 프레이밍 방식 (`None`이면 아직 감지 전)
    method: Option<FramingMethod>,
    /// 메시지 최대 크기 (바이트)
    max_size: usize,
    /// octet-counting: 길이 접두사를 읽고 본문을 기다리는 중인 길이
    pending_len: Option<usize>,
    /// non-transparent: LF를 찾지 못한 구간의 끝 (다음 검색 시작점)
    scan_offset: usize,
}

impl SyslogFrameCodec {
    /// 프레이밍 방식을 고정한 코덱을 생성합니다.
    pub fn new(method: FramingMethod) -> Self {
        Self::for_method(Some(method))
    }

    /// 첫 바이트들로 프레이밍 방식을 감지하는 코덱을 생성합니다.
    pub fn auto_detect() -> Self {
        Self::for_method(None)
    }

    /// `None`이면 자동 감지, `Some`이면 고정된 방식을 사용합니다.
    pub fn for_method(method: Option<FramingMethod>) -> Self {
        Self {
            method,
            max_size: DEFAULT_MAX_MESSAGE_SIZE,
            pending_len: None,
            scan_offset: 0,
        }
    }

    /// 최대 메시지 크기를 설정합니다.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// 현재 프레이밍 방식. 자동 감지 전이면 `None`.
    pub fn method(&self) -> Option<FramingMethod> {
        self.method
    }

    /// 최대 메시지 크기
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// 프레이밍 방식을 결정합니다. 판단할 바이트가 부족하면 `None`.
    fn resolve_method(&mut self, src: &BytesMut, eof: bool) -> Option<FramingMethod> {
        if let Some(method) = self.method {
            return Some(method);
        }

        let detected = match detect_framing(src) {
            Some(method) => method,
            // 스트림이 끝났으면 있는 바이트로 결정
            None if eof && !src.is_empty() => FramingMethod::NonTransparent,
            None => return None,
        };

        debug!(framing = %detected, "detected TCP framing method");
        self.method = Some(detected);
        Some(detected)
    }

    fn decode_octet_counted(&mut self, src: &mut BytesMut) -> Result<Option<String>, FramingError> {
        let length = match self.pending_len {
            Some(length) => length,
            None => {
                // 이전 프레임 뒤의 개행 등 접두사 앞 공백은 허용
                let skip = src.iter().take_while(|b| b.is_ascii_whitespace()).count();
                src.advance(skip);

                let Some(space) = find_length_terminator(src)? else {
                    return Ok(None);
                };

                let length = parse_length(&src[..space])?;
                if length > self.max_size {
                    return Err(FramingError::TooLarge {
                        length,
                        max: self.max_size,
                    });
                }

                src.advance(space + 1);
                self.pending_len = Some(length);
                length
            }
        };

        if src.len() < length {
            src.reserve(length - src.len());
            return Ok(None);
        }

        self.pending_len = None;
        let frame = src.split_to(length);
        Ok(Some(String::from_utf8_lossy(&frame).into_owned()))
    }

    fn decode_non_transparent(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<String>, FramingError> {
        let start = self.scan_offset.min(src.len());
        if let Some(offset) = src[start..].iter().position(|&b| b == b'\n') {
            self.scan_offset = 0;
            let line = src.split_to(start + offset + 1);
            return self.finish_line(&line).map(Some);
        }

        self.scan_offset = src.len();

        // LF가 오지 않아도 이미 최대 크기를 넘었으면 더 기다리지 않음
        if src.len() > self.max_size {
            let length = trim_delimiters(src).len();
            if length > self.max_size {
                return Err(FramingError::TooLarge {
                    length,
                    max: self.max_size,
                });
            }
        }

        Ok(None)
    }

    fn finish_line(&self, line: &[u8]) -> Result<String, FramingError> {
        let message = trim_delimiters(line);
        if message.len() > self.max_size {
            return Err(FramingError::TooLarge {
                length: message.len(),
                max: self.max_size,
            });
        }
        Ok(String::from_utf8_lossy(message).into_owned())
    }
}

impl Default for SyslogFrameCodec {
    fn default() -> Self {
        Self::auto_detect()
    }
}

impl Decoder for SyslogFrameCodec {
    type Item = String;
    type Error = FramingError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.resolve_method(src, false) {
            Some(FramingMethod::OctetCounting) => self.decode_octet_counted(src),
            Some(FramingMethod::NonTransparent) => self.decode_non_transparent(src),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.resolve_method(src, true) {
            Some(FramingMethod::OctetCounting) => {
                if let Some(frame) = self.decode_octet_counted(src)? {
                    return Ok(Some(frame));
                }
                match self.pending_len.take() {
                    Some(expected) => Err(FramingError::Truncated {
                        expected,
                        received: src.len(),
                    }),
                    None if src.is_empty() => Ok(None),
                    None => Err(FramingError::InvalidLength {
                        prefix: String::from_utf8_lossy(src).into_owned(),
                    }),
                }
            }
            Some(FramingMethod::NonTransparent) => {
                if let Some(frame) = self.decode_non_transparent(src)? {
                    return Ok(Some(frame));
                }
                if src.is_empty() {
                    return Ok(None);
                }
                // LF 없이 끝난 마지막 메시지
                self.scan_offset = 0;
                let rest = src.split();
                self.finish_line(&rest).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl<T: AsRef<str>> Encoder<T> for SyslogFrameCodec {
    type Error = FramingError;

    /// 감지 모드 코덱은 non-transparent로 인코딩합니다.
    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let message = item.as_ref();
        match self.method.unwrap_or(FramingMethod::NonTransparent) {
            FramingMethod::OctetCounting => {
                let prefix = message.len().to_string();
                dst.reserve(prefix.len() + 1 + message.len());
                dst.extend_from_slice(prefix.as_bytes());
                dst.extend_from_slice(b" ");
                dst.extend_from_slice(message.as_bytes());
            }
            FramingMethod::NonTransparent => {
                dst.reserve(message.len() + 1);
                dst.extend_from_slice(message.as_bytes());
                dst.extend_from_slice(b"\n");
            }
        }
        Ok(())
    }
}

/// 길이 접두사를 끝내는 공백 위치를 찾습니다. 아직 도착하지 않았으면 `None`.
fn find_length_terminator(src: &[u8]) -> Result<Option<usize>, FramingError> {
    for (idx, &byte) in src.iter().enumerate() {
        match byte {
            b' ' => return Ok(Some(idx)),
            b'0'..=b'9' if idx < MAX_LENGTH_DIGITS => continue,
            _ => {
                return Err(FramingError::InvalidLength {
                    prefix: String::from_utf8_lossy(&src[..=idx]).into_owned(),
                });
            }
        }
    }
    Ok(None)
}

/// 길이 접두사를 해석합니다. 비어 있거나 0이면 에러입니다.
fn parse_length(prefix: &[u8]) -> Result<usize, FramingError> {
    let invalid = || FramingError::InvalidLength {
        prefix: String::from_utf8_lossy(prefix).into_owned(),
    };

    let length = std::str::from_utf8(prefix)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(invalid)?;

    if length == 0 {
        return Err(invalid());
    }
    Ok(length)
}

/// 끝의 CR, LF, NUL을 제거합니다.
pub(crate) fn trim_delimiters(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| !matches!(b, b'\n' | b'\r' | b'\0'))
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}

/// 프레임 단위 syslog 리더
///
/// `read_message()`가 `Ok(None)`을 반환하면 스트림이 정상 종료된 것입니다.
/// 에러를 반환한 뒤에는 더 이상 메시지를 읽을 수 없습니다.
pub struct FramingReader<R> {
    inner: FramedRead<R, SyslogFrameCodec>,
}

impl<R: AsyncRead + Unpin> FramingReader<R> {
    /// 프레이밍 방식을 고정한 리더를 생성합니다.
    pub fn new(reader: R, method: FramingMethod) -> Self {
        Self::with_codec(reader, SyslogFrameCodec::new(method))
    }

    /// 첫 바이트들로 프레이밍 방식을 감지하는 리더를 생성합니다.
    pub fn auto_detect(reader: R) -> Self {
        Self::with_codec(reader, SyslogFrameCodec::auto_detect())
    }

    /// 설정된 코덱으로 리더를 생성합니다.
    pub fn with_codec(reader: R, codec: SyslogFrameCodec) -> Self {
        Self {
            inner: FramedRead::new(reader, codec),
        }
    }

    /// 최대 메시지 크기를 설정합니다 (기본 8KB).
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.inner.decoder_mut().max_size = max_size;
        self
    }

    /// 현재 프레이밍 방식. 자동 감지 전이면 `None`.
    pub fn method(&self) -> Option<FramingMethod> {
        self.inner.decoder().method()
    }

    /// 다음 메시지를 읽습니다.
    pub async fn read_message(&mut self) -> Result<Option<String>, FramingError> {
        self.inner.next().await.transpose()
    }

    /// 내부 리더를 반환합니다. 버퍼에 남은 바이트는 버려집니다.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

/// 프레임 단위 syslog 라이터
pub struct FramingWriter<W> {
    inner: FramedWrite<W, SyslogFrameCodec>,
}

impl<W: AsyncWrite + Unpin> FramingWriter<W> {
    /// 지정한 프레이밍 방식으로 쓰는 라이터를 생성합니다.
    pub fn new(writer: W, method: FramingMethod) -> Self {
        Self {
            inner: FramedWrite::new(writer, SyslogFrameCodec::new(method)),
        }
    }

    /// 프레이밍 방식
    pub fn method(&self) -> FramingMethod {
        self.inner
            .encoder()
            .method()
            .unwrap_or(FramingMethod::NonTransparent)
    }

    /// 메시지 하나를 프레임으로 감싸 쓰고 flush합니다.
    pub async fn write_message(&mut self, message: &str) -> Result<(), FramingError> {
        self.inner.send(message).await
    }

    /// 내부 라이터를 반환합니다.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}
