#![no_main]

use arbitrary::Arbitrary;
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use logharbor_collector::SyslogFrameCodec;
use logharbor_core::types::FramingMethod;
use tokio_util::codec::Decoder;

#[derive(Debug, Arbitrary)]
enum Mode {
    Auto,
    OctetCounting,
    NonTransparent,
}

#[derive(Debug, Arbitrary)]
struct Input {
    mode: Mode,
    max_size: u16,
    /// 스트림을 나눠 넣을 위치 (부분 읽기 재현)
    split: u16,
    stream: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let max_size = usize::from(input.max_size).max(1);
    let mut codec = match input.mode {
        Mode::Auto => SyslogFrameCodec::auto_detect(),
        Mode::OctetCounting => SyslogFrameCodec::new(FramingMethod::OctetCounting),
        Mode::NonTransparent => SyslogFrameCodec::new(FramingMethod::NonTransparent),
    }
    .with_max_size(max_size);

    let split = usize::from(input.split).min(input.stream.len());
    let (head, tail) = input.stream.split_at(split);
    let mut buf = BytesMut::from(head);

    loop {
        match codec.decode(&mut buf) {
            Ok(Some(frame)) => assert!(frame.len() <= max_size.saturating_mul(4)),
            Ok(None) => break,
            Err(_) => return,
        }
    }

    buf.extend_from_slice(tail);
    loop {
        match codec.decode_eof(&mut buf) {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }
});
