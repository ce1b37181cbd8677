#![no_main]

use libfuzzer_sys::fuzz_target;
use logharbor_collector::parser;

fuzz_target!(|data: &[u8]| {
    // 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(msg) = parser::parse_bytes(data) {
        assert!(msg.severity < 8);
        assert_eq!(msg.priority(), msg.facility * 8 + u64::from(msg.severity));
    }
});
