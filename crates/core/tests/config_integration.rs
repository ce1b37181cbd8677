//! logharbor.toml 통합 설정 테스트
//!
//! - logharbor.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::io::Write;

use logharbor_core::config::LogharborConfig;
use logharbor_core::error::{ConfigError, LogharborError};

// =============================================================================
// logharbor.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../logharbor.toml.example");
    let config = LogharborConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.collector.address, ":514");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../logharbor.toml.example");
    let config = LogharborConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../logharbor.toml.example");
    let from_file = LogharborConfig::parse(content).expect("should parse");
    let from_code = LogharborConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);

    assert_eq!(from_file.collector.address, from_code.collector.address);
    assert_eq!(from_file.collector.protocol, from_code.collector.protocol);
    assert_eq!(from_file.collector.framing, from_code.collector.framing);
    assert_eq!(
        from_file.collector.max_message_size,
        from_code.collector.max_message_size
    );

    assert_eq!(from_file.metrics.enabled, from_code.metrics.enabled);
    assert_eq!(from_file.metrics.listen_addr, from_code.metrics.listen_addr);
    assert_eq!(from_file.metrics.port, from_code.metrics.port);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_collector_only() {
    let toml = r#"
[collector]
address = "127.0.0.1:5514"
protocol = "tcp"
"#;
    let config = LogharborConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.collector.address, "127.0.0.1:5514");
    assert_eq!(config.collector.protocol, "tcp");
    assert_eq!(config.collector.framing, "auto");
    assert_eq!(config.general.log_level, "info");
    assert!(!config.metrics.enabled);
}

#[test]
fn partial_config_metrics_only() {
    let toml = r#"
[metrics]
enabled = true
port = 9300
"#;
    let config = LogharborConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.port, 9300);
    assert_eq!(config.metrics.listen_addr, "127.0.0.1");
    assert_eq!(config.collector.protocol, "udp");
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[collector]
protocol = "udp"
"#;

    let original = std::env::var("LOGHARBOR_COLLECTOR_PROTOCOL").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGHARBOR_COLLECTOR_PROTOCOL", "both");
    }

    let mut config = LogharborConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.collector.protocol.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGHARBOR_COLLECTOR_PROTOCOL", val),
            None => std::env::remove_var("LOGHARBOR_COLLECTOR_PROTOCOL"),
        }
    }

    assert_eq!(result, "both");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let original = std::env::var("LOGHARBOR_COLLECTOR_MAX_MESSAGE_SIZE").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGHARBOR_COLLECTOR_MAX_MESSAGE_SIZE", "4096");
    }

    let mut config = LogharborConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.collector.max_message_size;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGHARBOR_COLLECTOR_MAX_MESSAGE_SIZE", val),
            None => std::env::remove_var("LOGHARBOR_COLLECTOR_MAX_MESSAGE_SIZE"),
        }
    }

    assert_eq!(result, 4096);
}

#[test]
#[serial_test::serial]
fn env_override_bool_field() {
    let original = std::env::var("LOGHARBOR_METRICS_ENABLED").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGHARBOR_METRICS_ENABLED", "true");
    }

    let mut config = LogharborConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.metrics.enabled;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGHARBOR_METRICS_ENABLED", val),
            None => std::env::remove_var("LOGHARBOR_METRICS_ENABLED"),
        }
    }

    assert!(result);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_number_keeps_toml_value() {
    let toml = r#"
[metrics]
port = 9300
"#;
    let original = std::env::var("LOGHARBOR_METRICS_PORT").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGHARBOR_METRICS_PORT", "not-a-port");
    }

    let mut config = LogharborConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.metrics.port;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGHARBOR_METRICS_PORT", val),
            None => std::env::remove_var("LOGHARBOR_METRICS_PORT"),
        }
    }

    assert_eq!(result, 9300);
}

#[test]
#[serial_test::serial]
fn env_override_missing_var_keeps_toml_value() {
    let toml = r#"
[general]
log_level = "warn"
"#;

    // SAFETY: 존재하지 않는 변수를 명시적으로 제거
    unsafe {
        std::env::remove_var("LOGHARBOR_GENERAL_LOG_LEVEL");
    }

    let mut config = LogharborConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();

    assert_eq!(config.general.log_level, "warn");
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn load_reads_file_and_validates() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        "[collector]\naddress = \"127.0.0.1:5514\"\nprotocol = \"both\""
    )
    .expect("write");

    // SAFETY: 존재하지 않는 변수를 명시적으로 제거
    unsafe {
        std::env::remove_var("LOGHARBOR_COLLECTOR_PROTOCOL");
        std::env::remove_var("LOGHARBOR_COLLECTOR_ADDRESS");
    }

    let config = LogharborConfig::load(file.path())
        .await
        .expect("should load");
    assert_eq!(config.collector.protocol, "both");
    assert_eq!(config.collector.address, "127.0.0.1:5514");
}

#[tokio::test]
async fn load_rejects_invalid_values_in_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[collector]\nprotocol = \"sctp\"").expect("write");

    let err = LogharborConfig::from_file(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        LogharborError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 빈 파일 / 잘못된 형식 에러 테스트
// =============================================================================

#[test]
fn whitespace_only_parses_with_defaults() {
    let config = LogharborConfig::parse("   \n\n  \t  ").expect("whitespace should parse");
    config.validate().expect("should validate");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let err = LogharborConfig::parse("[invalid toml").unwrap_err();
    assert!(matches!(
        err,
        LogharborError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn invalid_type_returns_parse_error() {
    let toml = r#"
[collector]
max_message_size = "big"
"#;
    let err = LogharborConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        LogharborError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn address_without_port_fails_validation() {
    let toml = r#"
[collector]
address = "0.0.0.0"
"#;
    let config = LogharborConfig::parse(toml).expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("collector.address"));
}
