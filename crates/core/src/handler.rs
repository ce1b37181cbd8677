//! 핸들러 trait — 수집기와 외부 싱크 사이의 경계

use crate::error::LogharborError;
use crate::types::SyslogMessage;

/// 파싱에 성공한 메시지를 받는 싱크
///
/// 수집기는 UDP 루프와 모든 TCP 연결 태스크에서 이 핸들러를 동시에 호출하며,
/// 호출을 직렬화하지 않습니다. 따라서 구현체는 `Send + Sync`여야 하고
/// 내부 상태가 있다면 스스로 동기화해야 합니다.
///
/// 반환된 에러는 수집기가 로그로만 남기며, 재시도하거나 연결을 닫지 않습니다.
pub trait MessageHandler: Send + Sync {
    /// 메시지 하나를 처리합니다.
    fn handle(&self, message: SyslogMessage) -> Result<(), LogharborError>;
}

impl<F> MessageHandler for F
where
    F: Fn(SyslogMessage) -> Result<(), LogharborError> + Send + Sync,
{
    fn handle(&self, message: SyslogMessage) -> Result<(), LogharborError> {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    fn message(text: &str) -> SyslogMessage {
        SyslogMessage {
            timestamp: Utc::now(),
            hostname: "host".to_owned(),
            facility: 1,
            severity: 6,
            tag: "app".to_owned(),
            message: text.to_owned(),
            raw: text.to_owned(),
            pid: None,
            app_name: None,
            proc_id: None,
            msg_id: None,
            structured_data: Vec::new(),
        }
    }

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl MessageHandler for Recorder {
        fn handle(&self, message: SyslogMessage) -> Result<(), LogharborError> {
            self.seen
                .lock()
                .map_err(LogharborError::handler)?
                .push(message.message);
            Ok(())
        }
    }

    #[test]
    fn closures_are_handlers() {
        let handler = |msg: SyslogMessage| -> Result<(), LogharborError> {
            if msg.message.is_empty() {
                Err(LogharborError::handler("empty"))
            } else {
                Ok(())
            }
        };
        assert!(handler.handle(message("hello")).is_ok());
        assert!(handler.handle(message("")).is_err());
    }

    #[test]
    fn handler_usable_as_trait_object() {
        let recorder = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let dyn_handler: &dyn MessageHandler = &recorder;
        dyn_handler.handle(message("one")).unwrap();
        dyn_handler.handle(message("two")).unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["one", "two"]);
    }
}
