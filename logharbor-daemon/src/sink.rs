//! JSON-lines message sink.
//!
//! Writes one serialized [`SyslogMessage`] per line. The collector calls the
//! handler concurrently from the UDP loop and every TCP connection task, so
//! the writer sits behind a mutex and each line is written and flushed while
//! the lock is held.

use std::io::{self, Write};
use std::sync::Mutex;

use logharbor_core::error::LogharborError;
use logharbor_core::handler::MessageHandler;
use logharbor_core::types::SyslogMessage;

/// Handler that serializes each message as a JSON line.
pub struct JsonLinesHandler<W> {
    writer: Mutex<W>,
}

impl JsonLinesHandler<io::Stdout> {
    /// Sink writing to the process stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesHandler<W> {
    /// Wrap an arbitrary writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> Result<W, LogharborError> {
        self.writer.into_inner().map_err(LogharborError::handler)
    }
}

impl<W: Write + Send> MessageHandler for JsonLinesHandler<W> {
    fn handle(&self, message: SyslogMessage) -> Result<(), LogharborError> {
        let line = serde_json::to_vec(&message).map_err(LogharborError::handler)?;

        let mut writer = self.writer.lock().map_err(LogharborError::handler)?;
        writer.write_all(&line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
