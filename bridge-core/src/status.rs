//! Status reporting sink for live injection progress.
//!
//! The engine pushes one human-readable line into the sink as each step
//! begins, before the synchronous call returns, so a UI can render live
//! progress. The sink is an explicit parameter rather than a hidden
//! global logger, which keeps the engine testable with a capturing sink.

use std::sync::Mutex;

/// One-way sink for progress messages.
///
/// Delivery order matches emission order. The engine never retries or
/// buffers on behalf of a slow sink; keeping `report` fast is the
/// implementor's responsibility.
pub trait StatusSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Sink that forwards progress lines to the `log` facade at info level.
#[derive(Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn report(&self, message: &str) {
        log::info!("[injection status] {}", message);
    }
}

/// Sink that records every message, for tests and transcripts.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages reported so far, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl StatusSink for MemorySink {
    fn report(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
