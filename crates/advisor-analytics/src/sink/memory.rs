//! In-process sinks.

use std::sync::Mutex;

use async_trait::async_trait;

use advisor_types::LogEntry;

use super::{LogSink, SinkError};

/// Keeps entries in memory. Useful for tests.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the entries written so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LogSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, entry: &LogEntry) -> Result<(), SinkError> {
        self.entries
            .lock()
            .map_err(|_| SinkError::Request("memory sink poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}

/// Rejects every entry.
#[derive(Debug, Default)]
pub struct FailingSink;

#[async_trait]
impl LogSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn append(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Err(SinkError::Request("sink unavailable".to_string()))
    }
}

/// Drops every entry.
#[derive(Debug, Default)]
pub struct DisabledSink;

#[async_trait]
impl LogSink for DisabledSink {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn append(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }
}
