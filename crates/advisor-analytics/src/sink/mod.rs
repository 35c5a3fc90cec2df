//! Log sink trait and implementations.

mod jsonl;
mod memory;
mod sheets;

pub use jsonl::JsonlSink;
pub use memory::{DisabledSink, FailingSink, MemorySink};
pub use sheets::{SheetsSink, SheetsSinkConfig};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use advisor_types::{AnalyticsSettings, LogEntry, SinkKind};

/// Errors raised while appending a log entry.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Append request failed: {0}")]
    Request(String),

    #[error("Sink returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Append-only destination for log entries.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Append one entry. Entries are never updated once written.
    async fn append(&self, entry: &LogEntry) -> Result<(), SinkError>;
}

/// Build the sink selected in settings.
pub fn build_sink(settings: &AnalyticsSettings) -> Result<Arc<dyn LogSink>, SinkError> {
    match settings.sink {
        SinkKind::Sheets => {
            let config = SheetsSinkConfig::from_settings(&settings.sheets)?;
            Ok(Arc::new(SheetsSink::new(config)?))
        }
        SinkKind::Jsonl => Ok(Arc::new(JsonlSink::new(PathBuf::from(&settings.jsonl_path)))),
        SinkKind::Disabled => Ok(Arc::new(DisabledSink)),
    }
}
