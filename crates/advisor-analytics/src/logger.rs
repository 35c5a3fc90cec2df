//! Interaction logger.
//!
//! Wraps a sink with the fail-open policy: a failed append is reported on
//! the operator channel (tracing at error level, plus the returned
//! [`LoggingFailure`]) and never propagated to the conversation.

use std::sync::Arc;

use tracing::{debug, error};

use advisor_types::{ActionType, LogEntry};

use crate::sink::LogSink;

/// A log entry that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingFailure {
    pub action_type: ActionType,
    pub sink: &'static str,
    pub message: String,
}

impl std::fmt::Display for LoggingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "로그 기록 실패 ({} / {}): {}",
            self.sink,
            self.action_type.sheet_label(),
            self.message
        )
    }
}

/// Records visitor actions to an append-only sink.
#[derive(Clone)]
pub struct InteractionLogger {
    sink: Arc<dyn LogSink>,
}

impl InteractionLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Append `entry`. Returns the failure, if any, for the operator channel.
    pub async fn record(&self, entry: &LogEntry) -> Option<LoggingFailure> {
        match self.sink.append(entry).await {
            Ok(()) => {
                debug!(
                    action = %entry.action_type,
                    visitor = %entry.visitor_id,
                    sink = self.sink.name(),
                    "Recorded interaction"
                );
                None
            }
            Err(e) => {
                error!(
                    action = %entry.action_type,
                    visitor = %entry.visitor_id,
                    sink = self.sink.name(),
                    error = %e,
                    "Failed to record interaction"
                );
                Some(LoggingFailure {
                    action_type: entry.action_type,
                    sink: self.sink.name(),
                    message: e.to_string(),
                })
            }
        }
    }
}
