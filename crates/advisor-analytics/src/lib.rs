//! # advisor-analytics
//!
//! Append-only interaction logging for the policy advisor.
//!
//! Every visitor action produces one [`LogEntry`](advisor_types::LogEntry)
//! that is appended to a sink. Sink failures never interrupt a conversation:
//! [`InteractionLogger`] reports them on the operator channel and moves on.
//!
//! ## Sinks
//! - [`SheetsSink`]: Google Sheets `values:append`
//! - [`JsonlSink`]: Local JSON lines file
//! - [`MemorySink`] / [`FailingSink`]: Test doubles
//! - [`DisabledSink`]: Drops entries

pub mod logger;
pub mod sink;

pub use logger::{InteractionLogger, LoggingFailure};
pub use sink::{
    build_sink, DisabledSink, FailingSink, JsonlSink, LogSink, MemorySink, SheetsSink, SheetsSinkConfig,
    SinkError,
};
