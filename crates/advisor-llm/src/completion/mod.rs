//! Completion client trait and implementations.
//!
//! Clients report failures as [`CompletionError`]. Substituting
//! [`FALLBACK_ANSWER`] so the visitor never sees an error is the caller's
//! policy, applied where the reply is needed.

mod api;
mod extract;
mod mock;

pub use api::{ApiCompletionClient, ApiCompletionConfig};
pub use extract::extract_answer;
pub use mock::MockCompletionClient;

use async_trait::async_trait;
use thiserror::Error;

/// Reply shown when the completion service can't produce an answer.
pub const FALLBACK_ANSWER: &str = "분석 중 오류가 발생했습니다.";

/// Error type for completion calls.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Request(String),

    #[error("Timeout waiting for completion")]
    Timeout,

    #[error("Completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse completion response: {0}")]
    Parse(String),

    #[error("Completion response contained no answer")]
    EmptyAnswer,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Remote text generation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate an answer for `prompt`. The returned text is trimmed.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
