//! Controller error types.

use thiserror::Error;

use advisor_retrieval::RetrievalError;

/// Errors that stop the conversation controller from starting.
///
/// Turn-level failures (completion, logging) are recovered inside the
/// controller and never surface here.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Knowledge base missing or not initialized
    #[error("Knowledge base unavailable, refusing to start: {0}")]
    RetrievalUnavailable(#[from] RetrievalError),

    /// Invalid controller setup
    #[error("Invalid configuration: {0}")]
    Config(String),
}
