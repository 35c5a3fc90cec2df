//! Retrieval error types.

use thiserror::Error;

/// Errors that can occur while querying the knowledge base.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// No search backend configured or the backend is not initialized
    #[error("Knowledge base unavailable: {0}")]
    Unavailable(String),

    /// Request to the search service failed
    #[error("Search request failed: {0}")]
    Request(String),

    /// Search service answered with something we can't read
    #[error("Failed to parse search response: {0}")]
    Parse(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
