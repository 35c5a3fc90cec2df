//! Error types for the policy advisor.

use thiserror::Error;

/// Unified error type for configuration and catalog loading.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog file could not be read or is inconsistent
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
