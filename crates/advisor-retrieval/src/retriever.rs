//! Retrieval contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Source label used when a snippet carries none.
pub const DEFAULT_SOURCE_LABEL: &str = "약관";

/// A retrieved policy passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Passage text
    pub content: String,

    /// Document the passage came from
    #[serde(default, alias = "source_label")]
    pub source: Option<String>,
}

impl Snippet {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: Some(source.into()),
        }
    }

    /// Snippet without a source label.
    pub fn unlabeled(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
        }
    }

    /// Source label, defaulting to [`DEFAULT_SOURCE_LABEL`].
    pub fn source_label(&self) -> &str {
        match self.source.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => DEFAULT_SOURCE_LABEL,
        }
    }
}

/// Semantic search over the policy knowledge base.
///
/// Implementations must be thread-safe (Send + Sync) so one retriever can
/// serve every visitor session.
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    /// Return up to `k` passages most relevant to `query`, best first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Snippet>, RetrievalError>;

    /// Check the backend is initialized. Called once at startup; an error
    /// means the advisor must refuse to start.
    async fn ensure_ready(&self) -> Result<(), RetrievalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label_default() {
        assert_eq!(Snippet::unlabeled("text").source_label(), "약관");
        assert_eq!(
            Snippet {
                content: "text".to_string(),
                source: Some("  ".to_string())
            }
            .source_label(),
            "약관"
        );
        assert_eq!(Snippet::new("text", "암보험 약관.pdf").source_label(), "암보험 약관.pdf");
    }

    #[test]
    fn test_snippet_accepts_source_label_alias() {
        let snippet: Snippet =
            serde_json::from_str(r#"{"content": "c", "source_label": "doc"}"#).unwrap();
        assert_eq!(snippet.source_label(), "doc");
    }
}
