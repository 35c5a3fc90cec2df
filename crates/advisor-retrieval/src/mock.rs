//! Mock retriever for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RetrievalError;
use crate::retriever::{KnowledgeRetriever, Snippet};

/// Retriever returning a fixed set of snippets.
///
/// Records every query so tests can assert what was searched for.
pub struct MockRetriever {
    snippets: Vec<Snippet>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockRetriever {
    /// Retriever answering every query with `snippets` (truncated to k).
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Retriever with an empty knowledge base.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Retriever whose backend is down.
    pub fn unavailable() -> Self {
        Self {
            snippets: Vec::new(),
            fail: true,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Default for MockRetriever {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl KnowledgeRetriever for MockRetriever {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Snippet>, RetrievalError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        if self.fail {
            return Err(RetrievalError::Unavailable("mock backend down".to_string()));
        }

        Ok(self.snippets.iter().take(k).cloned().collect())
    }

    async fn ensure_ready(&self) -> Result<(), RetrievalError> {
        if self.fail {
            return Err(RetrievalError::Unavailable("mock backend down".to_string()));
        }
        Ok(())
    }
}
