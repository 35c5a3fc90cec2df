//! Client for an HTTP semantic search service.
//!
//! Wire contract:
//! - `GET {base_url}/health` answers 2xx once the index is loaded
//! - `POST {base_url}/search` with `{"query": "...", "k": 3}` answers either
//!   `{"results": [{"content": "...", "source": "..."}]}` or a bare array

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RetrievalError;
use crate::retriever::{KnowledgeRetriever, Snippet};

/// Configuration for the HTTP retriever.
#[derive(Debug, Clone)]
pub struct HttpRetrieverConfig {
    /// Service base URL (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Optional bearer token
    pub api_key: Option<SecretString>,

    /// Request timeout
    pub timeout: Duration,
}

impl HttpRetrieverConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { results: Vec<Snippet> },
    Bare(Vec<Snippet>),
}

impl SearchResponse {
    fn into_snippets(self) -> Vec<Snippet> {
        match self {
            SearchResponse::Wrapped { results } => results,
            SearchResponse::Bare(results) => results,
        }
    }
}

/// Retriever backed by an HTTP search service.
pub struct HttpRetriever {
    client: Client,
    config: HttpRetrieverConfig,
}

impl HttpRetriever {
    pub fn new(config: HttpRetrieverConfig) -> Result<Self, RetrievalError> {
        if config.base_url.trim().is_empty() {
            return Err(RetrievalError::Config("search endpoint is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key.expose_secret())),
            None => request,
        }
    }
}

#[async_trait]
impl KnowledgeRetriever for HttpRetriever {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Snippet>, RetrievalError> {
        debug!(k, query_len = query.len(), "Querying search service");

        let response = self
            .authorize(self.client.post(self.url("search")))
            .json(&SearchRequest { query, k })
            .send()
            .await
            .map_err(|e| RetrievalError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Request(format!("HTTP {}: {}", status, body)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;

        let mut snippets = body.into_snippets();
        snippets.truncate(k);
        debug!(count = snippets.len(), "Search returned snippets");
        Ok(snippets)
    }

    async fn ensure_ready(&self) -> Result<(), RetrievalError> {
        let response = self
            .authorize(self.client.get(self.url("health")))
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(format!("{}: {}", self.config.base_url, e)))?;

        if !response.status().is_success() {
            return Err(RetrievalError::Unavailable(format!(
                "{} answered HTTP {}",
                self.config.base_url,
                response.status()
            )));
        }

        Ok(())
    }
}
