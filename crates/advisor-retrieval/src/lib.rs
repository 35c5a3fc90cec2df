//! # advisor-retrieval
//!
//! Knowledge retrieval for the policy advisor.
//!
//! Policy passages live behind an external semantic search service. This
//! crate only defines the query contract and the clients that speak it; any
//! backend satisfying [`KnowledgeRetriever`] is interchangeable.
//!
//! ## Modules
//!
//! - [`retriever`]: `Snippet` and the `KnowledgeRetriever` trait
//! - [`http`]: Client for an HTTP search service
//! - [`mock`]: Deterministic retriever for tests
//! - [`error`]: Retrieval errors

pub mod error;
pub mod http;
pub mod mock;
pub mod retriever;

pub use error::RetrievalError;
pub use http::{HttpRetriever, HttpRetrieverConfig};
pub use mock::MockRetriever;
pub use retriever::{KnowledgeRetriever, Snippet, DEFAULT_SOURCE_LABEL};
