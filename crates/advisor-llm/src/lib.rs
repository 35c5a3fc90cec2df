//! Prompt composition and text generation for the policy advisor.
//!
//! Provides:
//! - Prompt composer selecting the structured (first turn) or freeform template
//! - Completion client trait with an HTTP implementation and a mock
//! - Ordered answer-extraction strategies for loosely shaped responses

pub mod completion;
pub mod prompt;

pub use completion::{
    extract_answer, ApiCompletionClient, ApiCompletionConfig, CompletionClient,
    CompletionError, MockCompletionClient, FALLBACK_ANSWER,
};
pub use prompt::{PromptComposer, PromptTemplate};
