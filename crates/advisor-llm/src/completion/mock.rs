//! Mock completion client for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionClient, CompletionError};

/// Completion client with scripted answers.
///
/// Answers are handed out in order; once the script runs out the last
/// answer repeats. Every prompt is recorded for inspection.
pub struct MockCompletionClient {
    script: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    /// Client that always answers `answer`.
    pub fn new(answer: impl Into<String>) -> Self {
        Self::scripted(vec![answer.into()])
    }

    /// Client answering with `answers` in order.
    pub fn scripted(answers: Vec<String>) -> Self {
        Self {
            script: Mutex::new(answers.into()),
            last: Mutex::new(None),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Client whose service is unreachable.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if self.fail {
            return Err(CompletionError::Request("connection refused".to_string()));
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = self
            .last
            .lock()
            .map_err(|_| CompletionError::Request("mock poisoned".to_string()))?;

        if let Some(answer) = next {
            *last = Some(answer);
        }

        last.clone().ok_or(CompletionError::EmptyAnswer)
    }
}
