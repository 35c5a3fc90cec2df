//! Answer extraction from completion responses.
//!
//! The upstream service does not commit to a response shape, so the answer
//! is looked up through an ordered list of strategies and the first one that
//! yields a non-empty string wins:
//! 1. top-level `message`
//! 2. top-level `content`
//! 3. chat-completion style `choices[0].message.content`

use serde_json::Value;

type Strategy = fn(&Value) -> Option<&str>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("message", top_level_message),
    ("content", top_level_content),
    ("choices", first_choice_content),
];

fn top_level_message(body: &Value) -> Option<&str> {
    body.get("message")?.as_str()
}

fn top_level_content(body: &Value) -> Option<&str> {
    body.get("content")?.as_str()
}

fn first_choice_content(body: &Value) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

/// Extract the trimmed answer text, or `None` if no strategy matched.
pub fn extract_answer(body: &Value) -> Option<String> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let answer = strategy(body)?.trim();
        if answer.is_empty() {
            return None;
        }
        tracing::trace!(strategy = *name, "Extracted completion answer");
        Some(answer.to_string())
    })
}
