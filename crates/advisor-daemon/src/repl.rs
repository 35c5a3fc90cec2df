//! Terminal chat surface.
//!
//! Input lines are parsed into [`ChatInput`] commands; rendering helpers
//! turn session state into plain text. Both are free of I/O so the chat
//! loop in `commands` stays thin.

use std::fmt::Write as _;

use advisor_core::{ProductAffordance, Session};
use advisor_types::{Message, TagTaxonomy};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Empty,
    Help,
    /// List tag categories with current selections
    Tags,
    /// Toggle a tag, e.g. `/tag #나`
    ToggleTag(String),
    /// Request the first recommendation; without text the tag description is used
    Recommend(Option<String>),
    /// Click "learn more" by button number or product name
    Detail(String),
    Reset,
    Quit,
    /// Free text: a description before the first recommendation, a follow-up after
    Text(String),
    Unknown(String),
}

pub const HELP: &str = "\
명령어:
  /tags                 키워드 목록 보기
  /tag <#태그>           키워드 선택/해제
  /recommend [상황]      맞춤 상품 추천 받기 (생략 시 선택한 키워드 사용)
  /detail <번호|상품명>   상품 자세히 보기
  /reset                상담 리셋하기
  /quit                 종료
그 외 입력은 추가 질문으로 전달됩니다.";

/// Parse a raw input line.
pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Text(line.to_string());
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "/help" | "/?" => ChatInput::Help,
        "/tags" => ChatInput::Tags,
        "/tag" if !arg.is_empty() => ChatInput::ToggleTag(arg.to_string()),
        "/recommend" | "/rec" => {
            ChatInput::Recommend((!arg.is_empty()).then(|| arg.to_string()))
        }
        "/detail" if !arg.is_empty() => ChatInput::Detail(arg.to_string()),
        "/reset" => ChatInput::Reset,
        "/quit" | "/exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(line.to_string()),
    }
}

/// Resolve a `/detail` argument: a 1-based button number, else a product name.
pub fn resolve_detail(arg: &str, buttons: &[ProductAffordance]) -> String {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| buttons.get(i))
        .map(|b| b.product.clone())
        .unwrap_or_else(|| arg.to_string())
}

/// Index of the most recent assistant message, if any.
pub fn last_assistant_index(session: &Session) -> Option<usize> {
    session.messages().iter().rposition(Message::is_assistant)
}

/// Tag categories with the session's selections marked.
pub fn render_tags(taxonomy: &TagTaxonomy, session: &Session) -> String {
    let mut out = String::new();
    for category in taxonomy.iter() {
        let _ = writeln!(out, "{}", category.label);
        let tags: Vec<String> = category
            .tags
            .iter()
            .map(|tag| {
                if session.selected_tag(&category.label) == Some(tag.as_str()) {
                    format!("[{tag}]")
                } else {
                    tag.clone()
                }
            })
            .collect();
        let _ = writeln!(out, "  {}", tags.join(" "));
    }
    out
}

/// Product buttons under an assistant message.
pub fn render_affordances(buttons: &[ProductAffordance]) -> String {
    let mut out = String::new();
    for (i, button) in buttons.iter().enumerate() {
        let _ = writeln!(out, "  [{}] 🔍 {} 자세히 보기", i + 1, button.product);
        if button.open_page_visible {
            let _ = writeln!(out, "      🔗 상품 페이지 열기: {}", button.url);
        }
    }
    out
}
