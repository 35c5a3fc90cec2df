//! Prompt composition.
//!
//! The first recommendation uses a strict structured template; every later
//! turn uses a freeform template. Both embed the product names, the retrieved
//! policy passages and the whole conversation so far.

use advisor_retrieval::Snippet;
use advisor_types::Message;

/// Histories up to this length still get the structured template.
const STRUCTURED_HISTORY_LIMIT: usize = 2;

/// Which prompt layout applies to a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    /// First recommendation: heading, product, three bullets, closing question
    Structured,
    /// Follow-up conversation without structural constraints
    Freeform,
}

impl PromptTemplate {
    /// Select the template for a history that already contains the new
    /// user message.
    pub fn for_history(history: &[Message]) -> Self {
        if history.len() <= STRUCTURED_HISTORY_LIMIT {
            PromptTemplate::Structured
        } else {
            PromptTemplate::Freeform
        }
    }
}

/// Builds prompts for the completion service.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    insurer: String,
}

impl PromptComposer {
    pub fn new(insurer: impl Into<String>) -> Self {
        Self {
            insurer: insurer.into(),
        }
    }

    /// Compose the prompt for the next assistant reply.
    pub fn compose(&self, history: &[Message], context: &[Snippet], product_names: &[&str]) -> String {
        let products = product_names.join(", ");
        let context = format_context(context);
        let history_text = format_history(history);

        match PromptTemplate::for_history(history) {
            PromptTemplate::Structured => self.structured(&products, &context, &history_text),
            PromptTemplate::Freeform => self.freeform(&products, &context, &history_text),
        }
    }

    fn structured(&self, products: &str, context: &str, history: &str) -> String {
        let insurer = &self.insurer;
        format!(
            r#"당신은 {insurer}의 보험 전문가입니다. 아래 형식을 반드시 지켜 답변하세요.
[추천 가능 상품] {products}
[약관 근거] {context}
[대화 내역] {history}

**출력 형식**:
1. 첫 줄: ## 💡 추천 상품
2. 둘째 줄: ### 🏥 [상품명] ([추천 가능 상품] 중 가장 적합한 상품 하나를 목록의 이름 그대로 선택)
3. 셋째 줄: "약관에 따르면"으로 시작하는 연결 문장
4. 보장 내용: 핵심 보장 3가지를 불렛 포인트(•)로 작성
   - 각 포인트는 한 줄로만 쓰고 끝에 이모티콘을 붙이세요. ✨
   - 불렛 포인트 사이에는 빈 줄을 하나씩 넣으세요.
   - 포인트끼리 같은 단어나 의미를 반복하지 마세요.
5. 마무리: 한 줄 띄우고 고객이 짧게 답할 수 있는 질문을 한 뒤, 아래 상세보기 버튼을 눌러 보도록 안내하세요. 👇
상담원 답변:"#
        )
    }

    fn freeform(&self, products: &str, context: &str, history: &str) -> String {
        let insurer = &self.insurer;
        format!(
            r#"당신은 {insurer}의 친절한 보험 전문가입니다. [약관 근거]를 바탕으로 대화하세요.
[추천 가능 상품] {products}
[약관 근거] {context}
[대화 내역] {history}
**답변 가이드**: 친절하고 자유롭게 답변하되 핵심을 전달하고, 이모티콘을 적절히 쓰고, 가벼운 질문을 하나 덧붙이세요.
상담원 답변:"#
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new("현대해상")
    }
}

/// `[source] content` per snippet, blank line between snippets.
fn format_context(context: &[Snippet]) -> String {
    context
        .iter()
        .map(|s| format!("[{}] {}", s.source_label(), s.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One `speaker: content` line per message.
fn format_history(history: &[Message]) -> String {
    history
        .iter()
        .map(Message::transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}
