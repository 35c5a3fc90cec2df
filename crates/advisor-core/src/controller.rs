//! Conversation controller.
//!
//! Drives one visitor's consultation through the recommend / follow-up /
//! detail-click / reset cycle. Every operation takes the visitor's
//! [`Session`] by `&mut` and writes its interaction log entry before it
//! returns.
//!
//! Turn pipeline:
//! 1. Append the user message
//! 2. Retrieve policy passages for it (failure degrades to no context)
//! 3. Compose the prompt and request a completion (failure degrades to the
//!    fallback answer)
//! 4. Append the assistant message and extract the recommended product
//! 5. Log the action

use std::sync::Arc;

use tracing::{debug, info, warn};

use advisor_analytics::{InteractionLogger, LoggingFailure};
use advisor_llm::{CompletionClient, PromptComposer, PromptTemplate, FALLBACK_ANSWER};
use advisor_retrieval::{KnowledgeRetriever, Snippet};
use advisor_types::{ActionType, Message, ProductCatalog, TagTaxonomy, DETAIL_CLICK_INPUT};

use crate::error::ControllerError;
use crate::extractor::{ProductAffordance, ProductExtractor};
use crate::session::{ConversationState, Session};

/// Default number of passages retrieved per turn.
pub const DEFAULT_TOP_K: usize = 3;

/// Collaborators the controller is built from.
#[derive(Clone)]
pub struct ControllerParts {
    pub retriever: Arc<dyn KnowledgeRetriever>,
    pub completion: Arc<dyn CompletionClient>,
    pub logger: InteractionLogger,
    pub catalog: Arc<ProductCatalog>,
    pub taxonomy: Arc<TagTaxonomy>,
    pub composer: PromptComposer,
    pub top_k: usize,
}

impl ControllerParts {
    /// Parts using the built-in catalog, taxonomy and prompt wording.
    pub fn new(
        retriever: Arc<dyn KnowledgeRetriever>,
        completion: Arc<dyn CompletionClient>,
        logger: InteractionLogger,
    ) -> Self {
        Self {
            retriever,
            completion,
            logger,
            catalog: Arc::new(ProductCatalog::builtin()),
            taxonomy: Arc::new(TagTaxonomy::builtin()),
            composer: PromptComposer::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_catalog(mut self, catalog: ProductCatalog, taxonomy: TagTaxonomy) -> Self {
        self.catalog = Arc::new(catalog);
        self.taxonomy = Arc::new(taxonomy);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Outcome of a recommendation or follow-up turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Text appended as the assistant message
    pub answer: String,

    /// First catalog product mentioned in the answer, or `해당 없음`
    pub extracted_product: String,

    pub template: PromptTemplate,

    /// The completion call failed and the fallback answer was used
    pub completion_failed: bool,

    /// Number of passages used as context
    pub context_snippets: usize,

    /// Set when the log entry could not be written
    pub logging_failure: Option<LoggingFailure>,
}

/// Outcome of a non-generating action (detail click, reset).
#[derive(Debug, Clone)]
pub struct ActionReport {
    pub action: ActionType,
    pub logging_failure: Option<LoggingFailure>,
}

/// Orchestrates turns for any number of sessions.
///
/// The controller holds no per-visitor state; it can be shared across
/// sessions behind an `Arc`.
pub struct ConversationController {
    retriever: Arc<dyn KnowledgeRetriever>,
    completion: Arc<dyn CompletionClient>,
    logger: InteractionLogger,
    extractor: ProductExtractor,
    taxonomy: Arc<TagTaxonomy>,
    composer: PromptComposer,
    top_k: usize,
}

impl ConversationController {
    /// Build a controller after checking that the knowledge base is ready.
    ///
    /// A knowledge base that isn't ready is fatal: the advisor must not
    /// answer without policy passages to ground on.
    pub async fn start(parts: ControllerParts) -> Result<Self, ControllerError> {
        if parts.top_k == 0 {
            return Err(ControllerError::Config("top_k must be at least 1".to_string()));
        }

        parts.retriever.ensure_ready().await?;

        info!(
            products = parts.catalog.len(),
            tag_categories = parts.taxonomy.len(),
            top_k = parts.top_k,
            sink = parts.logger.sink_name(),
            "Conversation controller ready"
        );

        Ok(Self {
            retriever: parts.retriever,
            completion: parts.completion,
            logger: parts.logger,
            extractor: ProductExtractor::new(parts.catalog),
            taxonomy: parts.taxonomy,
            composer: parts.composer,
            top_k: parts.top_k,
        })
    }

    pub fn catalog(&self) -> &ProductCatalog {
        self.extractor.catalog()
    }

    pub fn taxonomy(&self) -> &TagTaxonomy {
        &self.taxonomy
    }

    pub fn extractor(&self) -> &ProductExtractor {
        &self.extractor
    }

    /// Select `tag` in `category`, or deselect it if already selected.
    ///
    /// Unknown categories and tags are ignored. Returns whether the
    /// selection changed.
    pub fn toggle_tag(&self, session: &mut Session, category: &str, tag: &str) -> bool {
        let known = self
            .taxonomy
            .get(category)
            .map(|c| c.contains(tag))
            .unwrap_or(false);
        if !known {
            debug!(category, tag, "Ignoring unknown tag");
            return false;
        }

        session.toggle_tag(category, tag);
        if session.state() == ConversationState::Idle {
            session.set_state(ConversationState::AwaitingInitialInput);
        }
        true
    }

    /// Selected tags joined in category order; the prefilled description.
    pub fn tag_description(&self, session: &Session) -> String {
        session.tag_description(&self.taxonomy)
    }

    /// Request the first recommendation for a situation description.
    ///
    /// Blank descriptions are ignored: nothing is appended or logged.
    pub async fn submit_initial(&self, session: &mut Session, description: &str) -> Option<TurnReport> {
        if description.trim().is_empty() {
            debug!(visitor = session.visitor_id(), "Ignoring blank description");
            return None;
        }

        Some(
            self.run_turn(session, description, ActionType::InitialRecommendation)
                .await,
        )
    }

    /// Ask a follow-up question in an ongoing conversation.
    ///
    /// Ignored when the text is blank or no conversation has started.
    pub async fn submit_followup(&self, session: &mut Session, text: &str) -> Option<TurnReport> {
        if text.trim().is_empty() {
            debug!(visitor = session.visitor_id(), "Ignoring blank follow-up");
            return None;
        }
        if !matches!(
            session.state(),
            ConversationState::Conversing | ConversationState::DetailRequested
        ) {
            debug!(
                visitor = session.visitor_id(),
                state = ?session.state(),
                "Ignoring follow-up outside a conversation"
            );
            return None;
        }

        Some(self.run_turn(session, text, ActionType::FollowUpQuestion).await)
    }

    /// Record a "learn more" click on a catalog product.
    ///
    /// Clicking the same product again is allowed and logged again.
    pub async fn click_detail(&self, session: &mut Session, product: &str) -> Option<ActionReport> {
        if self.catalog().get(product).is_none() {
            debug!(product, "Ignoring click on unknown product");
            return None;
        }
        if session.messages().is_empty() {
            debug!(product, "Ignoring click without a conversation");
            return None;
        }

        session.set_clicked_product(product);
        session.set_state(ConversationState::DetailRequested);

        let entry = session.log_entry(ActionType::DetailClick, DETAIL_CLICK_INPUT, product);
        let logging_failure = self.logger.record(&entry).await;

        info!(visitor = session.visitor_id(), product, "Detail requested");
        Some(ActionReport {
            action: ActionType::DetailClick,
            logging_failure,
        })
    }

    /// End the consultation and start the next one.
    ///
    /// The log entry carries the metadata of the consultation being closed.
    pub async fn reset(&self, session: &mut Session) -> ActionReport {
        let entry = session.log_entry(ActionType::Reset, "", "");
        let logging_failure = self.logger.record(&entry).await;

        session.reset();

        info!(
            visitor = session.visitor_id(),
            consult_count = session.consult_count(),
            "Consultation reset"
        );
        ActionReport {
            action: ActionType::Reset,
            logging_failure,
        }
    }

    /// Product buttons to render under the message at `message_index`.
    ///
    /// Empty for user messages and out-of-range indexes.
    pub fn affordances(&self, session: &Session, message_index: usize) -> Vec<ProductAffordance> {
        let Some(message) = session.messages().get(message_index) else {
            return Vec::new();
        };
        if !message.is_assistant() {
            return Vec::new();
        }

        self.extractor
            .mentions(&message.content)
            .into_iter()
            .map(|p| ProductAffordance {
                product: p.name.clone(),
                url: p.url.clone(),
                open_page_visible: session.clicked_product() == Some(p.name.as_str()),
            })
            .collect()
    }

    async fn run_turn(&self, session: &mut Session, text: &str, action: ActionType) -> TurnReport {
        session.push_message(Message::user(text));

        let context = self.retrieve(text).await;
        let names = self.catalog().names();
        let prompt = self.composer.compose(session.messages(), &context, &names);
        let template = PromptTemplate::for_history(session.messages());

        let (answer, completion_failed) = match self.completion.complete(&prompt).await {
            Ok(answer) => (answer, false),
            Err(e) => {
                warn!(
                    visitor = session.visitor_id(),
                    error = %e,
                    "Completion failed, using fallback answer"
                );
                (FALLBACK_ANSWER.to_string(), true)
            }
        };

        session.push_message(Message::assistant(answer.clone()));
        session.set_state(ConversationState::Conversing);

        let extracted_product = self.extractor.extract(&answer);
        let logged_product = match action {
            ActionType::InitialRecommendation => extracted_product.as_str(),
            _ => "",
        };
        let entry = session.log_entry(action, text, logged_product);
        let logging_failure = self.logger.record(&entry).await;

        info!(
            visitor = session.visitor_id(),
            action = %action,
            template = ?template,
            product = %extracted_product,
            completion_failed,
            "Turn complete"
        );

        TurnReport {
            answer,
            extracted_product,
            template,
            completion_failed,
            context_snippets: context.len(),
            logging_failure,
        }
    }

    async fn retrieve(&self, query: &str) -> Vec<Snippet> {
        match self.retriever.similarity_search(query, self.top_k).await {
            Ok(snippets) => snippets,
            Err(e) => {
                warn!(error = %e, "Retrieval failed, answering without context");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use advisor_analytics::{FailingSink, MemorySink};
    use advisor_llm::MockCompletionClient;
    use advisor_retrieval::{MockRetriever, RetrievalError};
    use async_trait::async_trait;

    const RECOMMENDATION: &str = "## 💡 추천 상품\n### 🏥 **두배받는 암보험**\n약관에 따르면 진단비가 두 배입니다.";

    /// Ready at startup, but every search fails.
    struct FlakyRetriever;

    #[async_trait]
    impl KnowledgeRetriever for FlakyRetriever {
        async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Snippet>, RetrievalError> {
            Err(RetrievalError::Request("connection reset".to_string()))
        }
    }

    struct Fixture {
        controller: ConversationController,
        sink: Arc<MemorySink>,
        completion: Arc<MockCompletionClient>,
        retriever: Arc<MockRetriever>,
    }

    async fn fixture(completion: MockCompletionClient) -> Fixture {
        let sink = Arc::new(MemorySink::new());
        let completion = Arc::new(completion);
        let retriever = Arc::new(MockRetriever::new(vec![
            Snippet::new("암 진단 시 진단비를 지급합니다.", "암보험 약관"),
            Snippet::unlabeled("수술 1회당 수술비를 지급합니다."),
        ]));

        let parts = ControllerParts::new(
            retriever.clone(),
            completion.clone(),
            InteractionLogger::new(sink.clone()),
        );
        let controller = ConversationController::start(parts).await.unwrap();

        Fixture {
            controller,
            sink,
            completion,
            retriever,
        }
    }

    fn who() -> String {
        TagTaxonomy::builtin().iter().next().unwrap().label.clone()
    }

    fn risk() -> String {
        TagTaxonomy::builtin().iter().nth(1).unwrap().label.clone()
    }

    #[tokio::test]
    async fn test_start_fails_when_knowledge_base_unavailable() {
        let parts = ControllerParts::new(
            Arc::new(MockRetriever::unavailable()),
            Arc::new(MockCompletionClient::new("x")),
            InteractionLogger::new(Arc::new(MemorySink::new())),
        );

        let result = ConversationController::start(parts).await;
        assert!(matches!(result, Err(ControllerError::RetrievalUnavailable(_))));
    }

    #[tokio::test]
    async fn test_start_rejects_zero_top_k() {
        let parts = ControllerParts::new(
            Arc::new(MockRetriever::empty()),
            Arc::new(MockCompletionClient::new("x")),
            InteractionLogger::new(Arc::new(MemorySink::new())),
        )
        .with_top_k(0);

        let result = ConversationController::start(parts).await;
        assert!(matches!(result, Err(ControllerError::Config(_))));
    }

    #[tokio::test]
    async fn test_submit_initial_appends_one_exchange() {
        let f = fixture(MockCompletionClient::new(RECOMMENDATION)).await;
        let mut session = Session::new();

        let report = f
            .controller
            .submit_initial(&mut session, "40대 직장인, 암이 걱정돼요")
            .await
            .unwrap();

        assert_eq!(session.messages().len(), 2);
        assert!(session.messages()[0].is_user());
        assert!(session.messages()[1].is_assistant());
        assert_eq!(session.messages()[1].content, RECOMMENDATION);
        assert_eq!(session.state(), ConversationState::Conversing);

        assert_eq!(report.template, PromptTemplate::Structured);
        assert_eq!(report.extracted_product, "두배받는 암보험");
        assert_eq!(report.context_snippets, 2);
        assert!(!report.completion_failed);
        assert!(report.logging_failure.is_none());

        let entries = f.sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_type, ActionType::InitialRecommendation);
        assert_eq!(entries[0].user_input, "40대 직장인, 암이 걱정돼요");
        assert_eq!(entries[0].recommended_product, "두배받는 암보험");
        assert_eq!(f.retriever.queries(), vec!["40대 직장인, 암이 걱정돼요".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let f = fixture(MockCompletionClient::new(RECOMMENDATION)).await;
        let mut session = Session::new();

        assert!(f.controller.submit_initial(&mut session, "   ").await.is_none());
        assert!(session.messages().is_empty());

        f.controller.submit_initial(&mut session, "암보험").await.unwrap();
        assert!(f.controller.submit_followup(&mut session, "\n").await.is_none());

        assert_eq!(session.messages().len(), 2);
        assert_eq!(f.sink.entries().len(), 1);
        assert_eq!(f.completion.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_followup_requires_conversation() {
        let f = fixture(MockCompletionClient::new("답변")).await;
        let mut session = Session::new();

        assert!(f.controller.submit_followup(&mut session, "보험료는요?").await.is_none());
        assert!(session.messages().is_empty());
        assert!(f.sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_followup_logs_empty_product_and_uses_freeform() {
        let f = fixture(MockCompletionClient::scripted(vec![
            RECOMMENDATION.to_string(),
            "두배받는 암보험은 비갱신형입니다.".to_string(),
        ]))
        .await;
        let mut session = Session::new();

        f.controller.submit_initial(&mut session, "암 걱정").await.unwrap();
        let report = f
            .controller
            .submit_followup(&mut session, "갱신형인가요?")
            .await
            .unwrap();

        assert_eq!(report.template, PromptTemplate::Freeform);
        assert_eq!(report.extracted_product, "두배받는 암보험");
        assert_eq!(session.messages().len(), 4);

        let entries = f.sink.entries();
        assert_eq!(entries[1].action_type, ActionType::FollowUpQuestion);
        assert_eq!(entries[1].user_input, "갱신형인가요?");
        assert_eq!(entries[1].recommended_product, "");
    }

    #[tokio::test]
    async fn test_completion_failure_uses_fallback() {
        let f = fixture(MockCompletionClient::failing()).await;
        let mut session = Session::new();

        let report = f.controller.submit_initial(&mut session, "암보험").await.unwrap();

        assert!(report.completion_failed);
        assert_eq!(report.answer, FALLBACK_ANSWER);
        assert_eq!(session.messages()[1].content, FALLBACK_ANSWER);
        assert_eq!(f.sink.entries()[0].recommended_product, advisor_types::NO_PRODUCT);
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_followup() {
        let parts = ControllerParts::new(
            Arc::new(MockRetriever::empty()),
            Arc::new(MockCompletionClient::new("답변입니다")),
            InteractionLogger::new(Arc::new(FailingSink)),
        );
        let controller = ConversationController::start(parts).await.unwrap();
        let mut session = Session::new();

        let first = controller.submit_initial(&mut session, "암보험").await.unwrap();
        assert!(first.logging_failure.is_some());

        let report = controller.submit_followup(&mut session, "더 알려주세요").await.unwrap();
        assert_eq!(session.messages().len(), 4);
        assert!(session.messages()[3].is_assistant());
        assert_eq!(
            report.logging_failure.map(|f| f.action_type),
            Some(ActionType::FollowUpQuestion)
        );
    }

    #[tokio::test]
    async fn test_retrieval_error_mid_turn_degrades_to_empty_context() {
        let completion = Arc::new(MockCompletionClient::new("답변"));
        let parts = ControllerParts::new(
            Arc::new(FlakyRetriever),
            completion.clone(),
            InteractionLogger::new(Arc::new(MemorySink::new())),
        );
        let controller = ConversationController::start(parts).await.unwrap();
        let mut session = Session::new();

        let report = controller.submit_initial(&mut session, "암보험").await.unwrap();

        assert_eq!(report.context_snippets, 0);
        assert!(!report.completion_failed);
        assert_eq!(completion.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_tag_selection_prefills_description() {
        let f = fixture(MockCompletionClient::new(RECOMMENDATION)).await;
        let mut session = Session::new();

        assert!(f.controller.toggle_tag(&mut session, &risk(), "#암_중증질환"));
        assert!(f.controller.toggle_tag(&mut session, &who(), "#나"));
        assert_eq!(session.state(), ConversationState::AwaitingInitialInput);

        let description = f.controller.tag_description(&session);
        assert_eq!(description, "#나 #암_중증질환");

        f.controller.submit_initial(&mut session, &description).await.unwrap();
        assert_eq!(session.messages()[0].content, "#나 #암_중증질환");
        assert_eq!(f.sink.entries()[0].user_input, "#나 #암_중증질환");
    }

    #[tokio::test]
    async fn test_toggle_tag_ignores_unknown() {
        let f = fixture(MockCompletionClient::new("x")).await;
        let mut session = Session::new();

        assert!(!f.controller.toggle_tag(&mut session, "없는 분류", "#나"));
        assert!(!f.controller.toggle_tag(&mut session, &who(), "#없는태그"));
        assert!(!session.has_selected_tags());
        assert_eq!(session.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_click_detail() {
        let f = fixture(MockCompletionClient::new(RECOMMENDATION)).await;
        let mut session = Session::new();

        // No conversation yet
        assert!(f.controller.click_detail(&mut session, "두배받는 암보험").await.is_none());

        f.controller.submit_initial(&mut session, "암보험").await.unwrap();
        assert!(f.controller.click_detail(&mut session, "없는 상품").await.is_none());

        let report = f
            .controller
            .click_detail(&mut session, "두배받는 암보험")
            .await
            .unwrap();
        assert_eq!(report.action, ActionType::DetailClick);
        assert_eq!(session.clicked_product(), Some("두배받는 암보험"));
        assert_eq!(session.state(), ConversationState::DetailRequested);

        // Repeated click is logged again
        f.controller.click_detail(&mut session, "두배받는 암보험").await.unwrap();

        let clicks: Vec<_> = f
            .sink
            .entries()
            .into_iter()
            .filter(|e| e.action_type == ActionType::DetailClick)
            .collect();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].user_input, DETAIL_CLICK_INPUT);
        assert_eq!(clicks[0].recommended_product, "두배받는 암보험");

        // Follow-up is allowed after a click
        assert!(f.controller.submit_followup(&mut session, "가입 조건은?").await.is_some());
        assert_eq!(session.state(), ConversationState::Conversing);
    }

    #[tokio::test]
    async fn test_affordances() {
        let answer = "두배받는 암보험과 골든타임 수술종합보험을 함께 보세요.";
        let f = fixture(MockCompletionClient::new(answer)).await;
        let mut session = Session::new();

        f.controller.submit_initial(&mut session, "암, 수술").await.unwrap();
        assert!(f.controller.affordances(&session, 0).is_empty());
        assert!(f.controller.affordances(&session, 9).is_empty());

        f.controller.click_detail(&mut session, "두배받는 암보험").await.unwrap();
        let buttons = f.controller.affordances(&session, 1);

        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].product, "골든타임 수술종합보험");
        assert!(!buttons[0].open_page_visible);
        assert_eq!(buttons[1].product, "두배받는 암보험");
        assert!(buttons[1].open_page_visible);
        assert!(buttons[1].url.starts_with("https://"));
    }

    #[tokio::test]
    async fn test_reset_logs_pre_reset_metadata() {
        let f = fixture(MockCompletionClient::new(RECOMMENDATION)).await;
        let mut session = Session::new();

        f.controller.toggle_tag(&mut session, &who(), "#나");
        f.controller.submit_initial(&mut session, "#나").await.unwrap();
        f.controller.click_detail(&mut session, "두배받는 암보험").await.unwrap();

        let report = f.controller.reset(&mut session).await;
        assert_eq!(report.action, ActionType::Reset);

        assert_eq!(session.consult_count(), 2);
        assert!(session.messages().is_empty());
        assert!(!session.has_selected_tags());
        assert!(session.clicked_product().is_none());
        assert_eq!(session.state(), ConversationState::Idle);

        let last = f.sink.entries().pop().unwrap();
        assert_eq!(last.action_type, ActionType::Reset);
        assert_eq!(last.consult_count, 1);
        assert_eq!(last.user_input, "");

        // Reset from Idle still counts
        f.controller.reset(&mut session).await;
        assert_eq!(session.consult_count(), 3);
    }

    #[tokio::test]
    async fn test_third_submission_uses_freeform_prompt() {
        let f = fixture(MockCompletionClient::new("답변")).await;
        let mut session = Session::new();

        f.controller.submit_initial(&mut session, "첫 질문").await.unwrap();
        f.controller.submit_followup(&mut session, "두 번째").await.unwrap();
        let third = f.controller.submit_followup(&mut session, "세 번째").await.unwrap();

        assert_eq!(third.template, PromptTemplate::Freeform);
        let prompts = f.completion.prompts();
        assert!(prompts[2].contains("고객: 첫 질문"));
        assert!(prompts[2].contains("고객: 세 번째"));
    }
}
