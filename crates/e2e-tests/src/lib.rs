//! End-to-end test infrastructure for the policy advisor.
//!
//! Provides a shared TestHarness that wires a conversation controller to
//! mock retrieval and completion backends and an inspectable log sink.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use advisor_analytics::{InteractionLogger, JsonlSink, LogSink, MemorySink};
use advisor_core::{ControllerParts, ConversationController};
use advisor_llm::MockCompletionClient;
use advisor_retrieval::{KnowledgeRetriever, MockRetriever, RetrievalError, Snippet};
use advisor_types::LogEntry;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    pub controller: Arc<ConversationController>,
    pub completion: Arc<MockCompletionClient>,
    pub retriever: Arc<MockRetriever>,
    /// Entries logged through the harness sink (empty when a custom sink is used)
    pub sink: Arc<MemorySink>,
}

impl TestHarness {
    /// Harness whose completion service always answers `answer`.
    pub async fn new(answer: &str) -> Self {
        Self::with_completion(MockCompletionClient::new(answer)).await
    }

    /// Harness answering with `answers` in order.
    pub async fn scripted(answers: &[&str]) -> Self {
        let answers = answers.iter().map(|a| a.to_string()).collect();
        Self::with_completion(MockCompletionClient::scripted(answers)).await
    }

    pub async fn with_completion(completion: MockCompletionClient) -> Self {
        let sink = Arc::new(MemorySink::new());
        Self::build(completion, sink.clone(), sink).await
    }

    /// Harness logging to `log_sink` instead of the in-memory sink.
    pub async fn with_sink(answer: &str, log_sink: Arc<dyn LogSink>) -> Self {
        Self::build(MockCompletionClient::new(answer), Arc::new(MemorySink::new()), log_sink).await
    }

    async fn build(
        completion: MockCompletionClient,
        sink: Arc<MemorySink>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        let completion = Arc::new(completion);
        let retriever = Arc::new(MockRetriever::new(policy_snippets()));

        let parts = ControllerParts::new(
            retriever.clone(),
            completion.clone(),
            InteractionLogger::new(log_sink),
        );
        let controller = ConversationController::start(parts)
            .await
            .expect("Failed to start controller");

        Self {
            controller: Arc::new(controller),
            completion,
            retriever,
            sink,
        }
    }

    /// Entries written to the in-memory sink so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.sink.entries()
    }
}

/// Harness logging to a JSONL file in a temp dir.
pub struct JsonlHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub log_path: PathBuf,
    pub harness: TestHarness,
}

impl JsonlHarness {
    pub async fn new(answer: &str) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let log_path = temp_dir.path().join("logs").join("interactions.jsonl");
        let harness = TestHarness::with_sink(answer, Arc::new(JsonlSink::new(log_path.clone()))).await;

        Self {
            _temp_dir: temp_dir,
            log_path,
            harness,
        }
    }

    /// Logged rows, oldest first.
    pub fn rows(&self) -> Vec<Vec<String>> {
        std::fs::read_to_string(&self.log_path)
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).expect("Invalid JSONL line"))
            .collect()
    }
}

/// Policy passages returned by the mock knowledge base.
pub fn policy_snippets() -> Vec<Snippet> {
    vec![
        Snippet::new(
            "암으로 진단 확정 시 암진단비를 지급하며, 재진단 시 한 번 더 지급합니다.",
            "두배받는 암보험 약관",
        ),
        Snippet::new(
            "수술 1회당 수술비를 지급하며 입원 일수에 따라 입원비를 지급합니다.",
            "골든타임 수술종합보험 약관",
        ),
        Snippet::unlabeled("보험료 납입면제 조건은 약관에서 정한 바에 따릅니다."),
        Snippet::unlabeled("반려견 진료비는 연간 한도 내에서 보상합니다."),
    ]
}

/// A structured first recommendation naming `product`.
pub fn recommendation(product: &str) -> String {
    format!(
        "## 💡 추천 상품\n### 🏥 **{product}**\n약관에 따르면 고객님께 꼭 맞는 보장이 있어요.\n\n\
         • 진단비 보장 ✨\n\n• 수술비 보장 🏥\n\n• 비갱신형 보험료 💰\n\n\
         어떤 보장이 가장 궁금하신가요? 아래 버튼을 눌러 자세히 보세요. 👇"
    )
}

/// Ready at startup, but every search fails.
pub struct FlakyRetriever;

#[async_trait]
impl KnowledgeRetriever for FlakyRetriever {
    async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<Snippet>, RetrievalError> {
        Err(RetrievalError::Request("connection reset by peer".to_string()))
    }
}
