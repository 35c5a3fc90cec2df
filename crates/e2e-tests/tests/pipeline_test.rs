//! Recommendation pipeline E2E tests.
//!
//! Drives the controller through the tag picker, first recommendation,
//! follow-ups and detail clicks, checking the conversation and the log.

use pretty_assertions::assert_eq;

use advisor_core::{ConversationState, Session};
use advisor_llm::PromptTemplate;
use advisor_types::{ActionType, Role, DETAIL_CLICK_INPUT};
use e2e_tests::{recommendation, JsonlHarness, TestHarness};

/// Tags {#나, #암_중증질환} become the description and the first user message.
#[tokio::test]
async fn test_tag_selection_to_recommendation() {
    let harness = TestHarness::new(&recommendation("두배받는 암보험")).await;
    let controller = &harness.controller;
    let mut session = Session::new();

    let categories: Vec<String> = controller.taxonomy().iter().map(|c| c.label.clone()).collect();
    controller.toggle_tag(&mut session, &categories[0], "#나");
    controller.toggle_tag(&mut session, &categories[1], "#암_중증질환");

    let description = controller.tag_description(&session);
    assert_eq!(description, "#나 #암_중증질환");

    let report = controller.submit_initial(&mut session, &description).await.unwrap();

    let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert_eq!(session.messages()[0].content, "#나 #암_중증질환");
    assert_eq!(report.template, PromptTemplate::Structured);

    let entries = harness.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::InitialRecommendation);
    assert_eq!(entries[0].user_input, "#나 #암_중증질환");
    assert_eq!(entries[0].recommended_product, "두배받는 암보험");
    assert_eq!(entries[0].visitor_id, session.visitor_id());
}

/// The prompt carries catalog names, labelled passages and the transcript.
#[tokio::test]
async fn test_prompt_is_grounded_in_retrieved_passages() {
    let harness = TestHarness::new(&recommendation("두배받는 암보험")).await;
    let mut session = Session::new();

    harness
        .controller
        .submit_initial(&mut session, "암 진단비가 걱정돼요")
        .await
        .unwrap();

    let prompts = harness.completion.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("골든타임 수술종합보험"));
    assert!(prompt.contains("[두배받는 암보험 약관] 암으로 진단 확정 시"));
    assert!(prompt.contains("[약관] 보험료 납입면제"));
    // Only the top 3 passages are used
    assert!(!prompt.contains("반려견 진료비"));
    assert!(prompt.contains("고객: 암 진단비가 걱정돼요"));
    assert!(prompt.trim_end().ends_with("상담원 답변:"));

    assert_eq!(harness.retriever.queries(), vec!["암 진단비가 걱정돼요".to_string()]);
}

/// The earliest catalog product wins even when mentioned later in the text.
#[tokio::test]
async fn test_first_match_follows_catalog_order() {
    let answer = "두배받는 암보험도 좋지만 골든타임 수술종합보험을 먼저 추천드려요.";
    let harness = TestHarness::new(answer).await;
    let mut session = Session::new();

    let report = harness
        .controller
        .submit_initial(&mut session, "수술과 암 둘 다 걱정돼요")
        .await
        .unwrap();

    assert_eq!(report.extracted_product, "골든타임 수술종합보험");
    assert_eq!(harness.entries()[0].recommended_product, "골든타임 수술종합보험");

    let buttons: Vec<String> = harness
        .controller
        .affordances(&session, 1)
        .into_iter()
        .map(|b| b.product)
        .collect();
    assert_eq!(buttons, vec!["골든타임 수술종합보험", "두배받는 암보험"]);
}

/// Two prior exchanges switch the third submission to the freeform prompt.
#[tokio::test]
async fn test_third_submission_uses_freeform_template() {
    let harness = TestHarness::scripted(&[
        &recommendation("두배받는 암보험"),
        "네, 비갱신형이라 보험료가 오르지 않아요. 😊",
        "재진단 시에도 한 번 더 받을 수 있어요.",
    ])
    .await;
    let controller = &harness.controller;
    let mut session = Session::new();

    let first = controller.submit_initial(&mut session, "#나 #암_중증질환").await.unwrap();
    let second = controller.submit_followup(&mut session, "비갱신형인가요?").await.unwrap();
    let third = controller.submit_followup(&mut session, "재발하면요?").await.unwrap();

    assert_eq!(first.template, PromptTemplate::Structured);
    assert_eq!(second.template, PromptTemplate::Freeform);
    assert_eq!(third.template, PromptTemplate::Freeform);
    assert_eq!(session.messages().len(), 6);
    assert_eq!(third.answer, "재진단 시에도 한 번 더 받을 수 있어요.");

    let third_prompt = &harness.completion.prompts()[2];
    assert!(third_prompt.contains("상담원: 네, 비갱신형이라"));
    assert!(third_prompt.contains("고객: 재발하면요?"));
    assert!(!third_prompt.contains("**출력 형식**"));
}

/// recommend → click → follow-up → click again, with every action logged.
#[tokio::test]
async fn test_detail_click_cycle() {
    let harness = TestHarness::new(&recommendation("굿앤굿 우리펫보험")).await;
    let controller = &harness.controller;
    let mut session = Session::new();

    controller.submit_initial(&mut session, "#반려견").await.unwrap();
    let buttons = controller.affordances(&session, 1);
    assert_eq!(buttons.len(), 1);
    assert!(!buttons[0].open_page_visible);

    controller.click_detail(&mut session, "굿앤굿 우리펫보험").await.unwrap();
    assert_eq!(session.state(), ConversationState::DetailRequested);
    assert!(controller.affordances(&session, 1)[0].open_page_visible);

    controller.submit_followup(&mut session, "슬개골 탈구도 되나요?").await.unwrap();
    assert_eq!(session.state(), ConversationState::Conversing);

    controller.click_detail(&mut session, "굿앤굿 우리펫보험").await.unwrap();

    let actions: Vec<ActionType> = harness.entries().iter().map(|e| e.action_type).collect();
    assert_eq!(
        actions,
        vec![
            ActionType::InitialRecommendation,
            ActionType::DetailClick,
            ActionType::FollowUpQuestion,
            ActionType::DetailClick,
        ]
    );

    let entries = harness.entries();
    assert_eq!(entries[1].user_input, DETAIL_CLICK_INPUT);
    assert_eq!(entries[1].recommended_product, "굿앤굿 우리펫보험");
    assert_eq!(entries[2].recommended_product, "");
}

/// Log rows reach the JSONL file in action order with sheet-ready columns.
#[tokio::test]
async fn test_actions_are_appended_to_jsonl_log() {
    let jsonl = JsonlHarness::new(&recommendation("두배받는 암보험")).await;
    let controller = &jsonl.harness.controller;
    let mut session = Session::with_visitor_id("e2e00001");

    controller.submit_initial(&mut session, "#나").await.unwrap();
    controller.click_detail(&mut session, "두배받는 암보험").await.unwrap();
    controller.reset(&mut session).await;

    let rows = jsonl.rows();
    let actions: Vec<&str> = rows.iter().map(|r| r[4].as_str()).collect();
    assert_eq!(actions, vec!["초기추천", "상세보기클릭", "상담초기화"]);
    assert!(rows.iter().all(|r| r[0] == "e2e00001"));
    assert!(rows.iter().all(|r| r[1] == "1"));
    assert_eq!(rows[1][5], DETAIL_CLICK_INPUT);
    assert_eq!(rows[1][6], "두배받는 암보험");
}
