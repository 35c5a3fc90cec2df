//! Command implementations for the advisor binary.
//!
//! Handles:
//! - chat: Load config, check the knowledge base, run the terminal consultation
//! - catalog: Print the configured products and tag categories
//! - check: Report configuration and backend readiness

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use advisor_analytics::{build_sink, InteractionLogger, LoggingFailure};
use advisor_core::{ControllerError, ControllerParts, ConversationController, Session, TurnReport};
use advisor_llm::{ApiCompletionClient, ApiCompletionConfig, CompletionClient};
use advisor_retrieval::{HttpRetriever, HttpRetrieverConfig, KnowledgeRetriever, RetrievalError};
use advisor_types::{RetrievalSettings, Settings};

use crate::repl::{
    last_assistant_index, parse_input, render_affordances, render_tags, resolve_detail, ChatInput,
    HELP,
};

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let config_path = config_path.map(expand_path);
    let mut settings =
        Settings::load(config_path.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    settings.analytics.jsonl_path = expand_path(&settings.analytics.jsonl_path);
    settings.catalog_path = settings.catalog_path.as_deref().map(expand_path);

    Ok(settings)
}

/// Expand `~` and environment variables in a configured path.
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Initialize logging. Output goes to stderr so it never mixes with the chat.
fn init_tracing(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build the knowledge retriever. A missing endpoint means no knowledge base.
pub fn build_retriever(settings: &RetrievalSettings) -> Result<Arc<dyn KnowledgeRetriever>, ControllerError> {
    let endpoint = settings
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| {
            RetrievalError::Config("retrieval.endpoint is not set; no knowledge base".to_string())
        })?;

    let mut config = HttpRetrieverConfig::new(endpoint)
        .with_timeout(Duration::from_secs(settings.timeout_secs));
    if let Some(key) = &settings.api_key {
        config = config.with_api_key(key.clone());
    }

    Ok(Arc::new(HttpRetriever::new(config)?))
}

fn build_completion(settings: &Settings) -> Result<Arc<dyn CompletionClient>> {
    let config = ApiCompletionConfig::from_settings(&settings.completion)
        .context("Completion service is not configured")?;
    let client = ApiCompletionClient::new(config).context("Failed to create completion client")?;
    info!(model = client.model(), "Completion client ready");
    Ok(Arc::new(client))
}

/// Wire up every collaborator and start the controller.
///
/// Fails when the knowledge base is unavailable; the advisor refuses to
/// answer without it.
pub async fn build_controller(settings: &Settings) -> Result<ConversationController> {
    let (catalog, taxonomy) = settings
        .load_catalog()
        .context("Failed to load product catalog")?;

    let retriever = build_retriever(&settings.retrieval)?;
    let completion = build_completion(settings)?;
    let sink = build_sink(&settings.analytics).context("Failed to set up interaction log sink")?;

    let parts = ControllerParts::new(retriever, completion, InteractionLogger::new(sink))
        .with_catalog(catalog, taxonomy)
        .with_top_k(settings.retrieval.top_k);

    let controller = ConversationController::start(parts).await?;
    Ok(controller)
}

/// Run an interactive consultation on stdin/stdout.
pub async fn run_chat(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    visitor: Option<String>,
) -> Result<()> {
    let settings = load_settings(config_path, log_level_override)?;
    init_tracing(&settings)?;

    let controller = build_controller(&settings).await?;
    let mut session = visitor.map(Session::with_visitor_id).unwrap_or_default();
    info!(visitor = session.visitor_id(), "Consultation started");

    let stdin = BufReader::new(tokio::io::stdin());
    chat_loop(
        &controller,
        &mut session,
        stdin,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await
}

/// Drive a consultation from line-oriented input.
///
/// Conversation output goes to `out`; logging failures go to `ops`, the
/// operator channel.
pub async fn chat_loop<R, W, E>(
    controller: &ConversationController,
    session: &mut Session,
    input: R,
    out: &mut W,
    ops: &mut E,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: Write,
{
    writeln!(out, "🛡️ 보험 상담을 시작합니다. 키워드를 고르거나 상황을 입력해 주세요. (/help)")?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Help => writeln!(out, "{HELP}")?,
            ChatInput::Tags => write!(out, "{}", render_tags(controller.taxonomy(), session))?,
            ChatInput::ToggleTag(tag) => {
                let category = controller.taxonomy().category_of(&tag).map(|c| c.label.clone());
                match category {
                    Some(category) => {
                        controller.toggle_tag(session, &category, &tag);
                        writeln!(out, "선택한 키워드: {}", controller.tag_description(session))?;
                    }
                    None => writeln!(out, "알 수 없는 키워드입니다: {tag}")?,
                }
            }
            ChatInput::Recommend(text) => {
                let description = text.unwrap_or_else(|| controller.tag_description(session));
                match controller.submit_initial(session, &description).await {
                    Some(report) => render_turn(controller, session, &report, out, ops)?,
                    None => writeln!(out, "상황을 입력하거나 키워드를 선택해 주세요.")?,
                }
            }
            ChatInput::Text(text) => {
                let report = if session.messages().is_empty() {
                    controller.submit_initial(session, &text).await
                } else {
                    controller.submit_followup(session, &text).await
                };
                match report {
                    Some(report) => render_turn(controller, session, &report, out, ops)?,
                    None => writeln!(out, "먼저 추천을 받아 주세요. (/recommend)")?,
                }
            }
            ChatInput::Detail(arg) => {
                let buttons = last_assistant_index(session)
                    .map(|i| controller.affordances(session, i))
                    .unwrap_or_default();
                let product = resolve_detail(&arg, &buttons);

                match controller.click_detail(session, &product).await {
                    Some(report) => {
                        report_logging_failure(ops, report.logging_failure.as_ref())?;
                        if let Some(i) = last_assistant_index(session) {
                            write!(out, "{}", render_affordances(&controller.affordances(session, i)))?;
                        }
                        if let Some(p) = controller.catalog().get(&product) {
                            writeln!(out, "🔗 {}: {}", p.name, p.url)?;
                        }
                    }
                    None => writeln!(out, "자세히 볼 수 있는 상품이 아닙니다: {product}")?,
                }
            }
            ChatInput::Reset => {
                let report = controller.reset(session).await;
                report_logging_failure(ops, report.logging_failure.as_ref())?;
                writeln!(
                    out,
                    "🔄 상담을 새로 시작합니다. (상담 {}회차)",
                    session.consult_count()
                )?;
            }
            ChatInput::Quit => break,
            ChatInput::Unknown(command) => {
                writeln!(out, "알 수 없는 명령어입니다: {command} (/help)")?
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

fn render_turn<W: Write, E: Write>(
    controller: &ConversationController,
    session: &Session,
    report: &TurnReport,
    out: &mut W,
    ops: &mut E,
) -> Result<()> {
    writeln!(out, "{}", report.answer)?;
    if let Some(i) = last_assistant_index(session) {
        write!(out, "{}", render_affordances(&controller.affordances(session, i)))?;
    }
    report_logging_failure(ops, report.logging_failure.as_ref())
}

fn report_logging_failure<E: Write>(ops: &mut E, failure: Option<&LoggingFailure>) -> Result<()> {
    if let Some(failure) = failure {
        writeln!(ops, "⚠️ {failure}")?;
    }
    Ok(())
}

/// Print the configured catalog and taxonomy.
pub fn show_catalog(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level_override)?;
    let (catalog, taxonomy) = settings
        .load_catalog()
        .context("Failed to load product catalog")?;

    println!("Products ({}):", catalog.len());
    for (i, product) in catalog.iter().enumerate() {
        println!("  {:>2}. {}  {}", i + 1, product.name, product.url);
    }

    println!();
    println!("Tag categories ({}):", taxonomy.len());
    for category in taxonomy.iter() {
        println!("  {}", category.label);
        println!("    {}", category.tags.join(" "));
    }
    Ok(())
}

/// Report configuration and backend readiness. Fails if the knowledge
/// base isn't ready.
pub async fn run_check(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level_override)?;
    init_tracing(&settings)?;

    let (catalog, taxonomy) = settings
        .load_catalog()
        .context("Failed to load product catalog")?;
    println!("Catalog: {} products, {} tag categories", catalog.len(), taxonomy.len());

    match ApiCompletionConfig::from_settings(&settings.completion) {
        Ok(config) => println!("Completion: {} ({})", config.endpoint, config.model),
        Err(e) => println!("Completion: NOT CONFIGURED ({e})"),
    }

    match build_sink(&settings.analytics) {
        Ok(sink) => println!("Interaction log: {}", sink.name()),
        Err(e) => println!("Interaction log: NOT CONFIGURED ({e})"),
    }

    let retriever = build_retriever(&settings.retrieval)?;
    retriever
        .ensure_ready()
        .await
        .map_err(ControllerError::from)?;
    println!("Knowledge base: ready");

    Ok(())
}
