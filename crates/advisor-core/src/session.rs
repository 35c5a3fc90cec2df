//! Per-visitor session state.
//!
//! A [`Session`] is owned by exactly one visitor and is passed by `&mut`
//! into every controller operation. The [`SessionStore`] keeps sessions
//! apart in a multi-visitor deployment; each session sits behind its own
//! async mutex so a visitor can only have one turn in flight.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;

use advisor_types::{ActionType, LogEntry, Message, TagTaxonomy};

/// Where a visitor is in the recommend / click / reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// No messages and nothing selected yet
    #[default]
    Idle,
    /// Tags or description being entered
    AwaitingInitialInput,
    /// Messages exist
    Conversing,
    /// A product's "open page" affordance is showing
    DetailRequested,
}

/// Conversation state of one visitor.
#[derive(Debug, Clone)]
pub struct Session {
    visitor_id: String,
    consult_count: u32,
    opened_at: DateTime<Local>,
    messages: Vec<Message>,
    selected_tags: HashMap<String, String>,
    clicked_product: Option<String>,
    state: ConversationState,
}

/// Short random visitor token (8 lowercase hex chars).
fn new_visitor_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

impl Session {
    /// Open a session for a new visitor.
    pub fn new() -> Self {
        Self::with_visitor_id(new_visitor_id())
    }

    pub fn with_visitor_id(visitor_id: impl Into<String>) -> Self {
        Self {
            visitor_id: visitor_id.into(),
            consult_count: 1,
            opened_at: Local::now(),
            messages: Vec::new(),
            selected_tags: HashMap::new(),
            clicked_product: None,
            state: ConversationState::Idle,
        }
    }

    pub fn visitor_id(&self) -> &str {
        &self.visitor_id
    }

    pub fn consult_count(&self) -> u32 {
        self.consult_count
    }

    pub fn opened_at(&self) -> DateTime<Local> {
        self.opened_at
    }

    /// Messages in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clicked_product(&self) -> Option<&str> {
        self.clicked_product.as_deref()
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Tag selected in `category`, if any.
    pub fn selected_tag(&self, category: &str) -> Option<&str> {
        self.selected_tags.get(category).map(String::as_str)
    }

    /// Whether any tag is selected.
    pub fn has_selected_tags(&self) -> bool {
        !self.selected_tags.is_empty()
    }

    /// Selected tags in taxonomy order, joined by spaces.
    pub fn tag_description(&self, taxonomy: &TagTaxonomy) -> String {
        taxonomy
            .iter()
            .filter_map(|c| self.selected_tags.get(&c.label))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Select `tag` in `category`, or clear it if it is already selected.
    pub(crate) fn toggle_tag(&mut self, category: &str, tag: &str) {
        if self.selected_tag(category) == Some(tag) {
            self.selected_tags.remove(category);
        } else {
            self.selected_tags.insert(category.to_string(), tag.to_string());
        }
    }

    pub(crate) fn set_clicked_product(&mut self, product: &str) {
        self.clicked_product = Some(product.to_string());
    }

    pub(crate) fn set_state(&mut self, state: ConversationState) {
        self.state = state;
    }

    /// Start the next consultation: clear conversation and selections,
    /// bump the consultation counter. Visitor id and open time are kept.
    pub(crate) fn reset(&mut self) {
        self.messages.clear();
        self.selected_tags.clear();
        self.clicked_product = None;
        self.consult_count += 1;
        self.state = ConversationState::Idle;
    }

    /// Build a log entry stamped with the current session metadata.
    pub fn log_entry(
        &self,
        action_type: ActionType,
        user_input: impl Into<String>,
        recommended_product: impl Into<String>,
    ) -> LogEntry {
        let now = Local::now();
        let elapsed_secs = (now - self.opened_at).num_seconds().max(0) as u64;

        LogEntry {
            visitor_id: self.visitor_id.clone(),
            consult_count: self.consult_count,
            session_open_time: self.opened_at,
            event_time: now,
            action_type,
            user_input: user_input.into(),
            recommended_product: recommended_product.into(),
            elapsed_secs,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to one visitor's session.
pub type SessionHandle = Arc<AsyncMutex<Session>>;

/// Sessions keyed by visitor id.
///
/// Sessions are not persisted; closing a session drops its state.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a new visitor and return its id and handle.
    pub fn open(&self) -> (String, SessionHandle) {
        let session = Session::new();
        let visitor_id = session.visitor_id().to_string();
        let handle = Arc::new(AsyncMutex::new(session));

        self.sessions.insert(visitor_id.clone(), handle.clone());
        (visitor_id, handle)
    }

    pub fn get(&self, visitor_id: &str) -> Option<SessionHandle> {
        self.sessions.get(visitor_id).map(|h| h.value().clone())
    }

    /// Existing session for `visitor_id`, or a fresh one registered under it.
    pub fn get_or_open(&self, visitor_id: &str) -> SessionHandle {
        self.sessions
            .entry(visitor_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Session::with_visitor_id(visitor_id))))
            .clone()
    }

    /// Drop a visitor's session. Returns whether it existed.
    pub fn close(&self, visitor_id: &str) -> bool {
        self.sessions.remove(visitor_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
