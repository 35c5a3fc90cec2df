//! Analytics log entries.
//!
//! One entry is written per visitor action. Entries are append-only and are
//! never updated or deleted by the advisor.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Recommended-product value when no catalog product was found.
pub const NO_PRODUCT: &str = "해당 없음";

/// User-input value recorded for a detail-button click.
pub const DETAIL_CLICK_INPUT: &str = "버튼클릭";

/// Timestamp format used in log rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of visitor action being logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// First, structured recommendation
    InitialRecommendation,
    /// "Learn more" button clicked for a product
    DetailClick,
    /// Freeform follow-up question
    FollowUpQuestion,
    /// Consultation reset
    Reset,
}

impl ActionType {
    /// Label written to the analytics sheet.
    pub fn sheet_label(&self) -> &'static str {
        match self {
            ActionType::InitialRecommendation => "초기추천",
            ActionType::DetailClick => "상세보기클릭",
            ActionType::FollowUpQuestion => "추가질문",
            ActionType::Reset => "상담초기화",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::InitialRecommendation => write!(f, "initial_recommendation"),
            ActionType::DetailClick => write!(f, "detail_click"),
            ActionType::FollowUpQuestion => write!(f, "follow_up_question"),
            ActionType::Reset => write!(f, "reset"),
        }
    }
}

/// A single analytics record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Visitor the action belongs to
    pub visitor_id: String,

    /// Consultation number within the visit (starts at 1)
    pub consult_count: u32,

    /// When the visitor's session was opened
    pub session_open_time: DateTime<Local>,

    /// When the action happened
    pub event_time: DateTime<Local>,

    pub action_type: ActionType,

    /// Raw user input (empty when the action carries none)
    #[serde(default)]
    pub user_input: String,

    /// Product credited for the action (empty when not applicable)
    #[serde(default)]
    pub recommended_product: String,

    /// Whole seconds elapsed since the session was opened
    pub elapsed_secs: u64,
}

impl LogEntry {
    /// Render the fixed-width row written to tabular sinks:
    /// `[visitor_id, consult_count, open_time, event_time, action_type,
    /// user_input, recommended_product, duration]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.visitor_id.clone(),
            self.consult_count.to_string(),
            self.session_open_time.format(TIMESTAMP_FORMAT).to_string(),
            self.event_time.format(TIMESTAMP_FORMAT).to_string(),
            self.action_type.sheet_label().to_string(),
            self.user_input.clone(),
            self.recommended_product.clone(),
            format!("{}초", self.elapsed_secs),
        ]
    }
}
