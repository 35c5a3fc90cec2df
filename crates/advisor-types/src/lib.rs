//! # advisor-types
//!
//! Shared domain types for the policy advisor.
//!
//! This crate defines the data structures used throughout the system:
//! - Messages: Immutable conversation turns replayed into prompts
//! - Catalog: Recommendable products and the tag taxonomy
//! - Log entries: Append-only analytics records
//! - Settings: Layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use advisor_types::{Message, ProductCatalog};
//!
//! let catalog = ProductCatalog::builtin();
//! let msg = Message::user("#나 #암_중증질환");
//! assert!(!catalog.is_empty());
//! assert!(msg.is_user());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod log_entry;
pub mod message;

pub use catalog::{normalize, CatalogFile, Product, ProductCatalog, TagCategory, TagTaxonomy};
pub use config::{AnalyticsSettings, CompletionSettings, RetrievalSettings, Settings, SheetsSettings, SinkKind};
pub use error::AdvisorError;
pub use log_entry::{ActionType, LogEntry, DETAIL_CLICK_INPUT, NO_PRODUCT};
pub use message::{Message, Role};
