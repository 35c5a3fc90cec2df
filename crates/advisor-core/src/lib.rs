//! # advisor-core
//!
//! Conversation core of the policy advisor.
//!
//! - [`session`]: Per-visitor state and the store that isolates visitors
//! - [`extractor`]: Catalog product mentions in generated text
//! - [`controller`]: The recommend / follow-up / detail-click / reset state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! let controller = ConversationController::start(ControllerParts { .. }).await?;
//! let mut session = Session::new();
//!
//! controller.toggle_tag(&mut session, "👤 누구의 보험인가요?", "#나");
//! let description = controller.tag_description(&session);
//! let report = controller.submit_initial(&mut session, &description).await;
//! ```

pub mod controller;
pub mod error;
pub mod extractor;
pub mod session;

pub use controller::{ActionReport, ControllerParts, ConversationController, TurnReport, DEFAULT_TOP_K};
pub use error::ControllerError;
pub use extractor::{normalize, ProductAffordance, ProductExtractor};
pub use session::{ConversationState, Session, SessionHandle, SessionStore};
