//! Advisor binary library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (chat, catalog, check)
//! - `repl`: Input parsing and rendering for the terminal chat

pub mod cli;
pub mod commands;
pub mod repl;

pub use cli::{Cli, Commands};
pub use commands::{
    build_controller, build_retriever, chat_loop, load_settings, run_chat, run_check, show_catalog,
};
pub use repl::{parse_input, ChatInput};
