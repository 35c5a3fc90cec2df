//! Policy Advisor
//!
//! Conversational insurance product recommendations in the terminal.
//!
//! # Usage
//!
//! ```bash
//! advisor chat [--visitor ID]
//! advisor catalog
//! advisor check
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/policy-advisor/config.toml)
//! 3. Environment variables (ADVISOR_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use advisor_daemon::{run_chat, run_check, show_catalog, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { visitor } => {
            run_chat(cli.config.as_deref(), cli.log_level.as_deref(), visitor).await?;
        }
        Commands::Catalog => {
            show_catalog(cli.config.as_deref(), cli.log_level.as_deref())?;
        }
        Commands::Check => {
            run_check(cli.config.as_deref(), cli.log_level.as_deref()).await?;
        }
    }

    Ok(())
}
