//! CLI argument parsing for the advisor binary.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Policy Advisor
///
/// Conversational insurance product recommendations grounded in policy terms.
#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/policy-advisor/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Advisor commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive consultation in the terminal
    Chat {
        /// Resume under a fixed visitor id instead of a random one
        #[arg(long)]
        visitor: Option<String>,
    },

    /// Print the product catalog and tag categories
    Catalog,

    /// Check configuration and that the knowledge base is reachable
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_chat() {
        let cli = Cli::parse_from(["advisor", "chat"]);
        match cli.command {
            Commands::Chat { visitor } => assert!(visitor.is_none()),
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_chat_with_visitor() {
        let cli = Cli::parse_from(["advisor", "chat", "--visitor", "a1b2c3d4"]);
        match cli.command {
            Commands::Chat { visitor } => assert_eq!(visitor, Some("a1b2c3d4".to_string())),
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["advisor", "--config", "/path/to/config.toml", "check"]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_with_log_level_after_subcommand() {
        let cli = Cli::parse_from(["advisor", "catalog", "--log-level", "debug"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Catalog));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["advisor"]).is_err());
    }
}
