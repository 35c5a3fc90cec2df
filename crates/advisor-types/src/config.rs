//! Configuration loading for the policy advisor.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/policy-advisor/config.toml`.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogFile, ProductCatalog, TagTaxonomy};
use crate::error::AdvisorError;

const APP_NAME: &str = "policy-advisor";

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Endpoint receiving `{prompt, model, max_tokens, temperature}`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token (load from env var, don't store in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Target model identifier
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Token budget for one reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

fn default_completion_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.5
}

fn default_completion_timeout() -> u64 {
    60
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: default_completion_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

/// Semantic search service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Base URL of the search service; required at startup
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Optional bearer token for the search service
    #[serde(default)]
    pub api_key: Option<String>,

    /// Number of snippets retrieved per turn
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    3
}

fn default_retrieval_timeout() -> u64 {
    15
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            top_k: default_top_k(),
            timeout_secs: default_retrieval_timeout(),
        }
    }
}

/// Which analytics sink receives log entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Google Sheets append API
    Sheets,
    /// Local append-only JSON lines file (default)
    #[default]
    Jsonl,
    /// Entries are dropped
    Disabled,
}

/// Google Sheets sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsSettings {
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// A1 range rows are appended after
    #[serde(default = "default_sheets_range")]
    pub range: String,

    /// OAuth access token, supplied by the deployment's credential tooling
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_sheets_timeout")]
    pub timeout_secs: u64,
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_sheets_range() -> String {
    "A1".to_string()
}

fn default_sheets_timeout() -> u64 {
    10
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            base_url: default_sheets_base_url(),
            spreadsheet_id: None,
            range: default_sheets_range(),
            access_token: None,
            timeout_secs: default_sheets_timeout(),
        }
    }
}

/// Analytics logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    #[serde(default)]
    pub sink: SinkKind,

    /// Path of the JSON lines log when `sink = "jsonl"`
    #[serde(default = "default_jsonl_path")]
    pub jsonl_path: String,

    #[serde(default)]
    pub sheets: SheetsSettings,
}

fn default_jsonl_path() -> String {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.data_local_dir().join("interactions.jsonl"))
        .unwrap_or_else(|| PathBuf::from("./interactions.jsonl"))
        .to_string_lossy()
        .to_string()
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            jsonl_path: default_jsonl_path(),
            sheets: SheetsSettings::default(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub completion: CompletionSettings,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    #[serde(default)]
    pub analytics: AnalyticsSettings,

    /// Optional TOML catalog overriding the built-in products and tags
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            completion: CompletionSettings::default(),
            retrieval: RetrievalSettings::default(),
            analytics: AnalyticsSettings::default(),
            catalog_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/policy-advisor/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ADVISOR_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, AdvisorError> {
        let config_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .set_default("completion.model", default_completion_model())
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .set_default("retrieval.top_k", default_top_k() as i64)
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .set_default("analytics.jsonl_path", default_jsonl_path())
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: ADVISOR_LOG_LEVEL, ADVISOR_COMPLETION__API_KEY, ADVISOR_ANALYTICS__SHEETS__RANGE
        builder = builder.add_source(
            Environment::with_prefix("ADVISOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AdvisorError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| AdvisorError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(AdvisorError::Config(format!(
                "completion.temperature must be 0.0-2.0, got {}",
                self.completion.temperature
            )));
        }
        if self.completion.max_tokens == 0 {
            return Err(AdvisorError::Config("completion.max_tokens must be > 0".to_string()));
        }
        if self.completion.timeout_secs == 0
            || self.retrieval.timeout_secs == 0
            || self.analytics.sheets.timeout_secs == 0
        {
            return Err(AdvisorError::Config("timeouts must be > 0".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(AdvisorError::Config("retrieval.top_k must be > 0".to_string()));
        }
        Ok(())
    }

    /// Resolve the catalog and taxonomy, falling back to the built-in ones.
    pub fn load_catalog(&self) -> Result<(ProductCatalog, TagTaxonomy), AdvisorError> {
        match &self.catalog_path {
            Some(path) => CatalogFile::load(&PathBuf::from(path)),
            None => Ok((ProductCatalog::builtin(), TagTaxonomy::builtin())),
        }
    }
}
