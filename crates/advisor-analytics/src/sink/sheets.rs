//! Google Sheets sink.
//!
//! Appends each entry as one row through the Sheets v4 `values:append`
//! endpoint. Obtaining the OAuth access token is left to the deployment; the
//! sink only presents it as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use advisor_types::{LogEntry, SheetsSettings};

use super::{LogSink, SinkError};

/// Configuration for the Sheets sink.
#[derive(Debug, Clone)]
pub struct SheetsSinkConfig {
    /// API root (e.g., "https://sheets.googleapis.com")
    pub base_url: String,

    pub spreadsheet_id: String,

    /// A1 range the table starts at (e.g., "A1" or "로그!A1")
    pub range: String,

    /// OAuth access token
    pub access_token: SecretString,

    pub timeout: Duration,
}

impl SheetsSinkConfig {
    pub fn from_settings(settings: &SheetsSettings) -> Result<Self, SinkError> {
        let spreadsheet_id = settings
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SinkError::Config("analytics.sheets.spreadsheet_id is not set".to_string()))?;
        let access_token = settings
            .access_token
            .clone()
            .ok_or_else(|| SinkError::Config("analytics.sheets.access_token is not set".to_string()))?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            spreadsheet_id,
            range: settings.range.clone(),
            access_token: SecretString::from(access_token),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

#[derive(Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

/// Sink appending rows to a spreadsheet.
pub struct SheetsSink {
    client: Client,
    append_url: Url,
    access_token: SecretString,
}

impl SheetsSink {
    pub fn new(config: SheetsSinkConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::Config(e.to_string()))?;

        let append_url = append_url(&config)?;

        Ok(Self {
            client,
            append_url,
            access_token: config.access_token,
        })
    }
}

/// `{base}/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=USER_ENTERED`
fn append_url(config: &SheetsSinkConfig) -> Result<Url, SinkError> {
    let mut url = Url::parse(&config.base_url)
        .map_err(|e| SinkError::Config(format!("invalid sheets base_url: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| SinkError::Config("sheets base_url cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", config.spreadsheet_id.as_str(), "values"])
        .push(&format!("{}:append", config.range));

    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("insertDataOption", "INSERT_ROWS");

    Ok(url)
}

#[async_trait]
impl LogSink for SheetsSink {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn append(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let request = AppendRequest {
            values: vec![entry.to_row()],
        };

        debug!(action = %entry.action_type, visitor = %entry.visitor_id, "Appending sheet row");

        let response = self
            .client
            .post(self.append_url.clone())
            .header(
                "Authorization",
                format!("Bearer {}", self.access_token.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status { status, body });
        }

        Ok(())
    }
}
