use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://www.tenderyetu.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) TenderSniperBot/0.1";

/// What to do with an article that lacks the heading, company or sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    #[default]
    Abort,
    Skip,
    Sentinel,
}

/// What to do with an article that has no closing date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDatePolicy {
    #[default]
    Allow,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub site: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub max_pages: Option<usize>,
    pub missing_field_policy: MissingFieldPolicy,
    pub missing_date_policy: MissingDatePolicy,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site: "tenderyetu".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 8_000,
            max_pages: None,
            missing_field_policy: MissingFieldPolicy::default(),
            missing_date_policy: MissingDatePolicy::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported site {0:?}")]
    UnknownSite(String),
    #[error("parser setup failed")]
    Parser(#[from] crate::model::ParserError),
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn parse_config(content: &str) -> Result<AppConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Loads `path` when it exists. A missing file is only an error when the
/// caller asked for that path explicitly.
pub fn load_or_default(path: &Path, explicit: bool) -> Result<AppConfig, ConfigError> {
    if !explicit && !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config(path)
}
