// Core structs: TenderRecord, NormalizedTender, plus the error enums
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One tender as it was found on a listing page.
/// Field order matches the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRecord {
    #[serde(rename = "Date")]
    pub closing_date: Option<String>,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Project")]
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTender {
    pub closing_date: Option<NaiveDate>,
    pub company: String,
    pub url: String,
    pub sector: String,
    pub project: String,
}

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub base_url: String,
    pub query: String,
    pub target: usize,
}

/// Result of parsing one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    MorePages(Vec<TenderRecord>),
    EndOfData,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("unexpected status {status} from {url}")]
    InvalidResponse { status: u16, url: String },
    #[error("page not found: {0}")]
    NotFound(String),
    #[error("invalid page url: {0}")]
    InvalidUrl(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("article #{index} on {url} has no {field}")]
    MissingField {
        field: &'static str,
        url: String,
        index: usize,
    },
    #[error("article #{index} on {url} has no closing date")]
    MissingClosingDate { url: String, index: usize },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetching page {page} failed")]
    Fetch {
        page: usize,
        #[source]
        source: ScraperError,
    },
    #[error("parsing page {page} failed")]
    Parse {
        page: usize,
        #[source]
        source: ParserError,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("csv error")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
