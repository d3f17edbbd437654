use crate::config::AppConfig;
use crate::model::ScraperError;
use crate::scraper::traits::Fetcher;

use rand::Rng;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with capped exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based), without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered(&self, attempt: u32) -> Duration {
        let delay = self.delay_for(attempt);
        let spread = (delay.as_millis() / 2) as u64;
        let jitter = if spread == 0 {
            0
        } else {
            rand::rng().random_range(0..=spread)
        };
        delay + Duration::from_millis(jitter)
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.retry_base_delay_ms),
            max_delay: Duration::from_millis(cfg.retry_max_delay_ms),
        }
    }
}

pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(cfg: &AppConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ScraperError::Client(e.to_string()))?;

        Ok(Self {
            client,
            retry: RetryPolicy::from(cfg),
        })
    }

    fn fetch_once(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ScraperError::Timeout(url.to_string())
            } else {
                ScraperError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ScraperError::InvalidResponse {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().map_err(|e| ScraperError::HttpError(e.to_string()))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let mut attempt = 0;
        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);
            match self.fetch_once(url) {
                Ok(body) => return Ok(body),
                Err(e) if is_retryable(&e) && attempt < self.retry.max_retries => {
                    let delay = self.retry.jittered(attempt);
                    warn!("Fetch failed: {}; retrying in {:?}", e, delay);
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_retryable(err: &ScraperError) -> bool {
    match err {
        ScraperError::HttpError(_) | ScraperError::Timeout(_) => true,
        ScraperError::InvalidResponse { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Builds `<base>/page/<n>/?s=<query>` with the query percent-encoded.
pub fn build_page_url(base_url: &str, page: usize, query: &str) -> Result<String, ScraperError> {
    let raw = format!("{}/page/{}/", base_url.trim_end_matches('/'), page);
    let mut url = Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", raw, e)))?;
    url.query_pairs_mut().append_pair("s", query);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_has_page_and_query() {
        let url = build_page_url("https://www.tenderyetu.com", 3, "system").unwrap();
        assert_eq!(url, "https://www.tenderyetu.com/page/3/?s=system");
    }

    #[test]
    fn page_url_tolerates_trailing_slash_and_encodes_query() {
        let url = build_page_url("https://example.org/", 1, "road works&co").unwrap();
        assert_eq!(url, "https://example.org/page/1/?s=road+works%26co");
    }

    #[test]
    fn page_url_rejects_garbage_base() {
        assert!(matches!(
            build_page_url("not a url", 1, "x"),
            Err(ScraperError::InvalidUrl(_))
        ));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));

        let jittered = policy.jittered(1);
        assert!(jittered >= Duration::from_millis(200) && jittered <= Duration::from_millis(300));
    }

    #[test]
    fn only_transient_errors_retry() {
        assert!(is_retryable(&ScraperError::Timeout("u".into())));
        assert!(is_retryable(&ScraperError::InvalidResponse { status: 503, url: "u".into() }));
        assert!(is_retryable(&ScraperError::InvalidResponse { status: 429, url: "u".into() }));
        assert!(!is_retryable(&ScraperError::InvalidResponse { status: 403, url: "u".into() }));
        assert!(!is_retryable(&ScraperError::NotFound("u".into())));
    }
}
