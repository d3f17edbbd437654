use crate::model::ScraperError;

/// Fetches the body of one listing page.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}
