// Site-specific HTML extraction
pub mod tender_parser;

pub use tender_parser::TenderYetuParser;

use crate::config::{AppConfig, ConfigError};
use crate::model::{PageOutcome, ParserError};

/// Turns one listing page into tender records. One implementation per site.
pub trait ListingParser {
    fn parse_page(&self, html: &str, page_url: &str) -> Result<PageOutcome, ParserError>;
}

impl<P: ListingParser + ?Sized> ListingParser for Box<P> {
    fn parse_page(&self, html: &str, page_url: &str) -> Result<PageOutcome, ParserError> {
        (**self).parse_page(html, page_url)
    }
}

/// Picks the parser for the configured site key.
pub fn parser_for(cfg: &AppConfig) -> Result<Box<dyn ListingParser>, ConfigError> {
    match cfg.site.as_str() {
        "tenderyetu" => Ok(Box::new(TenderYetuParser::new(
            cfg.missing_field_policy,
            cfg.missing_date_policy,
        )?)),
        other => Err(ConfigError::UnknownSite(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_site_is_a_config_error() {
        let cfg = AppConfig {
            site: "example".into(),
            ..AppConfig::default()
        };
        assert!(matches!(parser_for(&cfg), Err(ConfigError::UnknownSite(s)) if s == "example"));
    }

    #[test]
    fn default_site_has_a_parser() {
        let parser = parser_for(&AppConfig::default()).unwrap();
        let outcome = parser.parse_page("<html><body></body></html>", "u").unwrap();
        assert_eq!(outcome, PageOutcome::EndOfData);
    }
}
