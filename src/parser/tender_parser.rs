// tenderyetu.com listing markup
use crate::config::{MissingDatePolicy, MissingFieldPolicy};
use crate::model::{PageOutcome, ParserError, TenderRecord};
use crate::parser::ListingParser;
use crate::utils::collapse_whitespace;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const ARTICLE: &str = "article";
const TITLE: &str = "h2.post-title.entry-title";
const LABEL: &str = "span";
const COMPANY_MARKER: &str = "Company:";
const SECTOR_MARKER: &str = "Sector:";
const CLOSING_DATE: &str = r"Closing Date:\s+(\d{1,2}(?:st|nd|rd|th)\s+[A-Za-z,?]+\s+\d{4})";

/// Filled in for a missing required field under `MissingFieldPolicy::Sentinel`.
pub const SENTINEL: &str = "N/A";

pub struct TenderYetuParser {
    article: Selector,
    title: Selector,
    label: Selector,
    closing_date: Regex,
    on_missing_field: MissingFieldPolicy,
    on_missing_date: MissingDatePolicy,
}

impl TenderYetuParser {
    pub fn new(
        on_missing_field: MissingFieldPolicy,
        on_missing_date: MissingDatePolicy,
    ) -> Result<Self, ParserError> {
        let closing_date = Regex::new(CLOSING_DATE).map_err(|e| ParserError::InvalidPattern {
            pattern: CLOSING_DATE.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            article: selector(ARTICLE)?,
            title: selector(TITLE)?,
            label: selector(LABEL)?,
            closing_date,
            on_missing_field,
            on_missing_date,
        })
    }

    fn project(&self, article: ElementRef) -> Option<String> {
        let heading = article.select(&self.title).next()?;
        let text = collapse_whitespace(&heading.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }

    /// Text node right after the first `<span>` whose text contains `marker`.
    fn labelled(&self, article: ElementRef, marker: &str) -> Option<String> {
        let label = article
            .select(&self.label)
            .find(|span| span.text().collect::<String>().contains(marker))?;

        label
            .next_siblings()
            .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
            .find(|t| !t.is_empty())
    }

    fn closing_date(&self, article: ElementRef) -> Option<String> {
        let text = article.text().collect::<String>();
        self.closing_date
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| collapse_whitespace(m.as_str()))
    }

    /// `Ok(None)` means the article is dropped.
    fn required(
        &self,
        value: Option<String>,
        field: &'static str,
        url: &str,
        index: usize,
    ) -> Result<Option<String>, ParserError> {
        if let Some(v) = value {
            return Ok(Some(v));
        }
        match self.on_missing_field {
            MissingFieldPolicy::Abort => Err(ParserError::MissingField {
                field,
                url: url.to_string(),
                index,
            }),
            MissingFieldPolicy::Skip => {
                warn!("Skipping article #{} on {}: no {}", index, url, field);
                Ok(None)
            }
            MissingFieldPolicy::Sentinel => {
                warn!("Article #{} on {} has no {}; using {:?}", index, url, field, SENTINEL);
                Ok(Some(SENTINEL.to_string()))
            }
        }
    }

    fn parse_article(
        &self,
        article: ElementRef,
        url: &str,
        index: usize,
    ) -> Result<Option<TenderRecord>, ParserError> {
        let Some(project) = self.required(self.project(article), "project heading", url, index)? else {
            return Ok(None);
        };
        let Some(company) = self.required(self.labelled(article, COMPANY_MARKER), "company", url, index)? else {
            return Ok(None);
        };
        let Some(sector) = self.required(self.labelled(article, SECTOR_MARKER), "sector", url, index)? else {
            return Ok(None);
        };

        let closing_date = self.closing_date(article);
        if closing_date.is_none() {
            match self.on_missing_date {
                MissingDatePolicy::Allow => {
                    debug!("Article #{} on {} has no closing date", index, url)
                }
                MissingDatePolicy::Reject => {
                    return Err(ParserError::MissingClosingDate {
                        url: url.to_string(),
                        index,
                    });
                }
            }
        }

        Ok(Some(TenderRecord {
            closing_date,
            company,
            url: url.to_string(),
            sector,
            project,
        }))
    }
}

impl ListingParser for TenderYetuParser {
    fn parse_page(&self, html: &str, page_url: &str) -> Result<PageOutcome, ParserError> {
        let document = Html::parse_document(html);
        let articles: Vec<ElementRef> = document.select(&self.article).collect();

        if articles.is_empty() {
            return Ok(PageOutcome::EndOfData);
        }

        let mut records = Vec::with_capacity(articles.len());
        for (index, article) in articles.into_iter().enumerate() {
            if let Some(record) = self.parse_article(article, page_url, index)? {
                records.push(record);
            }
        }

        Ok(PageOutcome::MorePages(records))
    }
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::InvalidPattern {
        pattern: css.to_string(),
        reason: e.to_string(),
    })
}
