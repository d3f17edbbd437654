use crate::model::{PageOutcome, ScrapeError, ScrapeRequest, ScraperError, TenderRecord};
use crate::parser::ListingParser;
use crate::scraper::fetcher::build_page_url;
use crate::scraper::traits::Fetcher;
use tracing::{debug, info};

/// Walks listing pages one at a time until enough tenders are collected
/// or the site runs out of pages.
pub struct TenderCollector<F, P> {
    fetcher: F,
    parser: P,
    max_pages: Option<usize>,
}

impl<F: Fetcher, P: ListingParser> TenderCollector<F, P> {
    pub fn new(fetcher: F, parser: P) -> Self {
        Self {
            fetcher,
            parser,
            max_pages: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Returns at least `req.target` records unless pages run out first.
    /// All records of the last fetched page are kept, so the result may overshoot.
    /// `on_progress` receives the number of records added by each page.
    pub fn collect(
        &self,
        req: &ScrapeRequest,
        mut on_progress: impl FnMut(usize),
    ) -> Result<Vec<TenderRecord>, ScrapeError> {
        let mut records: Vec<TenderRecord> = Vec::new();
        let mut page = 1;

        while records.len() < req.target {
            if self.max_pages.is_some_and(|max| page > max) {
                info!("Reached page limit ({}), stopping", page - 1);
                break;
            }

            let url = build_page_url(&req.base_url, page, &req.query)
                .map_err(|source| ScrapeError::Fetch { page, source })?;

            let html = match self.fetcher.fetch(&url) {
                Ok(html) => html,
                Err(ScraperError::NotFound(_)) => {
                    info!("Page {} not found, no more results", page);
                    break;
                }
                Err(source) => return Err(ScrapeError::Fetch { page, source }),
            };

            let found = match self
                .parser
                .parse_page(&html, &url)
                .map_err(|source| ScrapeError::Parse { page, source })?
            {
                PageOutcome::MorePages(found) => found,
                PageOutcome::EndOfData => {
                    info!("Page {} has no tenders, no more results", page);
                    break;
                }
            };

            let before = records.len();
            records.extend(found);
            let delta = records.len() - before;
            debug!("Page {}: {} tenders ({} total)", page, delta, records.len());
            on_progress(delta);

            page += 1;
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParserError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned bodies keyed by page number; unknown pages are 404.
    struct StubFetcher {
        pages: HashMap<usize, Result<String, u16>>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(pages: Vec<(usize, Result<String, u16>)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            self.requested.borrow_mut().push(url.to_string());
            let page: usize = url
                .split("/page/")
                .nth(1)
                .and_then(|rest| rest.split('/').next())
                .and_then(|n| n.parse().ok())
                .unwrap();
            match self.pages.get(&page) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(ScraperError::InvalidResponse {
                    status: *status,
                    url: url.to_string(),
                }),
                None => Err(ScraperError::NotFound(url.to_string())),
            }
        }
    }

    /// Body format: `"<count>"` articles, `"bad"` for a parse failure.
    struct CountingParser;

    impl ListingParser for CountingParser {
        fn parse_page(&self, html: &str, page_url: &str) -> Result<PageOutcome, ParserError> {
            if html == "bad" {
                return Err(ParserError::MissingField {
                    field: "company",
                    url: page_url.to_string(),
                    index: 0,
                });
            }
            let count: usize = html.parse().unwrap();
            if count == 0 {
                return Ok(PageOutcome::EndOfData);
            }
            Ok(PageOutcome::MorePages(
                (0..count)
                    .map(|i| TenderRecord {
                        closing_date: None,
                        company: format!("Company {}", i),
                        url: page_url.to_string(),
                        sector: "Private".into(),
                        project: format!("Project {}", i),
                    })
                    .collect(),
            ))
        }
    }

    fn request(target: usize) -> ScrapeRequest {
        ScrapeRequest {
            base_url: "https://tenders.test".into(),
            query: "system".into(),
            target,
        }
    }

    fn pages(counts: &[usize]) -> Vec<(usize, Result<String, u16>)> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| (i + 1, Ok(c.to_string())))
            .collect()
    }

    #[test]
    fn stops_once_target_reached_keeping_last_page() {
        let collector = TenderCollector::new(StubFetcher::new(pages(&[4, 4, 4, 4])), CountingParser);
        let mut deltas = Vec::new();
        let records = collector.collect(&request(6), |d| deltas.push(d)).unwrap();

        assert_eq!(records.len(), 8);
        assert_eq!(deltas, vec![4, 4]);
        assert_eq!(
            *collector.fetcher.requested.borrow(),
            vec![
                "https://tenders.test/page/1/?s=system".to_string(),
                "https://tenders.test/page/2/?s=system".to_string(),
            ]
        );
        assert!(records[..4].iter().all(|r| r.url.contains("/page/1/")));
        assert!(records[4..].iter().all(|r| r.url.contains("/page/2/")));
    }

    #[test]
    fn result_is_at_least_target_for_any_target() {
        for target in 1..=12 {
            let collector = TenderCollector::new(StubFetcher::new(pages(&[3, 3, 3, 3, 3])), CountingParser);
            let records = collector.collect(&request(target), |_| {}).unwrap();
            assert!(records.len() >= target);
            assert!(records.len() < target + 3);
        }
    }

    #[test]
    fn empty_first_page_yields_nothing() {
        let collector = TenderCollector::new(StubFetcher::new(pages(&[0])), CountingParser);
        let mut calls = 0;
        let records = collector.collect(&request(10), |_| calls += 1).unwrap();
        assert!(records.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn end_of_data_returns_partial_result() {
        let collector = TenderCollector::new(StubFetcher::new(pages(&[2, 2, 0])), CountingParser);
        let records = collector.collect(&request(10), |_| {}).unwrap();
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn not_found_ends_the_listing() {
        let collector = TenderCollector::new(StubFetcher::new(pages(&[2])), CountingParser);
        let records = collector.collect(&request(10), |_| {}).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(collector.fetcher.requested.borrow().len(), 2);
    }

    #[test]
    fn page_limit_caps_the_loop() {
        let collector = TenderCollector::new(StubFetcher::new(pages(&[1, 1, 1, 1])), CountingParser)
            .with_max_pages(Some(2));
        let records = collector.collect(&request(10), |_| {}).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn zero_target_does_no_io() {
        let collector = TenderCollector::new(StubFetcher::new(pages(&[5])), CountingParser);
        let records = collector.collect(&request(0), |_| {}).unwrap();
        assert!(records.is_empty());
        assert!(collector.fetcher.requested.borrow().is_empty());
    }

    #[test]
    fn transport_failure_is_fatal() {
        let mut p = pages(&[2]);
        p.push((2, Err(503)));
        let collector = TenderCollector::new(StubFetcher::new(p), CountingParser);
        let err = collector.collect(&request(10), |_| {}).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Fetch { page: 2, source: ScraperError::InvalidResponse { status: 503, .. } }
        ));
    }

    #[test]
    fn parse_failure_is_fatal() {
        let p = vec![(1, Ok("bad".to_string()))];
        let collector = TenderCollector::new(StubFetcher::new(p), CountingParser);
        let err = collector.collect(&request(3), |_| {}).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { page: 1, .. }));
    }
}
