// Scrape -> raw CSV -> re-read -> normalize -> spreadsheet
use crate::model::ScrapeRequest;
use crate::normalizer::Normalizer;
use crate::parser::ListingParser;
use crate::scraper::{Fetcher, TenderCollector};
use crate::storage::{csv_store, xlsx_store};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug)]
pub struct RunOutput {
    pub raw_path: PathBuf,
    pub cleaned_path: PathBuf,
    pub scraped: usize,
    pub undated: usize,
}

pub fn raw_file_name(ts: i64) -> String {
    format!("tenders_data_{}.csv", ts)
}

pub fn cleaned_file_name(ts: i64) -> String {
    format!("cleaned_data_{}.xlsx", ts)
}

/// Runs both stages. Returns `None` when nothing was scraped; no files are
/// written in that case.
pub fn run<F: Fetcher, P: ListingParser>(
    collector: &TenderCollector<F, P>,
    req: &ScrapeRequest,
    output_dir: &Path,
    ts: i64,
    on_progress: impl FnMut(usize),
) -> Result<Option<RunOutput>> {
    let tenders = collector
        .collect(req, on_progress)
        .with_context(|| format!("scraping {:?} from {}", req.query, req.base_url))?;

    if tenders.is_empty() {
        warn!("No tenders found for {:?}; nothing written", req.query);
        return Ok(None);
    }
    info!("Scraped {} tenders (asked for {})", tenders.len(), req.target);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let raw_path = output_dir.join(raw_file_name(ts));
    csv_store::write_tenders(&raw_path, &tenders)
        .with_context(|| format!("writing {}", raw_path.display()))?;
    drop(tenders);

    // The cleaning stage works from the file, not from memory.
    let reloaded = csv_store::read_tenders(&raw_path)
        .with_context(|| format!("reading back {}", raw_path.display()))?;

    let normalizer = Normalizer::new().context("compiling date patterns")?;
    let cleaned = normalizer.normalize_all(reloaded);
    let undated = cleaned.iter().filter(|t| t.closing_date.is_none()).count();
    if undated > 0 {
        warn!("{} of {} tenders have no usable closing date", undated, cleaned.len());
    }

    let cleaned_path = output_dir.join(cleaned_file_name(ts));
    xlsx_store::write_normalized(&cleaned_path, &cleaned)
        .with_context(|| format!("writing {}", cleaned_path.display()))?;

    Ok(Some(RunOutput {
        raw_path,
        cleaned_path,
        scraped: cleaned.len(),
        undated,
    }))
}
