use crate::model::{NormalizedTender, TenderRecord};
use crate::utils::{collapse_whitespace, title_case};
use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

const ORDINAL: &str = r"^(\d{1,2})(?:st|nd|rd|th)\b";
const DAY: &str = r"(\d{1,2}).*";
const MONTH: &str = r"\w+\s+([A-Za-z]+),?\s+.*";
const YEAR: &str = r".*(\d{4})$";

/// Formats tried on the closing date once the ordinal suffix is gone.
/// ISO comes last so our own output parses back to the same day.
const DIRECT_FORMATS: &[&str] = &["%d %B, %Y", "%d %B %Y", "%Y-%m-%d"];

pub struct Normalizer {
    ordinal: Regex,
    day: Regex,
    month: Regex,
    year: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            ordinal: Regex::new(ORDINAL)?,
            day: Regex::new(DAY)?,
            month: Regex::new(MONTH)?,
            year: Regex::new(YEAR)?,
        })
    }

    pub fn normalize_all(&self, records: Vec<TenderRecord>) -> Vec<NormalizedTender> {
        records.into_iter().map(|r| self.normalize_record(r)).collect()
    }

    pub fn normalize_record(&self, record: TenderRecord) -> NormalizedTender {
        let closing_date = match record.closing_date.as_deref() {
            Some(raw) => {
                let parsed = self.parse_closing_date(raw);
                if parsed.is_none() {
                    warn!("Unparseable closing date {:?} for {:?}", raw, record.project);
                }
                parsed
            }
            None => {
                warn!("No closing date for {:?}", record.project);
                None
            }
        };

        NormalizedTender {
            closing_date,
            company: record.company,
            url: record.url,
            sector: normalize_sector(&record.sector),
            project: record.project,
        }
    }

    /// Parses `"3rd January, 2024"` style dates, day first.
    /// The well-known format is parsed directly; day, month and year are
    /// only pulled out one by one when that fails.
    pub fn parse_closing_date(&self, raw: &str) -> Option<NaiveDate> {
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return None;
        }
        self.parse_direct(&text).or_else(|| self.parse_components(&text))
    }

    fn parse_direct(&self, text: &str) -> Option<NaiveDate> {
        let stripped = self.ordinal.replace(text, "$1");
        DIRECT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&stripped, fmt).ok())
    }

    fn parse_components(&self, text: &str) -> Option<NaiveDate> {
        let day = self.day.captures(text)?.get(1)?.as_str();
        let month = self.month.captures(text)?.get(1)?.as_str();
        let year = self.year.captures(text)?.get(1)?.as_str();
        NaiveDate::parse_from_str(&format!("{} {} {}", day, month, year), "%d %B %Y").ok()
    }
}

/// Title-cases the sector and renames the `Public` token to `Govt`.
/// Whitespace between tokens is kept as it was.
pub fn normalize_sector(sector: &str) -> String {
    let titled = title_case(sector);
    let mut out = String::with_capacity(titled.len());
    let mut rest = titled.as_str();
    while !rest.is_empty() {
        let gap = rest.len() - rest.trim_start().len();
        out.push_str(&rest[..gap]);
        rest = &rest[gap..];

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        out.push_str(if token == "Public" { "Govt" } else { token });
        rest = &rest[end..];
    }
    out
}
