use crate::model::{NormalizedTender, StorageError};
use crate::storage::COLUMNS;
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::Path;
use tracing::{info, warn};

const SHEET_NAME: &str = "Tenders";
const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Writes the cleaned tenders as a single worksheet. Closing dates are real
/// spreadsheet dates; tenders without one, or with a year Excel cannot
/// store (outside 1900..=9999), get a blank cell.
pub fn write_normalized(path: &Path, tenders: &[NormalizedTender]) -> Result<(), StorageError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (i, tender) in tenders.iter().enumerate() {
        let row = (i + 1) as u32;
        if let Some(date) = tender.closing_date {
            match excel_date(date) {
                Some(cell) => {
                    sheet.write_datetime_with_format(row, 0, &cell, &date_format)?;
                }
                None => warn!(
                    "Closing date {} for {:?} is outside the spreadsheet date range; left blank",
                    date, tender.project
                ),
            }
        }
        sheet.write_string(row, 1, tender.company.as_str())?;
        sheet.write_string(row, 2, tender.url.as_str())?;
        sheet.write_string(row, 3, tender.sector.as_str())?;
        sheet.write_string(row, 4, tender.project.as_str())?;
    }

    sheet.set_column_width(0, 12)?;
    sheet.set_column_width(1, 32)?;
    sheet.set_column_width(4, 60)?;

    workbook.save(path)?;
    info!("Wrote {} cleaned tenders to {}", tenders.len(), path.display());
    Ok(())
}

fn excel_date(date: NaiveDate) -> Option<ExcelDateTime> {
    let year = u16::try_from(date.year()).ok().filter(|y| (1900..=9999).contains(y))?;
    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8).ok()
}
