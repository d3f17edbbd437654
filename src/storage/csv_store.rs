use crate::model::{StorageError, TenderRecord};
use crate::storage::COLUMNS;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::info;

/// Writes raw tenders with a `Date,Company,URL,Sector,Project` header.
/// A missing closing date becomes an empty cell.
pub fn write_tenders(path: &Path, tenders: &[TenderRecord]) -> Result<(), StorageError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(COLUMNS)?;
    for tender in tenders {
        writer.serialize(tender)?;
    }
    writer.flush()?;
    info!("Wrote {} tenders to {}", tenders.len(), path.display());
    Ok(())
}

/// Reads back a file produced by [`write_tenders`].
pub fn read_tenders(path: &Path) -> Result<Vec<TenderRecord>, StorageError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let tenders = reader
        .deserialize()
        .collect::<Result<Vec<TenderRecord>, csv::Error>>()?;
    Ok(tenders)
}
