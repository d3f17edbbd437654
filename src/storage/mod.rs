// Flat-file output: raw CSV and the cleaned spreadsheet
pub mod csv_store;
pub mod xlsx_store;

/// Column order shared by both output files.
pub const COLUMNS: [&str; 5] = ["Date", "Company", "URL", "Sector", "Project"];
