use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "config.json";

/// Scrape tender listings and write a raw CSV plus a cleaned spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "tender-sniper", version)]
pub struct Cli {
    /// Number of tenders to fetch
    #[arg(short = 'n', long = "num", default_value_t = 100)]
    pub num: usize,

    /// Search query
    #[arg(short = 'q', long = "query", default_value = "system")]
    pub query: String,

    /// JSON config file (defaults to ./config.json when present)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory for the output files
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl Cli {
    /// Config path to load and whether the user named it explicitly.
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG), false),
        }
    }
}
