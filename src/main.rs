mod cli;
mod config;
mod model;
mod normalizer;
mod parser;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser as _;
use cli::Cli;
use config::load_or_default;
use dialoguer::{Confirm, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use model::ScrapeRequest;
use parser::parser_for;
use crate::scraper::{HttpFetcher, TenderCollector};
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Initialize logging; stderr keeps the progress bar readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config_path, explicit) = cli.config_path();
    let mut config = load_or_default(&config_path, explicit)?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    let request = ScrapeRequest {
        base_url: config.base_url.clone(),
        query: cli.query.clone(),
        target: cli.num,
    };

    println!(
        "tenders: {}, query: {:?}, site: {} ({}), output: {}",
        request.target,
        request.query,
        config.site,
        request.base_url,
        config.output_dir.display()
    );

    if !cli.yes && !confirm("Do you want to continue?")? {
        println!("Exiting...");
        return Ok(());
    }

    let ts = Utc::now().timestamp();
    let fetcher = HttpFetcher::new(&config).context("setting up http client")?;
    let parser = parser_for(&config)?;
    let collector = TenderCollector::new(fetcher, parser).with_max_pages(config.max_pages);

    let bar = ProgressBar::new(request.target as u64);
    bar.set_style(ProgressStyle::with_template(
        "{msg} [{elapsed_precise}] {wide_bar} {pos}/{len}",
    )?);
    bar.set_message("Scraping data");

    let outcome = pipeline::run(&collector, &request, &config.output_dir, ts, |delta| {
        bar.inc(delta as u64)
    });
    bar.finish_and_clear();

    match outcome? {
        Some(out) => {
            println!("Data saved to {}", out.raw_path.display());
            println!("Cleaned data saved to {}", out.cleaned_path.display());
            info!("Done: {} tenders, {} without closing date", out.scraped, out.undated);
        }
        None => println!("No tenders found, nothing saved."),
    }

    Ok(())
}

/// Asks before any network activity. A terminal gets the interactive
/// prompt; piped input is read as one line where only `y` means yes.
fn confirm(prompt: &str) -> Result<bool> {
    if io::stdin().is_terminal() {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact_opt()?;
        return Ok(answer == Some(true));
    }

    print!("{} [y/n] ", prompt);
    io::stdout().flush()?;
    Ok(read_answer(io::stdin().lock())?)
}

fn read_answer(mut input: impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
