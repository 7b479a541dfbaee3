mod capture;
mod config;
mod db;
mod error;
mod export;
mod extract;
mod messages;
mod model;
mod page;
mod report;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::config::Settings;
use crate::model::ProfileRecord;
use crate::page::SnapshotPage;

#[derive(Parser)]
#[command(name = "profile_capture", about = "Capture structured LinkedIn profiles into a local store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract profiles from saved, fully rendered HTML pages
    Ingest {
        /// Saved profile pages
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Profile URL to use instead of the page's canonical link
        #[arg(long)]
        url: Option<String>,
    },
    /// Open a profile in Chrome, expand and scroll it, then capture
    #[cfg(feature = "chrome")]
    Capture {
        url: String,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
    /// Stored profiles, newest first
    List {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Find profiles by name, headline, location, company, position or skill
    Search { query: String },
    /// Print one stored profile as JSON
    Show { id: String },
    /// Write profiles to a dated JSON file
    Export {
        /// Export a single profile
        #[arg(long)]
        id: Option<String>,
        /// Output path (default: dated name in the export directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Load profiles from an export file (array, single record, or id-keyed map)
    Import { file: PathBuf },
    /// Delete one stored profile
    Delete { id: String },
    /// Delete every stored profile
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Store summary
    Stats,
    /// Answer JSON requests, one per line, on stdin
    Serve {
        /// Saved page to answer `scrapeProfile` from
        #[arg(long)]
        html: Option<PathBuf>,
        /// Profile URL for the saved page
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = config::load()?;
    let conn = db::connect(&settings.db_path)?;

    let result = match cli.command {
        Commands::Ingest { files, url } => {
            println!("Extracting {} pages...", files.len());
            let records = ingest_pages(&files, url.as_deref(), &settings)?;
            let without_id = records.iter().filter(|r| r.profile_id.is_none()).count();
            let saved = db::save_many(&conn, &records)?;
            println!("Saved {} profiles ({} pages had no profile ID).", saved, without_id);
            Ok(())
        }
        #[cfg(feature = "chrome")]
        Commands::Capture { url, headed } => {
            let mut tab = page::chrome::ChromePage::open(&url, !headed)?;
            match capture::capture_current_profile(&mut tab, &settings).await {
                Some(record) => {
                    db::save(&conn, &record)?;
                    println!("Captured {} ({})", record.display_name(), record.profile_id.as_deref().unwrap_or("-"));
                }
                None => println!("Page never showed a profile; nothing captured."),
            }
            Ok(())
        }
        Commands::List { limit } => {
            let records = load_sorted(&conn)?;
            if records.is_empty() {
                println!("No profiles stored yet. Run 'ingest' or 'capture' first.");
                return Ok(());
            }
            print_table(records.iter().take(limit));
            println!("\n{} profiles", records.len());
            Ok(())
        }
        Commands::Search { query } => {
            let records = load_sorted(&conn)?;
            let hits = report::search(&records, &query);
            if hits.is_empty() {
                println!("No profiles match '{}'.", query);
                return Ok(());
            }
            print_table(hits.iter().copied());
            println!("\n{} of {} profiles", hits.len(), records.len());
            Ok(())
        }
        Commands::Show { id } => {
            let record = db::get(&conn, &id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Export { id, out } => run_export(&conn, &settings, id, out),
        Commands::Import { file } => {
            let records = export::read_import(&file)?;
            let saved = db::save_many(&conn, &records)?;
            println!("Imported {} of {} profiles from {}", saved, records.len(), file.display());
            Ok(())
        }
        Commands::Delete { id } => {
            db::delete(&conn, &id)?;
            println!("Deleted {}", id);
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("Refusing to delete every profile without --yes");
            }
            let removed = db::clear_all(&conn)?;
            println!("Cleared {} profiles.", removed);
            Ok(())
        }
        Commands::Stats => {
            let records: Vec<ProfileRecord> = db::get_all(&conn)?.into_values().collect();
            let s = report::stats(&records);
            println!("Total:          {}", s.total);
            println!("Companies:      {}", s.unique_companies);
            println!("Avg experience: {:.1}", s.avg_experience);
            match s.top_skill {
                Some((name, n)) => println!("Top skill:      {} ({})", name, n),
                None => println!("Top skill:      -"),
            }
            Ok(())
        }
        Commands::Serve { html, url } => serve(&conn, &settings, html.as_deref(), url).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Capture every saved page in parallel. Unreadable pages and pages that never show a
/// profile are skipped with a warning.
fn ingest_pages(files: &[PathBuf], url: Option<&str>, settings: &Settings) -> anyhow::Result<Vec<ProfileRecord>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut records = Vec::with_capacity(files.len());
    for chunk in files.chunks(64) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| ingest_page(path, url, settings))
            .collect();

        for (path, result) in chunk.iter().zip(results) {
            match result {
                Ok(Some(record)) => records.push(record),
                Ok(None) => warn!(path = %path.display(), "Not a loaded profile page, skipping"),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping page"),
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(records)
}

fn ingest_page(path: &Path, url: Option<&str>, settings: &Settings) -> anyhow::Result<Option<ProfileRecord>> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let url = url
        .map(String::from)
        .or_else(|| extract::document_url(&scraper::Html::parse_document(&html)))
        .unwrap_or_default();
    capture::capture_snapshot(SnapshotPage::new(url, html), settings)
}

fn load_sorted(conn: &Connection) -> anyhow::Result<Vec<ProfileRecord>> {
    let records = db::get_all(conn)?.into_values().collect();
    Ok(report::newest_first(records))
}

fn print_table<'a>(rows: impl Iterator<Item = &'a ProfileRecord>) {
    println!(
        "{:>3} | {:<22} | {:<24} | {:<20} | {:<18} | {:>3} | {:>3} | {:>3} | {:<10}",
        "#", "Name", "Position", "Company", "Location", "Exp", "Edu", "Skl", "Captured"
    );
    println!("{}", "-".repeat(134));

    for (i, r) in rows.enumerate() {
        println!(
            "{:>3} | {:<22} | {:<24} | {:<20} | {:<18} | {:>3} | {:>3} | {:>3} | {:<10}",
            i + 1,
            truncate(r.display_name(), 22),
            truncate(r.current_position.as_deref().unwrap_or("-"), 24),
            truncate(r.current_company.as_deref().unwrap_or("-"), 20),
            truncate(r.location.as_deref().unwrap_or("N/A"), 18),
            r.experience.len(),
            r.education.len(),
            r.skills.len(),
            r.timestamp.get(..10).unwrap_or(r.timestamp.as_str()),
        );
    }
}

fn run_export(conn: &Connection, settings: &Settings, id: Option<String>, out: Option<PathBuf>) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    match id {
        Some(id) => {
            let record = db::get(conn, &id)?;
            let path = export::target(out, &settings.export_dir, export::one_file_name(&id, today));
            export::export_one(&record, &path)?;
            println!("Exported {} to {}", record.display_name(), path.display());
        }
        None => {
            let records = load_sorted(conn)?;
            let path = export::target(out, &settings.export_dir, export::all_file_name(today));
            export::export_all(&records, &path)?;
            println!("Exported {} profiles to {}", records.len(), path.display());
        }
    }
    Ok(())
}

/// Line-delimited JSON request loop. Logs go to stderr so stdout carries only responses.
async fn serve(conn: &Connection, settings: &Settings, html: Option<&Path>, url: Option<String>) -> anyhow::Result<()> {
    let page = match html {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let url = url
                .or_else(|| extract::document_url(&scraper::Html::parse_document(&raw)))
                .unwrap_or_default();
            Some(SnapshotPage::new(url, raw))
        }
        None => None,
    };
    info!(page = page.is_some(), "Serving requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = messages::handle_line(conn, page.as_ref(), &settings.selectors, &line);
        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
