//! CLI parsing and orchestration. Parses args, bootstraps the session, harvests to the output file.
//! Maps errors to exit codes.

use crate::config;
use crate::scraper::{
    bootstrap, harvest_to_file, BootstrapError, HarvestError, HarvestOptions, HarvestSummary,
    Pagination, ReaderClient, ThreadPause, DEFAULT_USER_AGENT,
};
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://litnet.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("{0}")]
    Harvest(#[from] HarvestError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Bootstrap(_) => 2,
            CliRunError::Harvest(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "litharvest")]
#[command(about = "Harvest the full text of a web novel from its paginated reader into one text file")]
#[command(
    after_help = "Config file keys (base_url, user_agent, page_delay_ms, max_pages, timeout_secs) are read from ./litharvest.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Book slug from the reader URL, e.g. "volchya-tropa-b34046".
    #[arg(short, long)]
    pub slug: String,

    /// File to write the book to.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Site root (overrides config; default https://litnet.com).
    #[arg(long)]
    pub base_url: Option<String>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Delay between page requests of one chapter, in milliseconds (overrides config; default 1000).
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Give up on a chapter after this many pages without an end marker (overrides config; default 100).
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Suppress progress output (errors and warnings only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and full error chain.
    #[arg(long)]
    pub verbose: bool,
}

/// Reject an output path whose parent directory does not exist, before any network traffic.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::Harvest(HarvestError::Output {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "parent directory does not exist",
                ),
            }));
        }
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), CliRunError> {
    let slug = slug.trim();
    if slug.is_empty() || slug.contains('/') || slug.contains(char::is_whitespace) {
        return Err(CliRunError::InvalidInput(format!(
            "Invalid --slug '{}'. Use the last part of the reader URL, e.g. volchya-tropa-b34046.",
            slug
        )));
    }
    Ok(())
}

/// Resolve page limits from flags, then config, then defaults. At least one page is always read.
fn resolve_pagination(args: &Args, config: Option<&config::Config>) -> Pagination {
    let defaults = Pagination::default();
    let max_pages = args
        .max_pages
        .or_else(|| config.and_then(|c| c.max_pages))
        .unwrap_or(defaults.max_pages)
        .max(1);
    let delay = args
        .delay_ms
        .or_else(|| config.and_then(|c| c.page_delay_ms))
        .map(Duration::from_millis)
        .unwrap_or(defaults.delay);
    Pagination { max_pages, delay }
}

/// Entry point for the CLI. Returns the harvest summary on success.
pub fn run(args: &Args) -> Result<HarvestSummary, CliRunError> {
    validate_slug(&args.slug)?;
    validate_output_path(&args.output)?;

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let config = config.as_ref();

    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.and_then(|c| c.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()))
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let pagination = resolve_pagination(args, config);

    let mut client = ReaderClient::builder()
        .user_agent(user_agent.clone())
        .timeout_secs(timeout_secs)
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let (session, manifest) = bootstrap(&mut client, &base_url, args.slug.trim(), &user_agent)?;

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |percent: u32| {
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(100);
            let style = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}% ({elapsed})")
                .map(|s| {
                    s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ ")
                })
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(percent as u64);
        pb.set_message(format!("Harvesting {}", args.slug));
    };
    let progress: Option<&dyn Fn(u32)> = if args.quiet { None } else { Some(&progress_cb) };

    let options = HarvestOptions {
        pagination,
        progress,
    };
    let mut pause = ThreadPause;
    let summary = harvest_to_file(
        &mut client,
        session,
        &manifest,
        &mut pause,
        &args.output,
        &options,
    )?;

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }

    if !args.quiet {
        eprintln!(
            "Wrote {} ({} chapters, {} cut short)",
            args.output.display(),
            summary.chapters,
            summary.cut_short
        );
    }
    Ok(summary)
}
