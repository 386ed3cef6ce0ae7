//! litharvest: CLI harvester that reads a web novel page by page and writes it out as plain text.

pub mod cli;
pub mod config;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use model::{ChapterManifest, Session};
pub use scraper::{
    bootstrap, harvest_book, harvest_to_file, sanitize_page, BootstrapError, HarvestError,
    HarvestOptions, Pagination, ReaderClient, ReaderClientBuilder, Transport,
};
