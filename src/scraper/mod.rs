//! The harvesting pipeline: bootstrap, page fetching, sanitizing, chapter assembly and book output.

mod client;
mod error;

pub mod bootstrap;
pub mod chapter;
pub mod harvest;
pub mod page;
pub mod sanitize;

pub use bootstrap::{bootstrap, parse_landing_page};
pub use chapter::{
    assemble_chapter, AssembledChapter, ChapterOutcome, ChapterPages, Pagination, Pause,
    ThreadPause,
};
pub use client::{ReaderClient, ReaderClientBuilder, Transport, DEFAULT_USER_AGENT};
pub use error::{BootstrapError, HarvestError, PageError, TransportError};
pub use harvest::{harvest_book, harvest_to_file, progress_percent, HarvestOptions, HarvestSummary};
pub use page::{fetch_page, PageEnvelope, PageResult};
pub use sanitize::sanitize_page;
