//! Error types for the harvesting pipeline, split by how far a failure is allowed to travel.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the HTTP collaborator for a single request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Session bootstrap failed. Fatal: without a chapter list and token nothing can be harvested.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Could not load reader page: {0}")]
    Transport(#[from] TransportError),

    #[error("Reader page {url} has no chapter list (wrong slug, or the book is restricted).")]
    MissingChapterList { url: String },

    #[error("Reader page {url} has no csrf-token meta element.")]
    MissingToken { url: String },

    #[error("Reader page {url} returned a token that cannot be sent as a header: {reason}")]
    InvalidToken { url: String, reason: String },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// A single page request did not produce text. Local to the chapter being read.
#[derive(Debug, Error)]
pub enum PageError {
    /// Server answered `status: false`. Either the chapter ran out of pages or access was denied.
    #[error("Server returned no data: {message}")]
    NoData { message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed page response for chapter {chapter_id} page {page}: {reason}")]
    Envelope {
        chapter_id: String,
        page: u32,
        reason: String,
    },
}

/// Writing the output document failed. Fatal: a partial book is not useful.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Cannot open output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}
