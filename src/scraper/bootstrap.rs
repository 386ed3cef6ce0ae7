//! Session bootstrap: one request for the reader landing page yields the chapter list and token.

use crate::model::{landing_url, ChapterManifest, Session};
use crate::scraper::client::Transport;
use crate::scraper::error::BootstrapError;
use log::info;
use reqwest::header::HeaderMap;
use scraper::{Html, Selector};

const CHAPTER_OPTION_SELECTOR: &str = "select[name=\"chapter\"] option";
const TOKEN_SELECTOR: &str = "meta[name=\"csrf-token\"]";

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, BootstrapError> {
    Selector::parse(sel).map_err(|e| BootstrapError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Extract the chapter ids (option values, document order) and the anti-forgery token.
pub fn parse_landing_page(
    html: &str,
    url: &str,
) -> Result<(ChapterManifest, String), BootstrapError> {
    let doc = Html::parse_document(html);
    let option_sel = parse_selector(CHAPTER_OPTION_SELECTOR)?;
    let token_sel = parse_selector(TOKEN_SELECTOR)?;

    let manifest: ChapterManifest = doc
        .select(&option_sel)
        .filter_map(|opt| opt.value().attr("value"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    if manifest.is_empty() {
        return Err(BootstrapError::MissingChapterList {
            url: url.to_string(),
        });
    }

    let token = doc
        .select(&token_sel)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BootstrapError::MissingToken {
            url: url.to_string(),
        })?;

    Ok((manifest, token.to_string()))
}

/// Load the reader page for `slug` and set up the session every later request uses.
pub fn bootstrap<T: Transport + ?Sized>(
    transport: &mut T,
    base_url: &str,
    slug: &str,
    user_agent: &str,
) -> Result<(Session, ChapterManifest), BootstrapError> {
    let url = landing_url(base_url, slug);
    let html = transport.get(&url, &HeaderMap::new())?;
    let (manifest, token) = parse_landing_page(&html, &url)?;
    let session = Session::new(base_url, slug, &token, user_agent).map_err(|e| {
        BootstrapError::InvalidToken {
            url: url.clone(),
            reason: e.to_string(),
        }
    })?;
    info!("Found {} chapters for {}", manifest.len(), slug);
    Ok((session, manifest))
}
