//! One authenticated request for one page of one chapter.

use crate::model::Session;
use crate::scraper::client::Transport;
use crate::scraper::error::PageError;
use crate::scraper::sanitize::sanitize_page;
use log::debug;
use serde::Deserialize;

/// JSON envelope returned by the page endpoint. On `status: false`, `data` holds the reason.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    pub status: bool,
    #[serde(default)]
    pub data: String,
    #[serde(rename = "isLastPage", default)]
    pub is_last_page: bool,
}

/// Sanitized text of one page and whether the chapter ends with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub text: String,
    pub is_last_page: bool,
}

/// Fetch page `page` (1-based) of `chapter_id`.
///
/// The session referer is moved to the chapter before the request goes out.
pub fn fetch_page<T: Transport + ?Sized>(
    transport: &mut T,
    session: &mut Session,
    chapter_id: &str,
    page: u32,
) -> Result<PageResult, PageError> {
    session
        .set_chapter_referer(chapter_id)
        .map_err(|e| PageError::Envelope {
            chapter_id: chapter_id.to_string(),
            page,
            reason: format!("chapter id is not usable in a referer: {}", e),
        })?;

    let page_str = page.to_string();
    let url = session.page_url();
    debug!("Requesting chapter {} page {}", chapter_id, page);
    let body = transport.post_form(
        &url,
        session.headers(),
        &[
            ("chapterId", chapter_id),
            ("page", &page_str),
            ("_csrf", session.token()),
        ],
    )?;

    let envelope: PageEnvelope =
        serde_json::from_str(&body).map_err(|e| PageError::Envelope {
            chapter_id: chapter_id.to_string(),
            page,
            reason: e.to_string(),
        })?;
    if !envelope.status {
        return Err(PageError::NoData {
            message: envelope.data,
        });
    }
    Ok(PageResult {
        text: sanitize_page(&envelope.data),
        is_last_page: envelope.is_last_page,
    })
}
