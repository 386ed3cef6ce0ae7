//! Session state and chapter manifest shared by the pipeline stages.

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, ORIGIN, REFERER, USER_AGENT};

const READER_PATH: &str = "/ru/reader/";
const PAGE_PATH: &str = "/reader/get-page";

pub const CSRF_HEADER: &str = "x-csrf-token";
pub const AJAX_HEADER: &str = "x-requested-with";

/// URL of the reader landing page for a book.
pub fn landing_url(base_url: &str, slug: &str) -> String {
    format!("{}{}{}", base_url.trim_end_matches('/'), READER_PATH, slug)
}

/// Authenticated reader session: where to send requests, the anti-forgery token,
/// and the headers every request after bootstrap carries.
///
/// Only the bootstrapper creates one; page fetching only moves the referer.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    slug: String,
    token: String,
    headers: HeaderMap,
}

impl Session {
    /// Build the session header set: user agent, AJAX marker, origin, referer (landing page) and token.
    pub fn new(
        base_url: &str,
        slug: &str,
        token: &str,
        user_agent: &str,
    ) -> Result<Self, InvalidHeaderValue> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        headers.insert(AJAX_HEADER, HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ORIGIN, HeaderValue::from_str(&base_url)?);
        headers.insert(REFERER, HeaderValue::from_str(&landing_url(&base_url, slug))?);
        headers.insert(CSRF_HEADER, HeaderValue::from_str(token)?);
        Ok(Self {
            base_url,
            slug: slug.to_string(),
            token: token.to_string(),
            headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Endpoint that serves one page of one chapter.
    pub fn page_url(&self) -> String {
        format!("{}{}", self.base_url, PAGE_PATH)
    }

    /// Reader URL as the browser shows it while `chapter_id` is open.
    pub fn chapter_referer(&self, chapter_id: &str) -> String {
        format!("{}?c={}", landing_url(&self.base_url, &self.slug), chapter_id)
    }

    /// Point the referer at the chapter being read.
    pub fn set_chapter_referer(&mut self, chapter_id: &str) -> Result<(), InvalidHeaderValue> {
        let value = HeaderValue::from_str(&self.chapter_referer(chapter_id))?;
        self.headers.insert(REFERER, value);
        Ok(())
    }
}

/// Chapter identifiers in reading order, exactly as listed by the reader page.
/// Duplicates are kept and harvested twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterManifest {
    ids: Vec<String>,
}

impl ChapterManifest {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ChapterManifest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
