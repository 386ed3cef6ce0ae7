//! Blocking HTTP client for the reader site. One request at a time, no retries.

use crate::scraper::error::TransportError;
use reqwest::header::HeaderMap;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// The HTTP collaborator the pipeline talks to. Returns the response body of a 2xx answer.
///
/// `headers` are applied per request, so the session owns them rather than the client.
pub trait Transport {
    fn get(&mut self, url: &str, headers: &HeaderMap) -> Result<String, TransportError>;

    fn post_form(
        &mut self,
        url: &str,
        headers: &HeaderMap,
        form: &[(&str, &str)],
    ) -> Result<String, TransportError>;
}

/// Cookie-aware blocking client. The anti-forgery token is tied to the session cookie,
/// so the same client must serve the landing page and every page request.
#[derive(Debug)]
pub struct ReaderClient {
    inner: reqwest::blocking::Client,
}

impl ReaderClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> ReaderClientBuilder {
        ReaderClientBuilder::default()
    }
}

/// Check response status and read body as UTF-8.
fn read_body(
    response: reqwest::blocking::Response,
    url: &str,
) -> Result<String, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response.text().map_err(|e| TransportError::BodyRead {
        url: url.to_string(),
        source: e,
    })
}

impl Transport for ReaderClient {
    fn get(&mut self, url: &str, headers: &HeaderMap) -> Result<String, TransportError> {
        let response = self
            .inner
            .get(url)
            .headers(headers.clone())
            .send()
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                source: e,
            })?;
        read_body(response, url)
    }

    fn post_form(
        &mut self,
        url: &str,
        headers: &HeaderMap,
        form: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let response = self
            .inner
            .post(url)
            .headers(headers.clone())
            .form(form)
            .send()
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                source: e,
            })?;
        read_body(response, url)
    }
}

/// Builder for ReaderClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct ReaderClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for ReaderClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ReaderClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<ReaderClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(ReaderClient { inner })
    }
}
