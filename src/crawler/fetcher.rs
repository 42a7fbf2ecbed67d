//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests returning the raw body bytes
//! - Charset detection from the Content-Type header
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::resource::{Resource, DEFAULT_CHARSET};
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failures retrieving a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Http { url, .. } => url,
        }
    }

    fn classify(url: &Url, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connect { url, source: err }
        } else if let Some(status) = err.status() {
            Self::Status {
                url,
                status: status.as_u16(),
            }
        } else {
            Self::Http { url, source: err }
        }
    }
}

/// Something that can turn a URL into a fetched [`Resource`]
///
/// The crawler only ever awaits one fetch at a time.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &Url) -> Result<Resource, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `request_timeout` - Upper bound for a single request, body included
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::UserAgentConfig;
/// use site_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent_string())
        .timeout(request_timeout)
        .connect_timeout(request_timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetch`] implementation backed by `reqwest`
///
/// Redirects are followed with reqwest's default policy; the resource keeps the
/// URL that was requested, so storage paths follow the link that was crawled.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config, request_timeout)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Resource, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type)
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::classify(url, e))?;

        Ok(Resource::fetched(url.clone(), body.to_vec(), charset))
    }
}

/// Extracts the `charset` parameter from a Content-Type header value
///
/// ```
/// use site_mirror::crawler::charset_from_content_type;
///
/// assert_eq!(
///     charset_from_content_type("text/html; charset=\"ISO-8859-1\""),
///     Some("iso-8859-1".to_string())
/// );
/// assert_eq!(charset_from_content_type("image/png"), None);
/// ```
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_lowercase())
        }
    })
}
