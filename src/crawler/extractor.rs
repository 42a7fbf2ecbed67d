//! HTML link extraction
//!
//! This module parses fetched HTML and collects every resource it references:
//! - `<a href>` anchors
//! - `<img src>` images
//! - `<script src>` scripts
//! - `<style src>` style sources
//! - `<link href>` stylesheets, icons and other linked resources
//!
//! Each candidate is resolved against the page URL, stripped of its query and
//! fragment, and filtered down to the page's own scheme and host.

use crate::crawler::resource::{Resource, DEFAULT_CHARSET};
use crate::url::{resolve_link, Resolution};
use encoding_rs::Encoding;
use scraper::{Html, Selector};
use std::borrow::Cow;
use std::collections::HashSet;
use url::Url;

/// Element selectors and the attribute holding the link, in query order
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("style[src]", "src"),
    ("link[href]", "href"),
];

/// In-scope links found on one page, in discovery order
///
/// A finite, single-pass sequence: iterate it to stream the URLs, or collect it.
#[derive(Debug)]
pub struct Links {
    kept: std::vec::IntoIter<Url>,
    discarded: usize,
}

impl Links {
    fn empty() -> Self {
        Self {
            kept: Vec::new().into_iter(),
            discarded: 0,
        }
    }

    /// Number of candidates dropped as malformed or out of scope
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl Iterator for Links {
    type Item = Url;

    fn next(&mut self) -> Option<Url> {
        self.kept.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.kept.size_hint()
    }
}

impl ExactSizeIterator for Links {}

/// Extracts crawlable links from fetched HTML resources
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    fallback_charset: String,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self {
            fallback_charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `charset` for resources whose declared charset cannot be decoded
    pub fn with_fallback_charset(charset: impl Into<String>) -> Self {
        Self {
            fallback_charset: charset.into().to_lowercase(),
        }
    }

    /// Extracts the in-scope links of a fetched resource
    ///
    /// # Example
    ///
    /// ```
    /// use site_mirror::crawler::{LinkExtractor, Resource};
    /// use url::Url;
    ///
    /// let html = r#"<a href="/about.html">About</a><img src="http://other.test/logo.png">"#;
    /// let page = Resource::fetched(Url::parse("http://x.test/").unwrap(), html.into(), "utf-8");
    ///
    /// let links: Vec<Url> = LinkExtractor::new().extract_links(&page).collect();
    /// assert_eq!(links, vec![Url::parse("http://x.test/about.html").unwrap()]);
    /// ```
    pub fn extract_links(&self, resource: &Resource) -> Links {
        let html = match decode_body(resource.body(), resource.charset()) {
            Some(html) => html,
            None => {
                tracing::debug!(
                    "Unsupported charset '{}' for {}, decoding as {}",
                    resource.charset(),
                    resource.url(),
                    self.fallback_charset
                );
                match decode_body(resource.body(), &self.fallback_charset) {
                    Some(html) => html,
                    None => String::from_utf8_lossy(resource.body()),
                }
            }
        };

        self.extract_from_html(&html, resource.url())
    }

    /// Extracts the in-scope links of an already decoded HTML document
    pub fn extract_from_html(&self, html: &str, source: &Url) -> Links {
        if html.trim().is_empty() {
            return Links::empty();
        }

        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut discarded = 0;

        for (selector_str, attribute) in LINK_SOURCES {
            let selector = match Selector::parse(selector_str) {
                Ok(selector) => selector,
                Err(e) => {
                    tracing::warn!("\t* {} may be broken; {:?}", source, e);
                    continue;
                }
            };

            for element in document.select(&selector) {
                let Some(value) = element.value().attr(attribute) else {
                    continue;
                };

                match resolve_link(value, source).map(Resolution::into_kept) {
                    Ok(Some(url)) => {
                        tracing::debug!("\t+ {}", url);
                        if seen.insert(url.clone()) {
                            kept.push(url);
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("\t- {}", value);
                        discarded += 1;
                    }
                    Err(e) => {
                        tracing::warn!("\t* {} has a malformed link: {}", source, e);
                        discarded += 1;
                    }
                }
            }
        }

        Links {
            kept: kept.into_iter(),
            discarded,
        }
    }
}

/// Decodes a body with the given charset label, or None if the label is unknown
///
/// Labels follow the WHATWG Encoding Standard, so `iso-8859-1` and `us-ascii`
/// decode as windows-1252. A byte order mark overrides the label.
fn decode_body<'a>(body: &'a [u8], charset: &str) -> Option<Cow<'a, str>> {
    let encoding = Encoding::for_label(charset.trim().as_bytes())?;
    let (text, _, _) = encoding.decode(body);
    Some(text)
}
