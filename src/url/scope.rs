//! Crawl-scope resolution for extracted link candidates

use crate::url::strip_query_and_fragment;
use crate::UrlError;
use url::{ParseError, Url};

/// How a link candidate relates to the page it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Relative reference, resolved against the source page
    Relative(Url),
    /// Absolute reference on the source page's scheme and host
    SameHost(Url),
    /// Opaque, non-hierarchical scheme (mailto:, news:, data:, javascript:)
    Opaque,
    /// Reference to another scheme or host
    OffScope(Url),
}

impl Resolution {
    /// Returns the URL to follow, or None if the link is out of scope
    pub fn into_kept(self) -> Option<Url> {
        match self {
            Self::Relative(url) | Self::SameHost(url) => Some(url),
            Self::Opaque | Self::OffScope(_) => None,
        }
    }

    /// Returns true if the link stays within the crawl
    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Relative(_) | Self::SameHost(_))
    }
}

/// Resolves a raw attribute value against its source page and classifies it
///
/// # Scope Rules
///
/// | Candidate | Result |
/// |-----------|--------|
/// | relative (`/y`, `y.html`, `../y`) | resolved, kept |
/// | opaque scheme (`mailto:`, `data:`) | discarded |
/// | absolute, same scheme + host | kept |
/// | absolute, anything else | discarded |
///
/// Network-path references (`//other.com/y`) have no scheme of their own, but
/// after resolution they are checked like absolute references so that a foreign
/// host never reaches the store.
///
/// Query and fragment are stripped from every resolved URL.
///
/// # Examples
///
/// ```
/// use site_mirror::url::{resolve_link, Resolution};
/// use url::Url;
///
/// let source = Url::parse("http://a.com/x").unwrap();
/// let kept = resolve_link("/y", &source).unwrap().into_kept().unwrap();
/// assert_eq!(kept.as_str(), "http://a.com/y");
///
/// let other = resolve_link("http://b.com/y", &source).unwrap();
/// assert!(!other.is_kept());
/// ```
pub fn resolve_link(candidate: &str, source: &Url) -> Result<Resolution, UrlError> {
    let candidate = candidate.trim();

    match Url::parse(candidate) {
        Ok(mut absolute) => {
            if absolute.cannot_be_a_base() {
                return Ok(Resolution::Opaque);
            }
            strip_query_and_fragment(&mut absolute);
            if same_origin(&absolute, source) {
                Ok(Resolution::SameHost(absolute))
            } else {
                Ok(Resolution::OffScope(absolute))
            }
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            let mut resolved = source
                .join(candidate)
                .map_err(|e| UrlError::Parse(format!("{}: {}", candidate, e)))?;
            strip_query_and_fragment(&mut resolved);
            if same_origin(&resolved, source) {
                Ok(Resolution::Relative(resolved))
            } else {
                Ok(Resolution::OffScope(resolved))
            }
        }
        Err(e) => Err(UrlError::Parse(format!("{}: {}", candidate, e))),
    }
}

/// Returns true if both URLs share scheme and host
///
/// The port is not compared: `http://a.com:8080/y` is on the same site as
/// `http://a.com/x`, and both store under the same host directory.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str()
}
