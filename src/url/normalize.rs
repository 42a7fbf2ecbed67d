use crate::UrlError;
use url::Url;

/// Normalizes a URL into the form used as a crawl key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject URLs without a host (`mailto:`, `data:`, `file:///...`)
/// 3. Remove the query string (everything after ?)
/// 4. Remove the fragment (everything after #)
///
/// Scheme and host lowercasing, dot-segment removal and percent-encoding are
/// handled by the `url` parser itself.
///
/// # Examples
///
/// ```
/// use site_mirror::url::normalize_url;
///
/// let url = normalize_url("http://A.COM/p?x=1#f").unwrap();
/// assert_eq!(url.as_str(), "http://a.com/p");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url =
        Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    strip_query_and_fragment(&mut url);
    Ok(url)
}

/// Removes the query string and fragment in place
///
/// `page?x=1`, `page?x=2` and `page#frag` all collapse to `page`, both for
/// deduplication and for storage.
pub fn strip_query_and_fragment(url: &mut Url) {
    url.set_query(None);
    url.set_fragment(None);
}

/// Returns the host directory name used under the storage root
///
/// The port is not part of the segment: `http://a.com:8080/` stores under `a.com`.
pub fn host_segment(url: &Url) -> Result<String, UrlError> {
    url.host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))
}
