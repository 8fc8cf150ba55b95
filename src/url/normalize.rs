use crate::url::domain::site_key;
use crate::UrlError;
use std::fmt;
use url::Url;

/// Canonical key for a page: lowercase `host[:port]` followed by the path with
/// trailing slashes stripped
///
/// Scheme, query, and fragment take no part in the key, so
/// `https://Site.com/a/` and `http://site.com/a?x=1#top` are the same page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Builds the key for an already parsed URL
    pub fn from_url(url: &Url) -> Result<Self, UrlError> {
        let site = site_key(url).ok_or(UrlError::MissingDomain)?;
        let path = url.path().trim_end_matches('/');
        Ok(Self(format!("{}{}", site, path)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a URL string into its crawl key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Lowercase the host, keeping an explicit non-default port
/// 4. Strip every trailing slash from the path
/// 5. Drop scheme, query, and fragment
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize_url;
///
/// let key = normalize_url("https://BLOG.example.com/path/").unwrap();
/// assert_eq!(key.as_str(), "blog.example.com/path");
/// ```
pub fn normalize_url(url_str: &str) -> Result<NormalizedUrl, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    NormalizedUrl::from_url(&url)
}
