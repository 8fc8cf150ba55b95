use crate::UrlError;
use url::Url;

/// Returns the site identity of a URL: lowercase host plus any explicit,
/// non-default port
///
/// Two URLs belong to the same site when their site keys are equal; the scheme
/// is ignored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::site_key;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(site_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(site_key(&url), Some("localhost:8080".to_string()));
/// ```
pub fn site_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Parses and checks a seed URL before a crawl starts
///
/// The seed must be an absolute HTTP or HTTPS URL with a host.
pub fn parse_seed(seed: &str) -> Result<Url, UrlError> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}
