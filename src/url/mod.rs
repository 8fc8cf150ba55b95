//! URL handling module for sitecrawl
//!
//! This module provides the crawl key used for deduplication, the site key
//! used to keep the crawl on one host, and seed URL checking.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{parse_seed, site_key};
pub use normalize::{normalize_url, NormalizedUrl};

use url::Url;

/// Returns true if `url` lives on the site identified by `site`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitecrawl::url::is_same_site;
///
/// let url = Url::parse("https://site.com/about").unwrap();
/// assert!(is_same_site(&url, "site.com"));
/// assert!(!is_same_site(&url, "cdn.site.com"));
/// ```
pub fn is_same_site(url: &Url, site: &str) -> bool {
    site_key(url).as_deref() == Some(site)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_site_across_schemes() {
        let url = Url::parse("http://site.com/a").unwrap();
        assert!(is_same_site(&url, "site.com"));
    }

    #[test]
    fn test_other_host_is_not_same_site() {
        let url = Url::parse("https://external.com/b").unwrap();
        assert!(!is_same_site(&url, "site.com"));
    }

    #[test]
    fn test_port_is_part_of_site() {
        let url = Url::parse("http://127.0.0.1:9000/").unwrap();
        assert!(is_same_site(&url, "127.0.0.1:9000"));
        assert!(!is_same_site(&url, "127.0.0.1:9001"));
    }
}
