//! Page extraction
//!
//! Turns a fetched HTML document into a [`PageRecord`]:
//! - Title (first `<h1>`, falling back to `<title>`)
//! - Excerpt (first paragraph, preferring the `<main>` element)
//! - Same-site and off-site links from `<a href>`
//! - Image URLs from `<img src>`

use crate::crawler::registry::PageRecord;
use crate::url::site_key;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Turns a document into a page record
///
/// Implementations must be pure: the same document and URL always give the
/// same record.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, document: &str, page_url: &Url) -> PageRecord;
}

/// Default extractor backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl PageExtractor for HtmlExtractor {
    fn extract(&self, document: &str, page_url: &Url) -> PageRecord {
        extract_page(document, page_url)
    }
}

/// Extracts a page record from HTML
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags, resolved against `page_url`
/// - `<img src="...">` tags, resolved against `page_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// Links on the same host (and port) as `page_url` are internal; everything
/// else is external. Document order and duplicates are preserved.
///
/// # Example
///
/// ```
/// use sitecrawl::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><body><h1>Docs</h1><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let record = extract_page(html, &page_url);
/// assert_eq!(record.title, "Docs");
/// assert_eq!(record.internal_links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_page(html: &str, page_url: &Url) -> PageRecord {
    let document = Html::parse_document(html);

    let (internal_links, external_links) = split_links(extract_links(&document, page_url), page_url);

    PageRecord {
        url: page_url.to_string(),
        title: extract_title(&document),
        excerpt: extract_excerpt(&document),
        internal_links,
        external_links,
        image_urls: extract_images(&document, page_url),
    }
}

/// First `<h1>` text, else `<title>` text, else empty
fn extract_title(document: &Html) -> String {
    first_text(document, "h1")
        .or_else(|| first_text(document, "title"))
        .unwrap_or_default()
}

/// First paragraph inside `<main>`, else the first paragraph anywhere
fn extract_excerpt(document: &Html) -> String {
    let (Ok(main_selector), Ok(p_selector)) = (Selector::parse("main"), Selector::parse("p"))
    else {
        return String::new();
    };

    let in_main = document
        .select(&main_selector)
        .next()
        .and_then(|main| main.select(&p_selector).next());

    in_main
        .or_else(|| document.select(&p_selector).next())
        .map(element_text)
        .unwrap_or_default()
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}

fn extract_images(document: &Html, page_url: &Url) -> Vec<String> {
    let Ok(img_selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&img_selector)
        .filter_map(|element| element.value().attr("src"))
        .filter_map(|src| resolve_link(src, page_url))
        .map(String::from)
        .collect()
}

fn split_links(links: Vec<Url>, page_url: &Url) -> (Vec<String>, Vec<String>) {
    let page_site = site_key(page_url);
    let (internal, external): (Vec<Url>, Vec<Url>) = links
        .into_iter()
        .partition(|link| page_site.is_some() && site_key(link) == page_site);

    (
        internal.into_iter().map(String::from).collect(),
        external.into_iter().map(String::from).collect(),
    )
}

/// Resolves an href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url)
}
