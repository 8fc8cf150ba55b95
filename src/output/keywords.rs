//! Search word matching against page text

use crate::crawler::PageRecord;

/// Returns the search words found in a page's title or excerpt
///
/// Matching is a case-insensitive substring test. Words are returned in the
/// order given, keeping the caller's spelling.
///
/// # Example
///
/// ```
/// use sitecrawl::crawler::PageRecord;
/// use sitecrawl::output::keyword_matches;
///
/// let page = PageRecord {
///     url: "https://example.com/".to_string(),
///     title: "Python Tutorial".to_string(),
///     excerpt: "A short guide.".to_string(),
///     internal_links: vec![],
///     external_links: vec![],
///     image_urls: vec![],
/// };
/// let words = vec!["python".to_string(), "rust".to_string(), "Guide".to_string()];
/// assert_eq!(keyword_matches(&page, &words), vec!["python", "Guide"]);
/// ```
pub fn keyword_matches<'a>(page: &PageRecord, words: &'a [String]) -> Vec<&'a str> {
    if words.is_empty() {
        return Vec::new();
    }

    let text = format!("{} {}", page.title, page.excerpt).to_lowercase();
    words
        .iter()
        .map(String::as_str)
        .filter(|word| text.contains(&word.to_lowercase()))
        .collect()
}
