//! CSV report generation
//!
//! One row per recorded page, in key order. List columns are joined with `;`.

use crate::crawler::VisitedSet;
use crate::output::keywords::keyword_matches;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names of the CSV report
pub const REPORT_HEADER: [&str; 10] = [
    "page_url",
    "title",
    "excerpt",
    "internal_link_count",
    "external_link_count",
    "image_count",
    "internal_links",
    "external_links",
    "image_urls",
    "search_word_matches",
];

/// Writes the CSV report to `path`
///
/// # Returns
///
/// * `Ok(usize)` - Number of page rows written
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_csv_report(
    visited: &VisitedSet,
    search_words: &[String],
    path: &Path,
) -> OutputResult<usize> {
    let file = File::create(path)?;
    render_csv_report(visited, search_words, file)
}

/// Writes the CSV report to any writer
pub fn render_csv_report<W: Write>(
    visited: &VisitedSet,
    search_words: &[String],
    writer: W,
) -> OutputResult<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(REPORT_HEADER)?;

    let mut rows = 0;
    for (_, page) in visited.records() {
        let internal_count = page.internal_links.len().to_string();
        let external_count = page.external_links.len().to_string();
        let image_count = page.image_urls.len().to_string();
        let internal_links = page.internal_links.join(";");
        let external_links = page.external_links.join(";");
        let image_urls = page.image_urls.join(";");
        let matches = keyword_matches(page, search_words).join(";");

        writer.write_record([
            page.url.as_str(),
            page.title.as_str(),
            page.excerpt.as_str(),
            internal_count.as_str(),
            external_count.as_str(),
            image_count.as_str(),
            internal_links.as_str(),
            external_links.as_str(),
            image_urls.as_str(),
            matches.as_str(),
        ])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
