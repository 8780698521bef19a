//! Page summaries: HTML-to-Markdown conversion plus size metrics.
//!
//! Converts a fetched page to Markdown with the `htmd` crate, runs a short
//! cleanup pipeline, and reports how much readable text the page carries.

mod cleanup;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use sitepages_shared::{Result, SitePagesError};

/// Tags whose content never counts as readable text.
const SKIP_TAGS: [&str; 7] = ["script", "style", "nav", "iframe", "noscript", "svg", "head"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Readable-text summary of one page.
#[derive(Debug, Clone)]
pub struct PageSummary {
    /// `<title>` text, falling back to the first Markdown H1.
    pub title: Option<String>,
    /// The cleaned Markdown body.
    pub markdown: String,
    /// Whitespace-separated words in the Markdown body.
    pub word_count: usize,
    /// Characters (not bytes) in the Markdown body.
    pub character_count: usize,
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Summarize an HTML page.
///
/// 1. Reads the `<title>` element
/// 2. Converts HTML → Markdown via `htmd`, skipping non-content tags
/// 3. Runs the cleanup pipeline
/// 4. Counts words and characters
#[instrument(skip(html), fields(html_len = html.len()))]
pub fn summarize(html: &str) -> Result<PageSummary> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    let raw_markdown = converter
        .convert(html)
        .map_err(|e| SitePagesError::Conversion(format!("htmd conversion failed: {e}")))?;

    let markdown = cleanup::run_pipeline(&raw_markdown);

    let title = extract_html_title(html).or_else(|| extract_title_from_markdown(&markdown));
    let word_count = markdown.split_whitespace().count();
    let character_count = markdown.chars().count();

    debug!(word_count, character_count, "summary complete");

    Ok(PageSummary {
        title,
        markdown,
        word_count,
        character_count,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn extract_html_title(html: &str) -> Option<String> {
    static TITLE_SEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("title").expect("valid selector"));

    let doc = Html::parse_document(html);
    doc.select(&TITLE_SEL)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Extract title from the first H1 in the Markdown text.
fn extract_title_from_markdown(md: &str) -> Option<String> {
    static H1_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").expect("valid regex"));

    H1_RE.captures(md).map(|c| c[1].trim().to_string())
}
