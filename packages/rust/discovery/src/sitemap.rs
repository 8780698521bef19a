//! XML sitemap fetching and parsing.
//!
//! Supports both standard sitemaps and sitemap index files:
//!
//! - **Standard sitemap**: `<urlset>` with `<url><loc>…</loc></url>` entries
//! - **Sitemap index**: `<sitemapindex>` with `<sitemap><loc>…</loc></sitemap>`
//!   entries pointing at child sitemaps, read one level deep
//!
//! Gzip-compressed documents are detected by their magic bytes and inflated
//! before parsing.

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, info, instrument};

use sitepages_shared::{Result, SitePagesError};

use crate::fetch::Fetcher;
use crate::links::normalize_links;

/// Hard timeout for every sitemap request.
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(5);

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Page URLs from a `<urlset>`, in document order.
    UrlSet(Vec<String>),
    /// Child sitemap URLs from a `<sitemapindex>`, in document order.
    Index(Vec<String>),
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Fetches sitemaps and turns them into normalized page lists.
#[derive(Debug, Clone)]
pub struct SitemapReader {
    fetcher: Fetcher,
    timeout: Duration,
    max_child_sitemaps: usize,
}

impl SitemapReader {
    pub fn new(fetcher: Fetcher, timeout: Duration, max_child_sitemaps: usize) -> Self {
        Self {
            fetcher,
            timeout,
            max_child_sitemaps,
        }
    }

    /// Read the pages listed by the sitemap at `url`.
    ///
    /// Fetch failures, timeouts, and malformed XML all produce an empty list.
    /// An index is expanded by reading each child sitemap in order; indexes
    /// nested inside an index are skipped.
    #[instrument(skip(self), fields(timeout_ms = self.timeout.as_millis()))]
    pub async fn read(&self, url: &str) -> Vec<String> {
        let locs = match self.fetch_document(url).await {
            Ok(SitemapDocument::UrlSet(locs)) => locs,
            Ok(SitemapDocument::Index(children)) => self.read_children(children).await,
            Err(e) => {
                debug!(error = %e, "sitemap unavailable");
                return Vec::new();
            }
        };

        let pages = normalize_links(locs);
        info!(pages = pages.len(), "sitemap read");
        pages
    }

    async fn read_children(&self, children: Vec<String>) -> Vec<String> {
        if children.len() > self.max_child_sitemaps {
            debug!(
                children = children.len(),
                max = self.max_child_sitemaps,
                "sitemap index truncated"
            );
        }

        let mut locs = Vec::new();
        for child in children.into_iter().take(self.max_child_sitemaps) {
            match self.fetch_document(&child).await {
                Ok(SitemapDocument::UrlSet(child_locs)) => locs.extend(child_locs),
                Ok(SitemapDocument::Index(_)) => {
                    debug!(%child, "nested sitemap index skipped");
                }
                Err(e) => debug!(%child, error = %e, "child sitemap unavailable"),
            }
        }
        locs
    }

    async fn fetch_document(&self, url: &str) -> Result<SitemapDocument> {
        let body = self.fetcher.get_bytes(url, self.timeout).await?;
        let xml = maybe_gunzip(body, self.fetcher.max_response_bytes())?;
        parse_sitemap(&xml)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Inflate gzip bodies; pass anything else through.
///
/// Inflated output longer than `limit` bytes is an error.
fn maybe_gunzip(body: Vec<u8>, limit: u64) -> Result<Vec<u8>> {
    if body.len() < 2 || body[0] != 0x1F || body[1] != 0x8B {
        return Ok(body);
    }

    let mut out = Vec::new();
    GzDecoder::new(body.as_slice())
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| SitePagesError::parse(format!("failed to gunzip sitemap: {e}")))?;

    if out.len() as u64 > limit {
        return Err(SitePagesError::parse(format!(
            "gzipped sitemap inflates past {limit} bytes"
        )));
    }
    Ok(out)
}

/// Parse sitemap XML, collecting each `<loc>` that sits directly inside a
/// `<url>` or `<sitemap>` entry.
///
/// Extension elements such as `<image:loc>` are ignored.
pub fn parse_sitemap(xml: &[u8]) -> Result<SitemapDocument> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut is_index = false;
    let mut locs = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if stack.is_empty() && name == b"sitemapindex" {
                    is_index = true;
                }
                if name == b"loc" && is_entry(stack.last()) {
                    current = Some(String::new());
                }
                stack.push(name);
            }
            Ok(Event::Text(e)) => {
                if let Some(loc) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| SitePagesError::parse(format!("bad <loc> text: {e}")))?;
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(loc) = current.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let closed = stack.pop();
                if closed.as_deref() == Some(b"loc".as_slice()) {
                    if let Some(loc) = current.take() {
                        if !loc.trim().is_empty() {
                            locs.push(loc);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SitePagesError::parse(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if is_index {
        Ok(SitemapDocument::Index(locs))
    } else {
        Ok(SitemapDocument::UrlSet(locs))
    }
}

fn is_entry(parent: Option<&Vec<u8>>) -> bool {
    matches!(parent.map(Vec::as_slice), Some(b"url" | b"sitemap"))
}
