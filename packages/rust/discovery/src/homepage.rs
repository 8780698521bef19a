//! Homepage fetching and absolute link extraction.

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

use sitepages_shared::{Result, SitePagesError};

use crate::fetch::Fetcher;
use crate::links::normalize_links;
use crate::site_url::SiteUrl;

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// Scrapes absolute outbound links from a site's homepage.
#[derive(Debug, Clone)]
pub struct HomepageLinkExtractor {
    fetcher: Fetcher,
    timeout: Duration,
}

impl HomepageLinkExtractor {
    pub fn new(fetcher: Fetcher, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Fetch the raw HTML of `url`. Non-200 answers and empty bodies are errors.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let html = self.fetcher.get_text(url, self.timeout).await?;
        if html.is_empty() {
            return Err(SitePagesError::Upstream(format!("{url}: empty body")));
        }
        Ok(html)
    }

    /// Collect the root plus every absolute anchor target on the homepage.
    ///
    /// Returns `None` when the homepage could not be fetched at all, so the
    /// caller can tell "unreachable" apart from "nothing linked".
    #[instrument(skip(self), fields(root = %root))]
    pub async fn extract(&self, root: &SiteUrl) -> Option<Vec<String>> {
        let html = match self.fetch_html(root.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                debug!(error = %e, "homepage unavailable");
                return None;
            }
        };

        let mut links = vec![root.as_str().to_string()];
        links.extend(absolute_links(&html));

        let links = normalize_links(links);
        info!(links = links.len(), "homepage links extracted");
        Some(links)
    }
}

/// Every `href` starting with `http`, in document order.
///
/// html5ever recovers from malformed markup, so broken pages still yield
/// whatever anchors were parsed. Relative links are skipped.
pub fn absolute_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&ANCHOR_SEL)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .map(str::to_string)
        .collect()
}
