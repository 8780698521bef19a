//! Core domain types for page discovery results.

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// DiscoveryMethod
// ---------------------------------------------------------------------------

/// Which strategy produced a [`PageList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMethod {
    /// A sitemap declared in the site's `robots.txt`.
    Robots,
    /// The conventional `/sitemap.xml` location.
    Sitemap,
    /// Outbound links scraped from the homepage.
    Manual,
}

impl DiscoveryMethod {
    /// Wire name of the method, as it appears in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Robots => "robots",
            Self::Sitemap => "sitemap",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PageList
// ---------------------------------------------------------------------------

/// An ordered, de-duplicated list of discovered pages.
///
/// Serializes as the success payload:
/// `{ "url": ..., "type": ..., "pagesCount": ..., "pages": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageList {
    /// The sitemap or homepage URL the pages came from.
    pub url: String,
    /// The strategy that produced the pages.
    #[serde(rename = "type")]
    pub method: DiscoveryMethod,
    pages_count: usize,
    pages: Vec<String>,
}

impl PageList {
    /// Build a page list from pages that already went through link normalization.
    pub fn new(url: impl Into<String>, method: DiscoveryMethod, pages: Vec<String>) -> Self {
        Self {
            url: url.into(),
            method,
            pages_count: pages.len(),
            pages,
        }
    }

    /// Discovered page URLs, shortest first.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Number of discovered pages.
    pub fn count(&self) -> usize {
        self.pages_count
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DiscoveryFailure / DiscoveryResult
// ---------------------------------------------------------------------------

/// The fixed, caller-facing failure reasons.
///
/// `Display` yields the exact message clients match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryFailure {
    #[error("Missing url parameter")]
    MissingUrl,
    #[error("Invalid url")]
    InvalidUrl,
    /// The homepage was fetched but yielded no links at all.
    #[error("No links found")]
    NoLinksFound,
    /// Every strategy came back empty and the homepage could not be fetched.
    #[error("No sitemap found")]
    NoSitemapFound,
}

impl Serialize for DiscoveryFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one discovery request. Exactly one side is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryResult {
    Success(PageList),
    Failure(DiscoveryFailure),
}

impl DiscoveryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Wrap the result in the `{ "data": ... }` response envelope.
    pub fn into_envelope(self) -> Envelope {
        let data = match self {
            Self::Success(pages) => Payload::Pages(pages),
            Self::Failure(reason) => Payload::Message(reason),
        };
        Envelope { data }
    }
}

impl From<DiscoveryFailure> for DiscoveryResult {
    fn from(reason: DiscoveryFailure) -> Self {
        Self::Failure(reason)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Response envelope shared by the success and failure paths.
///
/// Callers tell the two apart by the shape of `data` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub data: Payload,
}

/// Either a page list object or a bare failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Pages(PageList),
    Message(DiscoveryFailure),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let pages = PageList::new(
            "https://site.com/sitemap-1.xml",
            DiscoveryMethod::Robots,
            vec!["https://site.com".into(), "https://site.com/about".into()],
        );
        let value = serde_json::to_value(DiscoveryResult::Success(pages).into_envelope())
            .expect("serialize");

        assert_eq!(
            value,
            json!({
                "data": {
                    "url": "https://site.com/sitemap-1.xml",
                    "type": "robots",
                    "pagesCount": 2,
                    "pages": ["https://site.com", "https://site.com/about"],
                }
            })
        );
    }

    #[test]
    fn failure_envelope_is_bare_string() {
        let value =
            serde_json::to_value(DiscoveryResult::from(DiscoveryFailure::InvalidUrl).into_envelope())
                .expect("serialize");
        assert_eq!(value, json!({ "data": "Invalid url" }));
    }

    #[test]
    fn failure_messages_are_exact() {
        assert_eq!(DiscoveryFailure::MissingUrl.to_string(), "Missing url parameter");
        assert_eq!(DiscoveryFailure::NoLinksFound.to_string(), "No links found");
        assert_eq!(DiscoveryFailure::NoSitemapFound.to_string(), "No sitemap found");
    }

    #[test]
    fn method_wire_names() {
        assert_eq!(DiscoveryMethod::Manual.to_string(), "manual");
        assert_eq!(
            serde_json::to_value(DiscoveryMethod::Sitemap).expect("serialize"),
            json!("sitemap")
        );
    }
}
