//! Canonicalization of user-supplied website strings.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use sitepages_shared::{Result, SitePagesError};

/// Matches an explicit `http://` or `https://` prefix.
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme regex"));

/// A validated absolute site root, e.g. `https://example.com`.
///
/// The string form keeps exactly what the user asked for (minus one trailing
/// slash); [`Url`] would otherwise append `/` to an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl {
    raw: String,
    parsed: Url,
}

impl SiteUrl {
    /// Normalize a raw website string into a site root.
    ///
    /// 1. Prepend `https://` when no http(s) scheme is present
    /// 2. Strip exactly one trailing `/`
    /// 3. Parse as a URL
    /// 4. Require a hostname with at least two dot-separated labels
    pub fn parse(input: &str) -> Result<Self> {
        let mut raw = if SCHEME_RE.is_match(input) {
            input.to_string()
        } else {
            format!("https://{input}")
        };
        if raw.ends_with('/') {
            raw.pop();
        }

        let parsed = Url::parse(&raw)
            .map_err(|e| SitePagesError::invalid_input(format!("{raw}: {e}")))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| SitePagesError::invalid_input(format!("{raw}: URL has no host")))?;
        if host.split('.').count() < 2 {
            return Err(SitePagesError::invalid_input(format!(
                "{raw}: hostname has no top-level domain"
            )));
        }

        Ok(Self { raw, parsed })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub(crate) fn url(&self) -> &Url {
        &self.parsed
    }

    /// `{root}/robots.txt`
    pub fn robots_txt_url(&self) -> String {
        format!("{}/robots.txt", self.raw)
    }

    /// `{root}/sitemap.xml`
    pub fn sitemap_xml_url(&self) -> String {
        format!("{}/sitemap.xml", self.raw)
    }
}

impl std::fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https() {
        let site = SiteUrl::parse("example.com").unwrap();
        assert_eq!(site.as_str(), "https://example.com");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let site = SiteUrl::parse("https://example.com/").unwrap();
        assert_eq!(site.as_str(), "https://example.com");
    }

    #[test]
    fn only_one_trailing_slash_is_stripped() {
        let site = SiteUrl::parse("https://example.com/docs//").unwrap();
        assert_eq!(site.as_str(), "https://example.com/docs/");
    }

    #[test]
    fn http_scheme_is_kept() {
        let site = SiteUrl::parse("http://example.com").unwrap();
        assert_eq!(site.as_str(), "http://example.com");
        assert_eq!(site.url().scheme(), "http");
    }

    #[test]
    fn uppercase_scheme_is_not_doubled() {
        let site = SiteUrl::parse("HTTPS://Example.com").unwrap();
        assert_eq!(site.url().host_str(), Some("example.com"));
    }

    #[test]
    fn single_label_host_is_rejected() {
        let err = SiteUrl::parse("localhost").unwrap_err();
        assert!(matches!(err, SitePagesError::InvalidInput { .. }));

        assert!(SiteUrl::parse("http://intranet/").is_err());
    }

    #[test]
    fn unparsable_input_is_rejected() {
        assert!(SiteUrl::parse("exa mple.com").is_err());
        assert!(SiteUrl::parse("https://").is_err());
    }

    #[test]
    fn well_known_paths() {
        let site = SiteUrl::parse("site.com").unwrap();
        assert_eq!(site.robots_txt_url(), "https://site.com/robots.txt");
        assert_eq!(site.sitemap_xml_url(), "https://site.com/sitemap.xml");
    }

    #[test]
    fn ip_host_with_port_is_accepted() {
        let site = SiteUrl::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(site.as_str(), "http://127.0.0.1:8080");
    }
}
