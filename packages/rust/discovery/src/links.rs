//! Canonical ordering for discovered page lists.

use std::collections::HashSet;

/// Trim, de-duplicate, and sort links shortest first.
///
/// Duplicates collapse onto their first occurrence, and the length sort is
/// stable, so links of equal length keep their first-occurrence order. Running
/// the output through again returns it unchanged.
pub fn normalize_links<I, S>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out: Vec<String> = links
        .into_iter()
        .map(|link| link.as_ref().trim().to_string())
        .filter(|link| seen.insert(link.clone()))
        .collect();

    out.sort_by_key(String::len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_variants() {
        let links = normalize_links(["https://a.com/x", " https://a.com/x ", "https://a.com/x"]);
        assert_eq!(links, vec!["https://a.com/x"]);
    }

    #[test]
    fn shortest_first() {
        let links = normalize_links(["https://a.com/longer-path", "https://a.com"]);
        assert_eq!(links, vec!["https://a.com", "https://a.com/longer-path"]);
    }

    #[test]
    fn equal_lengths_keep_first_occurrence_order() {
        let links = normalize_links(["https://a.com/b", "https://a.com/a", "https://a.com/b"]);
        assert_eq!(links, vec!["https://a.com/b", "https://a.com/a"]);
    }

    #[test]
    fn strips_line_breaks_from_sitemap_text() {
        let links = normalize_links(["\r\n  https://a.com/page\n"]);
        assert_eq!(links, vec!["https://a.com/page"]);
    }

    #[test]
    fn idempotent() {
        let once = normalize_links([
            "https://a.com/zz",
            " https://a.com ",
            "https://a.com/aa",
            "https://a.com/some/deeper/page",
        ]);
        let twice = normalize_links(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input() {
        let links = normalize_links(Vec::<String>::new());
        assert!(links.is_empty());
    }
}
