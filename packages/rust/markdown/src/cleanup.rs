//! Post-conversion cleanup for summary Markdown.
//!
//! Each pass is a function `&str -> String` applied in sequence, so the
//! character count reflects readable text rather than converter artifacts.

use std::sync::LazyLock;

use regex::Regex;

/// Run the cleanup passes on raw Markdown text.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = strip_leftover_html(md);
    result = trim_line_ends(&result);
    result = clean_blank_lines(&result);
    result.trim().to_string()
}

/// Remove HTML comments and tags the converter passed through verbatim.
fn strip_leftover_html(md: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9-]*(\s[^<>]*)?/?>").expect("valid regex"));

    let without_comments = COMMENT_RE.replace_all(md, "");
    TAG_RE.replace_all(&without_comments, "").into_owned()
}

fn trim_line_ends(md: &str) -> String {
    md.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

/// Collapse runs of three or more newlines into a single blank line.
fn clean_blank_lines(md: &str) -> String {
    static BLANKS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    BLANKS_RE.replace_all(md, "\n\n").into_owned()
}
