use std::sync::LazyLock;

use regex::Regex;

// Markdown image references pointing into the reserved assets/ directory.
// Absolute URLs never match because the path must start with "assets/".
static ASSET_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((assets/[^)]+)\)").unwrap());

// src attributes in rendered HTML that still carry the assets/ prefix.
static ASSET_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(src=["'])assets/"#).unwrap());

/// Find all `assets/...` image references in markdown, in document order.
/// Duplicates are preserved; no matches yields an empty list.
pub fn extract_asset_references(markdown: &str) -> Vec<String> {
    ASSET_REF_RE
        .captures_iter(markdown)
        .map(|c| c[1].to_string())
        .collect()
}

/// Rewrite `src="assets/x"` to `src="x"` in rendered HTML. Used after the
/// build step copies a post's assets next to its output file. External URLs
/// are left untouched.
pub fn rewrite_asset_paths(html: &str) -> String {
    ASSET_SRC_RE.replace_all(html, "$1").into_owned()
}
