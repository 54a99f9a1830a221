use std::sync::LazyLock;

use regex::Regex;

use crate::markdown;

// Fenced code blocks render as <pre>...</pre>; their contents are not prose.
static PRE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<pre>.*?</pre>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Count the prose words in markdown content.
///
/// The content is rendered to HTML first, code blocks are removed, remaining
/// tags are replaced with spaces so adjacent words do not fuse, and the rest
/// is counted as whitespace-separated tokens. Inline code survives because
/// `<code>` spans outside `<pre>` only lose their tags, not their text.
pub fn count(content: &str) -> usize {
    let html = markdown::to_html(content);
    let without_code = PRE_RE.replace_all(&html, "");
    let text = TAG_RE.replace_all(&without_code, " ");
    text.split_whitespace().count()
}
