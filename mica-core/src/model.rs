use chrono::NaiveDate;
use serde::Serialize;

/// A navigation menu entry.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub title: String,
    pub url: String,
}

/// A static page with all derived metadata attached at ingestion time.
///
/// The empty slug denotes the site root (`home.md` maps to it); every other
/// page lives at `/{slug}/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub title: String,
    pub slug: String,
    /// Rendered HTML body.
    pub content: String,
    /// Canonical path, always with leading and trailing slash.
    pub path: String,
    /// Date anchors in document order, duplicates preserved.
    pub date_anchors: Vec<String>,
    /// Dates of the most recent month, in document order.
    pub current_month_dates: Vec<String>,
    /// Archived months grouped under years, newest first.
    pub archived_years: Vec<YearGroup>,
    /// Frequency-ranked subject words, populated only for configured pages.
    pub topics: Vec<Topic>,
}

/// A blog post: a page plus publication date, summary, word count and the
/// co-located assets it references.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    #[serde(flatten)]
    pub page: Page,
    /// Publication date; `None` when neither the filename nor the
    /// frontmatter carries one.
    pub date: Option<NaiveDate>,
    pub summary: String,
    pub word_count: usize,
    /// Referenced `assets/...` paths in document order.
    pub assets: Vec<String>,
}

/// One month of archived date anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup {
    pub year: i32,
    /// Full English month name ("January").
    pub month: String,
    /// Dates in original document order.
    pub dates: Vec<String>,
}

/// One year of archived months, months in newest-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGroup {
    pub year: i32,
    pub months: Vec<MonthGroup>,
}

/// A recurring content word with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub word: String,
    pub count: usize,
}

/// The complete site: configuration-derived metadata plus all ingested
/// content. Built once per build, never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Site {
    pub title: String,
    pub description: String,
    pub base_url: String,
    pub author: String,
    pub navigation: Vec<NavItem>,
    pub pages: Vec<Page>,
    pub posts: Vec<Post>,
}

/// Normalize a page path for comparison: `now`, `/now`, `now/` and `/now/`
/// all become `/now/`; the root stays `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
