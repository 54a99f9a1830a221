use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::{self, Page, Site};

/// Maximum number of items in the rendered feed.
pub const FEED_LIMIT: usize = 20;

// Rendered headings whose id is a date, e.g.
// <h2 id="2026-01-27"><a href="#2026-01-27">2026-01-27</a></h2>
static DATE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<h[1-6] id="(\d{4}-\d{2}-\d{2})">.*?</h[1-6]>"#).unwrap());

/// One entry of the aggregated feed: either a whole blog post or a single
/// date-anchored section of a feed page.
#[derive(Debug, Clone)]
pub enum FeedItem {
    Post {
        title: String,
        slug: String,
        content: String,
        date: NaiveDate,
    },
    DateSection {
        page_title: String,
        page_path: String,
        anchor: String,
        content: String,
        date: NaiveDate,
    },
}

impl FeedItem {
    pub fn title(&self) -> String {
        match self {
            FeedItem::Post { title, .. } => title.clone(),
            FeedItem::DateSection {
                page_title, date, ..
            } => {
                format!("{page_title} - {}", date.format("%B %-d, %Y"))
            }
        }
    }

    pub fn link(&self, base_url: &str) -> String {
        match self {
            FeedItem::Post { slug, .. } => format!("{base_url}/blog/{slug}/"),
            FeedItem::DateSection {
                page_path, anchor, ..
            } => format!("{base_url}{page_path}#{anchor}"),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            FeedItem::Post { content, .. } => content,
            FeedItem::DateSection { content, .. } => content,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            FeedItem::Post { date, .. } => *date,
            FeedItem::DateSection { date, .. } => *date,
        }
    }
}

/// A date-anchored slice of rendered page HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSection {
    pub anchor: String,
    pub content: String,
}

/// Slice rendered HTML into date-anchored sections. A section runs from its
/// date heading to the next date heading (or the end of the document);
/// sections with no content between headings are skipped.
pub fn extract_date_sections(html: &str) -> Vec<DateSection> {
    let matches: Vec<_> = DATE_HEADER_RE.captures_iter(html).collect();
    let mut sections = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let anchor = caps[1].to_string();
        let start = caps.get(0).map(|m| m.end()).unwrap_or_default();
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(html.len());

        let content = html[start..end].trim();
        if content.is_empty() {
            continue;
        }

        sections.push(DateSection {
            anchor,
            content: content.to_string(),
        });
    }

    sections
}

/// Aggregate posts and feed-page date sections into a single list, newest
/// first, capped at [`FEED_LIMIT`] items. Undated posts sort as epoch.
/// Feed pages that do not exist are skipped, as are sections whose anchor
/// fails date parsing. Returns `None` when nothing qualifies, signalling
/// the caller to skip feed output entirely.
pub fn collect_feed_items(site: &Site, feed_pages: &[String]) -> Option<Vec<FeedItem>> {
    let mut items: Vec<FeedItem> = site
        .posts
        .iter()
        .map(|post| FeedItem::Post {
            title: post.page.title.clone(),
            slug: post.page.slug.clone(),
            content: post.page.content.clone(),
            date: post.date.unwrap_or_default(),
        })
        .collect();

    for path in feed_pages {
        let Some(page) = find_page_by_path(&site.pages, path) else {
            continue;
        };

        for section in extract_date_sections(&page.content) {
            let Ok(date) = NaiveDate::parse_from_str(&section.anchor, "%Y-%m-%d") else {
                continue;
            };
            items.push(FeedItem::DateSection {
                page_title: page.title.clone(),
                page_path: page.path.clone(),
                anchor: section.anchor,
                content: section.content,
                date,
            });
        }
    }

    if items.is_empty() {
        return None;
    }

    items.sort_by(|a, b| b.date().cmp(&a.date()));
    items.truncate(FEED_LIMIT);
    Some(items)
}

/// Look up a page by path, tolerant of missing leading or trailing slashes.
pub fn find_page_by_path<'a>(pages: &'a [Page], path: &str) -> Option<&'a Page> {
    let wanted = model::normalize_path(path);
    pages.iter().find(|p| p.path == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;

    fn page(title: &str, path: &str, content: &str) -> Page {
        Page {
            title: title.to_string(),
            path: path.to_string(),
            content: content.to_string(),
            ..Page::default()
        }
    }

    fn post(title: &str, slug: &str, date: Option<(i32, u32, u32)>) -> Post {
        Post {
            page: Page {
                title: title.to_string(),
                slug: slug.to_string(),
                content: format!("<p>{title}</p>"),
                path: format!("/blog/{slug}/"),
                ..Page::default()
            },
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            summary: String::new(),
            word_count: 0,
            assets: Vec::new(),
        }
    }

    #[test]
    fn slices_html_into_date_sections() {
        let html = concat!(
            r##"<h2 id="2026-01-28"><a href="#2026-01-28">2026-01-28</a></h2>"##,
            "\n<p>Today.</p>\n",
            r##"<h2 id="2026-01-25"><a href="#2026-01-25">2026-01-25</a></h2>"##,
            "\n<p>Earlier.</p>\n",
        );

        let sections = extract_date_sections(html);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].anchor, "2026-01-28");
        assert_eq!(sections[0].content, "<p>Today.</p>");
        assert_eq!(sections[1].anchor, "2026-01-25");
        assert_eq!(sections[1].content, "<p>Earlier.</p>");
    }

    #[test]
    fn skips_empty_sections() {
        let html = concat!(
            r#"<h2 id="2026-01-28">a</h2>"#,
            r#"<h2 id="2026-01-25">b</h2>"#,
            "<p>Only this one has content.</p>",
        );

        let sections = extract_date_sections(html);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].anchor, "2026-01-25");
    }

    #[test]
    fn ignores_non_date_headings() {
        let html = r##"<h2 id="my-section"><a href="#my-section">My Section</a></h2><p>x</p>"##;
        assert!(extract_date_sections(html).is_empty());
    }

    #[test]
    fn posts_only_feed_sorted_newest_first() {
        let site = Site {
            posts: vec![
                post("Older", "older", Some((2026, 1, 26))),
                post("Newer", "newer", Some((2026, 1, 27))),
            ],
            ..Site::default()
        };

        let items = collect_feed_items(&site, &[]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title(), "Newer");
        assert_eq!(items[1].title(), "Older");
    }

    #[test]
    fn interleaves_posts_and_date_sections() {
        let html = concat!(
            r#"<h2 id="2026-01-28">x</h2><p>Today.</p>"#,
            r#"<h2 id="2026-01-25">x</h2><p>Earlier.</p>"#,
        );
        let site = Site {
            pages: vec![page("Moments", "/moments/", html)],
            posts: vec![post("Blog Post", "blog-post", Some((2026, 1, 27)))],
            ..Site::default()
        };

        let items = collect_feed_items(&site, &["/moments/".to_string()]).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title(), "Moments - January 28, 2026");
        assert_eq!(items[1].title(), "Blog Post");
        assert_eq!(items[2].title(), "Moments - January 25, 2026");
    }

    #[test]
    fn missing_feed_page_is_skipped() {
        let site = Site::default();
        assert!(collect_feed_items(&site, &["/nonexistent/".to_string()]).is_none());
    }

    #[test]
    fn feed_page_lookup_tolerates_slash_variants() {
        let html = r#"<h2 id="2026-01-28">x</h2><p>Entry.</p>"#;
        let site = Site {
            pages: vec![page("Moments", "/moments/", html)],
            ..Site::default()
        };

        for variant in ["moments", "/moments", "moments/", "/moments/"] {
            let items = collect_feed_items(&site, &[variant.to_string()]).unwrap();
            assert_eq!(items.len(), 1, "variant {variant}");
        }
    }

    #[test]
    fn caps_at_feed_limit() {
        let posts = (1..=25)
            .map(|i| post(&format!("Post {i}"), &format!("post-{i}"), Some((2026, 1, i))))
            .collect();
        let site = Site {
            posts,
            ..Site::default()
        };

        let items = collect_feed_items(&site, &[]).unwrap();
        assert_eq!(items.len(), FEED_LIMIT);
        assert_eq!(items[0].title(), "Post 25");
    }

    #[test]
    fn undated_posts_sort_last() {
        let site = Site {
            posts: vec![
                post("Undated", "undated", None),
                post("Dated", "dated", Some((2026, 1, 1))),
            ],
            ..Site::default()
        };

        let items = collect_feed_items(&site, &[]).unwrap();
        assert_eq!(items[0].title(), "Dated");
        assert_eq!(items[1].title(), "Undated");
    }

    #[test]
    fn links_for_both_item_kinds() {
        let item = FeedItem::Post {
            title: "T".into(),
            slug: "my-post".into(),
            content: String::new(),
            date: NaiveDate::default(),
        };
        assert_eq!(item.link("https://example.com"), "https://example.com/blog/my-post/");

        let section = FeedItem::DateSection {
            page_title: "Moments".into(),
            page_path: "/moments/".into(),
            anchor: "2026-01-28".into(),
            content: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
        };
        assert_eq!(
            section.link("https://example.com"),
            "https://example.com/moments/#2026-01-28"
        );
    }

    #[test]
    fn empty_site_yields_no_feed() {
        assert!(collect_feed_items(&Site::default(), &[]).is_none());
    }
}
