use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::{fmt, fs, io};

use chrono::NaiveDate;
use regex::Regex;

use crate::model::{Page, Post};
use crate::{anchors, assets, frontmatter, markdown, topics, wordcount};

// Post filenames may carry the publication date: 2026-01-27-my-post.md
static DATE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)\.md$").unwrap());

#[derive(Debug)]
pub enum ParseError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Frontmatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    InvalidDate {
        path: PathBuf,
        value: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io { path, source } => {
                write!(f, "reading {}: {}", path.display(), source)
            }
            ParseError::Frontmatter { path, source } => {
                write!(f, "invalid frontmatter in {}: {}", path.display(), source)
            }
            ParseError::InvalidDate { path, value } => {
                write!(f, "invalid date \"{}\" in {}", value, path.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io { source, .. } => Some(source),
            ParseError::Frontmatter { source, .. } => Some(source),
            ParseError::InvalidDate { .. } => None,
        }
    }
}

/// Parse a markdown file into a [`Page`].
///
/// The slug comes from the filename; `home.md` maps to the empty slug and
/// the root path. Date anchors are extracted from the raw markdown and
/// grouped; topics are computed only when `with_topics` is set.
pub fn parse_page(path: &Path, with_topics: bool) -> Result<Page, ParseError> {
    let (fm, body) = read_and_split(path)?;

    let mut slug = file_stem(path);
    if slug == "home" {
        slug.clear();
    }

    let page_path = if slug.is_empty() {
        "/".to_string()
    } else {
        format!("/{slug}/")
    };

    let date_anchors = anchors::extract_date_anchors(&body);
    let (current_month_dates, archived_months) = anchors::group_dates_by_month(&date_anchors);
    let archived_years = anchors::group_months_by_year(archived_months);

    let page_topics = if with_topics {
        topics::extract(&body)
    } else {
        Vec::new()
    };

    Ok(Page {
        title: fm.title,
        slug,
        content: markdown::to_html(&body),
        path: page_path,
        date_anchors,
        current_month_dates,
        archived_years,
        topics: page_topics,
    })
}

/// Parse a markdown file into a [`Post`].
///
/// The date comes from the filename prefix when present; a non-empty
/// frontmatter `date` overrides it. A date that matches the pattern but is
/// not a real calendar date is an error, not a silent skip.
pub fn parse_post(path: &Path) -> Result<Post, ParseError> {
    let (fm, body) = read_and_split(path)?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut slug = file_stem(path);
    let mut date = None;

    if let Some(caps) = DATE_FILENAME_RE.captures(&filename) {
        date = Some(parse_date(&caps[1]).ok_or_else(|| ParseError::InvalidDate {
            path: path.to_path_buf(),
            value: caps[1].to_string(),
        })?);
        slug = caps[2].to_string();
    }

    if let Some(fm_date) = fm.date.as_deref().filter(|d| !d.is_empty()) {
        date = Some(parse_date(fm_date).ok_or_else(|| ParseError::InvalidDate {
            path: path.to_path_buf(),
            value: fm_date.to_string(),
        })?);
    }

    Ok(Post {
        page: Page {
            title: fm.title,
            slug: slug.clone(),
            content: markdown::to_html(&body),
            path: format!("/blog/{slug}/"),
            ..Page::default()
        },
        date,
        summary: fm.summary,
        word_count: wordcount::count(&body),
        assets: assets::extract_asset_references(&body),
    })
}

fn read_and_split(path: &Path) -> Result<(frontmatter::Frontmatter, String), ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    frontmatter::extract(&content).map_err(|source| ParseError::Frontmatter {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_page_with_frontmatter() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "about.md",
            "---\ntitle: About Me\n---\n# About\n\nHello.",
        );

        let page = parse_page(&path, false).unwrap();
        assert_eq!(page.title, "About Me");
        assert_eq!(page.slug, "about");
        assert_eq!(page.path, "/about/");
        assert!(page.content.contains("Hello."));
        assert!(page.topics.is_empty());
    }

    #[test]
    fn home_page_maps_to_root() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "home.md", "---\ntitle: Home\n---\nWelcome.");

        let page = parse_page(&path, false).unwrap();
        assert_eq!(page.slug, "");
        assert_eq!(page.path, "/");
    }

    #[test]
    fn page_collects_and_groups_date_anchors() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "now.md",
            "---\ntitle: Now\n---\n## *2026-01-28*\n\nA.\n\n## *2025-12-24*\n\nB.",
        );

        let page = parse_page(&path, false).unwrap();
        assert_eq!(page.date_anchors, vec!["2026-01-28", "2025-12-24"]);
        assert_eq!(page.current_month_dates, vec!["2026-01-28"]);
        assert_eq!(page.archived_years.len(), 1);
        assert_eq!(page.archived_years[0].year, 2025);
    }

    #[test]
    fn page_topics_only_when_requested() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "now.md",
            "---\ntitle: Now\n---\ndocker docker docker kubernetes kubernetes",
        );

        let without = parse_page(&path, false).unwrap();
        assert!(without.topics.is_empty());

        let with = parse_page(&path, true).unwrap();
        assert_eq!(with.topics.len(), 2);
        assert_eq!(with.topics[0].word, "docker");
    }

    #[test]
    fn post_date_from_filename() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "2026-01-27-my-post.md",
            "---\ntitle: My Post\nsummary: Short.\n---\nBody words here.",
        );

        let post = parse_post(&path).unwrap();
        assert_eq!(post.page.slug, "my-post");
        assert_eq!(post.page.path, "/blog/my-post/");
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2026, 1, 27));
        assert_eq!(post.summary, "Short.");
        assert_eq!(post.word_count, 3);
    }

    #[test]
    fn frontmatter_date_overrides_filename() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "2026-01-27-my-post.md",
            "---\ntitle: T\ndate: 2026-02-01\n---\nBody.",
        );

        let post = parse_post(&path).unwrap();
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(post.page.slug, "my-post");
    }

    #[test]
    fn undated_post_has_no_date() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "evergreen.md", "---\ntitle: T\n---\nBody.");

        let post = parse_post(&path).unwrap();
        assert_eq!(post.date, None);
        assert_eq!(post.page.slug, "evergreen");
    }

    #[test]
    fn invalid_filename_date_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "2026-02-30-bad.md", "---\ntitle: T\n---\nBody.");

        let err = parse_post(&path).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
        assert!(err.to_string().contains("2026-02-30"));
    }

    #[test]
    fn invalid_frontmatter_date_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "post.md",
            "---\ntitle: T\ndate: not-a-date\n---\nBody.",
        );

        assert!(matches!(
            parse_post(&path).unwrap_err(),
            ParseError::InvalidDate { .. }
        ));
    }

    #[test]
    fn post_collects_asset_references() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "2026-01-27-pics.md",
            "---\ntitle: T\n---\n![a](assets/a.png)\n![b](assets/b.jpg)",
        );

        let post = parse_post(&path).unwrap();
        assert_eq!(post.assets, vec!["assets/a.png", "assets/b.jpg"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = parse_page(&dir.path().join("nope.md"), false).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
