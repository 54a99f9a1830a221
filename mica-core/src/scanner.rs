use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use crate::config::Config;
use crate::model::{self, Site};
use crate::parser::{self, ParseError};

#[derive(Debug)]
pub enum ScanError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    MissingContentDir(PathBuf),
    MissingHomePage(PathBuf),
    Parse(ParseError),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Io { path, source } => {
                write!(f, "scanning {}: {}", path.display(), source)
            }
            ScanError::MissingContentDir(path) => {
                write!(f, "content directory {} does not exist", path.display())
            }
            ScanError::MissingHomePage(path) => {
                write!(
                    f,
                    "home.md not found in {} (the homepage is required)",
                    path.display()
                )
            }
            ScanError::Parse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Io { source, .. } => Some(source),
            ScanError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for ScanError {
    fn from(err: ParseError) -> Self {
        ScanError::Parse(err)
    }
}

/// Scan the content directory into a [`Site`].
///
/// Pages are markdown files at the top level of the content directory;
/// `home.md` is required and becomes the root page. Posts live in the
/// `blog/` subdirectory, which is optional. Files starting with `_` and
/// non-markdown files are skipped everywhere. Posts come back sorted
/// newest first, undated posts last.
pub fn scan_content(cfg: &Config) -> Result<Site, ScanError> {
    let content_dir = Path::new(&cfg.content_dir);
    if !content_dir.is_dir() {
        return Err(ScanError::MissingContentDir(content_dir.to_path_buf()));
    }
    if !content_dir.join("home.md").is_file() {
        return Err(ScanError::MissingHomePage(content_dir.to_path_buf()));
    }

    let description = if cfg.description.is_empty() {
        cfg.title.clone()
    } else {
        cfg.description.clone()
    };

    let mut site = Site {
        title: cfg.title.clone(),
        description,
        base_url: cfg.base_url.clone(),
        author: cfg.author.clone(),
        navigation: cfg.navigation.clone(),
        ..Site::default()
    };

    let topic_paths: Vec<String> = cfg
        .topic_pages
        .iter()
        .map(|p| model::normalize_path(p))
        .collect();

    for path in markdown_files(content_dir)? {
        let with_topics = topic_paths.contains(&page_path_for(&path));
        site.pages.push(parser::parse_page(&path, with_topics)?);
    }

    let blog_dir = content_dir.join("blog");
    if blog_dir.is_dir() {
        for path in markdown_files(&blog_dir)? {
            site.posts.push(parser::parse_post(&path)?);
        }
    }

    site.posts.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(site)
}

/// List the markdown files directly under `dir`, sorted by name.
/// Subdirectories, non-markdown files and `_`-prefixed files are skipped.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ScanError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().ends_with(".md") || name.starts_with('_') {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

// The canonical path a page file will get, used to match topic_pages
// before parsing.
fn page_path_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == "home" {
        "/".to_string()
    } else {
        format!("/{stem}/")
    }
}
