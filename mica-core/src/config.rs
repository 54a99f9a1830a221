use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use serde::Deserialize;

use crate::model::NavItem;

/// Resolved site configuration with defaults and overrides applied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub title: String,
    pub description: String,
    pub base_url: String,
    pub author: String,
    pub content_dir: String,
    pub output_dir: String,
    pub assets_dir: String,
    pub navigation: Vec<NavItem>,
    /// Paths of pages whose date sections feed into the RSS feed.
    pub feed_pages: Vec<String>,
    /// Paths of pages that get topic extraction.
    pub topic_pages: Vec<String>,
}

/// CLI flag overrides applied on top of the file values.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub content_dir: Option<String>,
    pub output_dir: Option<String>,
    pub assets_dir: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Yaml { path: PathBuf, source: serde_yaml::Error },
    MissingField(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "reading config {}: {}", path.display(), source)
            }
            ConfigError::Yaml { path, source } => {
                write!(f, "invalid config {}: {}", path.display(), source)
            }
            ConfigError::MissingField(field) => {
                write!(f, "config: missing required field '{field}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Yaml { source, .. } => Some(source),
            ConfigError::MissingField(_) => None,
        }
    }
}

// Mirror of the on-disk YAML layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlConfig {
    site: SiteSection,
    build: BuildSection,
    navigation: Vec<NavEntry>,
    #[serde(rename = "feedPages")]
    feed_pages: Vec<String>,
    #[serde(rename = "topicPages")]
    topic_pages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SiteSection {
    title: String,
    description: String,
    #[serde(rename = "baseURL")]
    base_url: String,
    author: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BuildSection {
    content: String,
    output: String,
    assets: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NavEntry {
    title: String,
    url: String,
}

/// Read configuration from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    load_with_options(path, Options::default())
}

/// Read configuration from a YAML file, then apply CLI overrides.
///
/// `site.title` and `site.baseURL` are required; the build directories
/// default to `content`, `public` and `assets`.
pub fn load_with_options(path: &Path, opts: Options) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let yc: YamlConfig = serde_yaml::from_str(&data).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    if yc.site.title.is_empty() {
        return Err(ConfigError::MissingField("site.title"));
    }
    if yc.site.base_url.is_empty() {
        return Err(ConfigError::MissingField("site.baseURL"));
    }

    let or_default = |value: String, default: &str| {
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    };

    let mut cfg = Config {
        title: yc.site.title,
        description: yc.site.description,
        base_url: yc.site.base_url,
        author: yc.site.author,
        content_dir: or_default(yc.build.content, "content"),
        output_dir: or_default(yc.build.output, "public"),
        assets_dir: or_default(yc.build.assets, "assets"),
        navigation: yc
            .navigation
            .into_iter()
            .map(|n| NavItem {
                title: n.title,
                url: n.url,
            })
            .collect(),
        feed_pages: yc.feed_pages,
        topic_pages: yc.topic_pages,
    };

    if let Some(dir) = opts.content_dir.filter(|d| !d.is_empty()) {
        cfg.content_dir = dir;
    }
    if let Some(dir) = opts.output_dir.filter(|d| !d.is_empty()) {
        cfg.output_dir = dir;
    }
    if let Some(dir) = opts.assets_dir.filter(|d| !d.is_empty()) {
        cfg.assets_dir = dir;
    }

    Ok(cfg)
}
