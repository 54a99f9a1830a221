use std::path::{Component, Path, PathBuf};
use std::{env, fmt, fs, io};

use chrono::Utc;
use serde::Serialize;

use crate::assets;
use crate::config::Config;
use crate::feed;
use crate::model::{Page, Post, Site};
use crate::renderer::{DEFAULT_STYLE_CSS, Renderer, TemplateError};
use crate::scanner::{self, ScanError};

#[derive(Debug)]
pub enum BuildError {
    Io(io::Error),
    Scan(ScanError),
    Template(TemplateError),
    UnsafeOutputDir(String),
    MissingAsset { asset: String, slug: String },
    Serialization(serde_json::Error),
}

impl From<io::Error> for BuildError {
    fn from(err: io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        BuildError::Scan(err)
    }
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::Template(err)
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::Serialization(err)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Io(e) => write!(f, "io error: {}", e),
            BuildError::Scan(e) => write!(f, "scan error: {}", e),
            BuildError::Template(e) => write!(f, "{}", e),
            BuildError::UnsafeOutputDir(reason) => {
                write!(f, "unsafe output directory: {}", reason)
            }
            BuildError::MissingAsset { asset, slug } => {
                write!(f, "asset {} referenced by post {} does not exist", asset, slug)
            }
            BuildError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io(e) => Some(e),
            BuildError::Scan(e) => Some(e),
            BuildError::Template(e) => Some(e),
            BuildError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

// Stamp written to build.json for cache busting and deploy tracing.
#[derive(Debug, Serialize)]
struct BuildStamp<'a> {
    version: &'a str,
    #[serde(rename = "buildTime")]
    build_time: String,
}

/// Runs the full build pipeline: scan content, render every page and post,
/// then emit the listing, feed, sitemap, robots.txt, build stamp and static
/// assets into the output directory.
pub struct Builder {
    cfg: Config,
    version: String,
}

impl Builder {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            version: String::new(),
        }
    }

    pub fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }

    pub fn build(&self) -> Result<Site, BuildError> {
        self.clean_output_dir()?;

        let site = scanner::scan_content(&self.cfg)?;
        let renderer = Renderer::new(&self.version)?;

        for page in &site.pages {
            self.write_page(&renderer, &site, page)?;
        }

        for post in &site.posts {
            self.write_post(&renderer, &site, post)?;
        }

        if !site.posts.is_empty() {
            self.write_blog_listing(&renderer, &site)?;
        }

        self.write_feed(&renderer, &site)?;
        self.write_404(&renderer, &site)?;
        self.write_sitemap(&renderer, &site)?;
        self.write_robots_txt()?;
        self.write_build_stamp()?;
        self.copy_site_assets()?;

        Ok(site)
    }

    fn output_dir(&self) -> &Path {
        Path::new(&self.cfg.output_dir)
    }

    // Removes and recreates the output directory, refusing dangerous paths.
    fn clean_output_dir(&self) -> Result<(), BuildError> {
        validate_output_dir(&self.cfg.output_dir, &self.cfg.content_dir)?;

        if self.output_dir().exists() {
            fs::remove_dir_all(self.output_dir())?;
        }
        fs::create_dir_all(self.output_dir())?;
        Ok(())
    }

    fn write_page(&self, r: &Renderer, site: &Site, page: &Page) -> Result<(), BuildError> {
        let html = r.render_page(site, page)?;

        // Clean URLs: /slug/index.html; the empty slug is the site root
        let dir = self.output_dir().join(&page.slug);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("index.html"), html)?;
        Ok(())
    }

    fn write_post(&self, r: &Renderer, site: &Site, post: &Post) -> Result<(), BuildError> {
        let html = r.render_post(site, post)?;
        let html = assets::rewrite_asset_paths(&html);

        let dir = self.output_dir().join("blog").join(&post.page.slug);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("index.html"), html)?;

        self.copy_post_assets(post, &dir)
    }

    // Assets referenced by a post live in content/blog/assets/ and are
    // copied next to the post's index.html, flattening the assets/ prefix.
    fn copy_post_assets(&self, post: &Post, post_dir: &Path) -> Result<(), BuildError> {
        for asset in &post.assets {
            let src = Path::new(&self.cfg.content_dir).join("blog").join(asset);
            if !src.is_file() {
                return Err(BuildError::MissingAsset {
                    asset: asset.clone(),
                    slug: post.page.slug.clone(),
                });
            }

            let name = src.file_name().map(PathBuf::from).unwrap_or_default();
            fs::copy(&src, post_dir.join(name))?;
        }
        Ok(())
    }

    fn write_blog_listing(&self, r: &Renderer, site: &Site) -> Result<(), BuildError> {
        let html = r.render_blog_list(site)?;
        let dir = self.output_dir().join("blog");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("index.html"), html)?;
        Ok(())
    }

    // No qualifying items means no feed document at all.
    fn write_feed(&self, r: &Renderer, site: &Site) -> Result<(), BuildError> {
        let Some(items) = feed::collect_feed_items(site, &self.cfg.feed_pages) else {
            return Ok(());
        };

        let xml = r.render_feed(site, &items);
        let dir = self.output_dir().join("feed");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("index.xml"), xml)?;
        Ok(())
    }

    fn write_404(&self, r: &Renderer, site: &Site) -> Result<(), BuildError> {
        let html = r.render_404(site)?;
        fs::write(self.output_dir().join("404.html"), html)?;
        Ok(())
    }

    fn write_sitemap(&self, r: &Renderer, site: &Site) -> Result<(), BuildError> {
        let xml = r.render_sitemap(site);
        fs::write(self.output_dir().join("sitemap.xml"), xml)?;
        Ok(())
    }

    fn write_robots_txt(&self) -> Result<(), BuildError> {
        let content = format!(
            "User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n",
            self.cfg.base_url
        );
        fs::write(self.output_dir().join("robots.txt"), content)?;
        Ok(())
    }

    fn write_build_stamp(&self) -> Result<(), BuildError> {
        let stamp = BuildStamp {
            version: &self.version,
            build_time: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&stamp)?;
        fs::write(self.output_dir().join("build.json"), json)?;
        Ok(())
    }

    // Site-wide assets are copied flat from the assets dir to the output
    // root; a missing assets dir is fine. style.css falls back to the
    // embedded default.
    fn copy_site_assets(&self) -> Result<(), BuildError> {
        let assets_dir = Path::new(&self.cfg.assets_dir);
        if assets_dir.is_dir() {
            for entry in fs::read_dir(assets_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    continue;
                }
                fs::copy(&path, self.output_dir().join(entry.file_name()))?;
            }
        }

        let style = self.output_dir().join("style.css");
        if !style.exists() {
            fs::write(style, DEFAULT_STYLE_CSS)?;
        }
        Ok(())
    }
}

/// Check that the output directory is safe to delete and recreate.
///
/// Rejected: empty paths, the current directory, anything reached through
/// `..`, the filesystem root, the home directory, the project root (the
/// parent of the content directory) and anything outside it.
pub fn validate_output_dir(output_dir: &str, content_dir: &str) -> Result<(), BuildError> {
    if output_dir.is_empty() {
        return Err(BuildError::UnsafeOutputDir(
            "output directory cannot be empty".to_string(),
        ));
    }

    let mut path = PathBuf::from(output_dir);

    if output_dir == "~" || output_dir.starts_with("~/") {
        if let Some(home) = env::home_dir() {
            path = if output_dir == "~" {
                home
            } else {
                home.join(&output_dir[2..])
            };
        }
    }

    let abs = normalize(&env::current_dir()?.join(&path));

    if abs == env::current_dir().map(|d| normalize(&d))? {
        return Err(BuildError::UnsafeOutputDir(
            "output directory cannot be the current directory".to_string(),
        ));
    }
    if abs == Path::new("/") {
        return Err(BuildError::UnsafeOutputDir(
            "output directory cannot be the filesystem root".to_string(),
        ));
    }
    if let Some(home) = env::home_dir()
        && abs == normalize(&home)
    {
        return Err(BuildError::UnsafeOutputDir(
            "output directory cannot be the home directory".to_string(),
        ));
    }

    let abs_content = normalize(&env::current_dir()?.join(content_dir));
    let project_root = abs_content
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    if abs == project_root {
        return Err(BuildError::UnsafeOutputDir(
            "output directory cannot be the project root".to_string(),
        ));
    }
    if !abs.starts_with(&project_root) {
        return Err(BuildError::UnsafeOutputDir(
            "output directory is outside the project root".to_string(),
        ));
    }

    Ok(())
}

// Lexically resolve . and .. components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
