use chrono::{NaiveDate, Utc};
use tera::{Context, Tera};

use crate::feed::FeedItem;
use crate::model::{Page, Post, Site};

/// The default stylesheet written when the assets directory does not
/// provide one.
pub const DEFAULT_STYLE_CSS: &str = include_str!("../static/style.css");

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "template error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::TeraError(e) => Some(e),
        }
    }
}

/// Renders site pages through embedded tera templates, and the XML
/// documents (feed, sitemap) through direct assembly.
pub struct Renderer {
    tera: Tera,
    version: String,
}

impl Renderer {
    pub fn new(version: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("page.html", include_str!("../templates/page.html")),
            ("blog_list.html", include_str!("../templates/blog_list.html")),
            ("blog_post.html", include_str!("../templates/blog_post.html")),
            ("404.html", include_str!("../templates/404.html")),
        ])?;

        Ok(Self {
            tera,
            version: version.to_string(),
        })
    }

    fn base_context(&self, site: &Site) -> Context {
        let mut ctx = Context::new();
        ctx.insert("site", site);
        ctx.insert("version", &self.version);
        ctx
    }

    pub fn render_page(&self, site: &Site, page: &Page) -> Result<String, TemplateError> {
        let mut ctx = self.base_context(site);
        ctx.insert("page", page);
        Ok(self.tera.render("page.html", &ctx)?)
    }

    pub fn render_post(&self, site: &Site, post: &Post) -> Result<String, TemplateError> {
        let mut ctx = self.base_context(site);
        ctx.insert("post", post);
        Ok(self.tera.render("blog_post.html", &ctx)?)
    }

    pub fn render_blog_list(&self, site: &Site) -> Result<String, TemplateError> {
        let mut ctx = self.base_context(site);
        ctx.insert("posts", &site.posts);
        Ok(self.tera.render("blog_list.html", &ctx)?)
    }

    pub fn render_404(&self, site: &Site) -> Result<String, TemplateError> {
        let ctx = self.base_context(site);
        Ok(self.tera.render("404.html", &ctx)?)
    }

    /// Render the RSS 2.0 feed document. The caller is responsible for
    /// passing a non-empty, already-capped item list.
    pub fn render_feed(&self, site: &Site, items: &[FeedItem]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<rss version=\"2.0\">\n");
        xml.push_str("  <channel>\n");
        xml.push_str(&format!(
            "    <title>{}</title>\n",
            html_escape::encode_text(&site.title)
        ));
        xml.push_str(&format!(
            "    <link>{}</link>\n",
            html_escape::encode_text(&site.base_url)
        ));
        xml.push_str(&format!(
            "    <description>{}</description>\n",
            html_escape::encode_text(&site.description)
        ));
        xml.push_str(&format!(
            "    <lastBuildDate>{}</lastBuildDate>\n",
            Utc::now().to_rfc2822()
        ));

        for item in items {
            let link = item.link(&site.base_url);
            xml.push_str("    <item>\n");
            xml.push_str(&format!(
                "      <title>{}</title>\n",
                html_escape::encode_text(&item.title())
            ));
            xml.push_str(&format!(
                "      <link>{}</link>\n",
                html_escape::encode_text(&link)
            ));
            xml.push_str(&format!(
                "      <guid>{}</guid>\n",
                html_escape::encode_text(&link)
            ));
            xml.push_str(&format!(
                "      <description><![CDATA[{}]]></description>\n",
                item.content()
            ));
            xml.push_str(&format!(
                "      <pubDate>{}</pubDate>\n",
                naive_to_rfc2822(item.date())
            ));
            xml.push_str("    </item>\n");
        }

        xml.push_str("  </channel>\n");
        xml.push_str("</rss>\n");
        xml
    }

    /// Render sitemap.xml: pages without lastmod, posts with their date.
    pub fn render_sitemap(&self, site: &Site) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

        for page in &site.pages {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}{}</loc>\n",
                html_escape::encode_text(&site.base_url),
                page.path
            ));
            xml.push_str("  </url>\n");
        }

        for post in &site.posts {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}{}</loc>\n",
                html_escape::encode_text(&site.base_url),
                post.page.path
            ));
            if let Some(date) = post.date {
                xml.push_str(&format!(
                    "    <lastmod>{}</lastmod>\n",
                    date.format("%Y-%m-%d")
                ));
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// RSS pubDate wants RFC 2822 with a time; date-only items get midnight UTC.
fn naive_to_rfc2822(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc2822())
        .unwrap_or_default()
}
