use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Convert markdown to HTML.
///
/// Every heading gets an `id` derived from its text and its content is
/// wrapped in a self-link, so `## *2026-01-28*` renders as
/// `<h2 id="2026-01-28"><a href="#2026-01-28"><em>2026-01-28</em></a></h2>`.
/// Those ids are what the feed aggregator later matches date sections on.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let mut processed = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = *level as u32;

                // Collect the heading's inline events and its plain text
                let mut inner = Vec::new();
                let mut text = String::new();
                i += 1;
                while i < events.len() {
                    match &events[i] {
                        Event::End(TagEnd::Heading(_)) => break,
                        Event::Text(t) => {
                            text.push_str(t);
                            inner.push(events[i].clone());
                        }
                        Event::Code(c) => {
                            text.push_str(c);
                            inner.push(events[i].clone());
                        }
                        other => inner.push(other.clone()),
                    }
                    i += 1;
                }

                let id = slugify(&text);
                if id.is_empty() {
                    processed.push(Event::Html(format!("<h{level}>").into()));
                    processed.extend(inner);
                    processed.push(Event::Html(format!("</h{level}>\n").into()));
                } else {
                    processed.push(Event::Html(
                        format!("<h{level} id=\"{id}\"><a href=\"#{id}\">").into(),
                    ));
                    processed.extend(inner);
                    processed.push(Event::Html(format!("</a></h{level}>\n").into()));
                }
            }
            other => processed.push(other.clone()),
        }
        i += 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, processed.into_iter());
    out
}

/// Derive a heading id from heading text: lowercase, alphanumerics kept,
/// whitespace becomes a hyphen, everything else is dropped, runs of hyphens
/// collapse and leading/trailing hyphens are trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_hyphen = false;

    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
            prev_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraphs() {
        let html = to_html("Hello **world**.");
        assert!(html.contains("<p>Hello <strong>world</strong>.</p>"));
    }

    #[test]
    fn headings_get_anchor_ids() {
        let html = to_html("## My Section");
        assert!(
            html.contains(r##"<h2 id="my-section"><a href="#my-section">My Section</a></h2>"##),
            "got: {html}"
        );
    }

    #[test]
    fn italic_date_heading_keeps_date_id() {
        let html = to_html("#### *2026-01-28*");
        assert!(
            html.contains(r##"<h4 id="2026-01-28"><a href="#2026-01-28"><em>2026-01-28</em></a></h4>"##),
            "got: {html}"
        );
    }

    #[test]
    fn plain_date_heading_keeps_date_id() {
        let html = to_html("## 2026-01-28\n\nToday's entry.");
        assert!(html.contains(r#"<h2 id="2026-01-28">"#), "got: {html}");
    }

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("2026-01-28"), "2026-01-28");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("  spaced  out  "), "spaced-out");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn renders_tables() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn fenced_code_renders_as_pre() {
        let html = to_html("```\nlet x = 1;\n```");
        assert!(html.contains("<pre><code>"));
    }
}
