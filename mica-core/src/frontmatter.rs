use serde::Deserialize;

/// Metadata extracted from the top of a markdown file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: String,
    pub summary: String,
    pub date: Option<String>,
}

/// Separate a leading `---`-delimited YAML block from the markdown body.
///
/// Text that does not start with the delimiter, or whose block is left
/// unterminated, is returned whole as the body with default metadata.
/// Only a block that parses as invalid YAML is an error.
pub fn extract(content: &str) -> Result<(Frontmatter, String), serde_yaml::Error> {
    if !content.starts_with("---") {
        return Ok((Frontmatter::default(), content.to_string()));
    }

    let parts: Vec<&str> = content.splitn(3, "---").collect();
    if parts.len() < 3 {
        return Ok((Frontmatter::default(), content.to_string()));
    }

    let fm = if parts[1].trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(parts[1])?
    };

    Ok((fm, parts[2].trim().to_string()))
}
