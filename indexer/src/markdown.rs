//! Markdown pages with YAML or TOML frontmatter, turned into corpus entries.

use anyhow::{Context, Result};
use docsearch_core::CorpusEntry;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub section: Option<String>,
    /// Overrides the path-derived URL.
    pub url: Option<String>,
    pub draft: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// `---` delimited.
    Yaml,
    /// `+++` delimited.
    Toml,
}

impl FrontmatterFormat {
    fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split a page into (format, frontmatter, body). Delimiters must sit on their own lines.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start_matches('\u{feff}');
    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };
    let delimiter = format.delimiter();

    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != delimiter {
        return None;
    }
    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            return Some((format, &rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let Some((format, raw, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };
    let fm: Frontmatter = match format {
        FrontmatterFormat::Yaml if raw.trim().is_empty() => Frontmatter::default(),
        FrontmatterFormat::Yaml => serde_yaml::from_str(raw)
            .with_context(|| format!("invalid YAML frontmatter in {}", path.display()))?,
        FrontmatterFormat::Toml => {
            toml::from_str(raw).with_context(|| format!("invalid TOML frontmatter in {}", path.display()))?
        }
    };
    Ok((fm, body.to_string()))
}

/// Plain text of a Markdown document plus the text of its first heading.
pub fn markdown_to_text(markdown: &str) -> (String, Option<String>) {
    let mut text = String::with_capacity(markdown.len());
    let mut first_heading: Option<String> = None;
    let mut heading: Option<String> = None;

    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { .. }) => heading = Some(String::new()),
            Event::End(TagEnd::Heading(_)) => {
                if let Some(h) = heading.take() {
                    if first_heading.is_none() && !h.trim().is_empty() {
                        first_heading = Some(h.trim().to_string());
                    }
                }
                text.push('\n');
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(h) = heading.as_mut() {
                    h.push_str(&t);
                }
                text.push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock | TagEnd::TableCell) => text.push('\n'),
            _ => {}
        }
    }
    (text.trim().to_string(), first_heading)
}

/// Site URL for a content file relative to the content root.
///
/// `guide/routing.md` becomes `/guide/routing/`; `guide/index.md` becomes `/guide/`.
pub fn url_for(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let stem = relative.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    if !matches!(stem.as_str(), "index" | "_index" | "README") {
        parts.push(stem);
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    }
}

/// Top-level directory of the page, used as its section when frontmatter names none.
fn section_for(relative: &Path) -> String {
    match relative.parent().and_then(|p| p.components().next()) {
        Some(Component::Normal(s)) => s.to_string_lossy().into_owned(),
        _ => String::new(),
    }
}

/// Read one page. Drafts come back as `None`.
pub fn load_page(root: &Path, path: &Path) -> Result<Option<CorpusEntry>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let (fm, body) = parse_frontmatter(&content, path)?;
    if fm.draft {
        tracing::debug!(path = %path.display(), "skipping draft");
        return Ok(None);
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    let (text, heading) = markdown_to_text(&body);
    let title = fm
        .title
        .or(heading)
        .unwrap_or_else(|| relative.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default());
    Ok(Some(CorpusEntry {
        url: fm.url.unwrap_or_else(|| url_for(relative)),
        title,
        body: text,
        section: fm.section.unwrap_or_else(|| section_for(relative)),
    }))
}
