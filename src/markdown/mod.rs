// Markdown inspection for post bodies.
// Extracts preview metadata (first image, first text, backmatter) from the parsed document tree.

pub mod render;

use chrono::{DateTime, NaiveDate, Utc};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};
use serde_json::{Map, Value};
use tracing::warn;

pub use render::{render_lines, wrapped_height};

/// Info string marking a fenced block of JSON post metadata.
pub const BACKMATTER_LANG: &str = "backmatter";

/// First image found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub title: String,
    pub alt: String,
}

/// Parser options shared by the inspector and the renderer.
pub(crate) fn options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options
}

/// Find the first image, depth-first and pre-order.
pub fn extract_first_image(source: &str) -> Option<ImageRef> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &options());

    find_first(root, &|node| {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Image(link) => Some(ImageRef {
                url: link.url.to_string(),
                title: link.title.to_string(),
                alt: collect_inline_text(node, true).trim().to_string(),
            }),
            _ => None,
        }
    })
}

/// Find the text of the first paragraph, depth-first and pre-order.
pub fn extract_first_text(source: &str) -> Option<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &options());

    find_first(root, &|node| {
        let is_paragraph = matches!(node.data.borrow().value, NodeValue::Paragraph);
        if !is_paragraph {
            return None;
        }
        let text = collect_inline_text(node, false);
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    })
}

/// Merge every backmatter block of the document, in order.
pub fn backmatter(source: &str) -> Map<String, Value> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &options());
    let mut merged = Map::new();

    visit(root, &mut |node| {
        let data = node.data.borrow();
        if let NodeValue::CodeBlock(block) = &data.value {
            if block.info.trim() == BACKMATTER_LANG {
                match serde_json::from_str::<Map<String, Value>>(&block.literal) {
                    Ok(fields) => merged.extend(fields),
                    Err(err) => warn!(error = %err, "skipping invalid backmatter block"),
                }
            }
        }
    });

    merged
}

/// The `publishedDate` backmatter field, if present and parseable.
pub fn published_date(source: &str) -> Option<DateTime<Utc>> {
    let fields = backmatter(source);
    let raw = fields.get("publishedDate")?.as_str()?;
    parse_date(raw)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn find_first<'a, T>(
    node: &'a AstNode<'a>,
    matcher: &dyn Fn(&'a AstNode<'a>) -> Option<T>,
) -> Option<T> {
    if let Some(found) = matcher(node) {
        return Some(found);
    }
    let mut child = node.first_child();
    while let Some(next) = child {
        if let Some(found) = find_first(next, matcher) {
            return Some(found);
        }
        child = next.next_sibling();
    }
    None
}

fn visit<'a>(node: &'a AstNode<'a>, f: &mut dyn FnMut(&'a AstNode<'a>)) {
    f(node);
    let mut child = node.first_child();
    while let Some(next) = child {
        visit(next, f);
        child = next.next_sibling();
    }
}

/// Concatenate the inline text below `node`. Image alt text is only
/// included when `with_images` is set.
pub(crate) fn collect_inline_text(node: &AstNode<'_>, with_images: bool) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String, with_images: bool) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                NodeValue::Image(_) if !with_images => return,
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer, with_images);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text, with_images);
        child = next.next_sibling();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_and_image() {
        let source = "Hello world\n\n![A cat](https://example.com/cat.png)\n";

        assert_eq!(extract_first_text(source), Some("Hello world".to_string()));

        let image = extract_first_image(source).unwrap();
        assert_eq!(image.url, "https://example.com/cat.png");
        assert_eq!(image.alt, "A cat");
    }

    #[test]
    fn test_first_image_nested_in_later_block() {
        let source = "# Title\n\n> quoted\n\n- item\n- ![nested](https://example.com/a.png)\n\n![second](https://example.com/b.png)\n";

        let image = extract_first_image(source).unwrap();
        assert_eq!(image.url, "https://example.com/a.png");
    }

    #[test]
    fn test_first_text_skips_headings() {
        let source = "# Heading\n\nFirst *emphasised* `code` paragraph.\n\nSecond.";
        assert_eq!(
            extract_first_text(source),
            Some("First emphasised code paragraph.".to_string())
        );
    }

    #[test]
    fn test_first_text_ignores_image_only_paragraph() {
        let source = "![cover](https://example.com/c.png)\n\nActual intro.";
        assert_eq!(extract_first_text(source), Some("Actual intro.".to_string()));
    }

    #[test]
    fn test_no_matches() {
        assert_eq!(extract_first_image("just text"), None);
        assert_eq!(extract_first_text("# Only a heading"), None);
        assert_eq!(extract_first_text(""), None);
    }

    #[test]
    fn test_backmatter_merges_blocks() {
        let source = "Body\n\n```backmatter\n{\"publishedDate\": \"2020-01-20\"}\n```\n\n```backmatter\n{\"canonical\": \"x\"}\n```\n\n```backmatter\nnot json\n```\n";

        let fields = backmatter(source);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["canonical"], "x");

        let date = published_date(source).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2020-01-20");
    }

    #[test]
    fn test_published_date_rfc3339() {
        let source = "```backmatter\n{\"publishedDate\": \"2021-03-04T10:00:00+02:00\"}\n```\n";
        let date = published_date(source).unwrap();
        assert_eq!(date.to_rfc3339(), "2021-03-04T08:00:00+00:00");
    }

    #[test]
    fn test_published_date_absent() {
        assert_eq!(published_date("no metadata"), None);
    }
}
