// Terminal rendering of post bodies.
// Walks the markdown tree and produces styled ratatui lines; raw HTML is shown as literal text.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, parse_document};
use ratatui::prelude::*;

use super::{BACKMATTER_LANG, collect_inline_text, options};

/// Render markdown into styled lines, one per output row before wrapping.
pub fn render_lines(source: &str) -> Vec<Line<'static>> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &options());

    let mut writer = LineWriter::default();
    writer.block(root);
    writer.finish()
}

/// Number of rows the lines occupy once wrapped to `width` columns.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

#[derive(Default)]
struct LineWriter {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Prefixes applied to every row (block quote bars, list indentation).
    prefixes: Vec<Span<'static>>,
    /// List marker waiting for the first row of its item.
    marker: Option<Span<'static>>,
}

impl LineWriter {
    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn push_text(&mut self, text: impl Into<String>) {
        let style = self.style();
        self.current.push(Span::styled(text.into(), style));
    }

    fn flush(&mut self) {
        let mut spans = self.prefixes.clone();
        if let Some(marker) = self.marker.take() {
            // The marker replaces the continuation indent of its own item.
            spans.pop();
            spans.push(marker);
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() == 0) || self.lines.is_empty() {
            return;
        }
        self.lines.push(Line::default());
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() {
            self.flush();
        }
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, inline: bool) {
        let mut child = node.first_child();
        while let Some(next) = child {
            if inline {
                self.inline(next);
            } else {
                self.block(next);
            }
            child = next.next_sibling();
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Document => self.children(node, false),
            NodeValue::Paragraph => {
                self.children(node, true);
                self.flush();
                if !self.in_tight_item(node) {
                    self.blank();
                }
            }
            NodeValue::Heading(heading) => {
                self.styles.push(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );
                self.push_text(format!("{} ", "#".repeat(usize::from(heading.level))));
                self.children(node, true);
                self.styles.pop();
                self.flush();
                self.blank();
            }
            NodeValue::CodeBlock(block) => {
                if block.info.trim() == BACKMATTER_LANG {
                    return;
                }
                self.code_lines(&block.literal);
            }
            NodeValue::HtmlBlock(html) => {
                for line in html.literal.trim_end().lines() {
                    self.push_text(line.to_string());
                    self.flush();
                }
                self.blank();
            }
            NodeValue::BlockQuote => {
                self.prefixes
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                self.styles
                    .push(Style::default().add_modifier(Modifier::ITALIC));
                self.children(node, false);
                self.styles.pop();
                self.prefixes.pop();
                self.blank();
            }
            NodeValue::List(list) => {
                let mut number = list.start;
                let mut child = node.first_child();
                while let Some(item) = child {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => format!("{}. ", number),
                    };
                    number += 1;
                    let indent = " ".repeat(marker.chars().count());
                    self.prefixes.push(Span::raw(indent));
                    self.marker = Some(Span::styled(marker, Style::default().fg(Color::Yellow)));
                    self.children(item, false);
                    // An empty item still gets its marker row.
                    if self.marker.is_some() {
                        self.flush();
                    }
                    self.prefixes.pop();
                    child = item.next_sibling();
                }
                if self.prefixes.is_empty() {
                    self.blank();
                }
            }
            NodeValue::ThematicBreak => {
                self.styles.push(Style::default().fg(Color::DarkGray));
                self.push_text("─".repeat(24));
                self.styles.pop();
                self.flush();
                self.blank();
            }
            NodeValue::Table(_) => {
                let mut row = node.first_child();
                while let Some(current) = row {
                    let mut cells = Vec::new();
                    let mut cell = current.first_child();
                    while let Some(next) = cell {
                        cells.push(collect_inline_text(next, true).trim().to_string());
                        cell = next.next_sibling();
                    }
                    self.push_text(format!("| {} |", cells.join(" | ")));
                    self.flush();
                    row = current.next_sibling();
                }
                self.blank();
            }
            _ => {
                if node.first_child().is_some() {
                    self.children(node, false);
                }
            }
        }
    }

    fn inline<'a>(&mut self, node: &'a AstNode<'a>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Text(text) => self.push_text(text.to_string()),
            NodeValue::Code(code) => {
                self.styles.push(Style::default().fg(Color::Yellow));
                self.push_text(code.literal.to_string());
                self.styles.pop();
            }
            NodeValue::HtmlInline(html) => self.push_text(html.to_string()),
            NodeValue::SoftBreak => self.push_text(" "),
            NodeValue::LineBreak => self.flush(),
            NodeValue::Emph => self.styled_children(node, Modifier::ITALIC),
            NodeValue::Strong => self.styled_children(node, Modifier::BOLD),
            NodeValue::Strikethrough => self.styled_children(node, Modifier::CROSSED_OUT),
            NodeValue::Link(_) => {
                self.styles.push(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
                self.children(node, true);
                self.styles.pop();
            }
            NodeValue::Image(_) => {
                let alt = collect_inline_text(node, true);
                let label = if alt.trim().is_empty() {
                    "[image]".to_string()
                } else {
                    format!("[image: {}]", alt.trim())
                };
                self.styles.push(Style::default().fg(Color::Magenta));
                self.push_text(label);
                self.styles.pop();
            }
            _ => self.children(node, true),
        }
    }

    fn styled_children<'a>(&mut self, node: &'a AstNode<'a>, modifier: Modifier) {
        self.styles.push(Style::default().add_modifier(modifier));
        self.children(node, true);
        self.styles.pop();
    }

    fn code_lines(&mut self, literal: &str) {
        self.styles.push(Style::default().fg(Color::Yellow));
        for line in literal.trim_end_matches('\n').lines() {
            self.push_text(format!("    {}", line));
            self.flush();
        }
        self.styles.pop();
        self.blank();
    }

    /// Paragraphs directly inside an item of a tight list get no trailing blank row.
    fn in_tight_item<'a>(&self, node: &'a AstNode<'a>) -> bool {
        let Some(item) = node.parent() else {
            return false;
        };
        if !matches!(item.data.borrow().value, NodeValue::Item(_)) {
            return false;
        }
        item.parent().is_some_and(|list| {
            matches!(&list.data.borrow().value, NodeValue::List(list) if list.tight)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_render_paragraphs_and_headings() {
        let lines = render_lines("# Title\n\nHello *world*.\n\nSecond paragraph.");
        assert_eq!(
            plain(&lines),
            vec!["# Title", "", "Hello world.", "", "Second paragraph."]
        );
    }

    #[test]
    fn test_render_lists() {
        let lines = render_lines("- one\n- two\n\n1. first\n2. second\n");
        assert_eq!(
            plain(&lines),
            vec!["• one", "• two", "", "1. first", "2. second"]
        );
    }

    #[test]
    fn test_render_loose_list_keeps_spacing() {
        let lines = render_lines("- one\n\n- two\n\nAfter\n");
        assert_eq!(plain(&lines), vec!["• one", "", "• two", "", "After"]);
    }

    #[test]
    fn test_render_hides_backmatter_and_shows_code() {
        let source = "Intro\n\n```rust\nfn main() {}\n```\n\n```backmatter\n{\"a\": 1}\n```\n";
        let lines = render_lines(source);
        assert_eq!(plain(&lines), vec!["Intro", "", "    fn main() {}"]);
    }

    #[test]
    fn test_render_html_as_text() {
        let lines = render_lines("Hi <b>there</b>");
        assert_eq!(plain(&lines), vec!["Hi <b>there</b>"]);
    }

    #[test]
    fn test_render_image_placeholder() {
        let lines = render_lines("![A cat](https://example.com/cat.png)");
        assert_eq!(plain(&lines), vec!["[image: A cat]"]);
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("0123456789"), Line::default(), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 80), 3);
    }
}
