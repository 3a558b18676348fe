// Posts listing rendering.
// Provides the article list plus loading and empty states.

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, ITEM_ROWS};
use crate::views::PostSummary;

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

pub fn list_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Latest Articles ")
        .title_style(Style::default().add_modifier(Modifier::BOLD))
}

/// The rows of one listing entry.
fn post_rows(post: &PostSummary, selected: bool, width: u16) -> Vec<Line<'static>> {
    let (marker, title_style) = if selected {
        (
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (Span::raw("  "), Style::default().add_modifier(Modifier::BOLD))
    };

    let mut meta = vec![
        Span::raw("  "),
        Span::styled(post.date.clone(), Style::default().fg(Color::DarkGray)),
    ];
    if !post.authors.is_empty() {
        meta.push(Span::styled(
            format!(" · {}", post.authors.join(", ")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if post.comments > 0 {
        meta.push(Span::styled(
            format!(" · 💬 {}", post.comments),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(image) = &post.image {
        let label = if image.alt.is_empty() { "image" } else { image.alt.as_str() };
        meta.push(Span::styled(
            format!(" · 🖼 {}", label),
            Style::default().fg(Color::Magenta),
        ));
    }

    let excerpt = post
        .excerpt
        .as_deref()
        .map(|text| truncate(text, usize::from(width.saturating_sub(2))))
        .unwrap_or_default();

    vec![
        Line::from(vec![marker, Span::styled(post.title.clone(), title_style)]),
        Line::from(meta),
        Line::from(vec![Span::raw("  "), Span::raw(excerpt)]),
        Line::from(""),
    ]
}

/// Cut `text` to `width` characters, ending with an ellipsis when shortened.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Render the posts listing, starting at the first visible entry.
pub fn draw_posts(frame: &mut Frame, app: &App, area: Rect) {
    let block = list_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(listing) = &app.listing else {
        render_loading(frame, inner, "Loading posts");
        return;
    };
    if listing.posts.is_empty() {
        render_empty(frame, inner, "No posts yet");
        return;
    }

    let selected = app.nav.current().selected;
    let visible = usize::from((inner.height / ITEM_ROWS).max(1));
    let mut lines: Vec<Line> = listing
        .posts
        .iter()
        .enumerate()
        .skip(app.first_visible())
        .take(visible)
        .flat_map(|(index, post)| post_rows(post, index == selected, inner.width))
        .collect();

    if app.is_loading_more() {
        lines.push(Line::from(Span::styled(
            "  ⏳ Loading more...",
            Style::default().fg(Color::Yellow),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer excerpt", 8), "a longe…");
        assert_eq!(truncate("héllo wörld", 5), "héll…");
    }

    #[test]
    fn test_post_rows_fill_item_height() {
        let post = PostSummary {
            id: "I_1".to_string(),
            number: 1,
            title: "Hello".to_string(),
            path: "/post/1/hello".to_string(),
            date: "Jan 1st, 2021".to_string(),
            authors: vec!["Ann".to_string()],
            excerpt: None,
            image: None,
            comments: 0,
        };
        assert_eq!(post_rows(&post, true, 40).len(), usize::from(ITEM_ROWS));
    }
}
