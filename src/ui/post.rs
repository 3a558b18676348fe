// Post detail rendering.
// Reading progress bar, the scrollable post document and the reaction bar.

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, PostPage};
use crate::views::PostView;
use crate::views::format::used_reactions;

/// Rows of the reaction bar under the body.
const REACTION_ROWS: u16 = 2;

fn split(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Reading progress
            Constraint::Min(1),                // Document
            Constraint::Length(REACTION_ROWS), // Reactions
        ])
        .split(area)
}

/// Area the document scrolls in.
pub fn body_area(area: Rect) -> Rect {
    split(area)[1]
}

/// Title, byline, body and author footer as one scrollable document.
pub fn document(view: &PostView, body: Vec<Line<'static>>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            view.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let mut byline = vec![Span::styled(
        view.date.clone(),
        Style::default().fg(Color::DarkGray),
    )];
    if !view.authors.is_empty() {
        let names: Vec<&str> = view.authors.iter().map(|a| a.name.as_str()).collect();
        byline.push(Span::styled(
            format!(" · by {}", names.join(", ")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(byline));
    lines.push(Line::from(""));

    lines.extend(body);

    if !view.authors.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Written By",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for author in &view.authors {
            let mut spans = vec![Span::raw("  "), Span::raw(author.name.clone())];
            if let Some(twitter) = &author.twitter {
                spans.push(Span::styled(
                    format!(" @{}", twitter),
                    Style::default().fg(Color::Cyan),
                ));
            }
            if let Some(url) = &author.url {
                spans.push(Span::styled(
                    format!(" {}", url),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::from(spans));
        }
    }

    lines
}

/// Draw the post page.
pub fn draw_post(frame: &mut Frame, app: &App, page: &PostPage, area: Rect) {
    let chunks = split(area);

    // Fades as the reader nears the end.
    let color = if app.progress.opacity() > 0.5 {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let ratio = (app.progress.percent() / 100.0).clamp(0.0, 1.0);
    // A post that fits on screen has nothing to track.
    let label = if app.progress.content_height() == 0 {
        String::new()
    } else {
        format!("{:>3.0}% ", app.progress.percent().clamp(0.0, 100.0))
    };
    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(color))
        .unfilled_style(Style::default().fg(Color::Black))
        .label(label)
        .ratio(ratio);
    frame.render_widget(gauge, chunks[0]);

    let body = Paragraph::new(page.lines.clone())
        .wrap(Wrap { trim: false })
        .scroll((app.nav.current().scroll, 0));
    frame.render_widget(body, chunks[1]);

    draw_reaction_bar(frame, app, page, chunks[2]);
}

fn draw_reaction_bar(frame: &mut Frame, app: &App, page: &PostPage, area: Rect) {
    let groups = app.reactions();
    let mut spans = vec![Span::raw(" ")];
    for group in used_reactions(&groups) {
        let style = if group.viewer_has_reacted {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(
            format!("{} {}", group.content.emoji(), group.total()),
            style,
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!("💬 {}", page.view.comments),
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(viewer) = &page.view.viewer {
        spans.push(Span::styled(
            format!("  reading as {}", viewer),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::allowed_labels;
    use crate::views::build_post;
    use serde_json::json;

    #[test]
    fn test_document_has_byline_and_footer() {
        let data = json!({ "gitHub": { "viewer": null, "repository": { "issue": {
            "id": "I_2",
            "number": 2,
            "title": "Hello",
            "body": "Text",
            "createdAt": "2021-03-02T00:00:00Z",
            "labels": { "nodes": [{ "name": "publish" }] },
            "assignees": { "nodes": [{ "login": "ann", "websiteUrl": "https://twitter.com/ann" }] }
        } } } });
        let view = build_post(&data, &allowed_labels(None)).unwrap();

        let lines = document(&view, vec![Line::from("Text")]);
        let text: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        assert_eq!(text[0], "Hello");
        assert_eq!(text[1], "Mar 2nd, 2021 · by ann");
        assert_eq!(text[3], "Text");
        assert!(text.contains(&"Written By".to_string()));
        assert!(text.last().unwrap().contains("@ann"));
    }

    #[test]
    fn test_body_area_leaves_room_for_bars() {
        let area = body_area(Rect::new(0, 0, 80, 20));
        assert_eq!(area, Rect::new(0, 1, 80, 17));
    }
}
