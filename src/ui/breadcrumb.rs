// Breadcrumb rendering for navigation trail.
// Shows the visited locations with the current one highlighted.

use ratatui::{prelude::*, widgets::*};

use crate::state::BreadcrumbNode;

/// Render the breadcrumb trail, with the current location on the right.
pub fn draw_breadcrumb(frame: &mut Frame, breadcrumbs: &[BreadcrumbNode], area: Rect) {
    let mut spans = vec![Span::raw(" ")];

    for (i, node) in breadcrumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }

        let style = if i == breadcrumbs.len() - 1 {
            // Current level is highlighted
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(node.label.clone(), style));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);

    let Some(current) = breadcrumbs.last() else {
        return;
    };
    let location_para = Paragraph::new(Line::from(Span::styled(
        format!("{} ", current.path),
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Right);
    frame.render_widget(
        location_para,
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1.min(area.height),
        },
    );
}
