// Error panel rendering.
// Shown in place of a view whose data failed to load or build.

use ratatui::{prelude::*, widgets::*};

use crate::error::ErrorKind;
use crate::views::ErrorPanel;

/// Draw the panel with its message and, when present, the remediation steps.
pub fn draw_error_panel(frame: &mut Frame, panel: &ErrorPanel, area: Rect) {
    let title = match panel.kind {
        ErrorKind::NotFound => " Not found ",
        ErrorKind::MissingCors | ErrorKind::Generic => " Error ",
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("❌ {}", panel.message),
            Style::default().fg(Color::Red),
        )),
    ];

    if let Some(remediation) = &panel.remediation {
        lines.push(Line::from(""));
        lines.push(Line::from(remediation.text.clone()));
        if let Some(link) = &remediation.link {
            lines.push(Line::from(Span::styled(
                link.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(title),
        );
    frame.render_widget(paragraph, area);
}
