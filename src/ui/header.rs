// Header rendering.
// Blog title, login status and the CORS misconfiguration banner.

use ratatui::{prelude::*, widgets::*};

use crate::app::App;
use crate::state::LoginStatus;

const CORS_BANNER: &str =
    " Missing CORS origin. Allow the current URL in the CORS Origins form on the OneGraph Dashboard.";

fn status_color(status: LoginStatus) -> Color {
    match status {
        LoginStatus::Checking => Color::Yellow,
        LoginStatus::LoggedIn => Color::Green,
        LoginStatus::LoggedOut => Color::DarkGray,
        LoginStatus::Error => Color::Red,
    }
}

/// Draw the header at the top of the screen.
pub fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let title = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            app.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(title, rows[0]);

    let status = app.context.session.status();
    let login = Paragraph::new(Line::from(Span::styled(
        format!("{} ", status.display()),
        Style::default().fg(status_color(status)),
    )))
    .alignment(Alignment::Right);
    frame.render_widget(login, rows[0]);

    if app.context.notifications.cors_violation() && rows[1].height > 0 {
        let banner = Paragraph::new(CORS_BANNER)
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(banner, rows[1]);
    }
}
