// UI module for rendering the TUI.
// Contains widgets for the header, breadcrumbs, listing, post body and overlays.

mod breadcrumb;
mod header;
mod list;
mod modal;
mod panel;
pub mod post;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Page};
use crate::state::NoticeLevel;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let header_height = if app.context.notifications.cors_violation() {
        3
    } else {
        2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // Title, login status, CORS banner
            Constraint::Length(2),             // Breadcrumb
            Constraint::Min(1),                // Main content
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    header::draw_header(frame, app, chunks[0]);

    let breadcrumbs = app.nav.breadcrumbs();
    breadcrumb::draw_breadcrumb(frame, &breadcrumbs, chunks[1]);

    draw_content(frame, app, chunks[2]);

    draw_status_bar(frame, app, chunks[3]);

    if app.show_picker {
        modal::draw_reaction_picker(frame, app);
    }

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the main content area for the current page.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let scrollable = match app.page {
        Page::Posts => list::list_block().inner(area),
        Page::Post(_) => post::body_area(area),
        Page::Loading | Page::Failed(_) => area,
    };
    app.set_viewport(scrollable.height, scrollable.width);

    match &app.page {
        Page::Loading => list::render_loading(frame, area, "Loading"),
        Page::Failed(panel) => panel::draw_error_panel(frame, panel, area),
        Page::Posts => list::draw_posts(frame, app, area),
        Page::Post(page) => post::draw_post(frame, app, page, area),
    }
}

/// Draw the status bar with keybinding hints, the latest notice and rate limit.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = if let Some(notice) = app.context.notifications.current() {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Warn => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        };
        let time = notice.timestamp.with_timezone(&chrono::Local);
        vec![
            Span::styled(
                format!(" {} ", time.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(notice.message, Style::default().fg(color)),
        ]
    } else if matches!(app.page, Page::Post(_)) {
        vec![
            Span::raw(" ↑↓ "),
            Span::styled("Scroll", Style::default().fg(Color::DarkGray)),
            Span::raw("  PgUp/Dn "),
            Span::styled("Page", Style::default().fg(Color::DarkGray)),
            Span::raw("  r "),
            Span::styled("React", Style::default().fg(Color::DarkGray)),
            Span::raw("  Esc "),
            Span::styled("Back", Style::default().fg(Color::DarkGray)),
            Span::raw("  ? "),
            Span::styled("Help", Style::default().fg(Color::DarkGray)),
            Span::raw("  q "),
            Span::styled("Quit", Style::default().fg(Color::DarkGray)),
        ]
    } else {
        vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
            Span::raw("  ↵ "),
            Span::styled("Read", Style::default().fg(Color::DarkGray)),
            Span::raw("  l/L "),
            Span::styled("Login/out", Style::default().fg(Color::DarkGray)),
            Span::raw("  ? "),
            Span::styled("Help", Style::default().fg(Color::DarkGray)),
            Span::raw("  q "),
            Span::styled("Quit", Style::default().fg(Color::DarkGray)),
        ]
    };

    if app.nav.can_go_back() && !matches!(app.page, Page::Post(_)) {
        spans.push(Span::raw("  Esc "));
        spans.push(Span::styled("Back", Style::default().fg(Color::DarkGray)));
    }

    // Add rate limit info on the right if available
    if let Some(rate) = app.context.rate_limit().filter(|rate| rate.limit > 0) {
        let rate_color = if rate.remaining < 100 {
            Color::Red
        } else if rate.remaining < 500 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        spans.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    let status = Paragraph::new(Line::from(spans));
    frame.render_widget(status, area);
}

/// Center a fixed-size popup within `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn help_line(keys: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(keys, Style::default().fg(Color::Cyan)),
        Span::raw(description),
    ])
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 55, 20);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        help_line("  ↑/↓ or j/k    ", "Select post / scroll"),
        help_line("  PgUp/PgDn     ", "Page up / down"),
        help_line("  g/G           ", "Jump to start / end"),
        help_line("  Enter         ", "Read selected post"),
        help_line("  Esc           ", "Go back"),
        help_line("  h             ", "Back to the listing"),
        help_line("  r             ", "React to the post"),
        help_line("  1-8           ", "Toggle a reaction (picker)"),
        help_line("  l / L         ", "Log in / log out"),
        help_line("  ?             ", "Show/hide this help"),
        help_line("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Log in reads the viewer token from the environment",
            Style::default().fg(Color::DarkGray),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("any key", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(area, 50, 20), Rect::new(25, 10, 50, 20));

        let small = Rect::new(0, 0, 30, 10);
        assert_eq!(centered(small, 50, 20), Rect::new(0, 0, 30, 10));
    }
}
