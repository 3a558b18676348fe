// Modal UI components.
// The reaction picker drawn over the post view.

use ratatui::{prelude::*, widgets::*};

use crate::app::App;
use crate::github::{ReactionContent, ReactionGroup};
use crate::views::format::reactor_sentence;

use super::centered;

fn picker_line(
    index: usize,
    content: ReactionContent,
    group: Option<&ReactionGroup>,
    pending: bool,
) -> Line<'static> {
    let reacted = group.is_some_and(|group| group.viewer_has_reacted);
    let count = group.map_or(0, ReactionGroup::total);

    let mut spans = vec![
        Span::styled(format!(" {} ", index + 1), Style::default().fg(Color::Yellow)),
        Span::raw(format!("{} ", content.emoji())),
        Span::styled(
            format!("{:<12}", content.label()),
            if reacted {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            },
        ),
        Span::styled(format!("{:>4}", count), Style::default().fg(Color::DarkGray)),
    ];
    if pending {
        spans.push(Span::styled(" ⏳", Style::default().fg(Color::Yellow)));
    }
    if let Some(group) = group.filter(|group| group.total() > 0) {
        spans.push(Span::styled(
            format!("  {}", reactor_sentence(group)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Draw the reaction picker with the current groups of the post.
pub fn draw_reaction_picker(frame: &mut Frame, app: &App) {
    let groups = app.reactions();
    let modal_area = centered(frame.area(), 72, 14);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Reactions
            Constraint::Length(1), // Instructions
        ])
        .split(modal_area);

    let lines: Vec<Line> = ReactionContent::ALL
        .iter()
        .enumerate()
        .map(|(index, content)| {
            let group = groups.iter().find(|group| group.content == *content);
            picker_line(index, *content, group, app.reaction_pending(*content))
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" React "),
    );
    frame.render_widget(list, chunks[0]);

    let instructions = Line::from(vec![
        Span::styled(" 1-8", Style::default().fg(Color::Yellow)),
        Span::styled(" = Toggle  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Cancel ", Style::default().fg(Color::DarkGray)),
    ]);
    let instructions_widget = Paragraph::new(instructions)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(instructions_widget, chunks[1]);
}
