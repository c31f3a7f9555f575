//! Status bar with run trigger state and keybindings

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar needs to know
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub interpreter: &'a str,
    pub trigger_enabled: bool,
    pub running: bool,
    pub dragging: bool,
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (badge, badge_bg) = if data.running {
        (" RUNNING ", DEFAULT_THEME.secondary)
    } else if data.trigger_enabled {
        (" READY ", DEFAULT_THEME.success)
    } else {
        (" BUSY ", DEFAULT_THEME.error)
    };

    let left_spans = vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", data.interpreter),
            Style::default().bg(DEFAULT_THEME.bar_bg).fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            " | ",
            Style::default().bg(DEFAULT_THEME.bar_bg).fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", data.message),
            Style::default().bg(DEFAULT_THEME.bar_bg).fg(DEFAULT_THEME.fg),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.bar_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default().bg(DEFAULT_THEME.bar_bg).fg(DEFAULT_THEME.fg);
    let sep_style = Style::default().bg(DEFAULT_THEME.bar_bg).fg(DEFAULT_THEME.comment);

    let mut right_spans = Vec::new();
    for (key, desc) in [
        (" r ", " run "),
        (" l ", " examples "),
        (" R ", " reload "),
        (" K ", " restart "),
        (" ⇥ ", " focus "),
        (" q ", " quit "),
    ] {
        if !right_spans.is_empty() {
            right_spans.push(Span::styled("│", sep_style));
        }
        right_spans.push(Span::styled(key, key_style));
        right_spans.push(Span::styled(desc, desc_style));
    }

    if data.dragging {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            " ↔ RESIZE ",
            Style::default()
                .bg(DEFAULT_THEME.gutter_active)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.bar_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
