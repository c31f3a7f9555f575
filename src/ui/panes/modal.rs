//! Overlay dialogs: welcome text and the example catalog

use crate::catalog::Catalog;
use crate::session::Modal;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const WELCOME: &[&str] = &[
    "Welcome to scriptpad.",
    "",
    "The left pane holds the script, the right column shows its console",
    "output and anything it renders through render_html.",
    "",
    "Press r to run the buffer, l to pick another example.",
    "Drag the gutters between panes with the mouse to resize them.",
    "",
    "Press Esc to close this dialog.",
];

/// Area of a centered box taking the given percentages of `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Render the active modal, returning the area it covers
pub fn render_modal(frame: &mut Frame, area: Rect, modal: Modal, catalog: &Catalog) -> Option<Rect> {
    let rect = centered_rect(70, 70, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_focused))
        .style(Style::default().bg(DEFAULT_THEME.bar_bg));

    let lines: Vec<Line> = match modal {
        Modal::Hidden => return None,
        Modal::Welcome => WELCOME
            .iter()
            .map(|l| Line::styled(*l, Style::default().fg(DEFAULT_THEME.fg)))
            .collect(),
        Modal::Catalog { selected } => catalog_lines(catalog, selected),
    };

    let title = match modal {
        Modal::Catalog { .. } => " Load example ",
        _ => " Welcome ",
    };

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block.title(title))
            .wrap(Wrap { trim: false }),
        rect,
    );
    Some(rect)
}

fn catalog_lines(catalog: &Catalog, selected: usize) -> Vec<Line<'static>> {
    if catalog.is_empty() {
        return vec![Line::styled(
            "No catalog loaded (pass --catalog)",
            Style::default().fg(DEFAULT_THEME.comment),
        )];
    }

    let mut lines = Vec::new();
    for (idx, example) in catalog.examples().iter().enumerate() {
        let marker = if idx == selected { "▶ " } else { "  " };
        let mut title_style = Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD);
        if idx == selected {
            title_style = title_style.fg(DEFAULT_THEME.border_focused);
        }
        let mut spans = vec![Span::raw(marker), Span::styled(example.title.clone(), title_style)];
        if !example.enabled {
            spans.push(Span::styled(
                "  (not run automatically)",
                Style::default().fg(DEFAULT_THEME.comment),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::styled(
            format!("    {}", example.description),
            Style::default().fg(DEFAULT_THEME.fg),
        ));
        if !example.files.is_empty() {
            let files: Vec<&str> = example.files.iter().map(|f| f.path.as_str()).collect();
            lines.push(Line::styled(
                format!("    Extra: {}", files.join(", ")),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
        }
        lines.push(Line::raw(""));
    }
    lines
}
