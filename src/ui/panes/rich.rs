//! Rich output pane: text view of the markup a script rendered

use crate::output::RichRegion;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_rich_pane(frame: &mut Frame, area: Rect, region: &RichRegion, is_focused: bool, scroll: &mut usize) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Rich Output ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let Some(content) = region.content() else {
        *scroll = 0;
        let paragraph = Paragraph::new("(nothing rendered)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll = (*scroll).min(content.text_lines.len().saturating_sub(visible_height));

    let lines: Vec<Line> = content
        .text_lines
        .iter()
        .skip(*scroll)
        .map(|l| Line::raw(l.as_str()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(DEFAULT_THEME.fg))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
