//! Console pane: the output log of the latest run

use crate::output::{OutputKind, OutputSink};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the console pane.
///
/// `sink.scroll` is clamped here; a value of `usize::MAX` lands on the last page.
pub fn render_console_pane(frame: &mut Frame, area: Rect, sink: &mut OutputSink, is_focused: bool) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if sink.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = sink
        .entries()
        .iter()
        .flat_map(|entry| {
            let color = match entry.kind {
                OutputKind::Ok => DEFAULT_THEME.fg,
                OutputKind::Error => DEFAULT_THEME.error,
            };
            entry
                .lines()
                .map(move |line| ListItem::new(line.to_string()).style(Style::default().fg(color)))
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        sink.scroll = sink.scroll.min(max_scroll);
    } else {
        sink.scroll = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(sink.scroll)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
