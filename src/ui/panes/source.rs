//! Source pane: the buffer the run trigger executes
//!
//! Highlighting uses a character tokenizer that knows Python keywords,
//! strings, numbers and `#` comments. It is deliberately shallow.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

const BUILTINS: &[&str] = &[
    "True", "False", "None", "print", "range", "len", "self", "super", "Exception",
];

fn word_style(word: &str, is_call: bool) -> Style {
    if KEYWORDS.contains(&word) {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if BUILTINS.contains(&word) {
        Style::default().fg(DEFAULT_THEME.builtin)
    } else if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        Style::default().fg(DEFAULT_THEME.number)
    } else if is_call {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Highlight one line of Python
pub fn highlight_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut word = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    let flush = |word: &mut String, spans: &mut Vec<Span<'static>>, is_call: bool| {
        if !word.is_empty() {
            let style = word_style(word, is_call);
            spans.push(Span::styled(std::mem::take(word), style));
        }
    };

    while i < chars.len() {
        let c = chars[i];

        if c == '#' {
            flush(&mut word, &mut spans, false);
            let rest: String = chars[i..].iter().collect();
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        if c == '"' || c == '\'' {
            flush(&mut word, &mut spans, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            let literal: String = chars[i..end].iter().collect();
            spans.push(Span::styled(literal, Style::default().fg(DEFAULT_THEME.string)));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            flush(&mut word, &mut spans, c == '(');
            let style = match c {
                '(' | ')' | '[' | ']' | '{' | '}' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        word.push(c);
        i += 1;
    }
    flush(&mut word, &mut spans, false);

    Line::from(spans)
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    title: &str,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders

    let max_scroll = lines.len().saturating_sub(visible_height);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let visible: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let mut spans = vec![Span::styled(
                format!("{:4} ", idx + 1),
                Style::default().fg(DEFAULT_THEME.comment),
            )];
            spans.extend(highlight_line(line).spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}
