//! TUI pane rendering modules
//!
//! Each pane module exports a `render_*` function that draws one region of
//! the screen from session state. None of them mutate anything beyond
//! clamping the scroll offsets they are handed.
//!
//! - [`source`]: the script buffer with Python highlighting
//! - [`console`]: the output log, error entries styled distinctly
//! - [`rich`]: text view of the rich output region
//! - [`status`]: trigger state and keybindings
//! - [`modal`]: welcome and catalog overlays

pub mod console;
pub mod modal;
pub mod rich;
pub mod source;
pub mod status;

pub use console::render_console_pane;
pub use modal::render_modal;
pub use rich::render_rich_pane;
pub use source::render_source_pane;
pub use status::{render_status_bar, StatusRenderData};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{layout::Rect, style::Style, text::Line, widgets::Paragraph, Frame};

/// Draw a gutter, highlighted while it is being dragged
pub fn render_gutter(frame: &mut Frame, area: Rect, vertical_line: bool, active: bool) {
    let color = if active {
        DEFAULT_THEME.gutter_active
    } else {
        DEFAULT_THEME.border_normal
    };
    let lines: Vec<Line> = if vertical_line {
        (0..area.height).map(|_| Line::raw("│")).collect()
    } else {
        (0..area.height)
            .map(|_| Line::raw("─".repeat(area.width as usize)))
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).style(Style::default().fg(color)), area);
}
