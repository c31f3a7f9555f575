//! Main TUI application: event loop and input adapters
//!
//! Handlers here only translate crossterm events into [`Session`] calls.

use crate::layout::{DragAxis, PointerEvent, PointerTarget};
use crate::session::{Modal, Session};
use crate::ui::panes::{self, StatusRenderData};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Rich,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> console -> rich)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Rich,
            FocusedPane::Rich => FocusedPane::Source,
        }
    }
}

/// Regions of the last frame, for mouse hit-testing
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutAreas {
    /// Container of the column tracks
    pub panes: Rect,
    /// Container of the row tracks (the output column)
    pub output: Rect,
    pub source: Rect,
    pub console: Rect,
    pub rich: Rect,
    pub column_gutter: Rect,
    pub row_gutter: Rect,
    pub modal: Option<Rect>,
}

fn rect_contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

pub struct App {
    pub session: Session,
    pub focused_pane: FocusedPane,
    pub source_scroll: usize,
    pub rich_scroll: usize,
    pub areas: LayoutAreas,
    pub should_quit: bool,
    /// Title of the source pane
    pub source_title: String,
}

impl App {
    pub fn new(session: Session, source_title: String) -> Self {
        App {
            session,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            rich_scroll: 0,
            areas: LayoutAreas::default(),
            should_quit: false,
            source_title,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.session.start();

        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.session.tick();

            // Poll with a timeout so streamed output keeps flowing
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);
        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        // Source | gutter | output column
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(self.session.layout.constraints(DragAxis::Horizontal))
            .split(pane_area);

        // Console / gutter / rich output
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(self.session.layout.constraints(DragAxis::Vertical))
            .split(columns[2]);

        self.areas = LayoutAreas {
            panes: pane_area,
            output: columns[2],
            source: columns[0],
            console: rows[0],
            rich: rows[2],
            column_gutter: columns[1],
            row_gutter: rows[1],
            modal: None,
        };

        let active = self.session.layout.active_axis();
        let title = match self.session.buffer.path() {
            Some(path) => path.display().to_string(),
            None => self.source_title.clone(),
        };

        panes::render_source_pane(
            frame,
            columns[0],
            self.session.buffer.text(),
            &title,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );
        panes::render_gutter(frame, columns[1], true, active == DragAxis::Horizontal);
        panes::render_console_pane(
            frame,
            rows[0],
            &mut self.session.sink,
            self.focused_pane == FocusedPane::Console,
        );
        panes::render_gutter(frame, rows[1], false, active == DragAxis::Vertical);
        panes::render_rich_pane(
            frame,
            rows[2],
            self.session.sink.rich(),
            self.focused_pane == FocusedPane::Rich,
            &mut self.rich_scroll,
        );

        panes::render_status_bar(
            frame,
            status_area,
            &StatusRenderData {
                message: &self.session.status,
                interpreter: self.session.driver.interpreter_name(),
                trigger_enabled: self.session.driver.trigger().is_enabled(),
                running: self.session.is_busy(),
                dragging: active != DragAxis::None,
            },
        );

        self.areas.modal =
            panes::render_modal(frame, pane_area, self.session.modal, &self.session.catalog);
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.session.modal != Modal::Hidden {
            self.handle_modal_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::F(5) => {
                let _ = self.session.run_buffer();
            }
            KeyCode::Char('l') => self.session.show_modal(Modal::Catalog { selected: 0 }),
            KeyCode::Char('?') => self.session.show_modal(Modal::Welcome),
            KeyCode::Char('R') => self.session.reload_buffer(),
            KeyCode::Char('K') => self.session.restart_interpreter(),
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::Up => self.scroll(self.focused_pane, true),
            KeyCode::Down => self.scroll(self.focused_pane, false),
            KeyCode::End => self.session.sink.scroll_to_bottom(),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.session.close_modal(),
            KeyCode::Up => self.session.catalog_move(-1),
            KeyCode::Down => self.session.catalog_move(1),
            KeyCode::Enter => match self.session.modal {
                Modal::Catalog { .. } => {
                    self.session.catalog_confirm();
                    self.source_scroll = 0;
                }
                _ => self.session.close_modal(),
            },
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        let (col, row) = (event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(modal) = self.areas.modal {
                    if !rect_contains(modal, col, row) {
                        self.session.close_modal();
                    }
                    return;
                }
                let pointer = PointerEvent::mouse(self.hit_test(col, row), col as f64, row as f64);
                self.session.pointer_down(&pointer);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let container = match self.session.layout.active_axis() {
                    DragAxis::None => return,
                    DragAxis::Horizontal => self.areas.panes,
                    DragAxis::Vertical => self.areas.output,
                };
                let pointer = PointerEvent::mouse(PointerTarget::Other, col as f64, row as f64);
                self.session.pointer_move(&pointer, container);
            }
            MouseEventKind::Up(_) => self.session.pointer_up(),
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let up = event.kind == MouseEventKind::ScrollUp;
                if let Some(pane) = self.pane_at(col, row) {
                    for _ in 0..3 {
                        self.scroll(pane, up);
                    }
                }
            }
            _ => {}
        }
    }

    fn hit_test(&self, col: u16, row: u16) -> PointerTarget {
        if rect_contains(self.areas.column_gutter, col, row) {
            PointerTarget::HorizontalGutter
        } else if rect_contains(self.areas.row_gutter, col, row) {
            PointerTarget::VerticalGutter
        } else {
            PointerTarget::Other
        }
    }

    fn pane_at(&self, col: u16, row: u16) -> Option<FocusedPane> {
        [
            (self.areas.source, FocusedPane::Source),
            (self.areas.console, FocusedPane::Console),
            (self.areas.rich, FocusedPane::Rich),
        ]
        .into_iter()
        .find(|(rect, _)| rect_contains(*rect, col, row))
        .map(|(_, pane)| pane)
    }

    fn scroll(&mut self, pane: FocusedPane, up: bool) {
        let offset = match pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Console => &mut self.session.sink.scroll,
            FocusedPane::Rich => &mut self.rich_scroll,
        };
        *offset = if up {
            offset.saturating_sub(1)
        } else {
            offset.saturating_add(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(2, 3, 4, 1);
        assert!(rect_contains(rect, 2, 3));
        assert!(rect_contains(rect, 5, 3));
        assert!(!rect_contains(rect, 6, 3));
        assert!(!rect_contains(rect, 2, 4));
    }
}
