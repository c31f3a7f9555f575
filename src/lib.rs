//! # Introduction
//!
//! scriptpad is a terminal playground: it loads example scripts from a
//! catalog into a source buffer, runs them through an embedded Python
//! interpreter and shows their console and rich output in resizable panes.
//!
//! ## Run pipeline
//!
//! ```text
//! Run key → ExecutionDriver → worker thread → Interpreter
//!              ▲                                  │ stdout / stderr / render_html
//!              └──── pump() ◀──── channel ◀────────┘
//!                      │
//!                      ▼
//!                 OutputSink (log + rich region)
//! ```
//!
//! 1. [`session`]: the console object owning everything below; UI handlers
//!    call into it.
//! 2. [`exec`]: the run cycle, the [`exec::Interpreter`] collaborator, the
//!    python child process and traceback trimming.
//! 3. [`output`]: the console log with markup escaping, and the rich region.
//! 4. [`layout`]: gutter drag gestures resizing the panes.
//! 5. [`catalog`]: example catalog, source buffer and file staging.
//! 6. [`config`]: `scriptpad.toml`.
//! 7. [`ui`]: ratatui-based TUI; not part of the stable library API.

pub mod catalog;
pub mod config;
pub mod exec;
pub mod layout;
pub mod output;
pub mod session;
pub mod ui;
