//! The interpreter collaborator seen by the execution driver

use super::errors::ExecError;
use std::sync::mpsc::Sender;

/// Output streamed by a run while it executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecEvent {
    Stdout(String),
    Stderr(String),
    /// Markup passed to `render_html`
    Rich(String),
}

/// Handle the interpreter uses to stream output back to the driver.
///
/// Sends after the driver has gone away are dropped silently.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<ExecEvent>,
}

impl EventSender {
    pub fn new(tx: Sender<ExecEvent>) -> Self {
        EventSender { tx }
    }

    pub fn send(&self, event: ExecEvent) {
        let _ = self.tx.send(event);
    }

    pub fn stdout(&self, text: impl Into<String>) {
        self.send(ExecEvent::Stdout(text.into()));
    }

    pub fn stderr(&self, text: impl Into<String>) {
        self.send(ExecEvent::Stderr(text.into()));
    }

    pub fn render_html(&self, markup: impl Into<String>) {
        self.send(ExecEvent::Rich(markup.into()));
    }
}

/// Unstructured multi-line failure dump produced by the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFailure(String);

impl RawFailure {
    pub fn new(text: impl Into<String>) -> Self {
        RawFailure(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Split into frame lines
    pub fn frames(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

/// How a run ended, as decided by the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Ok,
    /// The executed source raised
    ScriptFailure(RawFailure),
    /// The interpreter itself is unusable; the message is shown verbatim
    HostFailure(String),
}

impl From<ExecError> for ExecOutcome {
    fn from(err: ExecError) -> Self {
        ExecOutcome::HostFailure(err.to_string())
    }
}

/// An embedded interpreter that runs program text as a top-level module
pub trait Interpreter: Send {
    /// Short name for logs and the status bar
    fn name(&self) -> &str;

    /// Run `source` to completion, streaming output through `events`
    fn execute(&mut self, source: &str, events: &EventSender) -> ExecOutcome;

    /// Discard interpreter state so the next run starts fresh
    fn restart(&mut self) -> Result<(), ExecError> {
        Ok(())
    }
}
