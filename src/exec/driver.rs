//! The execution driver: one run at a time, streamed into the console
//!
//! ```text
//!   Idle ──run()──▶ Running ──pump() sees worker finished──▶ Idle
//! ```
//!
//! `run` hands the source to a worker thread and returns at once, so the UI
//! loop keeps handling input (drags included) while the script executes. The
//! UI loop calls `pump` on every tick; that is the only place streamed output
//! reaches the [`OutputSink`], which keeps writes ordered and single-threaded.
//!
//! A run with an explicit source is a *preload*: it leaves the console and the
//! run trigger alone. Runs of the current buffer clear the console, disable the
//! trigger for their duration and always re-enable it, whatever the outcome.

use super::errors::RunError;
use super::interpreter::{EventSender, ExecEvent, ExecOutcome, Interpreter};
use super::traceback::TracebackFilter;
use crate::catalog::Editor;
use crate::output::OutputSink;
use chrono::{SecondsFormat, Utc};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// Default sleep between pumps when waiting for a run to finish
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// The "Run" control; disabled while a buffer run is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTrigger {
    enabled: bool,
}

impl RunTrigger {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

impl Default for RunTrigger {
    fn default() -> Self {
        RunTrigger { enabled: true }
    }
}

/// Source submitted for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub source: String,
    /// Explicit source given: leave console and trigger untouched
    pub preload: bool,
}

impl ExecutionRequest {
    pub fn buffer(source: String) -> Self {
        ExecutionRequest {
            source,
            preload: false,
        }
    }

    pub fn preload(source: String) -> Self {
        ExecutionRequest {
            source,
            preload: true,
        }
    }
}

/// Terminal outcome of a run as written to the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Ok,
    Failed { report: String },
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ExecutionResult::Ok)
    }
}

/// Recorded at the end of every buffer run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCheckpoint {
    pub finished_at: SystemTime,
    pub elapsed: Duration,
    pub ok: bool,
}

struct Worker {
    events: Receiver<ExecEvent>,
    handle: JoinHandle<ExecOutcome>,
    preload: bool,
    started: Instant,
}

pub struct ExecutionDriver {
    interpreter: Arc<Mutex<Box<dyn Interpreter>>>,
    interpreter_name: String,
    filter: TracebackFilter,
    trigger: RunTrigger,
    worker: Option<Worker>,
    last_checkpoint: Option<RunCheckpoint>,
    poll_interval: Duration,
}

impl ExecutionDriver {
    pub fn new(interpreter: Box<dyn Interpreter>, filter: TracebackFilter) -> Self {
        ExecutionDriver {
            interpreter_name: interpreter.name().to_string(),
            interpreter: Arc::new(Mutex::new(interpreter)),
            filter,
            trigger: RunTrigger::default(),
            worker: None,
            last_checkpoint: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> RunState {
        if self.worker.is_some() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn trigger(&self) -> RunTrigger {
        self.trigger
    }

    pub fn last_checkpoint(&self) -> Option<RunCheckpoint> {
        self.last_checkpoint
    }

    pub fn filter(&self) -> &TracebackFilter {
        &self.filter
    }

    /// Start a run.
    ///
    /// With `explicit_source == None` the current editor buffer is run: the
    /// console is cleared, the trigger disabled and a timestamped banner
    /// written. An explicit source is a silent preload.
    pub fn run(
        &mut self,
        explicit_source: Option<String>,
        editor: &dyn Editor,
        sink: &mut OutputSink,
    ) -> Result<(), RunError> {
        if self.is_running() {
            debug!("run rejected, another run is in flight");
            return Err(RunError::Busy);
        }

        let request = match explicit_source {
            Some(source) => ExecutionRequest::preload(source),
            None => ExecutionRequest::buffer(editor.get_value()),
        };

        if !request.preload {
            sink.clear();
            self.trigger.disable();
            sink.write_ok(format!(
                "Console output [{}]",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            ));
        }

        info!(preload = request.preload, bytes = request.source.len(), "run started");
        self.worker = Some(self.spawn_worker(request));
        Ok(())
    }

    fn spawn_worker(&self, request: ExecutionRequest) -> Worker {
        let (tx, rx) = mpsc::channel();
        let interpreter = Arc::clone(&self.interpreter);
        let source = request.source;
        let handle = thread::spawn(move || {
            let events = EventSender::new(tx);
            let mut interpreter = interpreter.lock().unwrap_or_else(PoisonError::into_inner);
            interpreter.execute(&source, &events)
        });
        Worker {
            events: rx,
            handle,
            preload: request.preload,
            started: Instant::now(),
        }
    }

    /// Forward streamed output to the sink and finish the run once the
    /// worker is done. Returns the result exactly once per run.
    pub fn pump(&mut self, sink: &mut OutputSink) -> Option<ExecutionResult> {
        let worker = self.worker.as_ref()?;
        let finished = worker.handle.is_finished();
        let disconnected = forward_events(&worker.events, sink);
        if !finished && !disconnected {
            return None;
        }

        let worker = self.worker.take()?;
        // The worker sends everything before returning
        forward_events(&worker.events, sink);
        let outcome = worker.handle.join().unwrap_or_else(|_| {
            ExecOutcome::HostFailure("interpreter thread panicked".to_string())
        });
        Some(self.finish(outcome, worker.preload, worker.started, sink))
    }

    fn finish(
        &mut self,
        outcome: ExecOutcome,
        preload: bool,
        started: Instant,
        sink: &mut OutputSink,
    ) -> ExecutionResult {
        let result = match outcome {
            ExecOutcome::Ok => ExecutionResult::Ok,
            ExecOutcome::ScriptFailure(failure) => {
                let report = self.filter.report(&failure);
                sink.write_error(report.clone());
                ExecutionResult::Failed { report }
            }
            ExecOutcome::HostFailure(message) => {
                // Nothing else can safely go through the interpreter
                warn!(%message, "host-level failure");
                sink.write_error(message.clone());
                ExecutionResult::Failed { report: message }
            }
        };

        sink.scroll_to_bottom();
        let elapsed = started.elapsed();
        if !preload {
            self.trigger.enable();
            self.last_checkpoint = Some(RunCheckpoint {
                finished_at: SystemTime::now(),
                elapsed,
                ok: result.is_ok(),
            });
        }
        info!(preload, ok = result.is_ok(), elapsed_ms = elapsed.as_millis() as u64, "run finished");
        result
    }

    /// Start a run and pump until it finishes
    pub fn run_to_completion(
        &mut self,
        explicit_source: Option<String>,
        editor: &dyn Editor,
        sink: &mut OutputSink,
    ) -> Result<ExecutionResult, RunError> {
        self.run(explicit_source, editor, sink)?;
        loop {
            if let Some(result) = self.pump(sink) {
                return Ok(result);
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Throw away interpreter state; only allowed while idle
    pub fn restart(&mut self) -> Result<(), RunError> {
        if self.is_running() {
            return Err(RunError::Busy);
        }
        let mut interpreter = self.interpreter.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = interpreter.restart() {
            warn!(error = %e, "interpreter restart failed");
        }
        info!(interpreter = %self.interpreter_name, "interpreter restarted");
        Ok(())
    }

    pub fn interpreter_name(&self) -> &str {
        &self.interpreter_name
    }
}

/// Drain pending events into the sink. Returns true once the sender is gone.
fn forward_events(events: &Receiver<ExecEvent>, sink: &mut OutputSink) -> bool {
    loop {
        match events.try_recv() {
            Ok(ExecEvent::Stdout(text)) => sink.write_ok(text),
            Ok(ExecEvent::Stderr(text)) => sink.write_error(text),
            Ok(ExecEvent::Rich(markup)) => sink.render_rich(markup),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
}
