// Shared helpers for the integration tests

#![allow(dead_code)]

use scriptpad::exec::{EventSender, ExecOutcome, ExecutionDriver, Interpreter, RawFailure, TracebackFilter};
use scriptpad::output::{OutputKind, OutputSink};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Failure dump in the shape the python bootstrap produces
pub const SCRIPT_TRACEBACK: &str = "Traceback (most recent call last):
  File \"<bootstrap>\", line 41, in _serve
  File \"<bootstrap>\", line 18, in _run
  File \"main.py\", line 1, in <module>
Exception: x";

/// Interpreter that answers a few known sources without a python process
#[derive(Clone, Default)]
pub struct ScriptedInterpreter {
    /// Every source executed so far
    pub seen: Arc<Mutex<Vec<String>>>,
    /// Released by the test to let a `block` source finish
    pub gate: Arc<Mutex<bool>>,
    pub restarts: Arc<Mutex<usize>>,
}

impl ScriptedInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn release(&self) {
        *self.gate.lock().unwrap() = true;
    }
}

impl Interpreter for ScriptedInterpreter {
    fn name(&self) -> &str {
        "scripted"
    }

    fn execute(&mut self, source: &str, events: &EventSender) -> ExecOutcome {
        self.seen.lock().unwrap().push(source.to_string());
        match source.trim() {
            "print(1+1)" => {
                events.stdout("2");
                ExecOutcome::Ok
            }
            "raise Exception('x')" => ExecOutcome::ScriptFailure(RawFailure::new(SCRIPT_TRACEBACK)),
            "import sys; sys.stderr.write('warn')" => {
                events.stderr("warn");
                ExecOutcome::Ok
            }
            "render_html('<b>hi</b>')" => {
                events.render_html("<b>hi</b>");
                ExecOutcome::Ok
            }
            "crash" => ExecOutcome::HostFailure("interpreter exited unexpectedly (signal 9)".to_string()),
            "block" => {
                while !*self.gate.lock().unwrap() {
                    std::thread::sleep(Duration::from_millis(1));
                }
                events.stdout("unblocked");
                ExecOutcome::Ok
            }
            _ => ExecOutcome::Ok,
        }
    }

    fn restart(&mut self) -> Result<(), scriptpad::exec::ExecError> {
        *self.restarts.lock().unwrap() += 1;
        Ok(())
    }
}

pub fn scripted_driver() -> (ExecutionDriver, ScriptedInterpreter) {
    let interpreter = ScriptedInterpreter::new();
    let driver = ExecutionDriver::new(Box::new(interpreter.clone()), TracebackFilter::default())
        .with_poll_interval(Duration::from_millis(1));
    (driver, interpreter)
}

/// Texts of the sink entries of one kind
pub fn texts(sink: &OutputSink, kind: OutputKind) -> Vec<String> {
    sink.entries()
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.text.clone())
        .collect()
}

pub fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
