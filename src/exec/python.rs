//! Python interpreter backed by a long-lived child process
//!
//! The child runs a small bootstrap that redirects `sys.stdout`/`sys.stderr`
//! into JSON frames on the real stdout, installs the rich output module and
//! then serves one request per line on stdin:
//!
//! ```text
//! → {"source": "print(1+1)"}
//! ← \x1e{"kind":"out","text":"2"}
//! ← \x1e{"kind":"done","traceback":null}
//! ```
//!
//! The process survives between runs, so imports warmed by a preload run stay
//! cached. If it dies or the protocol breaks, the run is reported as a
//! host-level failure and a fresh process is spawned on the next run.

use super::errors::ExecError;
use super::interpreter::{EventSender, ExecOutcome, Interpreter, RawFailure};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::{debug, info, warn};

const BOOTSTRAP: &str = include_str!("bootstrap.py");

/// Marks a protocol frame on the child's stdout
const FRAME_PREFIX: char = '\x1e';

/// Lines of raw stderr kept for host-failure messages
const STDERR_TAIL: usize = 20;

/// How to launch the interpreter
#[derive(Debug, Clone)]
pub struct PythonConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Virtual filename user source is compiled under
    pub entry_point: String,
    /// Name of the module exposing `render_html`
    pub module_name: String,
    /// Working directory of the child (the example filesystem root)
    pub workdir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Frame {
    Out { text: String },
    Err { text: String },
    Rich { markup: String },
    Done { traceback: Option<String> },
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    source: &'a str,
}

struct Process {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
}

impl Process {
    /// Send one request and forward frames until the run is done.
    /// Returns the traceback text if the script raised.
    fn exchange(&mut self, source: &str, events: &EventSender) -> Result<Option<String>, ExecError> {
        let request = serde_json::to_string(&Request { source })?;
        writeln!(self.stdin, "{}", request)?;
        self.stdin.flush()?;

        let mut buf = String::new();
        // Every frame is preceded by a newline; a blank line is only output
        // if something other than a frame follows it
        let mut held_blank = false;
        loop {
            buf.clear();
            if self.stdout.read_line(&mut buf)? == 0 {
                return Err(self.exited());
            }
            let line = buf.trim_end_matches(['\n', '\r']);
            let Some((raw, payload)) = split_frame(line) else {
                // Written straight to fd 1, bypassing sys.stdout
                if std::mem::replace(&mut held_blank, line.is_empty()) {
                    events.stdout("");
                }
                if !line.is_empty() {
                    events.stdout(line);
                }
                continue;
            };
            held_blank = false;
            if !raw.is_empty() {
                events.stdout(raw);
            }
            match serde_json::from_str::<Frame>(payload)? {
                Frame::Out { text } => events.stdout(text),
                Frame::Err { text } => events.stderr(text),
                Frame::Rich { markup } => events.render_html(markup),
                Frame::Done { traceback } => return Ok(traceback),
            }
        }
    }

    fn exited(&mut self) -> ExecError {
        let status = match self.child.wait() {
            Ok(status) => status.to_string(),
            Err(e) => e.to_string(),
        };
        ExecError::Exited { status }
    }

    fn stderr_tail(&self) -> Vec<String> {
        let tail = self.stderr_tail.lock().unwrap_or_else(PoisonError::into_inner);
        tail.iter().cloned().collect()
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub struct PythonInterpreter {
    config: PythonConfig,
    process: Option<Process>,
}

impl PythonInterpreter {
    pub fn new(config: PythonConfig) -> Self {
        PythonInterpreter {
            config,
            process: None,
        }
    }

    pub fn config(&self) -> &PythonConfig {
        &self.config
    }

    fn spawn(&self) -> Result<Process, ExecError> {
        fs::create_dir_all(&self.config.workdir)?;

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg("-c")
            .arg(BOOTSTRAP)
            .arg(&self.config.entry_point)
            .arg(&self.config.module_name)
            .current_dir(&self.config.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL)));
        drain_stderr(stderr, Arc::clone(&stderr_tail));

        info!(program = %self.config.program, pid = child.id(), "interpreter started");
        Ok(Process {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr_tail,
        })
    }

    fn ensure_process(&mut self) -> Result<&mut Process, ExecError> {
        let process = match self.process.take() {
            Some(process) => process,
            None => self.spawn()?,
        };
        Ok(self.process.insert(process))
    }
}

impl Interpreter for PythonInterpreter {
    fn name(&self) -> &str {
        &self.config.program
    }

    fn execute(&mut self, source: &str, events: &EventSender) -> ExecOutcome {
        let process = match self.ensure_process() {
            Ok(process) => process,
            Err(e) => return e.into(),
        };

        match process.exchange(source, events) {
            Ok(None) => ExecOutcome::Ok,
            Ok(Some(traceback)) => ExecOutcome::ScriptFailure(RawFailure::new(traceback)),
            Err(e) => {
                let mut message = e.to_string();
                for line in process.stderr_tail() {
                    message.push('\n');
                    message.push_str(&line);
                }
                warn!(error = %e, "interpreter lost, will respawn on next run");
                self.process = None;
                ExecOutcome::HostFailure(message)
            }
        }
    }

    fn restart(&mut self) -> Result<(), ExecError> {
        if self.process.take().is_some() {
            debug!("interpreter process stopped");
        }
        Ok(())
    }
}

/// Split a stdout line into raw text and a frame payload.
///
/// JSON frames never contain a literal `\x1e`, so the last one starts the frame.
fn split_frame(line: &str) -> Option<(&str, &str)> {
    let at = line.rfind(FRAME_PREFIX)?;
    Some((&line[..at], &line[at + FRAME_PREFIX.len_utf8()..]))
}

fn missing_pipe(name: &str) -> ExecError {
    ExecError::Io(io::Error::other(format!("child {} was not captured", name)))
}

/// Raw stderr only carries interpreter-level noise; log it and keep a tail
fn drain_stderr(stderr: ChildStderr, tail: Arc<Mutex<VecDeque<String>>>) {
    thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            warn!(target: "scriptpad::interpreter", "{}", line);
            let mut tail = tail.lock().unwrap_or_else(PoisonError::into_inner);
            if tail.len() == STDERR_TAIL {
                tail.pop_front();
            }
            tail.push_back(line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_glued_to_raw_text_is_split() {
        assert_eq!(
            split_frame("partial\x1e{\"kind\":\"done\"}"),
            Some(("partial", "{\"kind\":\"done\"}"))
        );
        assert_eq!(split_frame("\x1e{}"), Some(("", "{}")));
        assert_eq!(split_frame("plain text"), None);
    }
}
