//! Error types for the execution layer
//!
//! These cover failures of the machinery around a run (spawning the
//! interpreter, talking to it). Failures raised *by* a script are not errors
//! here: they travel as [`ExecOutcome::ScriptFailure`] and end up as text in
//! the console.
//!
//! [`ExecOutcome::ScriptFailure`]: super::interpreter::ExecOutcome::ScriptFailure

use std::io;
use thiserror::Error;

/// Faults of the interpreter process or its protocol
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start interpreter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("interpreter pipe error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed interpreter frame: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("interpreter exited unexpectedly ({status})")]
    Exited { status: String },
}

/// Rejection of a run request
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    #[error("a run is already in progress")]
    Busy,
}
