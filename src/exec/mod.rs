//! Script execution: the driver, the interpreter collaborator and traceback trimming
//!
//! - [`driver`]: the `Idle → Running → Idle` run cycle feeding the console
//! - [`interpreter`]: the [`Interpreter`] trait and the tagged [`ExecOutcome`]
//! - [`python`]: a persistent `python3` child process implementing it
//! - [`traceback`]: drops interpreter bootstrap frames from failure reports

pub mod driver;
pub mod errors;
pub mod interpreter;
pub mod python;
pub mod traceback;

pub use driver::{
    ExecutionDriver, ExecutionRequest, ExecutionResult, RunCheckpoint, RunState, RunTrigger,
};
pub use errors::{ExecError, RunError};
pub use interpreter::{EventSender, ExecEvent, ExecOutcome, Interpreter, RawFailure};
pub use python::{PythonConfig, PythonInterpreter};
pub use traceback::{TracebackFilter, DEFAULT_ENTRY_POINT, FAILURE_HEADER};
