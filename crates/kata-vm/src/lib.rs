//! Kata Execution Sandbox
//!
//! Loads a compiled artifact in an isolated, per-call interpreter, invokes
//! its entry point with given arguments, captures everything the program
//! writes to its output channel, and enforces a wall-clock deadline.
//!
//! Isolation properties:
//! - A fresh interpreter is constructed inside every `execute` call and
//!   dropped on every exit path; nothing is reused between artifacts.
//! - Output capture is call-local: the capture destination is a parameter
//!   threaded through the call, never a process-global stream, so any
//!   number of executions may run concurrently without cross-talk.
//! - Submitted code exists only as bytecode under this interpreter's
//!   dispatch loop, so the deadline poll terminates a runaway submission
//!   unconditionally.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod limits;
pub mod output;
pub mod sandbox;
pub mod value;

mod interpreter;

pub use error::{ExecResult, ExecutionError};
pub use kata_bytecode::Artifact;
pub use limits::ResourceLimits;
pub use output::{CaptureBuffer, OutputSink};
pub use sandbox::Sandbox;
pub use value::Value;
