//! Execution errors
//!
//! The taxonomy mirrors how failures are attributed:
//! - [`ExecutionError::Timeout`]: the submission did not finish in time
//! - [`ExecutionError::Runtime`]: the submission faulted (its own fault)
//! - [`ExecutionError::Engine`]: the engine failed (never the submission's
//!   fault); messages stay generic and expose no host internals
//!
//! None of these escape the sandbox as panics; the caller always receives
//! a value.

use std::time::Duration;
use thiserror::Error;

/// Result alias for sandbox execution
pub type ExecResult<T> = Result<T, ExecutionError>;

/// An execution that did not produce captured output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// The entry point did not return before the deadline
    #[error("execution timed out after {:.1} seconds", deadline.as_secs_f64())]
    Timeout {
        /// The configured deadline that was exceeded
        deadline: Duration,
    },

    /// The submitted program faulted during execution
    #[error("runtime fault: {message}")]
    Runtime {
        /// What went wrong, in terms of the submitted program
        message: String,
    },

    /// An internal failure unrelated to the submission
    #[error("internal engine error: {message}")]
    Engine {
        /// Generic description; never host paths or stack internals
        message: String,
    },
}

impl ExecutionError {
    /// Shorthand for a runtime fault
    pub fn runtime(message: impl Into<String>) -> Self {
        ExecutionError::Runtime {
            message: message.into(),
        }
    }

    /// Shorthand for an engine fault
    pub fn engine(message: impl Into<String>) -> Self {
        ExecutionError::Engine {
            message: message.into(),
        }
    }
}
