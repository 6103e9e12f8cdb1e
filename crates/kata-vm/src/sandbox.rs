//! The execution sandbox facade
//!
//! [`Sandbox::execute`] is the one call the harness makes per test case: it
//! loads an artifact in isolation, invokes an entry point under a deadline,
//! and hands back the captured output.

use crate::error::{ExecResult, ExecutionError};
use crate::interpreter::Interpreter;
use crate::limits::ResourceLimits;
use crate::output::{CaptureBuffer, OutputSink};
use crate::value::Value;
use kata_bytecode::{verify_artifact, Artifact};
use std::time::Duration;

/// A stateless execution service.
///
/// The sandbox itself holds only configuration; every `execute` call builds
/// a fresh loading context (interpreter, stack, frames) and tears it down
/// on all exit paths, so concurrent calls never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    limits: ResourceLimits,
}

impl Sandbox {
    /// Create a sandbox with default resource limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sandbox with explicit resource limits.
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self { limits }
    }

    /// The sandbox's resource limits.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Execute an artifact's entry point and return its captured output.
    ///
    /// The returned string is the complete program output with a single
    /// trailing newline removed, ready for verdict comparison.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::Engine`] if the artifact fails verification or
    ///   has no function named `entry_name`
    /// - [`ExecutionError::Runtime`] if the submission faults, including an
    ///   entry signature that does not accept the supplied arguments
    /// - [`ExecutionError::Timeout`] if the entry point does not return
    ///   within `deadline`
    pub fn execute(
        &self,
        artifact: &Artifact,
        entry_name: &str,
        args: &[Value],
        deadline: Duration,
    ) -> ExecResult<String> {
        let mut capture = CaptureBuffer::new();
        self.execute_with_sink(artifact, entry_name, args, &mut capture, deadline)?;

        let mut output = capture.into_string();
        if output.ends_with('\n') {
            output.pop();
        }
        Ok(output)
    }

    /// Execute with a caller-supplied output sink.
    ///
    /// The sink is the capture destination for everything the program
    /// prints; threading it through the call is what keeps capture
    /// call-local instead of process-global.
    pub fn execute_with_sink(
        &self,
        artifact: &Artifact,
        entry_name: &str,
        args: &[Value],
        sink: &mut dyn OutputSink,
        deadline: Duration,
    ) -> ExecResult<()> {
        // Load-time checks: these failures are engine faults, not the
        // submission author's.
        verify_artifact(artifact).map_err(|_| {
            ExecutionError::engine("compiled artifact failed validation before execution")
        })?;

        let Some((entry_index, entry)) = artifact.function_named(entry_name) else {
            return Err(ExecutionError::engine(format!(
                "no entry point named '{entry_name}' in the compiled artifact"
            )));
        };

        // The learner owns the entry signature, so a mismatch with the test
        // case's inputs is attributed to the submission.
        if entry.param_count != args.len() {
            return Err(ExecutionError::runtime(format!(
                "'{entry_name}' expects {} arguments, but {} were supplied",
                entry.param_count,
                args.len()
            )));
        }

        Interpreter::new(artifact, &self.limits, deadline).run(entry_index, args, sink)
    }
}
