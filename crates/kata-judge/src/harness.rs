//! Test harness: drives the sandbox once per test case
//!
//! The harness consumes one artifact and one ordered list of test cases.
//! A failing case never aborts the suite; outcomes come back in submission
//! order so callers can correlate them positionally.

use crate::suite::{SuiteVerdict, TestCase, TestOutcome};
use kata_vm::{Artifact, ExecutionError, Sandbox, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

/// A stateless suite runner.
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    sandbox: Sandbox,
}

impl TestHarness {
    /// Create a harness with a default sandbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a harness around a configured sandbox.
    pub fn with_sandbox(sandbox: Sandbox) -> Self {
        Self { sandbox }
    }

    /// Run every test case against the artifact's entry point.
    ///
    /// Comparison is exact string equality after trimming a single trailing
    /// newline from both sides. A runtime fault or timeout fails only its
    /// own case; an engine fault fails the faulting case and every
    /// remaining one with the same generic message, since the engine — not
    /// the submission — is broken.
    pub fn run_suite(
        &self,
        artifact: &Artifact,
        entry_name: &str,
        test_cases: &[TestCase],
        deadline: Duration,
    ) -> SuiteVerdict {
        let mut outcomes = Vec::with_capacity(test_cases.len());

        for (index, case) in test_cases.iter().enumerate() {
            let args: Vec<Value> = case.inputs.iter().map(|v| v.to_value()).collect();

            let result = self.execute_guarded(artifact, entry_name, &args, deadline);
            match result {
                Ok(actual) => {
                    let expected = trim_trailing_newline(&case.expected_output);
                    if actual == expected {
                        outcomes.push(TestOutcome::pass(case.clone(), actual));
                    } else {
                        outcomes.push(TestOutcome::mismatch(case.clone(), expected, actual));
                    }
                }
                Err(err @ (ExecutionError::Runtime { .. } | ExecutionError::Timeout { .. })) => {
                    outcomes.push(TestOutcome::faulted(case.clone(), err.to_string()));
                }
                Err(err @ ExecutionError::Engine { .. }) => {
                    let message = err.to_string();
                    for remaining in &test_cases[index..] {
                        outcomes.push(TestOutcome::faulted(remaining.clone(), message.clone()));
                    }
                    break;
                }
            }
        }

        SuiteVerdict::from_outcomes(outcomes)
    }

    /// Execute one case, downgrading any panic to an engine fault.
    ///
    /// The validate boundary promises callers a value, never an unwind.
    fn execute_guarded(
        &self,
        artifact: &Artifact,
        entry_name: &str,
        args: &[Value],
        deadline: Duration,
    ) -> Result<String, ExecutionError> {
        catch_unwind(AssertUnwindSafe(|| {
            self.sandbox.execute(artifact, entry_name, args, deadline)
        }))
        .unwrap_or_else(|_| {
            Err(ExecutionError::engine(
                "execution failed unexpectedly inside the engine",
            ))
        })
    }
}

/// Remove a single trailing newline, mirroring the sandbox's own trim
fn trim_trailing_newline(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_newline() {
        assert_eq!(trim_trailing_newline("a\n"), "a");
        assert_eq!(trim_trailing_newline("a\n\n"), "a\n");
        assert_eq!(trim_trailing_newline("a"), "a");
        assert_eq!(trim_trailing_newline(""), "");
    }
}
