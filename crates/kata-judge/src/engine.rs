//! The validation engine facade
//!
//! The only entry point external collaborators call. It owns the
//! Compiler -> Artifact -> Harness lifecycle: compile failure
//! short-circuits with diagnostics and no execution; on success the
//! harness runs exactly once and the artifact is dropped before the call
//! returns.

use crate::harness::TestHarness;
use crate::state::SubmissionState;
use crate::suite::{SuiteVerdict, TestCase};
use kata_compiler::{Compiler, Diagnostic, SourceUnit};
use kata_vm::{ResourceLimits, Sandbox};
use std::time::Duration;

/// Configuration for one validation engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Wall-clock deadline applied to each test-case execution
    pub deadline: Duration,
    /// Sandbox resource limits applied to each execution
    pub limits: ResourceLimits,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(2),
            limits: ResourceLimits::default(),
        }
    }
}

/// The top-level compile-execute-validate service.
///
/// Holds no state across calls; a single engine may serve concurrent
/// `validate` calls from many threads.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    compiler: Compiler,
    harness: TestHarness,
    options: EngineOptions,
}

impl ValidationEngine {
    /// Create an engine with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            compiler: Compiler::new(),
            harness: TestHarness::with_sandbox(Sandbox::with_limits(options.limits.clone())),
            options,
        }
    }

    /// The engine's options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Validate one submission against its lesson's test cases.
    ///
    /// # Errors
    ///
    /// Returns the compiler's diagnostics if the submission does not
    /// compile; no execution is attempted in that case.
    pub fn validate(
        &self,
        unit: &SourceUnit,
        test_cases: &[TestCase],
    ) -> Result<SuiteVerdict, Vec<Diagnostic>> {
        let mut state = SubmissionState::Pending;
        advance(&mut state, SubmissionState::Compiling);

        let artifact = match self.compiler.compile(unit) {
            Err(diagnostics) => {
                advance(&mut state, SubmissionState::CompileFailed);
                return Err(diagnostics);
            }
            Ok(artifact) => artifact,
        };
        advance(&mut state, SubmissionState::Compiled);

        advance(&mut state, SubmissionState::Executing);
        let verdict =
            self.harness
                .run_suite(&artifact, &unit.entry_name, test_cases, self.options.deadline);
        advance(&mut state, SubmissionState::Executed);

        // `artifact` drops here; it never escapes the validate call.
        Ok(verdict)
    }
}

/// Step the submission state machine, asserting the transition is legal.
fn advance(state: &mut SubmissionState, next: SubmissionState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal submission state transition: {state:?} -> {next:?}"
    );
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadline_is_two_seconds() {
        let engine = ValidationEngine::new();
        assert_eq!(engine.options().deadline, Duration::from_secs(2));
    }
}
