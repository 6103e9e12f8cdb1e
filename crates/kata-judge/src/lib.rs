//! Kata Validation Engine
//!
//! The single call surface a controller or UI layer uses to judge one code
//! submission: compile it, run it against the lesson's test cases in the
//! sandbox, and report a suite verdict or compile diagnostics.
//!
//! Every [`ValidationEngine::validate`] call is a self-contained unit of
//! work: the engine's services are stateless, output capture is call-local,
//! and the compiled artifact never outlives the call. Arbitrarily many
//! validations may run concurrently on their own threads.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod engine;
pub mod harness;
pub mod state;
pub mod suite;

pub use engine::{EngineOptions, ValidationEngine};
pub use harness::TestHarness;
pub use state::SubmissionState;
pub use suite::{SuiteVerdict, TestCase, TestOutcome, TestValue};

pub use kata_compiler::{render_diagnostics, Diagnostic, SourceUnit};
pub use kata_vm::{ExecutionError, ResourceLimits, Value};
