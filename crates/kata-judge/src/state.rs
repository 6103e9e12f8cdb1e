//! Submission lifecycle states
//!
//! One submission moves through a fixed state machine:
//!
//! ```text
//! Pending -> Compiling -> CompileFailed
//!                      -> Compiled -> Executing -> Executed
//! ```
//!
//! `CompileFailed` and `Executed` are terminal. There are no automatic
//! retries; a retry is a new submission starting from `Pending`.

use serde::Serialize;

/// Lifecycle state of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionState {
    /// Received, not yet compiled
    Pending,
    /// Compilation in progress
    Compiling,
    /// Compilation produced diagnostics; terminal
    CompileFailed,
    /// An artifact exists; execution not yet started
    Compiled,
    /// The test suite is running
    Executing,
    /// The suite finished and a verdict exists; terminal
    Executed,
}

impl SubmissionState {
    /// Whether this state admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::CompileFailed | SubmissionState::Executed
        )
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Pending, Compiling)
                | (Compiling, CompileFailed)
                | (Compiling, Compiled)
                | (Compiled, Executing)
                | (Executing, Executed)
        )
    }
}
