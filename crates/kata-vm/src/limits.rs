//! Resource limits for sandbox execution

/// Bounds on what one execution may consume, besides wall-clock time.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum call depth before the execution faults.
    ///
    /// Bounds both stack memory and runaway recursion.
    pub max_call_depth: usize,

    /// Maximum bytes of captured output before the execution faults.
    ///
    /// Bounds the memory a print loop can consume inside its deadline.
    pub max_output_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_call_depth: 1024,
            max_output_bytes: 1024 * 1024, // 1 MiB
        }
    }
}
