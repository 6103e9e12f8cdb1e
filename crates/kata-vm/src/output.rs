//! Call-local output capture
//!
//! The capture destination is a parameter of each execution, not a process
//! global. `print`/`println` in submitted code write here and nowhere else,
//! which is what makes concurrent executions free of cross-talk.

/// Destination for everything a submission writes to its output stream
pub trait OutputSink {
    /// Append a chunk of program output
    fn write_str(&mut self, chunk: &str);
}

/// An in-memory sink that accumulates the complete output of one execution
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    buffer: String,
}

impl CaptureBuffer {
    /// Create an empty capture buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes captured so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been captured
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The captured output so far
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consume the buffer, returning the captured output
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl OutputSink for CaptureBuffer {
    fn write_str(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }
}
