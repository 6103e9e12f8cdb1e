//! Line-tagged compile diagnostics
//!
//! A [`Diagnostic`] is the only thing a caller sees when compilation fails.
//! It carries a 1-based source line and a message derived purely from the
//! submitted text — no host paths, no stack internals.

use crate::error::CodegenError;
use kata_parser::{LexError, ParseError};
use serde::Serialize;
use std::fmt;

/// A single compiler-produced error message tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line the error refers to
    pub line: u32,
    /// Human-readable error message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        let message = match err {
            LexError::UnexpectedCharacter { char, .. } => {
                format!("unexpected character '{}'", char.escape_default())
            }
            LexError::UnterminatedString { .. } => "unterminated string literal".to_string(),
            LexError::InvalidNumber { text, .. } => format!("invalid number '{text}'"),
        };
        Self::new(err.span().line, message)
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Self::new(err.span.line, err.message.clone())
    }
}

impl From<&CodegenError> for Diagnostic {
    fn from(err: &CodegenError) -> Self {
        Self::new(err.line(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diag = Diagnostic::new(3, "expected ';'");
        assert_eq!(diag.to_string(), "line 3: expected ';'");
    }

    #[test]
    fn test_from_codegen_error() {
        let err = CodegenError::UndefinedVariable {
            name: "x".to_string(),
            line: 7,
        };
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.line, 7);
        assert!(diag.message.contains("x"));
    }
}
