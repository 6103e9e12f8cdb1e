//! Kata Compiler
//!
//! Turns one submission's source text into a loadable [`Artifact`], or into
//! an ordered list of line-tagged [`Diagnostic`]s when the source is
//! malformed. The compiler is a stateless service: it holds nothing between
//! calls, writes nothing to disk, and compiling the same source twice
//! produces equivalent results.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codegen;
pub mod diagnostic;
pub mod error;
pub mod render;

mod builder;

pub use diagnostic::Diagnostic;
pub use error::{CodegenError, CompileResult};
pub use kata_bytecode::Artifact;
pub use render::render_diagnostics;

use kata_parser::Parser;

/// A named, in-memory unit of source text representing one compilable program.
///
/// `entry_name` is the symbol the sandbox will invoke; whether it actually
/// exists in `source_text` is checked at load time, not here. Submissions
/// are immutable once created and discarded after compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// The invocable symbol expected to exist in `source_text`
    pub entry_name: String,
    /// The submitted program text
    pub source_text: String,
}

impl SourceUnit {
    /// Create a source unit for one submission
    pub fn new(entry_name: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            entry_name: entry_name.into(),
            source_text: source_text.into(),
        }
    }
}

/// The stateless compilation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler;

impl Compiler {
    /// Create a compiler.
    pub fn new() -> Self {
        Self
    }

    /// Compile a submission into an artifact.
    ///
    /// # Errors
    ///
    /// Returns a non-empty, source-ordered list of diagnostics if the
    /// submission fails to lex, parse, or generate code. Diagnostics carry
    /// 1-based line numbers and only information derivable from the
    /// submitted source.
    pub fn compile(&self, unit: &SourceUnit) -> Result<Artifact, Vec<Diagnostic>> {
        let parser = match Parser::new(&unit.source_text) {
            Ok(parser) => parser,
            Err(lex_errors) => {
                return Err(lex_errors.iter().map(Diagnostic::from).collect());
            }
        };

        let program = match parser.parse() {
            Ok(program) => program,
            Err(parse_errors) => {
                return Err(parse_errors.iter().map(Diagnostic::from).collect());
            }
        };

        codegen::CodeGenerator::new()
            .compile(&program)
            .map_err(|err| vec![Diagnostic::from(&err)])
    }
}
