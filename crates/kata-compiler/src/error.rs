//! Code generation errors

use thiserror::Error;

/// Result alias for code generation
pub type CompileResult<T> = Result<T, CodegenError>;

/// Errors produced while lowering the AST to bytecode.
///
/// Every variant carries the 1-based source line it refers to so it can be
/// turned into a [`crate::Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// Reference to a variable that is not in scope
    #[error("undefined variable '{name}'")]
    UndefinedVariable {
        /// The referenced name
        name: String,
        /// Source line of the reference
        line: u32,
    },

    /// Call of a function that is neither defined nor a builtin
    #[error("undefined function '{name}'")]
    UndefinedFunction {
        /// The called name
        name: String,
        /// Source line of the call
        line: u32,
    },

    /// Two top-level functions share a name
    #[error("function '{name}' is defined more than once")]
    DuplicateFunction {
        /// The repeated name
        name: String,
        /// Source line of the second definition
        line: u32,
    },

    /// A function name collides with a builtin
    #[error("function name '{name}' shadows a builtin")]
    ShadowsBuiltin {
        /// The colliding name
        name: String,
        /// Source line of the definition
        line: u32,
    },

    /// A variable is declared twice in the same scope
    #[error("variable '{name}' is already defined in this scope")]
    DuplicateVariable {
        /// The repeated name
        name: String,
        /// Source line of the second declaration
        line: u32,
    },

    /// Call with the wrong number of arguments
    #[error("function '{name}' expects {expected} arguments, {found} given")]
    CallArity {
        /// The called name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
        /// Source line of the call
        line: u32,
    },

    /// `break` outside a loop
    #[error("'break' outside of a loop")]
    InvalidBreak {
        /// Source line of the statement
        line: u32,
    },

    /// `continue` outside a loop
    #[error("'continue' outside of a loop")]
    InvalidContinue {
        /// Source line of the statement
        line: u32,
    },

    /// Too many local variables in one function
    #[error("too many local variables (max {max})")]
    TooManyLocals {
        /// The limit that was exceeded
        max: usize,
        /// Source line of the declaration that overflowed
        line: u32,
    },

    /// Too many constants in the pool
    #[error("too many constants (max {max})")]
    TooManyConstants {
        /// The limit that was exceeded
        max: usize,
        /// Source line of the literal that overflowed
        line: u32,
    },

    /// A jump offset does not fit the instruction encoding
    #[error("function body too large")]
    JumpTooLarge {
        /// Source line of the construct being compiled
        line: u32,
    },

    /// Call with more arguments than the encoding supports
    #[error("calls support at most {max} arguments")]
    TooManyArguments {
        /// The limit that was exceeded
        max: usize,
        /// Source line of the call
        line: u32,
    },
}

impl CodegenError {
    /// The 1-based source line this error refers to
    pub fn line(&self) -> u32 {
        match self {
            CodegenError::UndefinedVariable { line, .. }
            | CodegenError::UndefinedFunction { line, .. }
            | CodegenError::DuplicateFunction { line, .. }
            | CodegenError::ShadowsBuiltin { line, .. }
            | CodegenError::DuplicateVariable { line, .. }
            | CodegenError::CallArity { line, .. }
            | CodegenError::InvalidBreak { line }
            | CodegenError::InvalidContinue { line }
            | CodegenError::TooManyLocals { line, .. }
            | CodegenError::TooManyConstants { line, .. }
            | CodegenError::JumpTooLarge { line }
            | CodegenError::TooManyArguments { line, .. } => *line,
        }
    }
}
