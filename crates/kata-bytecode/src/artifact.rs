//! Compiled artifact format
//!
//! An [`Artifact`] is the opaque, loadable result of compiling one
//! submission: a constant pool plus a set of functions keyed by name, each
//! carrying its bytecode payload. Artifacts live only in memory, are owned
//! by the compile call that produced them, and are dropped once a harness
//! run completes. There is no on-disk representation.

use crate::constants::ConstantPool;
use thiserror::Error;

/// Artifact structural errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Fingerprint recomputation did not match the stored value
    #[error("Artifact fingerprint mismatch: expected {expected:#x}, got {actual:#x}")]
    FingerprintMismatch {
        /// Fingerprint stored at build time
        expected: u32,
        /// Fingerprint recomputed from the current payloads
        actual: u32,
    },

    /// Two functions share a name
    #[error("Duplicate function name: {0}")]
    DuplicateFunction(String),
}

/// A single compiled function
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name (the invocable symbol)
    pub name: String,
    /// Number of parameters
    pub param_count: usize,
    /// Number of local variable slots, parameters included
    pub local_count: usize,
    /// Bytecode payload
    pub code: Vec<u8>,
}

/// A compiled, loadable artifact
#[derive(Debug, Clone)]
pub struct Artifact {
    constants: ConstantPool,
    functions: Vec<Function>,
    fingerprint: u32,
}

impl Artifact {
    /// Assemble an artifact from codegen output
    ///
    /// Computes the integrity fingerprint over all function payloads.
    pub fn new(constants: ConstantPool, functions: Vec<Function>) -> Self {
        let fingerprint = fingerprint_of(&functions);
        Self {
            constants,
            functions,
            fingerprint,
        }
    }

    /// The artifact's constant pool
    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    /// All functions, in definition order
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Look up a function by index
    pub fn function(&self, index: usize) -> Option<&Function> {
        self.functions.get(index)
    }

    /// Look up a function by its invocable symbol name
    pub fn function_named(&self, name: &str) -> Option<(usize, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
    }

    /// Integrity fingerprint computed at build time
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Validate structural invariants: unique names, intact fingerprint
    pub fn validate(&self) -> Result<(), ArtifactError> {
        for (i, f) in self.functions.iter().enumerate() {
            if self.functions[..i].iter().any(|g| g.name == f.name) {
                return Err(ArtifactError::DuplicateFunction(f.name.clone()));
            }
        }
        let actual = fingerprint_of(&self.functions);
        if actual != self.fingerprint {
            return Err(ArtifactError::FingerprintMismatch {
                expected: self.fingerprint,
                actual,
            });
        }
        Ok(())
    }
}

/// CRC32 over every function's name, shape, and payload
fn fingerprint_of(functions: &[Function]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for f in functions {
        hasher.update(f.name.as_bytes());
        hasher.update(&(f.param_count as u32).to_le_bytes());
        hasher.update(&(f.local_count as u32).to_le_bytes());
        hasher.update(&f.code);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BytecodeWriter;
    use crate::opcode::Opcode;

    fn sample_function(name: &str) -> Function {
        let mut writer = BytecodeWriter::new();
        writer.emit_opcode(Opcode::ConstNull);
        writer.emit_opcode(Opcode::Return);
        Function {
            name: name.to_string(),
            param_count: 0,
            local_count: 0,
            code: writer.into_bytes(),
        }
    }

    #[test]
    fn test_function_lookup() {
        let artifact = Artifact::new(
            ConstantPool::new(),
            vec![sample_function("main"), sample_function("helper")],
        );

        let (idx, f) = artifact.function_named("helper").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(f.name, "helper");
        assert!(artifact.function_named("missing").is_none());
    }

    #[test]
    fn test_validate_ok() {
        let artifact = Artifact::new(ConstantPool::new(), vec![sample_function("main")]);
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_duplicate_function_detected() {
        let artifact = Artifact::new(
            ConstantPool::new(),
            vec![sample_function("main"), sample_function("main")],
        );
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::DuplicateFunction(_))
        ));
    }

    #[test]
    fn test_fingerprint_tracks_payload() {
        let a = Artifact::new(ConstantPool::new(), vec![sample_function("main")]);
        let b = Artifact::new(ConstantPool::new(), vec![sample_function("other")]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
