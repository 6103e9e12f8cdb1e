//! Kata Bytecode Definitions
//!
//! This crate provides the instruction set, the in-memory compiled artifact
//! format, and the constant pool structures shared by the Kata compiler and
//! the execution sandbox.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod artifact;
pub mod builtin;
pub mod constants;
pub mod encoder;
pub mod opcode;
pub mod verify;

pub use artifact::{Artifact, ArtifactError, Function};
pub use builtin::Builtin;
pub use constants::ConstantPool;
pub use encoder::BytecodeWriter;
pub use opcode::Opcode;
pub use verify::{verify_artifact, VerifyError};
