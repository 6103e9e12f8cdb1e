//! Bytecode verification
//!
//! The sandbox verifies an artifact before loading it: every opcode must be
//! valid and complete, every jump must land on an instruction boundary, and
//! every pool, local, function, and builtin reference must be in bounds. A
//! verification failure is an engine fault, never attributable to the
//! submission author.

use crate::artifact::{Artifact, Function};
use crate::builtin::Builtin;
use crate::opcode::Opcode;
use std::collections::HashSet;

/// Bytecode verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Invalid opcode byte
    #[error("Invalid opcode {opcode:#x} at offset {offset} in {function}")]
    InvalidOpcode {
        /// The unrecognized byte
        opcode: u8,
        /// Byte offset within the function
        offset: usize,
        /// Function name
        function: String,
    },

    /// Operands run past the end of the code
    #[error("Truncated instruction at offset {offset} in {function}")]
    TruncatedInstruction {
        /// Byte offset within the function
        offset: usize,
        /// Function name
        function: String,
    },

    /// Jump lands outside the function or inside an instruction
    #[error("Invalid jump target {target} at offset {offset} in {function}")]
    InvalidJumpTarget {
        /// Computed target offset
        target: isize,
        /// Byte offset of the jump instruction
        offset: usize,
        /// Function name
        function: String,
    },

    /// Constant pool reference out of bounds
    #[error("Invalid constant reference {index} at offset {offset} in {function}")]
    InvalidConstantRef {
        /// Referenced pool index
        index: u16,
        /// Byte offset of the instruction
        offset: usize,
        /// Function name
        function: String,
    },

    /// Local slot reference out of bounds
    #[error("Invalid local slot {index} (max {max}) at offset {offset} in {function}")]
    InvalidLocalRef {
        /// Referenced slot
        index: u16,
        /// Number of declared slots
        max: usize,
        /// Byte offset of the instruction
        offset: usize,
        /// Function name
        function: String,
    },

    /// Call target out of bounds or arity mismatch
    #[error("Invalid call to function {index} at offset {offset} in {function}: {reason}")]
    InvalidCall {
        /// Referenced function index
        index: u16,
        /// Byte offset of the instruction
        offset: usize,
        /// Function name
        function: String,
        /// Why the call is invalid
        reason: String,
    },

    /// Unknown builtin id or wrong builtin arity
    #[error("Invalid builtin call at offset {offset} in {function}: {reason}")]
    InvalidBuiltin {
        /// Byte offset of the instruction
        offset: usize,
        /// Function name
        function: String,
        /// Why the call is invalid
        reason: String,
    },

    /// Execution can fall off the end of the function
    #[error("Execution falls off end of {function}")]
    FallOffEnd {
        /// Function name
        function: String,
    },

    /// Artifact-level structural error
    #[error("Artifact validation failed: {0}")]
    Artifact(#[from] crate::artifact::ArtifactError),
}

/// A decoded instruction with its operand bytes
struct Instruction {
    offset: usize,
    opcode: Opcode,
    operands: [u8; 3],
}

impl Instruction {
    fn u16_operand(&self) -> u16 {
        u16::from_le_bytes([self.operands[0], self.operands[1]])
    }

    fn i16_operand(&self) -> i16 {
        i16::from_le_bytes([self.operands[0], self.operands[1]])
    }

    /// Offset of the instruction that follows this one
    fn next_offset(&self) -> usize {
        self.offset + 1 + self.opcode.operand_size()
    }
}

/// Verify an artifact's structure and every function's bytecode
pub fn verify_artifact(artifact: &Artifact) -> Result<(), VerifyError> {
    artifact.validate()?;
    for function in artifact.functions() {
        verify_function(function, artifact)?;
    }
    Ok(())
}

fn verify_function(function: &Function, artifact: &Artifact) -> Result<(), VerifyError> {
    let instructions = decode_instructions(function)?;

    // A function must end in an unconditional terminator; codegen always
    // appends an implicit `const.null; return`.
    match instructions.last() {
        Some(last) if last.opcode.is_terminator() => {}
        _ => {
            return Err(VerifyError::FallOffEnd {
                function: function.name.clone(),
            })
        }
    }

    let boundaries: HashSet<usize> = instructions.iter().map(|i| i.offset).collect();

    for instr in &instructions {
        match instr.opcode {
            Opcode::Jump | Opcode::JumpIfFalse | Opcode::JumpIfTrue => {
                let target = instr.next_offset() as isize + instr.i16_operand() as isize;
                let valid = target >= 0 && boundaries.contains(&(target as usize));
                if !valid {
                    return Err(VerifyError::InvalidJumpTarget {
                        target,
                        offset: instr.offset,
                        function: function.name.clone(),
                    });
                }
            }
            Opcode::ConstInt => {
                check_pool(instr, artifact.constants().integer_count(), function)?;
            }
            Opcode::ConstFloat => {
                check_pool(instr, artifact.constants().float_count(), function)?;
            }
            Opcode::ConstStr => {
                check_pool(instr, artifact.constants().string_count(), function)?;
            }
            Opcode::LoadLocal | Opcode::StoreLocal => {
                let index = instr.u16_operand();
                if index as usize >= function.local_count {
                    return Err(VerifyError::InvalidLocalRef {
                        index,
                        max: function.local_count,
                        offset: instr.offset,
                        function: function.name.clone(),
                    });
                }
            }
            Opcode::Call => {
                let index = instr.u16_operand();
                let argc = instr.operands[2] as usize;
                match artifact.function(index as usize) {
                    None => {
                        return Err(VerifyError::InvalidCall {
                            index,
                            offset: instr.offset,
                            function: function.name.clone(),
                            reason: "no such function".to_string(),
                        })
                    }
                    Some(target) if target.param_count != argc => {
                        return Err(VerifyError::InvalidCall {
                            index,
                            offset: instr.offset,
                            function: function.name.clone(),
                            reason: format!(
                                "expects {} arguments, call passes {argc}",
                                target.param_count
                            ),
                        })
                    }
                    Some(_) => {}
                }
            }
            Opcode::CallBuiltin => {
                let id = instr.operands[0];
                let argc = instr.operands[1];
                match Builtin::from_u8(id) {
                    None => {
                        return Err(VerifyError::InvalidBuiltin {
                            offset: instr.offset,
                            function: function.name.clone(),
                            reason: format!("unknown builtin id {id}"),
                        })
                    }
                    Some(builtin) => {
                        if let Some(required) = builtin.fixed_arity() {
                            if required != argc {
                                return Err(VerifyError::InvalidBuiltin {
                                    offset: instr.offset,
                                    function: function.name.clone(),
                                    reason: format!(
                                        "{} expects {required} arguments, call passes {argc}",
                                        builtin.name()
                                    ),
                                });
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn check_pool(instr: &Instruction, pool_len: usize, function: &Function) -> Result<(), VerifyError> {
    let index = instr.u16_operand();
    if index as usize >= pool_len {
        return Err(VerifyError::InvalidConstantRef {
            index,
            offset: instr.offset,
            function: function.name.clone(),
        });
    }
    Ok(())
}

fn decode_instructions(function: &Function) -> Result<Vec<Instruction>, VerifyError> {
    let code = &function.code;
    let mut instructions = Vec::new();
    let mut offset = 0;

    while offset < code.len() {
        let byte = code[offset];
        let opcode = Opcode::from_u8(byte).ok_or_else(|| VerifyError::InvalidOpcode {
            opcode: byte,
            offset,
            function: function.name.clone(),
        })?;

        let size = opcode.operand_size();
        if offset + 1 + size > code.len() {
            return Err(VerifyError::TruncatedInstruction {
                offset,
                function: function.name.clone(),
            });
        }

        let mut operands = [0u8; 3];
        operands[..size].copy_from_slice(&code[offset + 1..offset + 1 + size]);

        instructions.push(Instruction {
            offset,
            opcode,
            operands,
        });
        offset += 1 + size;
    }

    Ok(instructions)
}
