//! Function assembly helpers
//!
//! A [`FunctionBuilder`] owns the bytecode writer for one function along
//! with its scope stack and loop bookkeeping. Local slots are handed out
//! per block scope and released when the scope ends, so sibling blocks
//! share slots; `local_count` is the high-water mark.

use crate::error::{CodegenError, CompileResult};
use kata_bytecode::{BytecodeWriter, Function, Opcode};
use rustc_hash::FxHashMap;

/// Maximum local slots per function (u16 operand encoding)
pub(crate) const MAX_LOCALS: usize = u16::MAX as usize;

/// Loop bookkeeping: where the loop begins and which breaks need patching
struct LoopFrame {
    /// Bytecode offset of the condition check (continue target)
    start: usize,
    /// Patch offsets of `break` jumps, resolved when the loop ends
    break_patches: Vec<usize>,
}

/// Builder for a single function's bytecode
pub(crate) struct FunctionBuilder {
    name: String,
    param_count: usize,
    pub(crate) writer: BytecodeWriter,
    scopes: Vec<FxHashMap<String, u16>>,
    scope_bases: Vec<usize>,
    next_slot: usize,
    max_slots: usize,
    loops: Vec<LoopFrame>,
}

impl FunctionBuilder {
    /// Start a function; parameters become the first local slots.
    pub(crate) fn new(name: &str, params: &[String]) -> Self {
        let mut scope = FxHashMap::default();
        for (i, param) in params.iter().enumerate() {
            scope.insert(param.clone(), i as u16);
        }
        Self {
            name: name.to_string(),
            param_count: params.len(),
            writer: BytecodeWriter::new(),
            scopes: vec![scope],
            scope_bases: vec![0],
            next_slot: params.len(),
            max_slots: params.len(),
            loops: Vec::new(),
        }
    }

    /// Enter a block scope.
    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
        self.scope_bases.push(self.next_slot);
    }

    /// Leave a block scope, releasing its slots for reuse.
    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
        if let Some(base) = self.scope_bases.pop() {
            self.next_slot = base;
        }
    }

    /// Declare a variable in the innermost scope.
    pub(crate) fn declare_local(&mut self, name: &str, line: u32) -> CompileResult<u16> {
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("function scope always present"));
        if scope.contains_key(name) {
            return Err(CodegenError::DuplicateVariable {
                name: name.to_string(),
                line,
            });
        }
        if self.next_slot >= MAX_LOCALS {
            return Err(CodegenError::TooManyLocals {
                max: MAX_LOCALS,
                line,
            });
        }
        let slot = self.next_slot as u16;
        scope.insert(name.to_string(), slot);
        self.next_slot += 1;
        self.max_slots = self.max_slots.max(self.next_slot);
        Ok(slot)
    }

    /// Resolve a variable through the scope stack, innermost first.
    pub(crate) fn resolve_local(&self, name: &str) -> Option<u16> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Begin a loop whose condition check sits at the current offset.
    pub(crate) fn begin_loop(&mut self) {
        self.loops.push(LoopFrame {
            start: self.writer.offset(),
            break_patches: Vec::new(),
        });
    }

    /// Finish the innermost loop, patching its breaks to the current offset.
    pub(crate) fn end_loop(&mut self, line: u32) -> CompileResult<()> {
        let frame = self
            .loops
            .pop()
            .unwrap_or_else(|| unreachable!("end_loop without begin_loop"));
        for patch in frame.break_patches {
            if !self.writer.patch_jump_to_here(patch) {
                return Err(CodegenError::JumpTooLarge { line });
            }
        }
        Ok(())
    }

    /// Emit a `break`: an unresolved forward jump out of the innermost loop.
    pub(crate) fn emit_break(&mut self, line: u32) -> CompileResult<()> {
        if self.loops.is_empty() {
            return Err(CodegenError::InvalidBreak { line });
        }
        let patch = self.writer.emit_jump(Opcode::Jump);
        if let Some(frame) = self.loops.last_mut() {
            frame.break_patches.push(patch);
        }
        Ok(())
    }

    /// Emit a `continue`: a backward jump to the innermost loop's condition.
    pub(crate) fn emit_continue(&mut self, line: u32) -> CompileResult<()> {
        let Some(frame) = self.loops.last() else {
            return Err(CodegenError::InvalidContinue { line });
        };
        let start = frame.start;
        self.emit_jump_back(start, line)
    }

    /// Emit an unconditional backward jump to `target`.
    pub(crate) fn emit_jump_back(&mut self, target: usize, line: u32) -> CompileResult<()> {
        let patch = self.writer.emit_jump(Opcode::Jump);
        let relative = target as isize - (patch as isize + 2);
        if !self.writer.patch_i16(patch, relative) {
            return Err(CodegenError::JumpTooLarge { line });
        }
        Ok(())
    }

    /// Finish the function.
    pub(crate) fn build(self) -> Function {
        Function {
            name: self.name,
            param_count: self.param_count,
            local_count: self.max_slots,
            code: self.writer.into_bytes(),
        }
    }
}
