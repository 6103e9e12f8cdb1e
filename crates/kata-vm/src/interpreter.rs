//! Bytecode interpreter
//!
//! A fetch-dispatch loop over the artifact's bytecode. One interpreter
//! exists per execution and dies with it; there is no state shared between
//! executions.
//!
//! Deadline enforcement: the loop polls a monotonic clock at every backward
//! jump, every function call, and every 256th dispatched instruction.
//! Straight-line code between polls is finite, so a submission cannot
//! outrun the deadline by more than a bounded margin.

use crate::error::{ExecResult, ExecutionError};
use crate::limits::ResourceLimits;
use crate::output::OutputSink;
use crate::value::Value;
use kata_bytecode::{Artifact, Builtin, Opcode};
use std::time::{Duration, Instant};

/// Dispatch-count interval between unconditional deadline polls
const DEADLINE_POLL_INTERVAL: u32 = 256;

/// One call frame
struct Frame {
    /// Index of the executing function in the artifact
    function: usize,
    /// Instruction pointer within the function's code
    ip: usize,
    /// Local variable slots, parameters first
    locals: Vec<Value>,
}

/// Per-execution interpreter state
pub(crate) struct Interpreter<'a> {
    artifact: &'a Artifact,
    limits: &'a ResourceLimits,
    deadline: Duration,
    deadline_at: Instant,
    stack: Vec<Value>,
    frames: Vec<Frame>,
    output_bytes: usize,
    dispatch_count: u32,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter for one execution
    pub(crate) fn new(
        artifact: &'a Artifact,
        limits: &'a ResourceLimits,
        deadline: Duration,
    ) -> Self {
        Self {
            artifact,
            limits,
            deadline,
            deadline_at: Instant::now() + deadline,
            stack: Vec::with_capacity(64),
            frames: Vec::new(),
            output_bytes: 0,
            dispatch_count: 0,
        }
    }

    /// Run the entry function with the given arguments.
    pub(crate) fn run(
        &mut self,
        entry_index: usize,
        args: &[Value],
        sink: &mut dyn OutputSink,
    ) -> ExecResult<()> {
        let artifact = self.artifact;
        let entry = artifact
            .function(entry_index)
            .ok_or_else(|| ExecutionError::engine("entry function index out of range"))?;

        let mut locals = vec![Value::Null; entry.local_count];
        for (slot, arg) in args.iter().enumerate() {
            locals[slot] = arg.clone();
        }
        self.frames.push(Frame {
            function: entry_index,
            ip: 0,
            locals,
        });

        loop {
            self.dispatch_count = self.dispatch_count.wrapping_add(1);
            if self.dispatch_count % DEADLINE_POLL_INTERVAL == 0 {
                self.check_deadline()?;
            }

            let fi = self.frames.len() - 1;
            let (func_index, mut ip) = {
                let frame = &self.frames[fi];
                (frame.function, frame.ip)
            };
            let func = artifact
                .function(func_index)
                .ok_or_else(|| ExecutionError::engine("corrupt frame: unknown function"))?;
            let code = &func.code;

            if ip >= code.len() {
                return Err(ExecutionError::engine(
                    "instruction pointer ran past end of function",
                ));
            }
            let opcode = Opcode::from_u8(code[ip])
                .ok_or_else(|| ExecutionError::engine("invalid opcode in artifact"))?;
            ip += 1;

            match opcode {
                Opcode::Nop => {}
                Opcode::Pop => {
                    self.pop()?;
                }
                Opcode::Dup => {
                    let top = self.peek()?.clone();
                    self.stack.push(top);
                }

                Opcode::ConstNull => self.stack.push(Value::Null),
                Opcode::ConstTrue => self.stack.push(Value::Bool(true)),
                Opcode::ConstFalse => self.stack.push(Value::Bool(false)),
                Opcode::ConstInt => {
                    let index = read_u16(code, &mut ip)?;
                    let value = artifact
                        .constants()
                        .integer(index)
                        .ok_or_else(|| ExecutionError::engine("integer constant out of range"))?;
                    self.stack.push(Value::Int(value));
                }
                Opcode::ConstFloat => {
                    let index = read_u16(code, &mut ip)?;
                    let value = artifact
                        .constants()
                        .float(index)
                        .ok_or_else(|| ExecutionError::engine("float constant out of range"))?;
                    self.stack.push(Value::Float(value));
                }
                Opcode::ConstStr => {
                    let index = read_u16(code, &mut ip)?;
                    let value = artifact
                        .constants()
                        .string(index)
                        .ok_or_else(|| ExecutionError::engine("string constant out of range"))?;
                    self.stack.push(Value::str(value));
                }

                Opcode::LoadLocal => {
                    let slot = read_u16(code, &mut ip)? as usize;
                    let value = self.frames[fi]
                        .locals
                        .get(slot)
                        .cloned()
                        .ok_or_else(|| ExecutionError::engine("local slot out of range"))?;
                    self.stack.push(value);
                }
                Opcode::StoreLocal => {
                    let slot = read_u16(code, &mut ip)? as usize;
                    let value = self.pop()?;
                    let locals = &mut self.frames[fi].locals;
                    if slot >= locals.len() {
                        return Err(ExecutionError::engine("local slot out of range"));
                    }
                    locals[slot] = value;
                }

                Opcode::Add => self.binary_op(Value::add)?,
                Opcode::Sub => self.binary_op(Value::sub)?,
                Opcode::Mul => self.binary_op(Value::mul)?,
                Opcode::Div => self.binary_op(Value::div)?,
                Opcode::Mod => self.binary_op(Value::rem)?,
                Opcode::Neg => {
                    let value = self.pop()?;
                    let result = value.neg().map_err(ExecutionError::runtime)?;
                    self.stack.push(result);
                }

                Opcode::Eq => {
                    let (a, b) = self.pop_pair()?;
                    self.stack.push(Value::Bool(a.equals(&b)));
                }
                Opcode::Ne => {
                    let (a, b) = self.pop_pair()?;
                    self.stack.push(Value::Bool(!a.equals(&b)));
                }
                Opcode::Lt => self.compare_op(|ord| ord.is_lt())?,
                Opcode::Le => self.compare_op(|ord| ord.is_le())?,
                Opcode::Gt => self.compare_op(|ord| ord.is_gt())?,
                Opcode::Ge => self.compare_op(|ord| ord.is_ge())?,
                Opcode::Not => {
                    let value = self.pop()?;
                    let result = value.not().map_err(ExecutionError::runtime)?;
                    self.stack.push(result);
                }

                Opcode::Jump => {
                    let offset = read_i16(code, &mut ip)?;
                    // Loop back-edges poll the deadline
                    if offset < 0 {
                        self.check_deadline()?;
                    }
                    ip = jump_target(ip, offset, code.len())?;
                }
                Opcode::JumpIfFalse => {
                    let offset = read_i16(code, &mut ip)?;
                    let condition = self
                        .pop()?
                        .as_condition()
                        .map_err(ExecutionError::runtime)?;
                    if !condition {
                        if offset < 0 {
                            self.check_deadline()?;
                        }
                        ip = jump_target(ip, offset, code.len())?;
                    }
                }
                Opcode::JumpIfTrue => {
                    let offset = read_i16(code, &mut ip)?;
                    let condition = self
                        .pop()?
                        .as_condition()
                        .map_err(ExecutionError::runtime)?;
                    if condition {
                        if offset < 0 {
                            self.check_deadline()?;
                        }
                        ip = jump_target(ip, offset, code.len())?;
                    }
                }

                Opcode::Call => {
                    self.check_deadline()?;
                    let target = read_u16(code, &mut ip)? as usize;
                    let argc = read_u8(code, &mut ip)? as usize;

                    if self.frames.len() >= self.limits.max_call_depth {
                        return Err(ExecutionError::runtime(format!(
                            "maximum call depth of {} exceeded (possible runaway recursion)",
                            self.limits.max_call_depth
                        )));
                    }

                    let callee = artifact
                        .function(target)
                        .ok_or_else(|| ExecutionError::engine("call target out of range"))?;
                    if callee.param_count != argc {
                        return Err(ExecutionError::engine("call arity mismatch in artifact"));
                    }

                    let mut locals = vec![Value::Null; callee.local_count];
                    for slot in (0..argc).rev() {
                        locals[slot] = self.pop()?;
                    }

                    // Resume the caller after the call instruction
                    self.frames[fi].ip = ip;
                    self.frames.push(Frame {
                        function: target,
                        ip: 0,
                        locals,
                    });
                    continue;
                }
                Opcode::CallBuiltin => {
                    let id = read_u8(code, &mut ip)?;
                    let argc = read_u8(code, &mut ip)? as usize;
                    let builtin = Builtin::from_u8(id)
                        .ok_or_else(|| ExecutionError::engine("unknown builtin in artifact"))?;

                    let mut args = vec![Value::Null; argc];
                    for slot in (0..argc).rev() {
                        args[slot] = self.pop()?;
                    }

                    let result = self.call_builtin(builtin, &args, sink)?;
                    self.stack.push(result);
                }
                Opcode::Return => {
                    let result = self.pop()?;
                    self.frames.pop();
                    match self.frames.last() {
                        None => return Ok(()),
                        Some(_) => self.stack.push(result),
                    }
                    continue;
                }
            }

            self.frames[fi].ip = ip;
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_deadline(&self) -> ExecResult<()> {
        if Instant::now() >= self.deadline_at {
            Err(ExecutionError::Timeout {
                deadline: self.deadline,
            })
        } else {
            Ok(())
        }
    }

    fn pop(&mut self) -> ExecResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| ExecutionError::engine("operand stack underflow"))
    }

    fn peek(&self) -> ExecResult<&Value> {
        self.stack
            .last()
            .ok_or_else(|| ExecutionError::engine("operand stack underflow"))
    }

    fn pop_pair(&mut self) -> ExecResult<(Value, Value)> {
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    fn binary_op(
        &mut self,
        op: fn(&Value, &Value) -> Result<Value, String>,
    ) -> ExecResult<()> {
        let (a, b) = self.pop_pair()?;
        let result = op(&a, &b).map_err(ExecutionError::runtime)?;
        self.stack.push(result);
        Ok(())
    }

    fn compare_op(&mut self, decide: fn(std::cmp::Ordering) -> bool) -> ExecResult<()> {
        let (a, b) = self.pop_pair()?;
        let ordering = a.compare(&b).map_err(ExecutionError::runtime)?;
        self.stack.push(Value::Bool(decide(ordering)));
        Ok(())
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Value],
        sink: &mut dyn OutputSink,
    ) -> ExecResult<Value> {
        match builtin {
            Builtin::Print | Builtin::Println => {
                let mut line = args
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                if builtin == Builtin::Println {
                    line.push('\n');
                }
                self.write_output(sink, &line)?;
                Ok(Value::Null)
            }
            Builtin::Len => match args.first() {
                Some(Value::Str(s)) => Ok(Value::Int(s.chars().count() as i64)),
                Some(other) => Err(ExecutionError::runtime(format!(
                    "len() expects a string, got {}",
                    other.type_name()
                ))),
                None => Err(ExecutionError::engine("builtin arity mismatch in artifact")),
            },
            Builtin::Str => match args.first() {
                Some(value) => Ok(Value::str(value.to_string())),
                None => Err(ExecutionError::engine("builtin arity mismatch in artifact")),
            },
        }
    }

    fn write_output(&mut self, sink: &mut dyn OutputSink, chunk: &str) -> ExecResult<()> {
        self.output_bytes += chunk.len();
        if self.output_bytes > self.limits.max_output_bytes {
            return Err(ExecutionError::runtime(format!(
                "output limit of {} bytes exceeded",
                self.limits.max_output_bytes
            )));
        }
        sink.write_str(chunk);
        Ok(())
    }
}

/// Read a u8 operand, advancing the instruction pointer
fn read_u8(code: &[u8], ip: &mut usize) -> ExecResult<u8> {
    let byte = *code
        .get(*ip)
        .ok_or_else(|| ExecutionError::engine("truncated instruction"))?;
    *ip += 1;
    Ok(byte)
}

/// Read a little-endian u16 operand, advancing the instruction pointer
fn read_u16(code: &[u8], ip: &mut usize) -> ExecResult<u16> {
    let lo = read_u8(code, ip)?;
    let hi = read_u8(code, ip)?;
    Ok(u16::from_le_bytes([lo, hi]))
}

/// Read a little-endian i16 operand, advancing the instruction pointer
fn read_i16(code: &[u8], ip: &mut usize) -> ExecResult<i16> {
    let lo = read_u8(code, ip)?;
    let hi = read_u8(code, ip)?;
    Ok(i16::from_le_bytes([lo, hi]))
}

/// Compute and bounds-check a relative jump target
fn jump_target(ip: usize, offset: i16, code_len: usize) -> ExecResult<usize> {
    let target = ip as isize + offset as isize;
    if target < 0 || target as usize >= code_len {
        return Err(ExecutionError::engine("jump target out of range"));
    }
    Ok(target as usize)
}
