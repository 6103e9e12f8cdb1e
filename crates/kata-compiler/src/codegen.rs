//! Code generation from AST to bytecode

use crate::builder::FunctionBuilder;
use crate::error::{CodegenError, CompileResult};
use kata_bytecode::{Artifact, Builtin, ConstantPool, Function, Opcode};
use kata_parser::ast::*;
use rustc_hash::FxHashMap;

/// Maximum entries per constant pool (u16 operand encoding)
const MAX_CONSTANTS: usize = u16::MAX as usize;

/// Maximum call arguments (u8 operand encoding)
const MAX_ARGS: usize = u8::MAX as usize;

/// Signature of a user-defined function, collected before lowering
struct FunctionSig {
    index: u16,
    param_count: usize,
}

/// Main code generator
pub struct CodeGenerator {
    constants: ConstantPool,
    signatures: FxHashMap<String, FunctionSig>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    /// Create a code generator.
    pub fn new() -> Self {
        Self {
            constants: ConstantPool::new(),
            signatures: FxHashMap::default(),
        }
    }

    /// Compile a parsed program into an artifact.
    pub fn compile(mut self, program: &Program) -> CompileResult<Artifact> {
        // Collect signatures first so functions can call forward.
        for (index, decl) in program.functions.iter().enumerate() {
            if Builtin::from_name(&decl.name).is_some() {
                return Err(CodegenError::ShadowsBuiltin {
                    name: decl.name.clone(),
                    line: decl.name_span.line,
                });
            }
            if self.signatures.contains_key(&decl.name) {
                return Err(CodegenError::DuplicateFunction {
                    name: decl.name.clone(),
                    line: decl.name_span.line,
                });
            }
            self.signatures.insert(
                decl.name.clone(),
                FunctionSig {
                    index: index as u16,
                    param_count: decl.params.len(),
                },
            );
        }

        let mut functions = Vec::with_capacity(program.functions.len());
        for decl in &program.functions {
            functions.push(self.compile_function(decl)?);
        }

        Ok(Artifact::new(self.constants, functions))
    }

    /// Compile one function declaration.
    fn compile_function(&mut self, decl: &FunctionDecl) -> CompileResult<Function> {
        let params: Vec<String> = decl.params.iter().map(|p| p.name.clone()).collect();
        let mut func = FunctionBuilder::new(&decl.name, &params);

        for stmt in &decl.body.statements {
            self.compile_stmt(&mut func, stmt)?;
        }

        // Implicit `return null` at the end of every function
        func.writer.emit_opcode(Opcode::ConstNull);
        func.writer.emit_opcode(Opcode::Return);

        Ok(func.build())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn compile_stmt(&mut self, func: &mut FunctionBuilder, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Let(decl) => {
                self.compile_expr(func, &decl.value)?;
                let slot = func.declare_local(&decl.name, decl.span.line)?;
                func.writer.emit_with_u16(Opcode::StoreLocal, slot);
                Ok(())
            }
            Stmt::Assign(assign) => {
                let Some(slot) = func.resolve_local(&assign.name) else {
                    return Err(CodegenError::UndefinedVariable {
                        name: assign.name.clone(),
                        line: assign.name_span.line,
                    });
                };
                self.compile_expr(func, &assign.value)?;
                func.writer.emit_with_u16(Opcode::StoreLocal, slot);
                Ok(())
            }
            Stmt::Expression(expr_stmt) => {
                self.compile_expr(func, &expr_stmt.expr)?;
                func.writer.emit_opcode(Opcode::Pop);
                Ok(())
            }
            Stmt::If(if_stmt) => self.compile_if(func, if_stmt),
            Stmt::While(while_stmt) => self.compile_while(func, while_stmt),
            Stmt::Return(ret) => {
                match &ret.value {
                    Some(expr) => self.compile_expr(func, expr)?,
                    None => func.writer.emit_opcode(Opcode::ConstNull),
                }
                func.writer.emit_opcode(Opcode::Return);
                Ok(())
            }
            Stmt::Break(span) => func.emit_break(span.line),
            Stmt::Continue(span) => func.emit_continue(span.line),
            Stmt::Block(block) => self.compile_block(func, block),
        }
    }

    fn compile_block(&mut self, func: &mut FunctionBuilder, block: &Block) -> CompileResult<()> {
        func.push_scope();
        let result = block
            .statements
            .iter()
            .try_for_each(|stmt| self.compile_stmt(func, stmt));
        func.pop_scope();
        result
    }

    fn compile_if(&mut self, func: &mut FunctionBuilder, if_stmt: &IfStmt) -> CompileResult<()> {
        let line = if_stmt.span.line;
        self.compile_expr(func, &if_stmt.condition)?;
        let skip_then = func.writer.emit_jump(Opcode::JumpIfFalse);

        self.compile_block(func, &if_stmt.then_branch)?;

        match &if_stmt.else_branch {
            None => {
                if !func.writer.patch_jump_to_here(skip_then) {
                    return Err(CodegenError::JumpTooLarge { line });
                }
            }
            Some(else_branch) => {
                let skip_else = func.writer.emit_jump(Opcode::Jump);
                if !func.writer.patch_jump_to_here(skip_then) {
                    return Err(CodegenError::JumpTooLarge { line });
                }
                match else_branch {
                    ElseBranch::Block(block) => self.compile_block(func, block)?,
                    ElseBranch::If(nested) => self.compile_if(func, nested)?,
                }
                if !func.writer.patch_jump_to_here(skip_else) {
                    return Err(CodegenError::JumpTooLarge { line });
                }
            }
        }
        Ok(())
    }

    fn compile_while(
        &mut self,
        func: &mut FunctionBuilder,
        while_stmt: &WhileStmt,
    ) -> CompileResult<()> {
        let line = while_stmt.span.line;
        func.begin_loop();
        let loop_start = func.writer.offset();

        self.compile_expr(func, &while_stmt.condition)?;
        let exit = func.writer.emit_jump(Opcode::JumpIfFalse);

        self.compile_block(func, &while_stmt.body)?;
        func.emit_jump_back(loop_start, line)?;

        if !func.writer.patch_jump_to_here(exit) {
            return Err(CodegenError::JumpTooLarge { line });
        }
        func.end_loop(line)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn compile_expr(&mut self, func: &mut FunctionBuilder, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Null(_) => {
                func.writer.emit_opcode(Opcode::ConstNull);
                Ok(())
            }
            Expr::Bool(value, _) => {
                func.writer.emit_opcode(if *value {
                    Opcode::ConstTrue
                } else {
                    Opcode::ConstFalse
                });
                Ok(())
            }
            Expr::Int(value, span) => {
                if self.constants.integer_count() >= MAX_CONSTANTS {
                    return Err(CodegenError::TooManyConstants {
                        max: MAX_CONSTANTS,
                        line: span.line,
                    });
                }
                let index = self.constants.add_integer(*value);
                func.writer.emit_with_u16(Opcode::ConstInt, index);
                Ok(())
            }
            Expr::Float(value, span) => {
                if self.constants.float_count() >= MAX_CONSTANTS {
                    return Err(CodegenError::TooManyConstants {
                        max: MAX_CONSTANTS,
                        line: span.line,
                    });
                }
                let index = self.constants.add_float(*value);
                func.writer.emit_with_u16(Opcode::ConstFloat, index);
                Ok(())
            }
            Expr::Str(value, span) => {
                if self.constants.string_count() >= MAX_CONSTANTS {
                    return Err(CodegenError::TooManyConstants {
                        max: MAX_CONSTANTS,
                        line: span.line,
                    });
                }
                let index = self.constants.add_string(value);
                func.writer.emit_with_u16(Opcode::ConstStr, index);
                Ok(())
            }
            Expr::Ident(name, span) => {
                let Some(slot) = func.resolve_local(name) else {
                    return Err(CodegenError::UndefinedVariable {
                        name: name.clone(),
                        line: span.line,
                    });
                };
                func.writer.emit_with_u16(Opcode::LoadLocal, slot);
                Ok(())
            }
            Expr::Unary { op, operand, .. } => {
                self.compile_expr(func, operand)?;
                func.writer.emit_opcode(match op {
                    UnaryOp::Neg => Opcode::Neg,
                    UnaryOp::Not => Opcode::Not,
                });
                Ok(())
            }
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
                span,
            } => {
                // `a && b`: if a is false, the whole expression is false
                // without evaluating b.
                self.compile_expr(func, left)?;
                let short = func.writer.emit_jump(Opcode::JumpIfFalse);
                self.compile_expr(func, right)?;
                let done = func.writer.emit_jump(Opcode::Jump);
                if !func.writer.patch_jump_to_here(short) {
                    return Err(CodegenError::JumpTooLarge { line: span.line });
                }
                func.writer.emit_opcode(Opcode::ConstFalse);
                if !func.writer.patch_jump_to_here(done) {
                    return Err(CodegenError::JumpTooLarge { line: span.line });
                }
                Ok(())
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
                span,
            } => {
                self.compile_expr(func, left)?;
                let short = func.writer.emit_jump(Opcode::JumpIfTrue);
                self.compile_expr(func, right)?;
                let done = func.writer.emit_jump(Opcode::Jump);
                if !func.writer.patch_jump_to_here(short) {
                    return Err(CodegenError::JumpTooLarge { line: span.line });
                }
                func.writer.emit_opcode(Opcode::ConstTrue);
                if !func.writer.patch_jump_to_here(done) {
                    return Err(CodegenError::JumpTooLarge { line: span.line });
                }
                Ok(())
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                self.compile_expr(func, left)?;
                self.compile_expr(func, right)?;
                func.writer.emit_opcode(match op {
                    BinaryOp::Add => Opcode::Add,
                    BinaryOp::Sub => Opcode::Sub,
                    BinaryOp::Mul => Opcode::Mul,
                    BinaryOp::Div => Opcode::Div,
                    BinaryOp::Mod => Opcode::Mod,
                    BinaryOp::Eq => Opcode::Eq,
                    BinaryOp::Ne => Opcode::Ne,
                    BinaryOp::Lt => Opcode::Lt,
                    BinaryOp::Le => Opcode::Le,
                    BinaryOp::Gt => Opcode::Gt,
                    BinaryOp::Ge => Opcode::Ge,
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                });
                Ok(())
            }
            Expr::Call {
                callee,
                callee_span,
                args,
                ..
            } => self.compile_call(func, callee, callee_span.line, args),
        }
    }

    fn compile_call(
        &mut self,
        func: &mut FunctionBuilder,
        callee: &str,
        line: u32,
        args: &[Expr],
    ) -> CompileResult<()> {
        if args.len() > MAX_ARGS {
            return Err(CodegenError::TooManyArguments {
                max: MAX_ARGS,
                line,
            });
        }

        for arg in args {
            self.compile_expr(func, arg)?;
        }

        if let Some(sig) = self.signatures.get(callee) {
            if sig.param_count != args.len() {
                return Err(CodegenError::CallArity {
                    name: callee.to_string(),
                    expected: sig.param_count,
                    found: args.len(),
                    line,
                });
            }
            let index = sig.index;
            func.writer.emit_opcode(Opcode::Call);
            func.writer.emit_u16(index);
            func.writer.emit_u8(args.len() as u8);
            return Ok(());
        }

        if let Some(builtin) = Builtin::from_name(callee) {
            if let Some(required) = builtin.fixed_arity() {
                if required as usize != args.len() {
                    return Err(CodegenError::CallArity {
                        name: callee.to_string(),
                        expected: required as usize,
                        found: args.len(),
                        line,
                    });
                }
            }
            func.writer.emit_opcode(Opcode::CallBuiltin);
            func.writer.emit_u8(builtin.to_u8());
            func.writer.emit_u8(args.len() as u8);
            return Ok(());
        }

        Err(CodegenError::UndefinedFunction {
            name: callee.to_string(),
            line,
        })
    }
}
