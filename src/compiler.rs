// Compiler - lowers the unified tree to bytecode in one forward pass
//
// Jumps are emitted with a placeholder target and patched once the
// destination address is known. Every instruction whose node carried a
// source line lands in the source map.

use crate::ast::*;
use crate::bytecode::{Bytecode, Instruction, Op};
use crate::error::CompileError;
use crate::value::Value;

const PATCH_PLACEHOLDER: usize = usize::MAX;

/// Compile a program; the result always terminates in `Halt`.
pub fn compile(program: &Program) -> Result<Bytecode, CompileError> {
    let mut compiler = Compiler::default();
    for stmt in &program.body {
        compiler.stmt(stmt)?;
    }
    compiler.emit(Op::Halt, 0);
    Ok(Bytecode {
        instructions: compiler.code,
        source_map: compiler.source_map,
    })
}

#[derive(Default)]
struct Compiler {
    code: Vec<Instruction>,
    source_map: Vec<usize>,
}

impl Compiler {
    fn emit(&mut self, op: Op, line: usize) -> usize {
        let index = self.code.len();
        self.code.push(Instruction { op, line });
        self.source_map.push(line);
        index
    }

    fn here(&self) -> usize {
        self.code.len()
    }

    fn patch(&mut self, at: usize, target: usize) {
        match &mut self.code[at].op {
            Op::Jump(addr) | Op::JumpIfFalse(addr) | Op::JumpIfTrue(addr) => *addr = target,
            other => unreachable!("patched a non-jump instruction: {:?}", other),
        }
    }

    fn block(&mut self, block: &Block) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Move { dir } => {
                self.emit(Op::Move(*dir), line);
            }
            StmtKind::Turn { dir } => {
                self.emit(Op::Turn(*dir), line);
            }
            StmtKind::Collect => {
                self.emit(Op::Collect, line);
            }
            StmtKind::Wait { ticks } => {
                self.emit(Op::Wait(*ticks), line);
            }
            StmtKind::Log { expr } => {
                self.expr(expr)?;
                self.emit(Op::Log, line);
            }
            StmtKind::If {
                cond,
                consequent,
                alternate,
            } => {
                self.expr(cond)?;
                let exit_then = self.emit(Op::JumpIfFalse(PATCH_PLACEHOLDER), line);
                self.block(consequent)?;
                match alternate {
                    Some(alt) => {
                        let exit_if = self.emit(Op::Jump(PATCH_PLACEHOLDER), line);
                        let else_start = self.here();
                        self.patch(exit_then, else_start);
                        match alt {
                            Alternate::Block(block) => self.block(block)?,
                            Alternate::If(chained) => self.stmt(chained)?,
                        }
                        let after = self.here();
                        self.patch(exit_if, after);
                    }
                    None => {
                        let after = self.here();
                        self.patch(exit_then, after);
                    }
                }
            }
            StmtKind::While { cond, body } => {
                let top = self.here();
                self.expr(cond)?;
                let exit = self.emit(Op::JumpIfFalse(PATCH_PLACEHOLDER), line);
                self.block(body)?;
                self.emit(Op::Jump(top), line);
                let after = self.here();
                self.patch(exit, after);
            }
            StmtKind::Loop { count, body } => {
                // Countdown held on the operand stack:
                //   PUSH n; top: DUP; PUSH 0; GT; JUMP_IF_FALSE exit;
                //   <body>; PUSH 1; SUB; JUMP top; exit: POP
                // Runs the body exactly max(0, n) times.
                self.emit(Op::Push(Value::Num(*count as f64)), line);
                let top = self.here();
                self.emit(Op::Dup, line);
                self.emit(Op::Push(Value::Num(0.0)), line);
                self.emit(Op::Gt, line);
                let exit = self.emit(Op::JumpIfFalse(PATCH_PLACEHOLDER), line);
                self.block(body)?;
                self.emit(Op::Push(Value::Num(1.0)), line);
                self.emit(Op::Sub, line);
                self.emit(Op::Jump(top), line);
                let after = self.here();
                self.patch(exit, after);
                self.emit(Op::Pop, line);
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Literal(lit) => {
                let value = match lit {
                    Literal::Number(n) => Value::Num(*n),
                    Literal::Str(s) => Value::Str(s.clone()),
                    Literal::Bool(b) => Value::Bool(*b),
                };
                self.emit(Op::Push(value), line);
            }
            ExprKind::Identifier(name) => {
                self.emit(Op::Load(name.clone()), line);
            }
            ExprKind::Binary { op, left, right } => {
                self.expr(left)?;
                self.expr(right)?;
                let op = match op {
                    BinOp::Add => Op::Add,
                    BinOp::Sub => Op::Sub,
                    BinOp::Eq => Op::Eq,
                    BinOp::Neq => Op::Neq,
                    BinOp::Lt => Op::Lt,
                    BinOp::Gt => Op::Gt,
                    BinOp::Lte => Op::Lte,
                    BinOp::Gte => Op::Gte,
                    BinOp::And => Op::And,
                    BinOp::Or => Op::Or,
                };
                self.emit(op, line);
            }
            ExprKind::Unary { op, operand } => {
                self.expr(operand)?;
                match op {
                    UnOp::Not => self.emit(Op::Not, line),
                };
            }
            ExprKind::Call { callee, args } => {
                let name = match &callee.kind {
                    ExprKind::Identifier(name) => name.clone(),
                    _ => {
                        return Err(CompileError::new(
                            "call target must be a function name",
                            line,
                        ));
                    }
                };
                for arg in args {
                    self.expr(arg)?;
                }
                self.emit(
                    Op::Call {
                        name,
                        argc: args.len(),
                    },
                    line,
                );
            }
            ExprKind::Member { object, property } => {
                self.expr(object)?;
                self.emit(Op::Member(property.clone()), line);
            }
        }
        Ok(())
    }
}
