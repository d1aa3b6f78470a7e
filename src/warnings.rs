// Warning pass - non-fatal lints collected alongside a successful parse

use crate::ast::*;

/// Names a script may read without tripping the unknown-identifier lint.
pub const KNOWN_NAMES: [&str; 10] = [
    "energy",
    "x",
    "y",
    "facing",
    "inventory",
    "scan",
    "scan_left",
    "scan_right",
    "true",
    "false",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

pub struct WarningCollector {
    warnings: Vec<Warning>,
    large_loop_threshold: i64,
}

impl WarningCollector {
    pub fn new(large_loop_threshold: i64) -> Self {
        Self {
            warnings: Vec::new(),
            large_loop_threshold,
        }
    }

    /// Run the full lint pass over a parsed program.
    pub fn collect(program: &Program) -> Vec<Warning> {
        let mut collector = Self::new(1000);
        collector.check_statements(&program.body);
        collector.warnings
    }

    fn warn(&mut self, message: String, line: usize, column: usize) {
        self.warnings.push(Warning {
            message,
            line,
            column,
        });
    }

    fn check_statements(&mut self, statements: &[Stmt]) {
        for (i, stmt) in statements.iter().enumerate() {
            self.check_stmt(stmt);
            // Anything after an unconditional `while true` never runs.
            if let StmtKind::While { cond, .. } = &stmt.kind {
                if cond.is_always_true() {
                    if let Some(next) = statements.get(i + 1) {
                        self.warn(
                            "Code after while-true is unreachable".to_string(),
                            next.line,
                            next.column,
                        );
                    }
                }
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Move { .. } | StmtKind::Turn { .. } | StmtKind::Collect => {}
            StmtKind::Wait { .. } => {}
            StmtKind::Log { expr } => self.check_expr(expr),
            StmtKind::If {
                cond,
                consequent,
                alternate,
            } => {
                self.check_expr(cond);
                self.check_statements(&consequent.statements);
                match alternate {
                    Some(Alternate::Block(block)) => self.check_statements(&block.statements),
                    Some(Alternate::If(chained)) => self.check_stmt(chained),
                    None => {}
                }
            }
            StmtKind::Loop { count, body } => {
                if *count <= 0 {
                    self.warn(
                        format!("LOOP with {} iterations will never execute", count),
                        stmt.line,
                        stmt.column,
                    );
                } else if *count > self.large_loop_threshold {
                    self.warn(
                        "Large loop count may impact performance".to_string(),
                        stmt.line,
                        stmt.column,
                    );
                }
                self.check_statements(&body.statements);
            }
            StmtKind::While { cond, body } => {
                self.check_expr(cond);
                self.check_statements(&body.statements);
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Identifier(name) => {
                if !KNOWN_NAMES.contains(&name.to_lowercase().as_str()) {
                    self.warn(
                        format!("Unknown variable or function `{}`", name),
                        expr.line,
                        expr.column,
                    );
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.check_expr(operand),
            ExprKind::Call { callee, args } => {
                self.check_expr(callee);
                for arg in args {
                    self.check_expr(arg);
                }
            }
            ExprKind::Member { object, .. } => self.check_expr(object),
        }
    }
}
