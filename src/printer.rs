// Printer - renders a tree back to keyword-surface source
//
// Round-tripping a program through the printer and the parser yields a
// structurally identical tree, which the editor relies on for
// reformatting and the tests use as a grammar check. Expressions are
// fully parenthesized so precedence survives the trip.

use std::fmt::Write;

use crate::ast::*;

pub fn to_keyword_source(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.body {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    for stmt in &block.statements {
        write_stmt(out, stmt, depth);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match &stmt.kind {
        StmtKind::Move { dir } => {
            let _ = writeln!(out, "move {}", dir.as_str());
        }
        StmtKind::Turn { dir } => {
            let _ = writeln!(out, "turn {}", dir.as_str());
        }
        StmtKind::Collect => out.push_str("collect\n"),
        StmtKind::Wait { ticks } => {
            let _ = writeln!(out, "wait {}", ticks);
        }
        StmtKind::Log { expr } => {
            let _ = writeln!(out, "log {}", print_expr(expr));
        }
        StmtKind::If { .. } => {
            write_if(out, stmt, depth, "if");
            indent(out, depth);
            out.push_str("end\n");
        }
        StmtKind::Loop { count, body } => {
            let _ = writeln!(out, "loop {}:", count);
            write_block(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end\n");
        }
        StmtKind::While { cond, body } => {
            let _ = writeln!(out, "while {}:", print_expr(cond));
            write_block(out, body, depth + 1);
            indent(out, depth);
            out.push_str("end\n");
        }
    }
}

/// Writes the header and body of an if-chain link; the caller emits the
/// single `end` that closes the whole chain.
fn write_if(out: &mut String, stmt: &Stmt, depth: usize, header: &str) {
    let StmtKind::If {
        cond,
        consequent,
        alternate,
    } = &stmt.kind
    else {
        return;
    };
    let _ = writeln!(out, "{} {}:", header, print_expr(cond));
    write_block(out, consequent, depth + 1);
    match alternate {
        Some(Alternate::If(chained)) => {
            indent(out, depth);
            write_if(out, chained, depth, "elif");
        }
        Some(Alternate::Block(block)) => {
            indent(out, depth);
            out.push_str("else:\n");
            write_block(out, block, depth + 1);
        }
        None => {}
    }
}

fn print_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal(Literal::Number(n)) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        ExprKind::Literal(Literal::Str(s)) => {
            format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
        }
        ExprKind::Literal(Literal::Bool(b)) => format!("{}", b),
        ExprKind::Identifier(name) => name.clone(),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", print_expr(left), op_str(*op), print_expr(right))
        }
        ExprKind::Unary { operand, .. } => format!("not {}", print_expr(operand)),
        ExprKind::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(print_expr).collect();
            format!("{}({})", print_expr(callee), args.join(", "))
        }
        ExprKind::Member { object, property } => {
            format!("{}.{}", print_expr(object), property)
        }
    }
}

fn op_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Eq => "==",
        BinOp::Neq => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Lte => "<=",
        BinOp::Gte => ">=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}
