// Parser module - recursive descent over the shared token stream
//
// Both surface syntaxes produce the same `ast::Program`. The statement
// grammars differ per family; the expression grammar is shared, since both
// lexers map their operators onto the same token kinds.

use crate::ast::*;
use crate::error::{FrontendError, ParseError};
use crate::token::{Token, TokenKind};
use crate::{clexer, lexer};

/// Which surface syntax a source buffer is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Keyword/block family: `move forward`, `if ...:` ... `end`.
    Keyword,
    /// Brace/semicolon family: `move_forward();`, `if (...) { ... }`.
    Braced,
}

/// Lex and parse a source buffer into the unified tree.
pub fn parse(source: &str, syntax: Syntax) -> Result<Program, FrontendError> {
    match syntax {
        Syntax::Keyword => {
            let tokens = lexer::tokenize(source)?;
            let program = Parser::new(&tokens).keyword_program()?;
            Ok(program)
        }
        Syntax::Braced => {
            // Newlines carry no meaning in the braced family; statements
            // end at `;` and blocks at `}`.
            let tokens: Vec<Token> = clexer::tokenize(source)?
                .into_iter()
                .filter(|t| t.kind != TokenKind::Newline)
                .collect();
            let program = Parser::new(&tokens).braced_program()?;
            Ok(program)
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // The lexers always emit a terminal EOF.
        self.tokens.get(self.pos).unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let t = self.peek();
        ParseError::new(message, t.line, t.column)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.at(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("{}, got {}", message, self.kind().describe())))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<(String, Token), ParseError> {
        match self.kind().clone() {
            TokenKind::Ident(name) => {
                let token = self.advance();
                Ok((name, token))
            }
            other => Err(self.error_here(format!("{}, got {}", message, other.describe()))),
        }
    }

    /// A whole-number literal; the grammar wants integers for `loop`,
    /// `wait` and `for` headers.
    fn expect_int(&mut self, message: &str) -> Result<i64, ParseError> {
        match *self.kind() {
            TokenKind::Number(n) if n.fract() == 0.0 => {
                self.advance();
                Ok(n as i64)
            }
            TokenKind::Number(_) => {
                Err(self.error_here(format!("{}, got a fractional number", message)))
            }
            ref other => Err(self.error_here(format!("{}, got {}", message, other.describe()))),
        }
    }

    // ---- keyword family ------------------------------------------------

    fn keyword_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        self.skip_newlines();
        while !self.at(&TokenKind::Eof) {
            body.push(self.keyword_statement()?);
            self.expect_terminator()?;
            self.skip_newlines();
        }
        Ok(Program { body })
    }

    fn skip_newlines(&mut self) {
        while self.at(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Statements occupy one logical line. The next token after a
    /// statement must be a terminator or something that closes the
    /// enclosing block.
    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        match self.kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof | TokenKind::End | TokenKind::Elif | TokenKind::Else => Ok(()),
            other => Err(self
                .error_here(format!("expected end of statement, got {}", other.describe()))
                .with_hint("separate statements with a newline or `;`")),
        }
    }

    fn keyword_block(&mut self, stop: &[TokenKind]) -> Result<Block, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if stop.iter().any(|k| self.at(k)) {
                return Ok(Block { statements });
            }
            if self.at(&TokenKind::Eof) {
                return Err(self
                    .error_here("unexpected end of input inside a block")
                    .with_hint("close the block with `end`"));
            }
            statements.push(self.keyword_statement()?);
            self.expect_terminator()?;
        }
    }

    fn keyword_statement(&mut self) -> Result<Stmt, ParseError> {
        let Token { line, column, .. } = *self.peek();
        match self.kind() {
            TokenKind::Move => {
                self.advance();
                let dir = match self.kind() {
                    TokenKind::Forward => MoveDir::Forward,
                    TokenKind::Back => MoveDir::Back,
                    other => {
                        return Err(self
                            .error_here(format!(
                                "expected `forward` or `back` after `move`, got {}",
                                other.describe()
                            ))
                            .with_hint("try `move forward`"));
                    }
                };
                self.advance();
                Ok(Stmt::new(StmtKind::Move { dir }, line, column))
            }
            TokenKind::Turn => {
                self.advance();
                let dir = match self.kind() {
                    TokenKind::Left => TurnDir::Left,
                    TokenKind::Right => TurnDir::Right,
                    other => {
                        return Err(self
                            .error_here(format!(
                                "expected `left` or `right` after `turn`, got {}",
                                other.describe()
                            ))
                            .with_hint("try `turn left`"));
                    }
                };
                self.advance();
                Ok(Stmt::new(StmtKind::Turn { dir }, line, column))
            }
            TokenKind::Collect => {
                self.advance();
                Ok(Stmt::new(StmtKind::Collect, line, column))
            }
            TokenKind::Wait => {
                self.advance();
                let ticks = if matches!(self.kind(), TokenKind::Number(_)) {
                    self.expect_int("wait count must be a whole number")? as u32
                } else {
                    1
                };
                Ok(Stmt::new(StmtKind::Wait { ticks }, line, column))
            }
            TokenKind::Log => {
                self.advance();
                let expr = self.expression()?;
                Ok(Stmt::new(StmtKind::Log { expr }, line, column))
            }
            TokenKind::If => self.keyword_if(),
            TokenKind::Loop => {
                self.advance();
                let count = self
                    .expect_int("missing count after `loop`")
                    .map_err(|e| e.with_hint("write `loop 3:` to repeat three times"))?;
                self.expect(TokenKind::Colon, "expected `:` after the loop count")?;
                let body = self.keyword_block(&[TokenKind::End])?;
                self.expect(TokenKind::End, "expected `end` to close the loop")?;
                Ok(Stmt::new(StmtKind::Loop { count, body }, line, column))
            }
            TokenKind::While => {
                self.advance();
                let cond = self.expression()?;
                self.expect(TokenKind::Colon, "expected `:` after the condition")?;
                let body = self.keyword_block(&[TokenKind::End])?;
                self.expect(TokenKind::End, "expected `end` to close the loop")?;
                Ok(Stmt::new(StmtKind::While { cond, body }, line, column))
            }
            TokenKind::End => Err(self
                .error_here("unexpected `end`")
                .with_hint("every `end` must close an `if`, `loop`, or `while` block")),
            other => Err(self
                .error_here(format!("unexpected {}", other.describe()))
                .with_hint(
                    "statements start with move, turn, collect, wait, log, if, loop, or while",
                )),
        }
    }

    /// Parses from `if` or `elif` through the `end` that closes the chain.
    fn keyword_if(&mut self) -> Result<Stmt, ParseError> {
        let Token { line, column, .. } = *self.peek();
        self.advance(); // `if` or `elif`
        let cond = self.expression()?;
        self.expect(TokenKind::Colon, "expected `:` after the condition")?;
        let consequent =
            self.keyword_block(&[TokenKind::End, TokenKind::Elif, TokenKind::Else])?;

        let alternate = match self.kind() {
            TokenKind::Elif => Some(Alternate::If(Box::new(self.keyword_if()?))),
            TokenKind::Else => {
                self.advance();
                self.expect(TokenKind::Colon, "expected `:` after `else`")?;
                let block = self.keyword_block(&[TokenKind::End])?;
                self.expect(TokenKind::End, "expected `end` to close the `if`")?;
                Some(Alternate::Block(block))
            }
            _ => {
                self.expect(TokenKind::End, "expected `end` to close the `if`")?;
                None
            }
        };

        Ok(Stmt::new(
            StmtKind::If {
                cond,
                consequent,
                alternate,
            },
            line,
            column,
        ))
    }

    // ---- braced family -------------------------------------------------

    fn braced_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while !self.at(&TokenKind::Eof) {
            body.push(self.braced_statement()?);
        }
        Ok(Program { body })
    }

    fn braced_block(&mut self) -> Result<Block, ParseError> {
        self.expect(TokenKind::LBrace, "expected `{`")?;
        let mut statements = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self
                    .error_here("unexpected end of input inside a block")
                    .with_hint("close the block with `}`"));
            }
            statements.push(self.braced_statement()?);
        }
        self.advance(); // `}`
        Ok(Block { statements })
    }

    fn braced_statement(&mut self) -> Result<Stmt, ParseError> {
        let Token { line, column, .. } = *self.peek();
        match self.kind() {
            TokenKind::MoveForward => self.braced_action(
                StmtKind::Move {
                    dir: MoveDir::Forward,
                },
                line,
                column,
            ),
            TokenKind::MoveBack => {
                self.braced_action(StmtKind::Move { dir: MoveDir::Back }, line, column)
            }
            TokenKind::TurnLeft => {
                self.braced_action(StmtKind::Turn { dir: TurnDir::Left }, line, column)
            }
            TokenKind::TurnRight => self.braced_action(
                StmtKind::Turn {
                    dir: TurnDir::Right,
                },
                line,
                column,
            ),
            TokenKind::Collect => self.braced_action(StmtKind::Collect, line, column),
            TokenKind::Wait => {
                self.advance();
                self.expect(TokenKind::LParen, "expected `(` after `wait`")?;
                let ticks = if matches!(self.kind(), TokenKind::Number(_)) {
                    self.expect_int("wait count must be a whole number")? as u32
                } else {
                    1
                };
                self.expect(TokenKind::RParen, "expected `)`")?;
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::Wait { ticks }, line, column))
            }
            TokenKind::Log => {
                self.advance();
                self.expect(TokenKind::LParen, "expected `(` after `log`")?;
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected `)` after the logged value")?;
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::Log { expr }, line, column))
            }
            TokenKind::If => self.braced_if(),
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LParen, "expected `(` after `while`")?;
                let cond = self.expression()?;
                self.expect(TokenKind::RParen, "expected `)` after the condition")?;
                let body = self.braced_block()?;
                Ok(Stmt::new(StmtKind::While { cond, body }, line, column))
            }
            TokenKind::For => self.braced_for(),
            other => Err(self
                .error_here(format!("unexpected {}", other.describe()))
                .with_hint("statements look like `move_forward();`")),
        }
    }

    /// An argument-less action call: `move_forward();`
    fn braced_action(
        &mut self,
        kind: StmtKind,
        line: usize,
        column: usize,
    ) -> Result<Stmt, ParseError> {
        let keyword = self.advance();
        self.expect(
            TokenKind::LParen,
            &format!("expected `(` after `{}`", keyword.kind.describe().trim_matches('`')),
        )?;
        self.expect(TokenKind::RParen, "expected `)`")?;
        self.expect_semicolon()?;
        Ok(Stmt::new(kind, line, column))
    }

    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Semicolon, "missing `;` after statement")
            .map_err(|e| e.with_hint("statements end with a semicolon"))?;
        Ok(())
    }

    /// Parses from `if` through the end of its else-chain.
    fn braced_if(&mut self) -> Result<Stmt, ParseError> {
        let Token { line, column, .. } = *self.peek();
        self.advance(); // `if`
        self.expect(TokenKind::LParen, "expected `(` after `if`")?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen, "expected `)` after the condition")?;
        let consequent = self.braced_block()?;

        let alternate = if self.at(&TokenKind::Else) {
            self.advance();
            if self.at(&TokenKind::If) {
                Some(Alternate::If(Box::new(self.braced_if()?)))
            } else {
                Some(Alternate::Block(self.braced_block()?))
            }
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                cond,
                consequent,
                alternate,
            },
            line,
            column,
        ))
    }

    /// `for (int i = a; i < b; i++) { ... }` lowers to a fixed-count loop
    /// of `b - a` iterations; the induction variable never reaches the
    /// tree.
    fn braced_for(&mut self) -> Result<Stmt, ParseError> {
        let Token { line, column, .. } = *self.peek();
        self.advance(); // `for`
        self.expect(TokenKind::LParen, "expected `(` after `for`")?;
        self.expect(TokenKind::Int, "expected `int` in the `for` header")?;
        let (var, _) = self.expect_ident("expected a loop variable after `int`")?;
        self.expect(TokenKind::Assign, "expected `=` after the loop variable")?;
        let start = self.expect_int("the loop start must be a whole number")?;
        self.expect(TokenKind::Semicolon, "expected `;` after the loop start")?;

        let (cond_var, cond_tok) = self.expect_ident("expected the loop variable in the condition")?;
        if cond_var != var {
            return Err(ParseError::new(
                format!("the loop condition must test `{}`, not `{}`", var, cond_var),
                cond_tok.line,
                cond_tok.column,
            ));
        }
        self.expect(TokenKind::Lt, "expected `<` in the loop condition")?;
        let end = self.expect_int("the loop bound must be a whole number")?;
        self.expect(TokenKind::Semicolon, "expected `;` after the loop condition")?;

        let (step_var, step_tok) = self.expect_ident("expected the loop variable in the step")?;
        if step_var != var {
            return Err(ParseError::new(
                format!("the loop step must increment `{}`, not `{}`", var, step_var),
                step_tok.line,
                step_tok.column,
            ));
        }
        self.expect(TokenKind::PlusPlus, "expected `++` in the loop step")?;
        self.expect(TokenKind::RParen, "expected `)` after the `for` header")?;
        let body = self.braced_block()?;

        Ok(Stmt::new(
            StmtKind::Loop {
                count: end - start,
                body,
            },
            line,
            column,
        ))
    }

    // ---- shared expression grammar ---------------------------------------

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.at(&TokenKind::Or) {
            self.advance();
            let right = self.and_expr()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.comparison()?;
        while self.at(&TokenKind::And) {
            self.advance();
            let right = self.comparison()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Neq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::LtEq => BinOp::Lte,
                TokenKind::GtEq => BinOp::Gte,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.additive()?;
            left = binary(op, left, right);
        }
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = binary(op, left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.at(&TokenKind::Not) {
            let Token { line, column, .. } = *self.peek();
            self.advance();
            let operand = self.unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                },
                line,
                column,
            ));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            match self.kind() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.at(&TokenKind::RParen) {
                        args.push(self.expression()?);
                        while self.at(&TokenKind::Comma) {
                            self.advance();
                            args.push(self.expression()?);
                        }
                    }
                    self.expect(TokenKind::RParen, "expected `)` after arguments")?;
                    let (line, column) = (expr.line, expr.column);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                        column,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let (property, _) = self
                        .expect_ident("missing property after `.`")
                        .map_err(|e| e.with_hint("try `inventory.crystal`"))?;
                    let (line, column) = (expr.line, expr.column);
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        line,
                        column,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Token { line, column, .. } = *self.peek();
        let kind = self.kind().clone();
        match kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Number(n)), line, column))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Str(s)), line, column))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(name), line, column))
            }
            // Keyword-surface sugar: direction keywords read as strings,
            // so `scan() == "crystal"` and `log forward` both work.
            TokenKind::Forward | TokenKind::Back | TokenKind::Left | TokenKind::Right => {
                let word = match kind {
                    TokenKind::Forward => "forward",
                    TokenKind::Back => "back",
                    TokenKind::Left => "left",
                    _ => "right",
                };
                self.advance();
                Ok(Expr::new(
                    ExprKind::Literal(Literal::Str(word.to_string())),
                    line,
                    column,
                ))
            }
            // Braced-surface scan keywords behave as builtin callees.
            TokenKind::Scan | TokenKind::ScanLeft | TokenKind::ScanRight => {
                let name = match kind {
                    TokenKind::Scan => "scan",
                    TokenKind::ScanLeft => "scan_left",
                    _ => "scan_right",
                };
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(name.to_string()), line, column))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected `)`")?;
                Ok(expr)
            }
            other => Err(self.error_here(format!(
                "expected an expression, got {}",
                other.describe()
            ))),
        }
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let (line, column) = (left.line, left.column);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
        column,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(source: &str) -> Program {
        parse(source, Syntax::Keyword).expect("parse failed")
    }

    fn braced(source: &str) -> Program {
        parse(source, Syntax::Braced).expect("parse failed")
    }

    #[test]
    fn test_simple_statements() {
        let program = keyword("move forward\nturn left\ncollect\nwait 2\nlog energy");
        assert_eq!(program.body.len(), 5);
        assert_eq!(
            program.body[0].kind,
            StmtKind::Move {
                dir: MoveDir::Forward
            }
        );
        assert_eq!(program.body[3].kind, StmtKind::Wait { ticks: 2 });
    }

    #[test]
    fn test_wait_defaults_to_one_tick() {
        let program = keyword("wait");
        assert_eq!(program.body[0].kind, StmtKind::Wait { ticks: 1 });
    }

    #[test]
    fn test_if_elif_else_chain() {
        let program = keyword(
            "if energy > 50:\n  move forward\nelif energy > 20:\n  wait 3\nelse:\n  collect\nend",
        );
        let StmtKind::If { alternate, .. } = &program.body[0].kind else {
            panic!("expected if");
        };
        let Some(Alternate::If(elif)) = alternate else {
            panic!("expected elif chain");
        };
        let StmtKind::If {
            alternate: Some(Alternate::Block(_)),
            ..
        } = &elif.kind
        else {
            panic!("expected else block on the elif");
        };
    }

    #[test]
    fn test_single_line_block_with_semicolons() {
        let program = keyword("IF scan() == \"crystal\": MOVE forward; COLLECT; END");
        let StmtKind::If { consequent, .. } = &program.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(consequent.statements.len(), 2);
    }

    #[test]
    fn test_loop_requires_integer_count() {
        let err = parse("loop:\nmove forward\nend", Syntax::Keyword).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.message.contains("missing count"));
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_unexpected_end() {
        let err = parse("end", Syntax::Keyword).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.message.contains("unexpected `end`"));
    }

    #[test]
    fn test_move_requires_direction() {
        let err = parse("move up", Syntax::Keyword).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.message.contains("forward"));
    }

    #[test]
    fn test_braced_actions() {
        let program = braced("move_forward(); turn_right(); collect(); wait(4); log(energy);");
        assert_eq!(program.body.len(), 5);
        assert_eq!(
            program.body[1].kind,
            StmtKind::Turn {
                dir: TurnDir::Right
            }
        );
        assert_eq!(program.body[3].kind, StmtKind::Wait { ticks: 4 });
    }

    #[test]
    fn test_braced_missing_semicolon() {
        let err = parse("move_forward()", Syntax::Braced).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.message.contains("missing `;`"));
    }

    #[test]
    fn test_for_lowers_to_loop() {
        let program = braced("for (int i = 2; i < 7; i++) { move_forward(); }");
        let StmtKind::Loop { count, body } = &program.body[0].kind else {
            panic!("expected loop");
        };
        assert_eq!(*count, 5);
        assert_eq!(body.statements.len(), 1);
    }

    #[test]
    fn test_for_variable_must_match() {
        let err = parse("for (int i = 0; j < 3; i++) {}", Syntax::Braced).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.message.contains("`i`"));
    }

    #[test]
    fn test_else_if_chains() {
        let program = braced(
            "if (energy > 50) { move_forward(); } else if (energy > 20) { wait(); } else { collect(); }",
        );
        let StmtKind::If { alternate, .. } = &program.body[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(alternate, Some(Alternate::If(_))));
    }

    #[test]
    fn test_scan_keywords_become_calls() {
        let program = braced("if (scan() == \"crystal\") { collect(); }");
        let StmtKind::If { cond, .. } = &program.body[0].kind else {
            panic!("expected if");
        };
        let ExprKind::Binary { left, .. } = &cond.kind else {
            panic!("expected comparison");
        };
        let ExprKind::Call { callee, args } = &left.kind else {
            panic!("expected call");
        };
        assert!(args.is_empty());
        assert_eq!(callee.kind, ExprKind::Identifier("scan".to_string()));
    }

    #[test]
    fn test_direction_keyword_as_string() {
        let program = keyword("log forward");
        let StmtKind::Log { expr } = &program.body[0].kind else {
            panic!("expected log");
        };
        assert_eq!(
            expr.kind,
            ExprKind::Literal(Literal::Str("forward".to_string()))
        );
    }

    #[test]
    fn test_member_chain() {
        let program = keyword("log inventory.crystal");
        let StmtKind::Log { expr } = &program.body[0].kind else {
            panic!("expected log");
        };
        let ExprKind::Member { object, property } = &expr.kind else {
            panic!("expected member access");
        };
        assert_eq!(property, "crystal");
        assert_eq!(object.kind, ExprKind::Identifier("inventory".to_string()));
    }

    #[test]
    fn test_precedence_or_is_weakest() {
        let program = keyword("log energy > 10 and x < 2 or not y");
        let StmtKind::Log { expr } = &program.body[0].kind else {
            panic!("expected log");
        };
        let ExprKind::Binary { op, .. } = &expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Or);
    }

    #[test]
    fn test_positions_attached() {
        let program = keyword("move forward\nwait 2");
        assert_eq!(program.body[0].line, 1);
        assert_eq!(program.body[1].line, 2);
        assert_eq!(program.body[1].column, 1);
    }

    #[test]
    fn test_missing_end_reports_block() {
        let err = parse("while energy > 0:\nmove forward\n", Syntax::Keyword).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.hint.as_deref().unwrap_or("").contains("end"));
    }

    #[test]
    fn test_missing_brace_reports_block() {
        let err = parse("while (energy > 0) { move_forward();", Syntax::Braced).unwrap_err();
        let FrontendError::Parse(err) = err else {
            panic!("expected parse error");
        };
        assert!(err.hint.as_deref().unwrap_or("").contains("}"));
    }
}
