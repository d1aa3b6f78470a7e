// Braced-surface lexer - tokenizer using logos
//
// Same token contract as the keyword-surface lexer: one NEWLINE per run of
// physical newlines, 1-based positions, terminal EOF. Statements in this
// family end with `;`, blocks are `{ ... }`, comments are `//` and `/* */`.

use logos::Logos;

use crate::error::{LexError, LexErrorKind};
use crate::span::LineIndex;
use crate::token::{Token, TokenKind};

fn unescape(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('\'') => out.push('\''),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
enum RawToken {
    #[regex(r"\n+")]
    Newline,

    // Keywords
    #[token("if", ignore(ascii_case))]
    If,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("int", ignore(ascii_case))]
    Int,
    #[token("move_forward", ignore(ascii_case))]
    MoveForward,
    #[token("move_back", ignore(ascii_case))]
    MoveBack,
    #[token("turn_left", ignore(ascii_case))]
    TurnLeft,
    #[token("turn_right", ignore(ascii_case))]
    TurnRight,
    #[token("collect", ignore(ascii_case))]
    Collect,
    #[token("wait", ignore(ascii_case))]
    Wait,
    #[token("log", ignore(ascii_case))]
    Log,
    #[token("scan", ignore(ascii_case))]
    Scan,
    #[token("scan_left", ignore(ascii_case))]
    ScanLeft,
    #[token("scan_right", ignore(ascii_case))]
    ScanRight,

    // Operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("=")]
    Assign,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse().ok())]
    Number(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl RawToken {
    fn into_kind(self) -> TokenKind {
        match self {
            RawToken::Newline => TokenKind::Newline,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::For => TokenKind::For,
            RawToken::While => TokenKind::While,
            RawToken::Int => TokenKind::Int,
            RawToken::MoveForward => TokenKind::MoveForward,
            RawToken::MoveBack => TokenKind::MoveBack,
            RawToken::TurnLeft => TokenKind::TurnLeft,
            RawToken::TurnRight => TokenKind::TurnRight,
            RawToken::Collect => TokenKind::Collect,
            RawToken::Wait => TokenKind::Wait,
            RawToken::Log => TokenKind::Log,
            RawToken::Scan => TokenKind::Scan,
            RawToken::ScanLeft => TokenKind::ScanLeft,
            RawToken::ScanRight => TokenKind::ScanRight,
            RawToken::AndAnd => TokenKind::And,
            RawToken::OrOr => TokenKind::Or,
            RawToken::Bang => TokenKind::Not,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Assign => TokenKind::Assign,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Number(n) => TokenKind::Number(n),
            RawToken::Str(s) => TokenKind::Str(s),
            RawToken::Ident(s) => TokenKind::Ident(s),
        }
    }
}

/// Tokenize braced-surface source.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let index = LineIndex::new(source);
    let mut lexer = RawToken::lexer(source);
    let mut tokens: Vec<Token> = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let pos = index.position_at(span.start);
        match result {
            Ok(raw) => {
                let kind = raw.into_kind();
                if kind == TokenKind::Newline
                    && matches!(tokens.last(), Some(t) if t.kind == TokenKind::Newline)
                {
                    continue;
                }
                tokens.push(Token::new(kind, pos.line, pos.column));
            }
            Err(()) => {
                let rest = &source[span.start..];
                let kind = if rest.starts_with('"') || rest.starts_with('\'') {
                    LexErrorKind::UnterminatedString
                } else {
                    LexErrorKind::UnexpectedChar(rest.chars().next().unwrap_or('\0'))
                };
                return Err(LexError {
                    kind,
                    line: pos.line,
                    column: pos.column,
                });
            }
        }
    }

    let end = index.position_at(source.len());
    tokens.push(Token::new(TokenKind::Eof, end.line, end.column));
    Ok(tokens)
}
