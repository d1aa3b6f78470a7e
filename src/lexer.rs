// Keyword-surface lexer - tokenizes the block-and-keyword syntax
//
// Statements end at a physical newline or `;`; blocks open with a trailing
// `:` and close with `end`. Runs of terminators collapse to one NEWLINE.

use crate::error::{LexError, LexErrorKind};
use crate::token::{Token, TokenKind};

pub struct Lexer {
    source: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn push(&mut self, tokens: &mut Vec<Token>, kind: TokenKind, line: usize, column: usize) {
        // Terminator runs collapse to a single NEWLINE.
        if kind == TokenKind::Newline
            && matches!(tokens.last(), Some(t) if t.kind == TokenKind::Newline)
        {
            return;
        }
        tokens.push(Token::new(kind, line, column));
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let line = self.line;
            let column = self.column;
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '\n' | ';' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::Newline, line, column);
                }
                '"' | '\'' => {
                    let text = self.read_string(ch, line, column)?;
                    self.push(&mut tokens, TokenKind::Str(text), line, column);
                }
                '0'..='9' => {
                    let number = self.read_number();
                    self.push(&mut tokens, TokenKind::Number(number), line, column);
                }
                'a'..='z' | 'A'..='Z' | '_' => {
                    let word = self.read_word();
                    self.push(&mut tokens, keyword_or_ident(&word), line, column);
                }
                '(' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::LParen, line, column);
                }
                ')' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::RParen, line, column);
                }
                ':' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::Colon, line, column);
                }
                ',' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::Comma, line, column);
                }
                '.' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::Dot, line, column);
                }
                '+' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::Plus, line, column);
                }
                '-' => {
                    self.advance();
                    self.push(&mut tokens, TokenKind::Minus, line, column);
                }
                '=' if self.peek_next() == Some('=') => {
                    self.advance();
                    self.advance();
                    self.push(&mut tokens, TokenKind::EqEq, line, column);
                }
                '!' if self.peek_next() == Some('=') => {
                    self.advance();
                    self.advance();
                    self.push(&mut tokens, TokenKind::NotEq, line, column);
                }
                '<' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        self.push(&mut tokens, TokenKind::LtEq, line, column);
                    } else {
                        self.push(&mut tokens, TokenKind::Lt, line, column);
                    }
                }
                '>' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        self.push(&mut tokens, TokenKind::GtEq, line, column);
                    } else {
                        self.push(&mut tokens, TokenKind::Gt, line, column);
                    }
                }
                other => {
                    return Err(LexError {
                        kind: LexErrorKind::UnexpectedChar(other),
                        line,
                        column,
                    });
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
        Ok(tokens)
    }

    fn read_string(
        &mut self,
        quote: char,
        line: usize,
        column: usize,
    ) -> Result<String, LexError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        line,
                        column,
                    });
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(text);
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('\\') => text.push('\\'),
                        Some('"') => text.push('"'),
                        Some('\'') => text.push('\''),
                        Some(other) => text.push(other),
                        None => {
                            return Err(LexError {
                                kind: LexErrorKind::UnterminatedString,
                                line,
                                column,
                            });
                        }
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> f64 {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        text.parse().unwrap_or(0.0)
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }
}

fn keyword_or_ident(word: &str) -> TokenKind {
    match word.to_lowercase().as_str() {
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "end" => TokenKind::End,
        "loop" => TokenKind::Loop,
        "while" => TokenKind::While,
        "move" => TokenKind::Move,
        "turn" => TokenKind::Turn,
        "collect" => TokenKind::Collect,
        "wait" => TokenKind::Wait,
        "log" => TokenKind::Log,
        "forward" => TokenKind::Forward,
        "back" => TokenKind::Back,
        "left" => TokenKind::Left,
        "right" => TokenKind::Right,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        _ => TokenKind::Ident(word.to_string()),
    }
}

/// Tokenize keyword-surface source.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("MOVE forward"),
            vec![TokenKind::Move, TokenKind::Forward, TokenKind::Eof]
        );
    }

    #[test]
    fn test_newline_runs_collapse() {
        assert_eq!(
            kinds("collect\n\n\ncollect"),
            vec![
                TokenKind::Collect,
                TokenKind::Newline,
                TokenKind::Collect,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_semicolon_is_a_terminator() {
        assert_eq!(
            kinds("collect;;\n collect"),
            vec![
                TokenKind::Collect,
                TokenKind::Newline,
                TokenKind::Collect,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            kinds("collect # grab it\ncollect"),
            vec![
                TokenKind::Collect,
                TokenKind::Newline,
                TokenKind::Collect,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("move forward\nturn left").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 6));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 1));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#"log "a\nb""#),
            vec![
                TokenKind::Log,
                TokenKind::Str("a\nb".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("log \"oops").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_unexpected_char() {
        let err = tokenize("move @").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedChar('@'));
        assert_eq!((err.line, err.column), (1, 6));
    }

    #[test]
    fn test_number_with_fraction() {
        assert_eq!(
            kinds("wait 2.5"),
            vec![TokenKind::Wait, TokenKind::Number(2.5), TokenKind::Eof]
        );
    }

    #[test]
    fn test_eof_always_present() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }
}
