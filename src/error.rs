// Error kinds surfaced by the pipeline, with source positions and hints

use std::fmt;

use crate::span::LineIndex;

/// Failure while turning source text into tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    UnexpectedChar(char),
    UnterminatedString,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::UnexpectedChar(ch) => {
                write!(
                    f,
                    "unexpected character `{}` at {}:{}",
                    ch, self.line, self.column
                )
            }
            LexErrorKind::UnterminatedString => {
                write!(f, "unterminated string at {}:{}", self.line, self.column)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Fatal parse failure. Carries an optional hint the host shows verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Compiler-stage failure. These indicate a malformed tree reaching the
/// compiler, not a user mistake.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub line: usize,
}

impl CompileError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal compile error: {} (line {})", self.message, self.line)
    }
}

impl std::error::Error for CompileError {}

/// Execution failure raised by the virtual machine.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: usize,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    StackUnderflow,
    UnknownIdentifier(String),
    BadMember(String),
    UnknownFunction(String),
    InstructionLimit(usize),
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn message(&self) -> String {
        match &self.kind {
            RuntimeErrorKind::StackUnderflow => "operand stack underflow".to_string(),
            RuntimeErrorKind::UnknownIdentifier(name) => {
                format!("unknown variable `{}`", name)
            }
            RuntimeErrorKind::BadMember(prop) => {
                format!("no such property `{}`", prop)
            }
            RuntimeErrorKind::UnknownFunction(name) => {
                format!("unknown function `{}`", name)
            }
            RuntimeErrorKind::InstructionLimit(limit) => {
                format!("instruction limit of {} exceeded", limit)
            }
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())?;
        if self.line > 0 {
            write!(f, " at line {}", self.line)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

/// Any failure on the source -> bytecode path.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontendError {
    Lex(LexError),
    Parse(ParseError),
    Compile(CompileError),
}

impl FrontendError {
    /// The 1-based source line, when the stage tracked one.
    pub fn line(&self) -> usize {
        match self {
            FrontendError::Lex(e) => e.line,
            FrontendError::Parse(e) => e.line,
            FrontendError::Compile(e) => e.line,
        }
    }
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontendError::Lex(e) => e.fmt(f),
            FrontendError::Parse(e) => e.fmt(f),
            FrontendError::Compile(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for FrontendError {}

impl From<LexError> for FrontendError {
    fn from(e: LexError) -> Self {
        FrontendError::Lex(e)
    }
}

impl From<ParseError> for FrontendError {
    fn from(e: ParseError) -> Self {
        FrontendError::Parse(e)
    }
}

impl From<CompileError> for FrontendError {
    fn from(e: CompileError) -> Self {
        FrontendError::Compile(e)
    }
}

/// Render an error against its source with the offending line underlined.
///
/// ```text
/// error:3:7: unexpected character `$`
///    3 | move $orward
///      |      ^
/// ```
pub fn render_with_source(source: &str, line: usize, column: usize, message: &str) -> String {
    let index = LineIndex::new(source);
    let mut out = format!("error:{}:{}: {}\n", line, column, message);
    if let Some(text) = index.line_text(line) {
        out.push_str(&format!("{:4} | {}\n", line, text));
        let pad: String = text
            .chars()
            .take(column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        out.push_str(&format!("     | {}^\n", pad));
    }
    out
}
