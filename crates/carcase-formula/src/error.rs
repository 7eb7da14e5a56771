//! Parse and evaluation errors.

use std::fmt;
use thiserror::Error;

/// Byte range into a formula's source text.
///
/// Formulas are standalone strings, so a span is just a start/end offset
/// pair; there is no file indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse error with byte offset and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// Byte range where the error occurred
    pub span: Span,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character sequence that is not a valid token.
    InvalidToken,
    /// A valid token in a position where a different one was expected.
    UnexpectedToken,
    /// End of the formula while a construct was incomplete.
    UnexpectedEof,
}

impl ParseError {
    /// Create an "expected token" error.
    pub fn expected(expected: &str, found: Option<&crate::lexer::Token>, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("expected {}, found '{}'", expected, token),
            None => format!("expected {}, found end of formula", expected),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "invalid token" error for an unlexable character sequence.
    pub fn invalid_token(slice: &str, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::InvalidToken,
            span,
            message: format!("invalid token '{}'", slice),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.span.start)
    }
}

impl std::error::Error for ParseError {}

/// Evaluation errors.
///
/// Evaluation is total for well-formed ASTs apart from these cases. All
/// are non-retriable: a formula stays broken until its text is edited.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{function}' takes {expected} argument(s), found {found}")]
    WrongArgCount {
        function: String,
        expected: usize,
        found: usize,
    },
}
