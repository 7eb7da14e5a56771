//! Lexical analysis for assembly formulas.
//!
//! Formulas are short single-expression strings stored on part templates
//! (`"width - 2 * thickness"`, `"ceil(height / 400)"`). Tokenization uses
//! logos; whitespace is skipped and every token carries its byte range so
//! parse errors can point at an exact offset.

use logos::Logos;
use std::ops::Range;

use crate::error::{ParseError, Span};

/// Formula token.
///
/// Dotted identifiers (`side_left.width`) are a single token: the dot form
/// is how formulas reference sibling part results, and the engine treats
/// the whole dotted name as one scope key.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // === Literals ===
    /// Numeric literal (integers and floats share one representation)
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Double-quoted string literal with escapes
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    Str(String),

    /// Boolean literal `true`
    #[token("true")]
    True,
    /// Boolean literal `false`
    #[token("false")]
    False,

    /// Identifier, optionally dotted (`width`, `part.width`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*", |lex| lex.slice().to_owned())]
    Ident(String),

    // === Arithmetic ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // === Comparison ===
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // === Boolean ===
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // === Ternary ===
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::EqEq => write!(f, "=="),
            Token::BangEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Unescape a string literal's content.
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(_) => return None, // unsupported escape
                None => return None,    // trailing backslash
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// Tokenize formula text into `(Token, byte range)` pairs.
///
/// An unrecognized character produces [`ParseError`] with the exact byte
/// offset; the token list is never partially usable on error.
pub fn lex(source: &str) -> Result<Vec<(Token, Range<usize>)>, ParseError> {
    let mut tokens = Vec::new();
    for (result, range) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, range)),
            Err(()) => {
                return Err(ParseError::invalid_token(
                    &source[range.clone()],
                    Span::new(range.start as u32, range.end as u32),
                ));
            }
        }
    }
    Ok(tokens)
}
