//! Formula parser.
//!
//! Grammar (loosest to tightest binding):
//!
//! ```text
//! expr    := ternary
//! ternary := or ('?' ternary ':' ternary)?   // right-associative
//! or      := and ('||' and)*
//! and     := cmp ('&&' cmp)*
//! cmp     := add (('<'|'<='|'>'|'>='|'=='|'!=') add)*
//! add     := mul (('+'|'-') mul)*
//! mul     := unary (('*'|'/') unary)*
//! unary   := ('-'|'!')* atom
//! atom    := NUMBER | STRING | BOOL | IDENT | IDENT '(' args ')' | '(' expr ')'
//! ```
//!
//! Parsing is deterministic and never partially applies: either the whole
//! formula parses, or a [`ParseError`] with a byte offset is returned.

mod pratt;
mod stream;

pub use stream::TokenStream;

use crate::ast::Expr;
use crate::error::ParseError;
use crate::lexer::lex;

/// Parse formula text into an AST.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = lex(source)?;
    let mut stream = TokenStream::new(&tokens, source.len());

    let expr = pratt::parse_ternary(&mut stream)?;

    if !stream.at_end() {
        return Err(ParseError::expected(
            "end of formula",
            stream.peek(),
            stream.current_span(),
        ));
    }

    Ok(expr)
}
