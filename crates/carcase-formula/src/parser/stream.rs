//! Token stream wrapper for the hand-written parser.

use std::ops::Range;

use crate::error::{ParseError, Span};
use crate::lexer::Token;

/// Token stream with lookahead and byte-span tracking.
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Range<usize>)],
    pos: usize,
    /// Length of the source text, for EOF spans.
    source_len: u32,
}

impl<'src> TokenStream<'src> {
    pub fn new(tokens: &'src [(Token, Range<usize>)], source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            source_len: source_len as u32,
        }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the consumed one.
    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Expect a specific token and advance past it.
    pub fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if *token == expected => {
                self.advance();
                Ok(())
            }
            found => Err(ParseError::expected(
                &format!("'{}'", expected),
                found,
                self.current_span(),
            )),
        }
    }

    /// Check if the stream is exhausted.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current position in the token stream.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Span from a token position to the last consumed token.
    pub fn span_from(&self, start: usize) -> Span {
        let start_byte = self
            .tokens
            .get(start)
            .map(|(_, range)| range.start as u32)
            .unwrap_or(self.source_len);
        let end_byte = if self.pos > 0 {
            self.tokens
                .get(self.pos - 1)
                .map(|(_, range)| range.end as u32)
                .unwrap_or(self.source_len)
        } else {
            start_byte
        };
        Span::new(start_byte, end_byte)
    }

    /// Span of the current token, or a zero-length span at EOF.
    pub fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, range)) => Span::new(range.start as u32, range.end as u32),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|(_, range)| range.end as u32)
                    .unwrap_or(self.source_len);
                Span::new(end, end)
            }
        }
    }
}
