//! Pratt parser core - precedence climbing for binary and unary operators.

use super::TokenStream;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::ParseError;
use crate::lexer::Token;

/// Get binary operator metadata (precedence and operator enum).
///
/// Higher precedence = tighter binding. All binary operators are
/// left-associative; the ternary form is handled above this layer.
fn binary_op_info(token: &Token) -> Option<(u8, BinaryOp)> {
    match token {
        Token::OrOr => Some((10, BinaryOp::Or)),
        Token::AndAnd => Some((20, BinaryOp::And)),
        Token::EqEq => Some((30, BinaryOp::Eq)),
        Token::BangEq => Some((30, BinaryOp::Ne)),
        Token::Lt => Some((30, BinaryOp::Lt)),
        Token::LtEq => Some((30, BinaryOp::Le)),
        Token::Gt => Some((30, BinaryOp::Gt)),
        Token::GtEq => Some((30, BinaryOp::Ge)),
        Token::Plus => Some((40, BinaryOp::Add)),
        Token::Minus => Some((40, BinaryOp::Sub)),
        Token::Star => Some((50, BinaryOp::Mul)),
        Token::Slash => Some((50, BinaryOp::Div)),
        _ => None,
    }
}

/// Parse a full expression including the ternary form.
///
/// `?:` binds loosest and is right-associative:
/// `a ? b : c ? d : e` parses as `a ? b : (c ? d : e)`.
pub(super) fn parse_ternary(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let condition = parse_pratt(stream, 0)?;

    if matches!(stream.peek(), Some(Token::Question)) {
        stream.advance();
        let then_branch = parse_ternary(stream)?;
        stream.expect(Token::Colon)?;
        let else_branch = parse_ternary(stream)?;
        let span = stream.span_from(start);
        return Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ));
    }

    Ok(condition)
}

/// Pratt parser - handles binary operators with precedence climbing.
fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let mut left = parse_prefix(stream)?;

    while let Some(token) = stream.peek() {
        if let Some((prec, op)) = binary_op_info(token) {
            if prec < min_prec {
                break;
            }

            stream.advance();
            let right = parse_pratt(stream, prec + 1)?;

            let span = stream.span_from(start);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        } else {
            break;
        }
    }

    Ok(left)
}

/// Parse prefix expressions (unary operators, then atoms).
fn parse_prefix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let op = match stream.peek() {
        Some(Token::Minus) => Some(UnaryOp::Neg),
        Some(Token::Bang) => Some(UnaryOp::Not),
        _ => None,
    };

    if let Some(op) = op {
        stream.advance();
        let operand = parse_prefix(stream)?;
        let span = stream.span_from(start);
        return Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ));
    }

    parse_atom(stream)
}

/// Parse atoms: literals, identifiers, function calls, parentheses.
fn parse_atom(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let span = stream.current_span();

    match stream.advance().cloned() {
        Some(Token::Number(value)) => Ok(Expr::new(ExprKind::Number(value), span)),
        Some(Token::Str(value)) => Ok(Expr::new(ExprKind::Str(value), span)),
        Some(Token::True) => Ok(Expr::new(ExprKind::Bool(true), span)),
        Some(Token::False) => Ok(Expr::new(ExprKind::Bool(false), span)),
        Some(Token::Ident(name)) => {
            // Function call if immediately followed by '('
            if matches!(stream.peek(), Some(Token::LParen)) {
                let args = parse_call_args(stream)?;
                let span = stream.span_from(start);
                Ok(Expr::new(
                    ExprKind::Call {
                        function: name,
                        args,
                    },
                    span,
                ))
            } else {
                Ok(Expr::new(ExprKind::Ident(name), span))
            }
        }
        Some(Token::LParen) => {
            let inner = parse_ternary(stream)?;
            stream.expect(Token::RParen)?;
            Ok(inner)
        }
        found => Err(ParseError::expected("an expression", found.as_ref(), span)),
    }
}

/// Parse function call arguments.
fn parse_call_args(stream: &mut TokenStream) -> Result<Vec<Expr>, ParseError> {
    stream.expect(Token::LParen)?;

    let mut args = Vec::new();
    while !matches!(stream.peek(), Some(Token::RParen)) {
        args.push(parse_ternary(stream)?);

        if !matches!(stream.peek(), Some(Token::RParen)) {
            stream.expect(Token::Comma)?;
        }
    }

    stream.expect(Token::RParen)?;
    Ok(args)
}
