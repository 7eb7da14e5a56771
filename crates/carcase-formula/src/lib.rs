//! Formula language for parametric cabinet assemblies.
//!
//! Part templates carry their geometry as formula strings
//! (`"width - 2*thickness"`, `"ceil(height / 400)"`). This crate
//! tokenizes, parses and evaluates those formulas:
//!
//! - [`lexer`] - logos tokenizer with byte spans
//! - [`ast`] - immutable expression tree
//! - [`parser`] - hand-written precedence-climbing parser
//! - [`eval`] - pure tree-walking evaluator
//! - [`value`] - typed values and layered scopes
//! - [`cache`] - parse-once AST cache shared across threads
//!
//! Evaluation is deterministic and side-effect free: the same AST and
//! scope always produce the same value, which is what makes bulk
//! per-cabinet resolution safe to parallelize.

pub mod ast;
pub mod cache;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use cache::FormulaCache;
pub use error::{EvalError, ParseError, ParseErrorKind, Span};
pub use eval::evaluate;
pub use parser::parse;
pub use value::{Scope, Value};
