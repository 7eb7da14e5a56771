//! Formula AST.
//!
//! Expressions are immutable after parsing and carry byte spans for
//! diagnostics. A parsed AST is a pure function of the formula text, so
//! it can be cached by source string and shared across threads.

use indexmap::IndexSet;

use crate::error::Span;

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Collect the free identifiers of this expression, in first-use order.
    ///
    /// Used by the dependency resolver to discover sibling-part references
    /// (`side_left.width`) before evaluation.
    pub fn free_idents(&self) -> IndexSet<String> {
        let mut idents = IndexSet::new();
        self.collect_idents(&mut idents);
        idents
    }

    fn collect_idents(&self, out: &mut IndexSet<String>) {
        match &self.kind {
            ExprKind::Ident(name) => {
                out.insert(name.clone());
            }
            ExprKind::Unary { operand, .. } => operand.collect_idents(out),
            ExprKind::Binary { left, right, .. } => {
                left.collect_idents(out);
                right.collect_idents(out);
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.collect_idents(out);
                then_branch.collect_idents(out);
                else_branch.collect_idents(out);
            }
            ExprKind::Call { args, .. } => {
                for arg in args {
                    arg.collect_idents(out);
                }
            }
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Bool(_) => {}
        }
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal
    Number(f64),
    /// String literal
    Str(String),
    /// Boolean literal
    Bool(bool),
    /// Scope lookup, possibly dotted (`width`, `side_left.width`)
    Ident(String),
    /// Unary operator
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operator
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Conditional: `cond ? then : else`. Only the selected branch
    /// is evaluated.
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Built-in function call (`ceil`, `min`, ...)
    Call { function: String, args: Vec<Expr> },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric negation `-x`
    Neg,
    /// Boolean negation `!x`
    Not,
}
