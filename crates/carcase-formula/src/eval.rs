//! Formula evaluation.
//!
//! Pure tree-walking evaluator: no side effects, no interior state. The
//! same cached AST can be evaluated concurrently against different scopes.

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::EvalError;
use crate::value::{Scope, Value};

/// Evaluate an expression against a scope.
pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Number(n) => Ok(Value::Number(*n)),
        ExprKind::Str(s) => Ok(Value::Text(s.clone())),
        ExprKind::Bool(b) => Ok(Value::Boolean(*b)),

        ExprKind::Ident(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),

        ExprKind::Unary { op, operand } => {
            let value = evaluate(operand, scope)?;
            match op {
                UnaryOp::Neg => Ok(Value::Number(-expect_number(&value)?)),
                UnaryOp::Not => Ok(Value::Boolean(!expect_boolean(&value)?)),
            }
        }

        ExprKind::Binary { op, left, right } => eval_binary(*op, left, right, scope),

        ExprKind::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            let cond = evaluate(condition, scope)?;
            if expect_boolean(&cond)? {
                evaluate(then_branch, scope)
            } else {
                evaluate(else_branch, scope)
            }
        }

        ExprKind::Call { function, args } => eval_call(function, args, scope),
    }
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr, scope: &Scope) -> Result<Value, EvalError> {
    // && and || short-circuit; the right operand is only evaluated on demand.
    match op {
        BinaryOp::And => {
            let lhs = expect_boolean(&evaluate(left, scope)?)?;
            if !lhs {
                return Ok(Value::Boolean(false));
            }
            return Ok(Value::Boolean(expect_boolean(&evaluate(right, scope)?)?));
        }
        BinaryOp::Or => {
            let lhs = expect_boolean(&evaluate(left, scope)?)?;
            if lhs {
                return Ok(Value::Boolean(true));
            }
            return Ok(Value::Boolean(expect_boolean(&evaluate(right, scope)?)?));
        }
        _ => {}
    }

    let lhs = evaluate(left, scope)?;
    let rhs = evaluate(right, scope)?;

    match op {
        BinaryOp::Add => Ok(Value::Number(expect_number(&lhs)? + expect_number(&rhs)?)),
        BinaryOp::Sub => Ok(Value::Number(expect_number(&lhs)? - expect_number(&rhs)?)),
        BinaryOp::Mul => Ok(Value::Number(expect_number(&lhs)? * expect_number(&rhs)?)),
        BinaryOp::Div => {
            let divisor = expect_number(&rhs)?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Number(expect_number(&lhs)? / divisor))
        }

        BinaryOp::Lt => Ok(Value::Boolean(expect_number(&lhs)? < expect_number(&rhs)?)),
        BinaryOp::Le => Ok(Value::Boolean(expect_number(&lhs)? <= expect_number(&rhs)?)),
        BinaryOp::Gt => Ok(Value::Boolean(expect_number(&lhs)? > expect_number(&rhs)?)),
        BinaryOp::Ge => Ok(Value::Boolean(expect_number(&lhs)? >= expect_number(&rhs)?)),

        BinaryOp::Eq => Ok(Value::Boolean(values_equal(&lhs, &rhs)?)),
        BinaryOp::Ne => Ok(Value::Boolean(!values_equal(&lhs, &rhs)?)),

        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

/// Equality requires same-typed operands; cross-type comparison is a
/// type error rather than `false`.
fn values_equal(lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
        (Value::Text(a), Value::Text(b)) => Ok(a == b),
        _ => Err(EvalError::TypeMismatch {
            expected: lhs.type_name(),
            found: rhs.type_name(),
        }),
    }
}

fn eval_call(function: &str, args: &[Expr], scope: &Scope) -> Result<Value, EvalError> {
    match function {
        "ceil" => Ok(Value::Number(unary_arg(function, args, scope)?.ceil())),
        "floor" => Ok(Value::Number(unary_arg(function, args, scope)?.floor())),
        "round" => Ok(Value::Number(unary_arg(function, args, scope)?.round())),
        "abs" => Ok(Value::Number(unary_arg(function, args, scope)?.abs())),
        "sqrt" => Ok(Value::Number(unary_arg(function, args, scope)?.sqrt())),
        "min" => {
            let (a, b) = binary_args(function, args, scope)?;
            Ok(Value::Number(a.min(b)))
        }
        "max" => {
            let (a, b) = binary_args(function, args, scope)?;
            Ok(Value::Number(a.max(b)))
        }
        _ => Err(EvalError::UnknownFunction(function.to_string())),
    }
}

fn unary_arg(function: &str, args: &[Expr], scope: &Scope) -> Result<f64, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::WrongArgCount {
            function: function.to_string(),
            expected: 1,
            found: args.len(),
        });
    }
    expect_number(&evaluate(&args[0], scope)?)
}

fn binary_args(function: &str, args: &[Expr], scope: &Scope) -> Result<(f64, f64), EvalError> {
    if args.len() != 2 {
        return Err(EvalError::WrongArgCount {
            function: function.to_string(),
            expected: 2,
            found: args.len(),
        });
    }
    let a = expect_number(&evaluate(&args[0], scope)?)?;
    let b = expect_number(&evaluate(&args[1], scope)?)?;
    Ok((a, b))
}

fn expect_number(value: &Value) -> Result<f64, EvalError> {
    value.as_number().ok_or(EvalError::TypeMismatch {
        expected: "number",
        found: value.type_name(),
    })
}

fn expect_boolean(value: &Value) -> Result<bool, EvalError> {
    value.as_boolean().ok_or(EvalError::TypeMismatch {
        expected: "boolean",
        found: value.type_name(),
    })
}
