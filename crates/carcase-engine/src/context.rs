//! Formula evaluation helpers with part-level error context.
//!
//! Thin wrappers over `carcase-formula` that attach the offending part id
//! and formula text to every failure, and coerce results to the type the
//! caller requires (without any implicit value coercion).

use carcase_formula::{evaluate, EvalError, FormulaCache, Scope, Value};

use crate::error::{Error, Result};
use crate::types::PartId;

/// Evaluate a formula to a [`Value`].
pub(crate) fn eval_value(
    part: &PartId,
    formula: &str,
    scope: &Scope,
    cache: &FormulaCache,
) -> Result<Value> {
    let expr = cache.parse_cached(formula).map_err(|source| Error::Formula {
        part: part.clone(),
        formula: formula.to_string(),
        source,
    })?;
    evaluate(&expr, scope).map_err(|source| Error::Eval {
        part: part.clone(),
        formula: formula.to_string(),
        source,
    })
}

/// Evaluate a formula that must produce a number.
pub(crate) fn eval_number(
    part: &PartId,
    formula: &str,
    scope: &Scope,
    cache: &FormulaCache,
) -> Result<f64> {
    let value = eval_value(part, formula, scope, cache)?;
    value.as_number().ok_or_else(|| Error::Eval {
        part: part.clone(),
        formula: formula.to_string(),
        source: EvalError::TypeMismatch {
            expected: "number",
            found: value.type_name(),
        },
    })
}

/// Evaluate a formula that must produce a boolean.
pub(crate) fn eval_boolean(
    part: &PartId,
    formula: &str,
    scope: &Scope,
    cache: &FormulaCache,
) -> Result<bool> {
    let value = eval_value(part, formula, scope, cache)?;
    value.as_boolean().ok_or_else(|| Error::Eval {
        part: part.clone(),
        formula: formula.to_string(),
        source: EvalError::TypeMismatch {
            expected: "boolean",
            found: value.type_name(),
        },
    })
}

/// Evaluate an optional formula to a number, falling back to a default.
pub(crate) fn eval_number_or(
    part: &PartId,
    formula: Option<&str>,
    default: f64,
    scope: &Scope,
    cache: &FormulaCache,
) -> Result<f64> {
    match formula {
        Some(text) => eval_number(part, text, scope, cache),
        None => Ok(default),
    }
}
