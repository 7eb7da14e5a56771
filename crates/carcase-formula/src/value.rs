//! Runtime values and variable scopes.

use indexmap::IndexMap;

/// A typed formula value.
///
/// There is no implicit coercion between variants: a boolean used where a
/// number is required is a type error, not `0`/`1`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of this value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Text(_) => "text",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// A layered variable scope.
///
/// Identifier lookup is case-sensitive and walks from the innermost layer
/// outwards. Layers are immutable once built; nested evaluation pushes a
/// child layer instead of mutating, so concurrent evaluations never
/// observe partial writes.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    vars: IndexMap<String, Value>,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    /// Create a root scope from a set of variables.
    pub fn new(vars: IndexMap<String, Value>) -> Self {
        Self { vars, parent: None }
    }

    /// Push a child layer on top of this scope.
    pub fn child(&'a self, vars: IndexMap<String, Value>) -> Scope<'a> {
        Scope {
            vars,
            parent: Some(self),
        }
    }

    /// Look up a variable, innermost layer first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars
            .get(name)
            .or_else(|| self.parent.and_then(|p| p.get(name)))
    }
}
