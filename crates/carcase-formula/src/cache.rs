//! Parse-once formula cache.
//!
//! Templates store formulas as plain text; a project recompute evaluates
//! the same text hundreds of times across cabinets. Parsing is a pure
//! function of the text, so ASTs are cached by source string and shared
//! read-only across threads.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ast::Expr;
use crate::error::ParseError;
use crate::parser::parse;

/// Thread-safe cache of parsed formulas, keyed by source text.
#[derive(Debug, Default)]
pub struct FormulaCache {
    entries: RwLock<HashMap<String, Arc<Expr>>>,
}

impl FormulaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse formula text, reusing a cached AST when available.
    ///
    /// Parse errors are not cached: formula text is static until edited,
    /// so the error path is never hot.
    pub fn parse_cached(&self, source: &str) -> Result<Arc<Expr>, ParseError> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(expr) = entries.get(source) {
                return Ok(Arc::clone(expr));
            }
        }

        let expr = Arc::new(parse(source)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let entry = entries
            .entry(source.to_string())
            .or_insert_with(|| Arc::clone(&expr));
        Ok(Arc::clone(entry))
    }

    /// Number of cached formulas.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
