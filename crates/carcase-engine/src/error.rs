//! Resolution errors.
//!
//! All errors are detected locally and non-retriable (formulas are static
//! until edited). They abort the whole cabinet resolution and are
//! propagated whole; the engine never logs-and-continues, retries, or
//! degrades. Each variant carries the offending part id, and the formula
//! text where one exists, for caller-side diagnostics.

use thiserror::Error;

use carcase_formula::{EvalError, ParseError};

use crate::types::{AssemblyId, CabinetId, ComponentId, MaterialId, PartId};

/// Engine result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Resolution errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("part '{part}': cannot parse formula '{formula}': {source}")]
    Formula {
        part: PartId,
        formula: String,
        source: ParseError,
    },

    #[error("part '{part}': cannot evaluate formula '{formula}': {source}")]
    Eval {
        part: PartId,
        formula: String,
        source: EvalError,
    },

    #[error("circular dependency between parts: {}", format_cycle(.0))]
    CircularDependency(Vec<PartId>),

    #[error("part '{part}': references excluded part '{referenced}'")]
    ReferencedExcludedPart { part: PartId, referenced: PartId },

    #[error("part '{part}': quantity formula produced negative quantity {quantity}")]
    NegativeQuantity { part: PartId, quantity: i64 },

    #[error("part '{part}': quantity formula produced non-finite value {value}")]
    NonFiniteQuantity { part: PartId, value: f64 },

    #[error("part '{part}': {source}")]
    Shape {
        part: PartId,
        #[source]
        source: ShapeError,
    },

    #[error("part '{part}': unknown component '{component}'")]
    UnknownComponent { part: PartId, component: ComponentId },

    #[error("part '{part}': unknown material '{material}'")]
    UnknownMaterial { part: PartId, material: MaterialId },

    #[error("cabinet '{cabinet}': unknown assembly '{assembly}'")]
    UnknownAssembly {
        cabinet: CabinetId,
        assembly: AssemblyId,
    },
}

/// Outline construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// The final outline point does not coincide with the start point.
    /// Reported rather than silently snapped; callers decide whether this
    /// is fatal or cosmetic.
    #[error("outline does not close: gap of {gap} between final and start point")]
    NotClosed { gap: f64 },

    #[error("invalid shape segment {index}: {message}")]
    InvalidSegment { index: usize, message: String },
}

fn format_cycle(parts: &[PartId]) -> String {
    parts
        .iter()
        .map(|p| p.0.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}
