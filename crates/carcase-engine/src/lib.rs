//! Parametric assembly resolution engine.
//!
//! Resolves formula-driven assembly definitions against concrete cabinet
//! instances: orders parts by their formula dependencies, evaluates
//! dimensions, positions, conditions and quantities, builds part
//! outlines, merges per-cabinet hardware overrides and prices the result.
//!
//! Resolution is pure: no I/O, no clocks, no randomness. The same inputs
//! always yield the same [`Resolution`], which makes results cacheable
//! and bulk recomputes embarrassingly parallel.

mod context;
pub mod error;
pub mod graph;
mod overrides;
pub mod pricing;
pub mod resolver;
pub mod shape;
pub mod types;

use rayon::prelude::*;
use tracing::debug;

pub use error::{Error, Result, ShapeError};
pub use graph::evaluation_order;
pub use pricing::total_price;
pub use resolver::Resolver;
pub use shape::build_outline;
pub use types::{
    AssemblyDefinition, AssemblyId, AssemblyPartTemplate, CabinetHardwareOverride, CabinetId,
    CabinetInstance, Catalog, ComponentId, ComponentInfo, MaterialId, MaterialInfo, PartId, Point,
    Resolution, ResolutionWarning, ResolvedPart, ScopeValue, ShapeSegment,
};

use indexmap::IndexMap;

/// Resolve every cabinet of a project in parallel.
///
/// Each cabinet resolves independently against its assembly definition;
/// one cabinet's failure never blocks the others. Results come back in
/// cabinet input order regardless of scheduling.
pub fn resolve_project(
    resolver: &Resolver,
    definitions: &IndexMap<AssemblyId, AssemblyDefinition>,
    cabinets: &[CabinetInstance],
    overrides: &[CabinetHardwareOverride],
    catalog: &Catalog,
) -> Vec<(CabinetId, Result<Resolution>)> {
    debug!(cabinets = cabinets.len(), "resolving project");
    cabinets
        .par_iter()
        .map(|cabinet| {
            let result = match definitions.get(&cabinet.assembly_id) {
                Some(definition) => resolver.resolve(definition, cabinet, overrides, catalog),
                None => Err(Error::UnknownAssembly {
                    cabinet: cabinet.id.clone(),
                    assembly: cabinet.assembly_id.clone(),
                }),
            };
            (cabinet.id.clone(), result)
        })
        .collect()
}
