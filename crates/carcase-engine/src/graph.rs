//! Dependency-aware evaluation ordering.
//!
//! A part's formula may reference another part's resolved result
//! (`side_left.width`), so parts of one assembly instance form a directed
//! graph: an edge from B to A means "A reads B, so B evaluates first".
//! Ordering uses Kahn's algorithm with a deterministically sorted ready
//! set; leftover nodes mean a cycle, which is reported as a concrete
//! ordered path rather than guessed around.

use indexmap::{IndexMap, IndexSet};

use carcase_formula::FormulaCache;

use crate::error::{Error, Result};
use crate::types::AssemblyDefinition;

/// Compute the evaluation order for an assembly's parts.
///
/// Returns indices into `definition.parts`. Ties among independent parts
/// are broken by `sort_order` ascending, then declaration order, so the
/// order is a pure function of the definition.
pub fn evaluation_order(definition: &AssemblyDefinition, cache: &FormulaCache) -> Result<Vec<usize>> {
    let parts = &definition.parts;

    let index_by_id: IndexMap<&str, usize> = parts
        .iter()
        .enumerate()
        .map(|(idx, part)| (part.id.0.as_str(), idx))
        .collect();

    // deps[i] = parts that must evaluate before part i
    let mut deps: Vec<IndexSet<usize>> = vec![IndexSet::new(); parts.len()];
    for (idx, part) in parts.iter().enumerate() {
        for formula in part.formulas() {
            let expr = cache.parse_cached(formula).map_err(|source| Error::Formula {
                part: part.id.clone(),
                formula: formula.to_string(),
                source,
            })?;

            for ident in expr.free_idents() {
                // Only the dotted form references a sibling result; the
                // first segment is the referenced part's id.
                let Some((tag, _attr)) = ident.split_once('.') else {
                    continue;
                };
                if let Some(&dep_idx) = index_by_id.get(tag) {
                    deps[idx].insert(dep_idx);
                }
            }
        }
    }

    // Kahn's algorithm with deterministic ready-set ordering.
    let mut in_degree: Vec<usize> = deps.iter().map(|d| d.len()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); parts.len()];
    for (idx, dep_set) in deps.iter().enumerate() {
        for &dep in dep_set {
            dependents[dep].push(idx);
        }
    }

    let mut ready: Vec<usize> = (0..parts.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(parts.len());

    while !ready.is_empty() {
        ready.sort_by_key(|&i| (parts[i].sort_order, i));
        let next = ready.remove(0);
        order.push(next);

        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if order.len() != parts.len() {
        let cycle = trace_cycle(parts.len(), &deps, &in_degree);
        return Err(Error::CircularDependency(
            cycle.into_iter().map(|i| parts[i].id.clone()).collect(),
        ));
    }

    Ok(order)
}

/// Trace one concrete cycle through the leftover nodes.
///
/// Follows depends-on edges among nodes Kahn's algorithm could not
/// process until a node repeats; the returned path lists each part in the
/// cycle once, in dependency order.
fn trace_cycle(part_count: usize, deps: &[IndexSet<usize>], in_degree: &[usize]) -> Vec<usize> {
    let leftover: IndexSet<usize> = (0..part_count).filter(|&i| in_degree[i] > 0).collect();

    let Some(&start) = leftover.first() else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(&next) = deps[current].iter().find(|d| leftover.contains(*d)) else {
            // Leftover node with no leftover dependency; cannot happen for
            // a well-formed leftover set, but do not loop forever on it.
            return path;
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            return path[pos..].to_vec();
        }
        path.push(next);
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssemblyDefinition, AssemblyPartTemplate};

    fn definition(parts: Vec<AssemblyPartTemplate>) -> AssemblyDefinition {
        AssemblyDefinition {
            id: "base_cabinet".into(),
            parts,
        }
    }

    fn part(id: &str) -> AssemblyPartTemplate {
        AssemblyPartTemplate::new(id, "panel_18mm")
    }

    #[test]
    fn test_chain_order() {
        // shelf reads side.width, side reads nothing
        let mut shelf = part("shelf");
        shelf.width_expr = Some("side.width - 4".to_string());
        let def = definition(vec![shelf, part("side")]);

        let cache = FormulaCache::new();
        let order = evaluation_order(&def, &cache).unwrap();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_independent_parts_ordered_by_sort_order() {
        let mut a = part("a");
        a.sort_order = 20;
        let mut b = part("b");
        b.sort_order = 10;
        let def = definition(vec![a, b]);

        let cache = FormulaCache::new();
        let order = evaluation_order(&def, &cache).unwrap();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_equal_sort_order_falls_back_to_declaration_order() {
        let def = definition(vec![part("a"), part("b"), part("c")]);
        let cache = FormulaCache::new();
        let order = evaluation_order(&def, &cache).unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_reports_ordered_path() {
        let mut a = part("a");
        a.x = Some("b.width".to_string());
        let mut b = part("b");
        b.width_expr = Some("a.x".to_string());
        let def = definition(vec![a, b]);

        let cache = FormulaCache::new();
        let err = evaluation_order(&def, &cache).unwrap_err();
        match err {
            Error::CircularDependency(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(parts.contains(&"a".into()));
                assert!(parts.contains(&"b".into()));
            }
            other => panic!("expected CircularDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut a = part("a");
        a.length_expr = Some("a.width + 2".to_string());
        let def = definition(vec![a]);

        let cache = FormulaCache::new();
        let err = evaluation_order(&def, &cache).unwrap_err();
        assert_eq!(err, Error::CircularDependency(vec!["a".into()]));
    }

    #[test]
    fn test_unknown_sibling_reference_is_not_an_edge() {
        // References to cabinet-level dotted params are not sibling refs.
        let mut a = part("a");
        a.x = Some("module.gap * 2".to_string());
        let def = definition(vec![a]);

        let cache = FormulaCache::new();
        let order = evaluation_order(&def, &cache).unwrap();
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn test_parse_error_carries_part_and_formula() {
        let mut a = part("a");
        a.x = Some("1 +".to_string());
        let def = definition(vec![a]);

        let cache = FormulaCache::new();
        let err = evaluation_order(&def, &cache).unwrap_err();
        match err {
            Error::Formula { part, formula, .. } => {
                assert_eq!(part, "a".into());
                assert_eq!(formula, "1 +");
            }
            other => panic!("expected Formula error, got {:?}", other),
        }
    }
}
