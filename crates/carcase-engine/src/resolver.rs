//! Assembly resolution.
//!
//! Turns one assembly definition plus one cabinet's parameters into the
//! concrete part list, applies per-cabinet hardware overrides, and prices
//! the result. Resolution is a pure function of its inputs: the same
//! definition, cabinet, overrides and catalog always produce the same
//! [`Resolution`].

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, instrument};

use carcase_formula::{FormulaCache, Scope, Value};

use crate::context::{eval_boolean, eval_number, eval_number_or};
use crate::error::{Error, Result};
use crate::graph;
use crate::overrides;
use crate::pricing;
use crate::shape;
use crate::types::{
    AssemblyDefinition, AssemblyPartTemplate, CabinetHardwareOverride, CabinetInstance, Catalog,
    PartId, Point, Resolution, ResolvedPart,
};

/// A resolved part annotated with the bookkeeping the override merger and
/// output ordering need. Internal to the engine.
pub(crate) struct RawPart {
    /// Index into the definition's part list.
    pub(crate) decl_index: usize,
    pub(crate) sort_order: i32,
    /// Number of sibling-result entries visible when this part evaluated.
    /// Taking that prefix of the sibling layer reconstructs the exact
    /// scope the part's own formulas saw.
    pub(crate) sibling_prefix: usize,
    /// Whether length/width fell back to the component's intrinsic size,
    /// so component substitution knows to re-apply the new default.
    pub(crate) length_defaulted: bool,
    pub(crate) width_defaulted: bool,
    pub(crate) part: ResolvedPart,
}

/// The resolution engine. Holds the shared formula parse cache; reusable
/// across calls and safe to share across threads.
#[derive(Debug, Default)]
pub struct Resolver {
    cache: FormulaCache,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            cache: FormulaCache::new(),
        }
    }

    pub fn cache(&self) -> &FormulaCache {
        &self.cache
    }

    /// Resolve one cabinet against its assembly definition.
    ///
    /// Parts evaluate in dependency order; the returned list is sorted by
    /// `sort_order` ascending, then declaration order, independent of the
    /// evaluation order. Any error aborts the whole resolution.
    #[instrument(skip_all, fields(cabinet = %cabinet.id, assembly = %definition.id))]
    pub fn resolve(
        &self,
        definition: &AssemblyDefinition,
        cabinet: &CabinetInstance,
        hardware_overrides: &[CabinetHardwareOverride],
        catalog: &Catalog,
    ) -> Result<Resolution> {
        let order = graph::evaluation_order(definition, &self.cache)?;

        let base = Scope::new(cabinet.scope_vars());
        let mut siblings: IndexMap<String, Value> = IndexMap::new();
        let mut excluded: IndexSet<PartId> = IndexSet::new();
        let mut raw: Vec<RawPart> = Vec::with_capacity(order.len());

        for decl_index in order {
            let template = &definition.parts[decl_index];
            self.check_excluded_references(template, &excluded)?;

            let sibling_prefix = siblings.len();
            let scope = base.child(siblings.clone());
            let entry = self.resolve_part(template, cabinet, catalog, &scope, decl_index)?;

            if entry.part.included {
                publish_sibling_results(&mut siblings, &entry.part);
            } else {
                excluded.insert(template.id.clone());
            }
            raw.push(RawPart {
                sibling_prefix,
                ..entry
            });
        }

        let warnings = overrides::apply(
            cabinet,
            hardware_overrides,
            catalog,
            &self.cache,
            &base,
            &siblings,
            &mut raw,
        )?;

        raw.sort_by_key(|r| (r.sort_order, r.decl_index));
        let parts: Vec<ResolvedPart> = raw.into_iter().map(|r| r.part).collect();
        let price = pricing::total_price(&parts);
        debug!(parts = parts.len(), %price, warnings = warnings.len(), "cabinet resolved");

        Ok(Resolution {
            parts,
            price,
            warnings,
        })
    }

    /// Reject any formula that reads a sibling whose condition excluded it.
    ///
    /// Checked before evaluating anything of this part, so the error fires
    /// even when the reference sits in a branch evaluation would skip.
    fn check_excluded_references(
        &self,
        template: &AssemblyPartTemplate,
        excluded: &IndexSet<PartId>,
    ) -> Result<()> {
        for formula in template.formulas() {
            let expr = self
                .cache
                .parse_cached(formula)
                .map_err(|source| Error::Formula {
                    part: template.id.clone(),
                    formula: formula.to_string(),
                    source,
                })?;
            for ident in expr.free_idents() {
                let Some((tag, _attr)) = ident.split_once('.') else {
                    continue;
                };
                if let Some(referenced) = excluded.get(&PartId(tag.to_string())) {
                    return Err(Error::ReferencedExcludedPart {
                        part: template.id.clone(),
                        referenced: referenced.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn resolve_part(
        &self,
        template: &AssemblyPartTemplate,
        cabinet: &CabinetInstance,
        catalog: &Catalog,
        scope: &Scope<'_>,
        decl_index: usize,
    ) -> Result<RawPart> {
        let part_id = &template.id;
        let component = catalog
            .components
            .get(&template.component_id)
            .ok_or_else(|| Error::UnknownComponent {
                part: part_id.clone(),
                component: template.component_id.clone(),
            })?;
        let material = catalog
            .materials
            .get(&cabinet.material_id)
            .ok_or_else(|| Error::UnknownMaterial {
                part: part_id.clone(),
                material: cabinet.material_id.clone(),
            })?;

        let included = match template.condition.as_deref() {
            Some(condition) => eval_boolean(part_id, condition, scope, &self.cache)?,
            None => true,
        };
        if !included {
            // Placeholder: the part stays visible in the output but carries
            // no geometry, quantity or price.
            return Ok(RawPart {
                decl_index,
                sort_order: template.sort_order,
                sibling_prefix: 0,
                length_defaulted: false,
                width_defaulted: false,
                part: ResolvedPart {
                    part_id: part_id.clone(),
                    component_id: template.component_id.clone(),
                    material_id: cabinet.material_id.clone(),
                    length: 0.0,
                    width: 0.0,
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    rotation_x: template.rotation_x,
                    rotation_y: template.rotation_y,
                    rotation_z: template.rotation_z,
                    included: false,
                    quantity: 0,
                    outline: vec![Point::new(0.0, 0.0)],
                    unit_material_cost: material.unit_cost,
                    unit_hardware_cost: component.unit_cost,
                },
            });
        }

        let length = eval_number_or(
            part_id,
            template.length_expr.as_deref(),
            component.length,
            scope,
            &self.cache,
        )?;
        let width = eval_number_or(
            part_id,
            template.width_expr.as_deref(),
            component.width,
            scope,
            &self.cache,
        )?;
        let x = eval_number_or(part_id, template.x.as_deref(), 0.0, scope, &self.cache)?;
        let y = eval_number_or(part_id, template.y.as_deref(), 0.0, scope, &self.cache)?;
        let z = eval_number_or(part_id, template.z.as_deref(), 0.0, scope, &self.cache)?;

        let quantity = match template.quantity_formula.as_deref() {
            Some(formula) => {
                let value = eval_number(part_id, formula, scope, &self.cache)?;
                quantize(part_id, value)?
            }
            None => template.quantity,
        };

        let outline = shape::build_outline(part_id, &template.shape, scope, &self.cache)?;

        Ok(RawPart {
            decl_index,
            sort_order: template.sort_order,
            sibling_prefix: 0,
            length_defaulted: template.length_expr.is_none(),
            width_defaulted: template.width_expr.is_none(),
            part: ResolvedPart {
                part_id: part_id.clone(),
                component_id: template.component_id.clone(),
                material_id: cabinet.material_id.clone(),
                length,
                width,
                x,
                y,
                z,
                rotation_x: template.rotation_x,
                rotation_y: template.rotation_y,
                rotation_z: template.rotation_z,
                included: true,
                quantity,
                outline,
                unit_material_cost: material.unit_cost,
                unit_hardware_cost: component.unit_cost,
            },
        })
    }
}

/// Round a quantity formula result to the nearest whole count.
///
/// NaN and infinities are rejected before the check: an `as u32` cast
/// would saturate them to 0 or `u32::MAX` instead of failing.
pub(crate) fn quantize(part: &PartId, value: f64) -> Result<u32> {
    if !value.is_finite() {
        return Err(Error::NonFiniteQuantity {
            part: part.clone(),
            value,
        });
    }
    let rounded = value.round();
    if rounded < 0.0 {
        return Err(Error::NegativeQuantity {
            part: part.clone(),
            quantity: rounded as i64,
        });
    }
    Ok(rounded as u32)
}

/// Expose one resolved part's results to later-evaluating siblings.
fn publish_sibling_results(siblings: &mut IndexMap<String, Value>, part: &ResolvedPart) {
    let id = &part.part_id;
    siblings.insert(format!("{id}.length"), Value::Number(part.length));
    siblings.insert(format!("{id}.width"), Value::Number(part.width));
    siblings.insert(format!("{id}.x"), Value::Number(part.x));
    siblings.insert(format!("{id}.y"), Value::Number(part.y));
    siblings.insert(format!("{id}.z"), Value::Number(part.z));
    siblings.insert(format!("{id}.quantity"), Value::Number(part.quantity as f64));
}
