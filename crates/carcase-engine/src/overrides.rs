//! Per-cabinet hardware override merging.
//!
//! Overrides patch the raw resolution of a single cabinet: they disable
//! parts, substitute components or materials, and replace quantity or
//! position values. They apply after every part has resolved and before
//! pricing, so an override never feeds back into sibling formulas.

use indexmap::IndexMap;
use tracing::debug;

use carcase_formula::{FormulaCache, Scope, Value};

use crate::context::eval_number;
use crate::error::{Error, Result};
use crate::resolver::{quantize, RawPart};
use crate::types::{CabinetHardwareOverride, CabinetInstance, Catalog, ResolutionWarning};

/// Apply a cabinet's overrides to its raw resolution, in list order.
///
/// Overrides for other cabinets are skipped. An override whose part id
/// matches nothing in the definition is recorded as a
/// [`ResolutionWarning::StaleOverride`] rather than failing the
/// resolution, so an edited template does not brick existing cabinets.
pub(crate) fn apply(
    cabinet: &CabinetInstance,
    overrides: &[CabinetHardwareOverride],
    catalog: &Catalog,
    cache: &FormulaCache,
    base: &Scope<'_>,
    siblings: &IndexMap<String, Value>,
    raw: &mut Vec<RawPart>,
) -> Result<Vec<ResolutionWarning>> {
    let mut warnings = Vec::new();

    for patch in overrides {
        if patch.cabinet_id != cabinet.id {
            continue;
        }

        let Some(position) = raw.iter().position(|r| r.part.part_id == patch.part_id) else {
            debug!(part = %patch.part_id, "override references no resolved part");
            warnings.push(ResolutionWarning::StaleOverride {
                part_id: patch.part_id.clone(),
            });
            continue;
        };

        if !patch.is_enabled {
            raw.remove(position);
            continue;
        }

        let entry = &mut raw[position];
        if !entry.part.included {
            // Nothing to patch on a placeholder; geometry and quantity are
            // already zeroed and it never prices.
            continue;
        }

        if let Some(component_id) = &patch.component_id {
            let component =
                catalog
                    .components
                    .get(component_id)
                    .ok_or_else(|| Error::UnknownComponent {
                        part: entry.part.part_id.clone(),
                        component: component_id.clone(),
                    })?;
            entry.part.component_id = component_id.clone();
            entry.part.unit_hardware_cost = component.unit_cost;
            if entry.length_defaulted {
                entry.part.length = component.length;
            }
            if entry.width_defaulted {
                entry.part.width = component.width;
            }
        }

        if let Some(material_id) = &patch.material_id {
            let material =
                catalog
                    .materials
                    .get(material_id)
                    .ok_or_else(|| Error::UnknownMaterial {
                        part: entry.part.part_id.clone(),
                        material: material_id.clone(),
                    })?;
            entry.part.material_id = material_id.clone();
            entry.part.unit_material_cost = material.unit_cost;
        }

        if patch.quantity_formula.is_none()
            && patch.position_x_formula.is_none()
            && patch.position_y_formula.is_none()
            && patch.position_z_formula.is_none()
        {
            continue;
        }

        // Override formulas see exactly the scope the part's own formulas
        // saw: the cabinet layer plus the sibling results that existed
        // when the part evaluated.
        let visible: IndexMap<String, Value> = siblings
            .iter()
            .take(entry.sibling_prefix)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let scope = base.child(visible);
        let part_id = entry.part.part_id.clone();

        if let Some(formula) = patch.quantity_formula.as_deref() {
            let value = eval_number(&part_id, formula, &scope, cache)?;
            entry.part.quantity = quantize(&part_id, value)?;
        }
        if let Some(formula) = patch.position_x_formula.as_deref() {
            entry.part.x = eval_number(&part_id, formula, &scope, cache)?;
        }
        if let Some(formula) = patch.position_y_formula.as_deref() {
            entry.part.y = eval_number(&part_id, formula, &scope, cache)?;
        }
        if let Some(formula) = patch.position_z_formula.as_deref() {
            entry.part.z = eval_number(&part_id, formula, &scope, cache)?;
        }
    }

    Ok(warnings)
}
