//! Price aggregation.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::ResolvedPart;

/// Total price of a resolved part list.
///
/// Sum of quantity times unit material cost plus quantity times unit
/// hardware cost over included parts. Accumulation stays exact in
/// [`Decimal`]; only the final total is rounded, to 2 decimal places with
/// midpoints away from zero.
pub fn total_price(parts: &[ResolvedPart]) -> Decimal {
    let total: Decimal = parts
        .iter()
        .filter(|part| part.included)
        .map(|part| {
            let quantity = Decimal::from(part.quantity);
            quantity * (part.unit_material_cost + part.unit_hardware_cost)
        })
        .sum();
    total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
