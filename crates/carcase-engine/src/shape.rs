//! Outline construction from parametrized shape segments.
//!
//! A part's custom footprint is an ordered segment list walked from an
//! implicit origin. Line segments append one vertex; arc segments are
//! flattened into a short polyline at a fixed angular step. The outline
//! must return to the origin within a small tolerance; a gap is reported,
//! never snapped.

use carcase_formula::{FormulaCache, Scope};

use crate::context::eval_number;
use crate::error::{Error, Result, ShapeError};
use crate::types::{PartId, Point, ShapeSegment};

/// Absolute closure tolerance, in the drawing's unit.
pub const CLOSE_TOLERANCE: f64 = 1e-3;

/// Fixed angular step for arc flattening, in degrees.
const ARC_STEP_DEG: f64 = 5.0;

/// Build a closed outline from a part's segment list.
///
/// An empty segment list yields the degenerate single-point outline at
/// the origin, used by parts whose footprint is implied by length x width.
pub fn build_outline(
    part: &PartId,
    segments: &[ShapeSegment],
    scope: &Scope,
    cache: &FormulaCache,
) -> Result<Vec<Point>> {
    let start = Point::new(0.0, 0.0);
    let mut outline = vec![start];

    if segments.is_empty() {
        return Ok(outline);
    }

    for (index, segment) in segments.iter().enumerate() {
        let current = *outline.last().unwrap_or(&start);
        match segment {
            ShapeSegment::Line { x, y } => {
                let x = eval_number(part, x, scope, cache)?;
                let y = eval_number(part, y, scope, cache)?;
                outline.push(Point::new(x, y));
            }
            ShapeSegment::Arc {
                x,
                y,
                radius,
                clockwise,
            } => {
                let x = eval_number(part, x, scope, cache)?;
                let y = eval_number(part, y, scope, cache)?;
                let radius = eval_number(part, radius, scope, cache)?;
                flatten_arc(
                    part,
                    index,
                    current,
                    Point::new(x, y),
                    radius,
                    *clockwise,
                    &mut outline,
                )?;
            }
        }
    }

    let last = outline[outline.len() - 1];
    let gap = last.distance(&start);
    if gap > CLOSE_TOLERANCE {
        return Err(Error::Shape {
            part: part.clone(),
            source: ShapeError::NotClosed { gap },
        });
    }

    Ok(outline)
}

/// Flatten the minor arc from `from` to `to` into `outline`.
///
/// The arc's center is derived from the chord, the radius and the sweep
/// direction; the exact endpoint is always appended last so flattening
/// error never accumulates into the closure check.
fn flatten_arc(
    part: &PartId,
    index: usize,
    from: Point,
    to: Point,
    radius: f64,
    clockwise: bool,
    outline: &mut Vec<Point>,
) -> Result<()> {
    let invalid = |message: String| Error::Shape {
        part: part.clone(),
        source: ShapeError::InvalidSegment { index, message },
    };

    if radius <= 0.0 {
        return Err(invalid(format!("arc radius must be positive, got {}", radius)));
    }

    let chord = from.distance(&to);
    if chord == 0.0 {
        return Err(invalid("arc endpoints coincide".to_string()));
    }
    if chord > 2.0 * radius {
        return Err(invalid(format!(
            "arc radius {} too small for chord of length {}",
            radius, chord
        )));
    }

    // Center of the minor arc: offset from the chord midpoint along the
    // chord normal. Sweeping counterclockwise keeps the center on the
    // left of the travel direction, clockwise on the right.
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let half = (radius * radius - (chord / 2.0) * (chord / 2.0)).max(0.0);
    let offset = half.sqrt();
    let ux = (to.x - from.x) / chord;
    let uy = (to.y - from.y) / chord;
    // Left normal of the chord direction.
    let (nx, ny) = (-uy, ux);
    let center = if clockwise {
        Point::new(mid.x - nx * offset, mid.y - ny * offset)
    } else {
        Point::new(mid.x + nx * offset, mid.y + ny * offset)
    };

    let start_angle = (from.y - center.y).atan2(from.x - center.x);
    let end_angle = (to.y - center.y).atan2(to.x - center.x);

    // Sweep in the requested direction, normalized to (0, 2*pi).
    let tau = std::f64::consts::TAU;
    let sweep = if clockwise {
        (start_angle - end_angle).rem_euclid(tau)
    } else {
        (end_angle - start_angle).rem_euclid(tau)
    };

    let step = ARC_STEP_DEG.to_radians();
    let steps = (sweep / step).ceil() as usize;

    for i in 1..steps {
        let angle = if clockwise {
            start_angle - step * i as f64
        } else {
            start_angle + step * i as f64
        };
        outline.push(Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }
    outline.push(to);

    Ok(())
}
