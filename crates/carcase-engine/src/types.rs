//! Engine data model.
//!
//! Inputs (templates, cabinet instances, overrides, catalog) are owned by
//! external collaborators and consumed read-only; [`ResolvedPart`] and
//! [`Resolution`] are produced fresh on every call and never persisted by
//! the engine itself.

use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use carcase_formula::Value;

/// Unique identifier for an assembly part template.
///
/// Doubles as the tag other parts use in formulas: a part with id
/// `side_left` is referenced as `side_left.width`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub String);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a reusable component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub String);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub String);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a cabinet instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CabinetId(pub String);

impl fmt::Display for CabinetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CabinetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an assembly definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssemblyId(pub String);

impl fmt::Display for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssemblyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A reusable cabinet-part recipe: an ordered list of part templates.
///
/// Part order is declaration order; it breaks evaluation-order ties
/// together with `sort_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyDefinition {
    pub id: AssemblyId,
    pub parts: Vec<AssemblyPartTemplate>,
}

/// One formula-parametrized sub-component of an assembly.
///
/// Formula fields hold plain expression text; `None` means "use the
/// default" (component intrinsic size for dimensions, 0 for positions,
/// always-included for the condition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyPartTemplate {
    pub id: PartId,
    pub component_id: ComponentId,
    pub length_expr: Option<String>,
    pub width_expr: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    /// Boolean inclusion formula; absent = always included.
    pub condition: Option<String>,
    /// Custom footprint outline; empty = implied by length x width.
    pub shape: Vec<ShapeSegment>,
    /// Static quantity, overridden by `quantity_formula` when present.
    pub quantity: u32,
    pub quantity_formula: Option<String>,
    /// Output ordering and evaluation tie-break, ascending.
    pub sort_order: i32,
}

impl AssemblyPartTemplate {
    /// A template with defaults: intrinsic size, origin position,
    /// quantity 1, always included.
    pub fn new(id: impl Into<PartId>, component_id: impl Into<ComponentId>) -> Self {
        Self {
            id: id.into(),
            component_id: component_id.into(),
            length_expr: None,
            width_expr: None,
            x: None,
            y: None,
            z: None,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            condition: None,
            shape: Vec::new(),
            quantity: 1,
            quantity_formula: None,
            sort_order: 0,
        }
    }

    /// All formula strings attached to this template, for dependency
    /// inspection.
    pub(crate) fn formulas(&self) -> impl Iterator<Item = &str> {
        self.length_expr
            .as_deref()
            .into_iter()
            .chain(self.width_expr.as_deref())
            .chain(self.x.as_deref())
            .chain(self.y.as_deref())
            .chain(self.z.as_deref())
            .chain(self.condition.as_deref())
            .chain(self.quantity_formula.as_deref())
            .chain(self.shape.iter().flat_map(|seg| seg.formulas()))
    }
}

/// One outline drawing primitive. All coordinate and radius fields are
/// formula strings evaluated against the part's scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeSegment {
    /// Straight segment to `(x, y)`.
    Line { x: String, y: String },
    /// Circular arc to `(x, y)` with the given radius, flattened to a
    /// polyline. The minor arc is taken; `clockwise` picks the side.
    Arc {
        x: String,
        y: String,
        radius: String,
        clockwise: bool,
    },
}

impl ShapeSegment {
    pub(crate) fn formulas(&self) -> impl Iterator<Item = &str> {
        match self {
            ShapeSegment::Line { x, y } => vec![x.as_str(), y.as_str()],
            ShapeSegment::Arc { x, y, radius, .. } => {
                vec![x.as_str(), y.as_str(), radius.as_str()]
            }
        }
        .into_iter()
    }
}

/// A 2-D outline point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The concrete cabinet being resolved. Owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetInstance {
    pub id: CabinetId,
    pub assembly_id: AssemblyId,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub rotation: f64,
    pub facade_type: String,
    pub material_id: MaterialId,
    /// Additional constants (module-type derived, user parameters)
    /// exposed to formulas by name.
    pub params: IndexMap<String, ScopeValue>,
}

impl CabinetInstance {
    /// Build the base variable scope for this cabinet's formulas.
    pub fn scope_vars(&self) -> IndexMap<String, Value> {
        let mut vars: IndexMap<String, Value> = IndexMap::new();
        vars.insert("width".to_string(), Value::Number(self.width));
        vars.insert("height".to_string(), Value::Number(self.height));
        vars.insert("depth".to_string(), Value::Number(self.depth));
        vars.insert("positionX".to_string(), Value::Number(self.position_x));
        vars.insert("positionY".to_string(), Value::Number(self.position_y));
        vars.insert("positionZ".to_string(), Value::Number(self.position_z));
        vars.insert("rotation".to_string(), Value::Number(self.rotation));
        vars.insert(
            "facadeType".to_string(),
            Value::Text(self.facade_type.clone()),
        );
        for (name, value) in &self.params {
            vars.insert(name.clone(), value.clone().into());
        }
        vars
    }
}

/// Serializable counterpart of a formula [`Value`], used for cabinet
/// parameters supplied over the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl From<ScopeValue> for Value {
    fn from(v: ScopeValue) -> Self {
        match v {
            ScopeValue::Number(n) => Value::Number(n),
            ScopeValue::Boolean(b) => Value::Boolean(b),
            ScopeValue::Text(s) => Value::Text(s),
        }
    }
}

/// A per-cabinet exception to a part template's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetHardwareOverride {
    pub cabinet_id: CabinetId,
    pub part_id: PartId,
    /// Substitute component; `None` keeps the template's.
    pub component_id: Option<ComponentId>,
    /// Free-form role tag (hinge, slide, handle...).
    pub role: Option<String>,
    pub quantity_formula: Option<String>,
    pub position_x_formula: Option<String>,
    pub position_y_formula: Option<String>,
    pub position_z_formula: Option<String>,
    /// Substitute material; `None` keeps the cabinet's.
    pub material_id: Option<MaterialId>,
    /// `false` removes the part instance entirely.
    pub is_enabled: bool,
}

impl CabinetHardwareOverride {
    pub fn new(cabinet_id: impl Into<CabinetId>, part_id: impl Into<PartId>) -> Self {
        Self {
            cabinet_id: cabinet_id.into(),
            part_id: part_id.into(),
            component_id: None,
            role: None,
            quantity_formula: None,
            position_x_formula: None,
            position_y_formula: None,
            position_z_formula: None,
            material_id: None,
            is_enabled: true,
        }
    }
}

/// Catalog lookups supplied by the Modules/Materials collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub components: IndexMap<ComponentId, ComponentInfo>,
    pub materials: IndexMap<MaterialId, MaterialInfo>,
}

/// Intrinsic data for a reusable component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Intrinsic length, the default when a part has no `length_expr`.
    pub length: f64,
    /// Intrinsic width, the default when a part has no `width_expr`.
    pub width: f64,
    pub color: Option<String>,
    /// Unit hardware cost.
    pub unit_cost: Decimal,
}

/// Pricing data for a material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// Unit material cost.
    pub unit_cost: Decimal,
}

/// The concrete, numeric outcome of evaluating one part template against
/// one cabinet's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPart {
    pub part_id: PartId,
    pub component_id: ComponentId,
    pub material_id: MaterialId,
    pub length: f64,
    pub width: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    /// `false` when the part's condition evaluated false; such parts are
    /// placeholders with zero dimensions and quantity.
    pub included: bool,
    pub quantity: u32,
    /// Closed 2-D outline; a single point for parts whose footprint is
    /// implied by length x width.
    pub outline: Vec<Point>,
    pub unit_material_cost: Decimal,
    pub unit_hardware_cost: Decimal,
}

/// Non-fatal findings surfaced alongside a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolutionWarning {
    /// An override references a part id that no longer exists in the
    /// template, typically because the template was edited after the
    /// override was authored.
    StaleOverride { part_id: PartId },
}

/// Result of resolving one cabinet: the merged part list, the computed
/// price, and any non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Parts ordered by `sort_order` ascending, then declaration order.
    pub parts: Vec<ResolvedPart>,
    /// Total price, rounded to 2 decimal places.
    pub price: Decimal,
    pub warnings: Vec<ResolutionWarning>,
}
