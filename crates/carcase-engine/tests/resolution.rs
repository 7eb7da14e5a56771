//! End-to-end resolution scenarios: one realistic base-cabinet assembly
//! resolved against concrete cabinets, with overrides and pricing.

use indexmap::IndexMap;
use rust_decimal::Decimal;

use carcase_engine::{
    resolve_project, AssemblyDefinition, AssemblyPartTemplate, CabinetHardwareOverride,
    CabinetInstance, Catalog, ComponentInfo, Error, MaterialInfo, Resolution, ResolutionWarning,
    Resolver, ShapeError, ShapeSegment,
};

fn catalog() -> Catalog {
    let mut catalog = Catalog::default();
    catalog.components.insert(
        "panel_18mm".into(),
        ComponentInfo {
            length: 800.0,
            width: 600.0,
            color: Some("white".to_string()),
            unit_cost: Decimal::new(150, 2),
        },
    );
    catalog.components.insert(
        "hinge_std".into(),
        ComponentInfo {
            length: 0.0,
            width: 0.0,
            color: None,
            unit_cost: Decimal::new(250, 2),
        },
    );
    catalog.components.insert(
        "hinge_soft_close".into(),
        ComponentInfo {
            length: 0.0,
            width: 0.0,
            color: None,
            unit_cost: Decimal::new(680, 2),
        },
    );
    catalog.materials.insert(
        "white_mdf".into(),
        MaterialInfo {
            unit_cost: Decimal::new(1200, 2),
        },
    );
    catalog.materials.insert(
        "oak_veneer".into(),
        MaterialInfo {
            unit_cost: Decimal::new(1990, 2),
        },
    );
    catalog
}

/// A standard base cabinet: two sides, a bottom cut to fit between them,
/// a slab-only door and height-dependent hinges.
fn base_cabinet() -> AssemblyDefinition {
    let mut side_left = AssemblyPartTemplate::new("side_left", "panel_18mm");
    side_left.length_expr = Some("depth".to_string());
    side_left.width_expr = Some("height".to_string());
    side_left.sort_order = 10;

    let mut side_right = AssemblyPartTemplate::new("side_right", "panel_18mm");
    side_right.length_expr = Some("depth".to_string());
    side_right.width_expr = Some("height".to_string());
    side_right.x = Some("width - 18".to_string());
    side_right.sort_order = 20;

    let mut bottom = AssemblyPartTemplate::new("bottom", "panel_18mm");
    bottom.length_expr = Some("depth".to_string());
    bottom.width_expr = Some("width - 36".to_string());
    bottom.x = Some("18".to_string());
    bottom.sort_order = 30;

    let mut door = AssemblyPartTemplate::new("door", "panel_18mm");
    door.condition = Some("facadeType == \"slab\"".to_string());
    door.length_expr = Some("height - 4".to_string());
    door.width_expr = Some("width - 3".to_string());
    door.sort_order = 40;

    let mut hinge = AssemblyPartTemplate::new("hinge", "hinge_std");
    hinge.quantity_formula = Some("ceil(height / 400)".to_string());
    hinge.y = Some("height - 80".to_string());
    hinge.sort_order = 50;

    AssemblyDefinition {
        id: "base_cabinet".into(),
        parts: vec![side_left, side_right, bottom, door, hinge],
    }
}

fn cabinet(id: &str) -> CabinetInstance {
    CabinetInstance {
        id: id.into(),
        assembly_id: "base_cabinet".into(),
        width: 600.0,
        height: 720.0,
        depth: 560.0,
        position_x: 0.0,
        position_y: 0.0,
        position_z: 0.0,
        rotation: 0.0,
        facade_type: "slab".to_string(),
        material_id: "white_mdf".into(),
        params: IndexMap::new(),
    }
}

fn resolve(cabinet: &CabinetInstance, overrides: &[CabinetHardwareOverride]) -> Resolution {
    Resolver::new()
        .resolve(&base_cabinet(), cabinet, overrides, &catalog())
        .unwrap()
}

#[test]
fn resolution_is_deterministic() {
    let cabinet = cabinet("kitchen_1");
    let first = resolve(&cabinet, &[]);
    let second = resolve(&cabinet, &[]);
    assert_eq!(first, second);

    // A fresh resolver (empty parse cache) produces the same result too.
    let third = Resolver::new()
        .resolve(&base_cabinet(), &cabinet, &[], &catalog())
        .unwrap();
    assert_eq!(first, third);
}

#[test]
fn dimension_formulas_use_cabinet_parameters() {
    let resolution = resolve(&cabinet("kitchen_1"), &[]);

    let bottom = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "bottom".into())
        .unwrap();
    assert_eq!(bottom.length, 560.0);
    assert_eq!(bottom.width, 564.0);
    assert_eq!(bottom.x, 18.0);

    let door = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "door".into())
        .unwrap();
    assert!(door.included);
    assert_eq!(door.length, 716.0);
    assert_eq!(door.width, 597.0);
}

#[test]
fn quantity_formula_takes_precedence_over_static_quantity() {
    let mut tall = cabinet("kitchen_1");
    tall.height = 1200.0;
    let resolution = resolve(&tall, &[]);

    let hinge = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "hinge".into())
        .unwrap();
    // ceil(1200 / 400) = 3, even though the static quantity is 1.
    assert_eq!(hinge.quantity, 3);
}

#[test]
fn nan_quantity_fails_resolution() {
    let mut definition = base_cabinet();
    definition.parts[4].quantity_formula = Some("sqrt(0 - 4)".to_string());

    let err = Resolver::new()
        .resolve(&definition, &cabinet("kitchen_1"), &[], &catalog())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NonFiniteQuantity { ref part, value } if *part == "hinge".into() && value.is_nan()
    ));
}

#[test]
fn condition_false_excludes_and_blocks_references() {
    let mut glass_front = cabinet("kitchen_1");
    glass_front.facade_type = "glass".to_string();
    let resolution = resolve(&glass_front, &[]);

    let door = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "door".into())
        .unwrap();
    assert!(!door.included);
    assert_eq!(door.quantity, 0);
    assert_eq!(door.length, 0.0);

    // A part reading the excluded door fails the whole resolution.
    let mut definition = base_cabinet();
    let mut handle = AssemblyPartTemplate::new("handle", "hinge_std");
    handle.y = Some("door.length - 100".to_string());
    definition.parts.push(handle);

    let err = Resolver::new()
        .resolve(&definition, &glass_front, &[], &catalog())
        .unwrap_err();
    assert_eq!(
        err,
        Error::ReferencedExcludedPart {
            part: "handle".into(),
            referenced: "door".into(),
        }
    );
}

#[test]
fn sibling_references_resolve_in_dependency_order() {
    let mut definition = base_cabinet();
    // Declared before its dependency on purpose.
    let mut stretcher = AssemblyPartTemplate::new("stretcher", "panel_18mm");
    stretcher.length_expr = Some("bottom.width".to_string());
    stretcher.width_expr = Some("100".to_string());
    stretcher.sort_order = 5;
    definition.parts.insert(0, stretcher);

    let resolution = Resolver::new()
        .resolve(&definition, &cabinet("kitchen_1"), &[], &catalog())
        .unwrap();
    let stretcher = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "stretcher".into())
        .unwrap();
    assert_eq!(stretcher.length, 564.0);
}

#[test]
fn circular_dependency_reports_the_cycle() {
    let mut a = AssemblyPartTemplate::new("a", "panel_18mm");
    a.width_expr = Some("b.width - 10".to_string());
    let mut b = AssemblyPartTemplate::new("b", "panel_18mm");
    b.width_expr = Some("a.width + 10".to_string());
    let definition = AssemblyDefinition {
        id: "broken".into(),
        parts: vec![a, b],
    };

    let err = Resolver::new()
        .resolve(&definition, &cabinet("kitchen_1"), &[], &catalog())
        .unwrap_err();
    match err {
        Error::CircularDependency(parts) => {
            assert_eq!(parts.len(), 2);
            assert!(parts.contains(&"a".into()));
            assert!(parts.contains(&"b".into()));
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }
}

#[test]
fn price_sums_included_parts_only() {
    let resolution = resolve(&cabinet("kitchen_1"), &[]);
    // 4 panels at 1 x (12.00 + 1.50) plus hinges at 2 x (12.00 + 2.50).
    assert_eq!(resolution.price, Decimal::new(8300, 2));

    let mut glass_front = cabinet("kitchen_1");
    glass_front.facade_type = "glass".to_string();
    let without_door = resolve(&glass_front, &[]);
    assert_eq!(without_door.price, Decimal::new(6950, 2));
}

#[test]
fn disabling_override_removes_part_and_its_price() {
    let mut patch = CabinetHardwareOverride::new("kitchen_1", "hinge");
    patch.is_enabled = false;

    let resolution = resolve(&cabinet("kitchen_1"), &[patch]);
    assert!(resolution
        .parts
        .iter()
        .all(|p| p.part_id != "hinge".into()));
    // Full price minus 2 x (12.00 + 2.50).
    assert_eq!(resolution.price, Decimal::new(5400, 2));
}

#[test]
fn override_substitutions_reprice_the_part() {
    let mut hinge_patch = CabinetHardwareOverride::new("kitchen_1", "hinge");
    hinge_patch.component_id = Some("hinge_soft_close".into());
    let mut door_patch = CabinetHardwareOverride::new("kitchen_1", "door");
    door_patch.material_id = Some("oak_veneer".into());

    let resolution = resolve(&cabinet("kitchen_1"), &[hinge_patch, door_patch]);

    let hinge = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "hinge".into())
        .unwrap();
    assert_eq!(hinge.component_id, "hinge_soft_close".into());
    assert_eq!(hinge.unit_hardware_cost, Decimal::new(680, 2));

    let door = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "door".into())
        .unwrap();
    assert_eq!(door.material_id, "oak_veneer".into());

    // Base 83.00, hinge +2 x 4.30, door +7.90.
    assert_eq!(resolution.price, Decimal::new(9950, 2));
}

#[test]
fn override_formulas_replace_resolved_values() {
    let mut patch = CabinetHardwareOverride::new("kitchen_1", "hinge");
    patch.quantity_formula = Some("ceil(height / 200)".to_string());
    patch.position_y_formula = Some("height / 2".to_string());

    let resolution = resolve(&cabinet("kitchen_1"), &[patch]);
    let hinge = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "hinge".into())
        .unwrap();
    assert_eq!(hinge.quantity, 4);
    assert_eq!(hinge.y, 360.0);
}

#[test]
fn stale_override_warns_without_failing() {
    let patch = CabinetHardwareOverride::new("kitchen_1", "old_shelf");
    let resolution = resolve(&cabinet("kitchen_1"), &[patch]);

    assert_eq!(
        resolution.warnings,
        vec![ResolutionWarning::StaleOverride {
            part_id: "old_shelf".into(),
        }]
    );
    assert_eq!(resolution.parts.len(), 5);
}

#[test]
fn parametrized_shape_resolves_and_must_close() {
    let mut definition = base_cabinet();
    let rectangle = vec![
        ShapeSegment::Line {
            x: "depth".to_string(),
            y: "0".to_string(),
        },
        ShapeSegment::Line {
            x: "depth".to_string(),
            y: "width - 36".to_string(),
        },
        ShapeSegment::Line {
            x: "0".to_string(),
            y: "width - 36".to_string(),
        },
        ShapeSegment::Line {
            x: "0".to_string(),
            y: "0".to_string(),
        },
    ];
    definition.parts[2].shape = rectangle.clone();

    let resolution = Resolver::new()
        .resolve(&definition, &cabinet("kitchen_1"), &[], &catalog())
        .unwrap();
    let bottom = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "bottom".into())
        .unwrap();
    assert_eq!(bottom.outline.len(), 5);
    assert_eq!(bottom.outline[2].x, 560.0);
    assert_eq!(bottom.outline[2].y, 564.0);

    // Dropping the closing segment fails the resolution.
    definition.parts[2].shape = rectangle[..3].to_vec();
    let err = Resolver::new()
        .resolve(&definition, &cabinet("kitchen_1"), &[], &catalog())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Shape {
            source: ShapeError::NotClosed { .. },
            ..
        }
    ));
}

#[test]
fn project_resolution_is_per_cabinet() {
    let mut definitions = IndexMap::new();
    definitions.insert("base_cabinet".into(), base_cabinet());

    let mut orphan = cabinet("kitchen_3");
    orphan.assembly_id = "wall_cabinet".into();
    let cabinets = vec![cabinet("kitchen_1"), cabinet("kitchen_2"), orphan];

    let resolver = Resolver::new();
    let results = resolve_project(&resolver, &definitions, &cabinets, &[], &catalog());

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, "kitchen_1".into());
    assert_eq!(results[1].0, "kitchen_2".into());
    assert!(results[0].1.is_ok());
    assert_eq!(
        results[0].1.as_ref().unwrap(),
        results[1].1.as_ref().unwrap()
    );
    assert_eq!(
        results[2].1,
        Err(Error::UnknownAssembly {
            cabinet: "kitchen_3".into(),
            assembly: "wall_cabinet".into(),
        })
    );
}

#[test]
fn cabinet_params_are_visible_to_formulas() {
    let mut definition = base_cabinet();
    let mut plinth = AssemblyPartTemplate::new("plinth", "panel_18mm");
    plinth.width_expr = Some("plinthHeight".to_string());
    plinth.sort_order = 60;
    definition.parts.push(plinth);

    let mut cabinet = cabinet("kitchen_1");
    cabinet.params.insert(
        "plinthHeight".to_string(),
        carcase_engine::ScopeValue::Number(100.0),
    );

    let resolution = Resolver::new()
        .resolve(&definition, &cabinet, &[], &catalog())
        .unwrap();
    let plinth = resolution
        .parts
        .iter()
        .find(|p| p.part_id == "plinth".into())
        .unwrap();
    assert_eq!(plinth.width, 100.0);
}
