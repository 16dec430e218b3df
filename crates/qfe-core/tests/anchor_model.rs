//! Integration tests: anchors through the `DesignModel` contract.
//!
//! Exercises `SceneModel` end to end: anchor writes, cycle rejection,
//! resolved instance geometry and transaction bookkeeping.

use pretty_assertions::assert_eq;
use qfe_core::model::ModelNode;
use qfe_core::{
    AnchorLineKind, AnchorTarget, DesignModel, ModelError, ModelNotification, NodeId,
    PropertyValue, Rect, SceneModel, TransactionStats,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Root 400×300 with three 50×50 siblings in a row.
fn three_in_a_row(prefix: &str) -> (SceneModel, NodeId, NodeId, NodeId) {
    init_logging();
    let mut model = SceneModel::new(&format!("{prefix}_root"), "Item", 400.0, 300.0);
    let root = model.root();
    let mut add = |name: &str, x: f64| {
        model
            .add_node(
                root,
                ModelNode::new(NodeId::intern(&format!("{prefix}_{name}")), "Rectangle")
                    .with_geometry(x, 0.0, 50.0, 50.0),
            )
            .unwrap()
    };
    let a = add("a", 0.0);
    let b = add("b", 60.0);
    let c = add("c", 120.0);
    model.take_notifications();
    (model, a, b, c)
}

fn target(node: NodeId, line: AnchorLineKind) -> AnchorTarget {
    AnchorTarget { node, line }
}

// ─── Cycle rejection ────────────────────────────────────────────────────

#[test]
fn transitive_anchor_cycle_is_rejected_without_side_effects() {
    let (mut model, a, b, c) = three_in_a_row("cycle");
    // c → b → a
    model
        .set_anchor(b, AnchorLineKind::Left, target(a, AnchorLineKind::Right))
        .unwrap();
    model
        .set_anchor(c, AnchorLineKind::Left, target(b, AnchorLineKind::Right))
        .unwrap();
    model.set_margin(b, AnchorLineKind::Left, 10.0);

    let before: Vec<_> = AnchorLineKind::ALL
        .iter()
        .map(|l| model.instance_anchor(a, *l))
        .collect();

    assert!(model.check_for_cycle(a, AnchorLineKind::Right, c));
    let err = model
        .set_anchor(a, AnchorLineKind::Right, target(c, AnchorLineKind::Left))
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::AnchorCycle {
            node: a,
            line: AnchorLineKind::Right
        }
    );

    let after: Vec<_> = AnchorLineKind::ALL
        .iter()
        .map(|l| model.instance_anchor(a, *l))
        .collect();
    assert_eq!(before, after);
    assert!(!model.has_anchors(a));
}

#[test]
fn anchoring_to_self_or_descendant_is_a_cycle() {
    let (mut model, a, _, _) = three_in_a_row("self");
    let inner = model
        .add_node(
            a,
            ModelNode::new(NodeId::intern("self_inner"), "Text").with_geometry(0.0, 0.0, 10.0, 10.0),
        )
        .unwrap();
    assert!(model.check_for_cycle(a, AnchorLineKind::Top, a));
    assert!(model.check_for_cycle(a, AnchorLineKind::Top, inner));
    assert!(!model.can_anchor(a, a));
    assert!(!model.can_anchor(a, inner));
}

// ─── Resolved geometry ──────────────────────────────────────────────────

#[test]
fn sibling_chain_resolves_through_margins() {
    let (mut model, a, b, c) = three_in_a_row("chain");
    model
        .set_anchor(b, AnchorLineKind::Left, target(a, AnchorLineKind::Right))
        .unwrap();
    model.set_margin(b, AnchorLineKind::Left, 20.0);
    model
        .set_anchor(c, AnchorLineKind::Left, target(b, AnchorLineKind::Right))
        .unwrap();

    assert_eq!(model.instance_value(b, "x"), Some(PropertyValue::Number(70.0)));
    assert_eq!(model.instance_value(c, "x"), Some(PropertyValue::Number(120.0)));

    // Moving the head of the chain drags the rest along.
    model.take_notifications();
    model.set_variant_property(a, "x", 30.0.into());
    let info = model.instance_info(c).unwrap();
    assert_eq!(info.scene_bounding_rect(), Rect::new(150.0, 0.0, 200.0, 50.0));

    let notes = model.take_notifications();
    let changed = notes.iter().find_map(|n| match n {
        ModelNotification::InstanceInformationsChanged(nodes) => Some(nodes.clone()),
        _ => None,
    });
    assert_eq!(changed, Some(vec![a, b, c]));
}

#[test]
fn nested_items_compose_scene_transforms() {
    let (mut model, a, _, _) = three_in_a_row("nested");
    model.set_variant_property(a, "x", 100.0.into());
    model.set_variant_property(a, "y", 40.0.into());
    let inner = model
        .add_node(
            a,
            ModelNode::new(NodeId::intern("nested_inner"), "Rectangle")
                .with_geometry(5.0, 5.0, 10.0, 10.0),
        )
        .unwrap();
    let info = model.instance_info(inner).unwrap();
    assert_eq!(info.scene_bounding_rect(), Rect::new(105.0, 45.0, 115.0, 55.0));
    assert_eq!(info.parent, Some(a));
}

// ─── Transactions ───────────────────────────────────────────────────────

#[test]
fn nested_transactions_record_one_step() {
    let (mut model, a, b, _) = three_in_a_row("tx");
    let outer = model.begin_transaction("move");
    let inner = model.begin_transaction("anchor");
    model
        .set_anchor(b, AnchorLineKind::Left, target(a, AnchorLineKind::Right))
        .unwrap();
    model.commit(inner).unwrap();
    assert!(model.in_transaction());
    model.commit(outer).unwrap();
    assert!(!model.in_transaction());

    assert_eq!(
        model.transaction_stats(),
        TransactionStats {
            begun: 1,
            committed: 1
        }
    );
    assert_eq!(model.undo().as_deref(), Some("move"));
    assert!(!model.has_anchor(b, AnchorLineKind::Left));
    assert_eq!(model.commit(outer), Err(ModelError::NoOpenTransaction));
}

#[test]
fn undo_of_creation_reports_removed_node() {
    let (mut model, _, _, _) = three_in_a_row("undo_create");
    let root = model.root();
    let tx = model.begin_transaction("create");
    let created = model
        .create_node("QtQuick.Rectangle", root, vec![("width".into(), 20.0.into())])
        .unwrap();
    model.commit(tx).unwrap();
    model.set_selected_nodes(vec![created]);
    model.take_notifications();

    model.undo();
    assert!(!model.is_valid(created));
    assert!(model.selected_nodes().is_empty());
    let notes = model.take_notifications();
    assert!(notes.contains(&ModelNotification::NodeRemoved {
        node: created,
        parent: Some(root)
    }));
}
