//! Integration tests: full gestures through `FormEditorView`.
//!
//! Every test drives the editor with input events only and checks the model
//! afterwards: geometry, anchors, transactions and the current tool.

use pretty_assertions::assert_eq;
use qfe_core::model::ModelNode;
use qfe_core::{
    AnchorLineKind, AnchorTarget, DesignModel, NodeId, PropertyValue, SceneModel,
    TransactionStats,
};
use qfe_editor::input::DialogResult;
use qfe_editor::{
    DragPayload, EditorConfig, FormEditorView, InputEvent, Key, Modifiers, OverlayItem, ToolKind,
    ToolRequest,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Root 400×300 with one 50×50 rectangle at (100, 100).
fn single(
    prefix: &str,
    configure: impl FnOnce(&mut SceneModel, NodeId),
) -> (FormEditorView<SceneModel>, NodeId) {
    init_logging();
    let mut model = SceneModel::new(&format!("{prefix}_root"), "Item", 400.0, 300.0);
    let root = model.root();
    let a = model
        .add_node(
            root,
            ModelNode::new(NodeId::intern(&format!("{prefix}_a")), "Rectangle")
                .with_geometry(100.0, 100.0, 50.0, 50.0),
        )
        .unwrap();
    configure(&mut model, a);
    let view = FormEditorView::new(model, EditorConfig::default()).unwrap();
    (view, a)
}

fn number(view: &FormEditorView<SceneModel>, node: NodeId, name: &str) -> f64 {
    view.model()
        .instance_value(node, name)
        .and_then(|v| v.as_f64())
        .unwrap_or(f64::NAN)
}

fn ctrl(event: InputEvent) -> InputEvent {
    event.with_modifiers(Modifiers::ctrl())
}

fn click(view: &mut FormEditorView<SceneModel>, x: f64, y: f64) {
    view.handle_event(&InputEvent::pointer_down(x, y, 0));
    view.handle_event(&InputEvent::pointer_up(x, y, 10));
}

/// A 50×50 sibling of the root's first item.
fn add_sibling(model: &mut SceneModel, id: &str, x: f64, y: f64) -> NodeId {
    let root = model.root();
    model
        .add_node(
            root,
            ModelNode::new(NodeId::intern(id), "Rectangle").with_geometry(x, y, 50.0, 50.0),
        )
        .unwrap()
}

fn anchor_to(model: &mut SceneModel, node: NodeId, line: AnchorLineKind, target: AnchorTarget, margin: f64) {
    model.set_anchor(node, line, target).unwrap();
    model.set_margin(node, line, margin);
}

fn stats_since(view: &FormEditorView<SceneModel>, before: TransactionStats) -> TransactionStats {
    let after = view.model().transaction_stats();
    TransactionStats {
        begun: after.begun - before.begun,
        committed: after.committed - before.committed,
    }
}

// ─── Move ────────────────────────────────────────────────────────────────

#[test]
fn selection_move_selection_round_trip() {
    let (mut view, a) = single("rt", |_, _| {});
    let before = view.model().transaction_stats();

    view.handle_event(&InputEvent::pointer_down(120.0, 120.0, 0));
    assert_eq!(view.current_tool(), ToolKind::Selection);
    view.handle_event(&ctrl(InputEvent::pointer_move(160.0, 160.0, 100)));
    assert_eq!(view.current_tool(), ToolKind::Move);
    view.handle_event(&ctrl(InputEvent::pointer_up(157.0, 163.0, 200)));

    assert_eq!(view.current_tool(), ToolKind::Selection);
    assert_eq!(number(&view, a, "x"), 137.0);
    assert_eq!(number(&view, a, "y"), 143.0);
    assert_eq!(
        stats_since(&view, before),
        TransactionStats {
            begun: 1,
            committed: 1
        }
    );
    assert!(!view.model().in_transaction());
}

#[test]
fn short_drag_does_not_move() {
    let (mut view, a) = single("short", |_, _| {});
    view.handle_event(&InputEvent::pointer_down(120.0, 120.0, 0));
    view.handle_event(&InputEvent::pointer_move(130.0, 125.0, 500));
    view.handle_event(&InputEvent::pointer_up(130.0, 125.0, 600));
    assert_eq!(view.current_tool(), ToolKind::Selection);
    assert_eq!(number(&view, a, "x"), 100.0);
    assert_eq!(view.model().selected_nodes(), vec![a]);
}

#[test]
fn anchored_move_edits_the_margin() {
    let (mut view, a) = single("anch", |model, a| {
        let root = model.root();
        model
            .set_anchor(
                a,
                AnchorLineKind::Top,
                AnchorTarget {
                    node: root,
                    line: AnchorLineKind::Top,
                },
            )
            .unwrap();
        model.set_margin(a, AnchorLineKind::Top, 10.0);
    });
    assert_eq!(number(&view, a, "y"), 10.0);

    view.handle_event(&InputEvent::pointer_down(120.0, 20.0, 0));
    view.handle_event(&ctrl(InputEvent::pointer_move(120.0, 50.0, 100)));
    view.handle_event(&ctrl(InputEvent::pointer_up(120.0, 25.0, 200)));

    assert!(view.model().has_anchor(a, AnchorLineKind::Top));
    assert_eq!(view.model().instance_margin(a, AnchorLineKind::Top), 15.0);
    assert_eq!(number(&view, a, "y"), 15.0);
}

#[test]
fn arrow_keys_nudge_and_return_to_selection() {
    let (mut view, a) = single("key", |_, _| {});
    click(&mut view, 120.0, 120.0);
    view.handle_event(&InputEvent::key_down(Key::ArrowRight));
    assert_eq!(view.current_tool(), ToolKind::Move);
    view.handle_event(&InputEvent::key_down(Key::ArrowDown).with_modifiers(Modifiers::shift()));
    view.handle_event(&InputEvent::key_up(Key::ArrowDown));
    assert_eq!(view.current_tool(), ToolKind::Selection);
    assert_eq!(number(&view, a, "x"), 101.0);
    assert_eq!(number(&view, a, "y"), 110.0);
    assert!(!view.model().in_transaction());
}

#[test]
fn snapped_move_anchors_to_padding_and_sibling_edges() {
    let (mut view, a) = single("snapmv", |model, _| {
        add_sibling(model, "snapmv_b", 200.0, 200.0);
    });
    let root = view.model().root();
    let b = NodeId::intern("snapmv_b");

    view.handle_event(&InputEvent::pointer_down(120.0, 120.0, 0));
    view.handle_event(&InputEvent::pointer_move(30.0, 222.0, 100));
    assert_eq!(view.current_tool(), ToolKind::Move);
    view.handle_event(&InputEvent::pointer_up(30.0, 222.0, 200));

    // Left edge pulled onto the padded line (8), top onto b's top (200).
    assert_eq!(number(&view, a, "x"), 8.0);
    assert_eq!(number(&view, a, "y"), 200.0);
    let model = view.model();
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Left),
        Some(AnchorTarget {
            node: root,
            line: AnchorLineKind::Left
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Left), 8.0);
    assert!(!model.has_anchor(a, AnchorLineKind::Right));
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Top),
        Some(AnchorTarget {
            node: b,
            line: AnchorLineKind::Top
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Top), 0.0);
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Bottom),
        Some(AnchorTarget {
            node: b,
            line: AnchorLineKind::Bottom
        })
    );
    assert!(!model.in_transaction());
}

#[test]
fn centered_axis_is_left_alone_by_anchor_inference() {
    let (mut view, a) = single("centermv", |model, a| {
        let root = model.root();
        anchor_to(
            model,
            a,
            AnchorLineKind::HorizontalCenter,
            AnchorTarget {
                node: root,
                line: AnchorLineKind::HorizontalCenter,
            },
            0.0,
        );
        add_sibling(model, "centermv_b", 175.0, 200.0);
    });
    let root = view.model().root();
    assert_eq!(number(&view, a, "x"), 175.0);

    view.handle_event(&InputEvent::pointer_down(190.0, 120.0, 0));
    view.handle_event(&InputEvent::pointer_move(190.0, 30.0, 100));
    view.handle_event(&InputEvent::pointer_up(190.0, 30.0, 200));

    let model = view.model();
    assert_eq!(number(&view, a, "y"), 8.0);
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Top),
        Some(AnchorTarget {
            node: root,
            line: AnchorLineKind::Top
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Top), 8.0);
    // a's left edge lies on b's, but the x axis is centered.
    assert!(!model.has_anchor(a, AnchorLineKind::Left));
    assert!(!model.has_anchor(a, AnchorLineKind::Right));
    assert!(model.has_anchor(a, AnchorLineKind::HorizontalCenter));
    assert_eq!(model.instance_margin(a, AnchorLineKind::HorizontalCenter), 0.0);
    assert_eq!(number(&view, a, "x"), 175.0);
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn resize_never_goes_negative() {
    let (mut view, a) = single("floor", |_, _| {});
    click(&mut view, 120.0, 120.0);
    view.handle_event(&InputEvent::hover(150.0, 150.0));
    assert_eq!(view.current_tool(), ToolKind::Resize);
    view.handle_event(&InputEvent::pointer_down(150.0, 150.0, 0));
    view.handle_event(&ctrl(InputEvent::pointer_move(20.0, 30.0, 50)));
    view.handle_event(&ctrl(InputEvent::pointer_up(20.0, 30.0, 100)));

    assert_eq!(number(&view, a, "width"), 0.0);
    assert_eq!(number(&view, a, "height"), 0.0);
    assert_eq!(number(&view, a, "x"), 100.0);
    assert_eq!(number(&view, a, "y"), 100.0);
}

#[test]
fn resize_snaps_to_spacing_before_neighbour() {
    init_logging();
    let mut model = SceneModel::new("gap_rt_root", "Item", 400.0, 300.0);
    let root = model.root();
    let a = model
        .add_node(
            root,
            ModelNode::new(NodeId::intern("gap_rt_a"), "Rectangle")
                .with_geometry(0.0, 0.0, 40.0, 50.0),
        )
        .unwrap();
    model
        .add_node(
            root,
            ModelNode::new(NodeId::intern("gap_rt_b"), "Rectangle")
                .with_geometry(60.0, 0.0, 50.0, 50.0),
        )
        .unwrap();
    let config = EditorConfig {
        item_spacing: 10.0,
        ..EditorConfig::default()
    };
    let mut view = FormEditorView::new(model, config).unwrap();

    click(&mut view, 20.0, 25.0);
    view.handle_event(&InputEvent::hover(40.0, 25.0));
    assert_eq!(view.current_tool(), ToolKind::Resize);
    view.handle_event(&InputEvent::pointer_down(40.0, 25.0, 0));
    view.handle_event(&InputEvent::pointer_move(53.0, 25.0, 50));
    assert!(
        view.overlay()
            .iter()
            .any(|o| matches!(o, OverlayItem::SnapGuide(_)))
    );
    view.handle_event(&InputEvent::pointer_up(53.0, 25.0, 100));
    assert_eq!(number(&view, a, "width"), 50.0);

    // The right edge sits one spacing before b: anchored to b's left edge.
    let b = NodeId::intern("gap_rt_b");
    let model = view.model();
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Right),
        Some(AnchorTarget {
            node: b,
            line: AnchorLineKind::Left
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Right), 10.0);
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Left),
        Some(AnchorTarget {
            node: root,
            line: AnchorLineKind::Left
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Left), 0.0);
}

#[test]
fn resize_onto_padding_anchors_with_padding_margin() {
    let (mut view, a) = single("padrs", |_, _| {});
    let root = view.model().root();
    click(&mut view, 120.0, 120.0);
    view.handle_event(&InputEvent::hover(150.0, 150.0));
    assert_eq!(view.current_tool(), ToolKind::Resize);
    view.handle_event(&InputEvent::pointer_down(150.0, 150.0, 0));
    view.handle_event(&InputEvent::pointer_move(390.0, 150.0, 50));
    view.handle_event(&InputEvent::pointer_up(390.0, 150.0, 100));

    assert_eq!(number(&view, a, "x"), 100.0);
    assert_eq!(number(&view, a, "width"), 292.0);
    assert_eq!(number(&view, a, "height"), 50.0);
    let model = view.model();
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Right),
        Some(AnchorTarget {
            node: root,
            line: AnchorLineKind::Right
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Right), 8.0);
    assert!(!model.has_anchor(a, AnchorLineKind::Left));
    assert!(!model.has_anchor(a, AnchorLineKind::Bottom));
}

// ─── Anchor ──────────────────────────────────────────────────────────────

fn highlighted_lines(view: &FormEditorView<SceneModel>, node: NodeId) -> Vec<AnchorLineKind> {
    view.overlay()
        .into_iter()
        .filter_map(|item| match item {
            OverlayItem::AnchorLine {
                node: n,
                line,
                highlighted: true,
                ..
            } if n == node => Some(line),
            _ => None,
        })
        .collect()
}

#[test]
fn anchor_drag_onto_sibling_is_one_undoable_edit() {
    let (mut view, a) = single("ancadd", |model, _| {
        add_sibling(model, "ancadd_b", 200.0, 100.0);
    });
    let b = NodeId::intern("ancadd_b");
    click(&mut view, 120.0, 120.0);
    assert!(view.change_tool(ToolRequest::Anchor));
    let before = view.model().transaction_stats();

    view.handle_event(&InputEvent::pointer_down(150.0, 110.0, 0));
    view.handle_event(&InputEvent::pointer_move(200.0, 110.0, 50));
    assert_eq!(
        highlighted_lines(&view, b),
        vec![AnchorLineKind::Left, AnchorLineKind::Right]
    );
    view.handle_event(&InputEvent::pointer_up(200.0, 110.0, 100));

    assert_eq!(
        view.model().instance_anchor(a, AnchorLineKind::Right),
        Some(AnchorTarget {
            node: b,
            line: AnchorLineKind::Left
        })
    );
    assert_eq!(view.model().instance_margin(a, AnchorLineKind::Right), 50.0);
    assert_eq!(number(&view, a, "x"), 100.0);
    assert_eq!(
        stats_since(&view, before),
        TransactionStats {
            begun: 1,
            committed: 1
        }
    );
    assert!(highlighted_lines(&view, b).is_empty());

    assert_eq!(view.model_mut().undo().as_deref(), Some("add anchor"));
    assert!(!view.model().has_anchor(a, AnchorLineKind::Right));
}

#[test]
fn anchor_release_over_nothing_removes_the_anchor() {
    let (mut view, a) = single("ancrm", |model, a| {
        let root = model.root();
        anchor_to(
            model,
            a,
            AnchorLineKind::Right,
            AnchorTarget {
                node: root,
                line: AnchorLineKind::Right,
            },
            250.0,
        );
        add_sibling(model, "ancrm_b", 200.0, 100.0);
    });
    assert_eq!(number(&view, a, "x"), 100.0);
    click(&mut view, 120.0, 120.0);
    view.change_tool(ToolRequest::Anchor);

    view.handle_event(&InputEvent::pointer_down(150.0, 110.0, 0));
    view.handle_event(&InputEvent::pointer_up(300.0, 250.0, 50));

    assert!(!view.model().has_anchor(a, AnchorLineKind::Right));
    assert_eq!(view.model().instance_margin(a, AnchorLineKind::Right), 0.0);
    assert_eq!(number(&view, a, "x"), 100.0);
    assert_eq!(view.current_tool(), ToolKind::Anchor);
}

#[test]
fn anchor_onto_a_dependent_sibling_is_refused() {
    let (mut view, a) = single("anccyc", |model, a| {
        let root = model.root();
        anchor_to(
            model,
            a,
            AnchorLineKind::Right,
            AnchorTarget {
                node: root,
                line: AnchorLineKind::Right,
            },
            250.0,
        );
        let b = add_sibling(model, "anccyc_b", 200.0, 100.0);
        anchor_to(
            model,
            b,
            AnchorLineKind::Left,
            AnchorTarget {
                node: a,
                line: AnchorLineKind::Right,
            },
            50.0,
        );
    });
    let root = view.model().root();
    let b = NodeId::intern("anccyc_b");
    assert_eq!(number(&view, b, "x"), 200.0);
    click(&mut view, 120.0, 120.0);
    view.change_tool(ToolRequest::Anchor);
    let before = view.model().transaction_stats();

    view.handle_event(&InputEvent::pointer_down(150.0, 110.0, 0));
    view.handle_event(&InputEvent::pointer_move(200.0, 110.0, 50));
    assert!(highlighted_lines(&view, b).is_empty());
    view.handle_event(&InputEvent::pointer_up(200.0, 110.0, 100));

    let model = view.model();
    assert_eq!(
        model.instance_anchor(a, AnchorLineKind::Right),
        Some(AnchorTarget {
            node: root,
            line: AnchorLineKind::Right
        })
    );
    assert_eq!(model.instance_margin(a, AnchorLineKind::Right), 250.0);
    assert_eq!(
        model.instance_anchor(b, AnchorLineKind::Left),
        Some(AnchorTarget {
            node: a,
            line: AnchorLineKind::Right
        })
    );
    assert_eq!(stats_since(&view, before).committed, 0);
    assert!(!model.in_transaction());
}

// ─── Rotate ──────────────────────────────────────────────────────────────

#[test]
fn rotation_with_origin_on_the_dragged_corner_pivots_on_center() {
    let (mut view, a) = single("pivot", |model, a| {
        model.set_variant_property(
            a,
            "transformOrigin",
            PropertyValue::Enum("Item.TopLeft".to_string()),
        );
    });
    click(&mut view, 120.0, 120.0);
    // Rotation handle just outside the top-left corner.
    view.handle_event(&InputEvent::hover(92.0, 92.0));
    assert_eq!(view.current_tool(), ToolKind::Rotate);
    view.handle_event(&InputEvent::pointer_down(92.0, 92.0, 0));
    view.handle_event(&InputEvent::pointer_move(150.0, 100.0, 50));
    view.handle_event(&InputEvent::pointer_up(150.0, 100.0, 100));

    let info = view.model().instance_info(a).unwrap();
    assert!((info.rotation - 90.0).abs() < 1e-9);
    let center = info.scene_bounding_rect().center();
    assert!((center.x - 125.0).abs() < 1e-9);
    assert!((center.y - 125.0).abs() < 1e-9);
    assert!(!view.model().in_transaction());
}

// ─── Drag & drop ─────────────────────────────────────────────────────────

#[test]
fn drop_creates_one_undoable_item() {
    let (mut view, _) = single("drop", |_, _| {});
    let before = view.model().transaction_stats();
    view.handle_event(&InputEvent::DragEnter {
        pos: (300.0, 40.0).into(),
        payload: DragPayload::LibraryItem {
            type_name: "Rectangle".to_string(),
            properties: Vec::new(),
            size: Some(qfe_core::Size::new(20.0, 20.0)),
        },
    });
    assert_eq!(view.current_tool(), ToolKind::Drag);
    view.handle_event(&InputEvent::DragMove {
        pos: (310.0, 60.0).into(),
        modifiers: Modifiers::NONE,
    });
    view.handle_event(&InputEvent::Drop {
        pos: (310.0, 60.0).into(),
        modifiers: Modifiers::NONE,
    });
    assert_eq!(view.current_tool(), ToolKind::Selection);

    let selected = view.model().selected_nodes();
    assert_eq!(selected.len(), 1);
    let dropped = selected[0];
    assert_eq!(number(&view, dropped, "x"), 310.0);
    assert_eq!(number(&view, dropped, "y"), 60.0);
    assert!(view.scene().has_item(dropped));
    let after = view.model().transaction_stats();
    assert_eq!(after.committed - before.committed, 1);

    assert_eq!(view.model_mut().undo().as_deref(), Some("drop item"));
    view.process_notifications();
    assert!(!view.model().is_valid(dropped));
    assert!(!view.scene().has_item(dropped));
}

#[test]
fn drag_leave_removes_the_preview() {
    let (mut view, _) = single("leave", |_, _| {});
    view.handle_event(&InputEvent::DragEnter {
        pos: (300.0, 40.0).into(),
        payload: DragPayload::ImageAsset("images/logo.png".to_string()),
    });
    let dropped = view.model().selected_nodes()[0];
    assert_eq!(view.model().type_name(dropped).as_deref(), Some("Image"));
    view.handle_event(&InputEvent::DragLeave);
    assert!(!view.model().is_valid(dropped));
    assert_eq!(view.current_tool(), ToolKind::Selection);
    assert!(!view.model().in_transaction());
}

// ─── Custom tools ────────────────────────────────────────────────────────

#[test]
fn double_click_opens_color_tool_and_reject_restores() {
    let (mut view, a) = single("color", |model, a| {
        model.set_variant_property(a, "color", "red".into());
    });
    view.handle_event(&InputEvent::DoubleClick {
        pos: (120.0, 120.0).into(),
        modifiers: Modifiers::NONE,
    });
    assert_eq!(view.current_tool(), ToolKind::Custom);
    assert_eq!(view.current_custom_tool(), Some("color"));

    view.handle_event(&InputEvent::Dialog(DialogResult::Preview("blue".into())));
    assert_eq!(view.model().property(a, "color"), Some(&PropertyValue::from("blue")));
    view.handle_event(&InputEvent::Dialog(DialogResult::Rejected));
    assert_eq!(view.model().property(a, "color"), Some(&PropertyValue::from("red")));
    assert_eq!(view.current_tool(), ToolKind::Selection);
    assert!(!view.model().in_transaction());
}

#[test]
fn annotation_is_only_reachable_by_name() {
    let (mut view, a) = single("note", |model, a| {
        model.set_selected_nodes(vec![a]);
    });
    assert!(view.change_tool(ToolRequest::Custom {
        name: Some("annotation".to_string())
    }));
    view.handle_event(&InputEvent::Dialog(DialogResult::Accepted("check me".into())));
    assert_eq!(
        view.model().property(a, "__annotation"),
        Some(&PropertyValue::from("check me"))
    );
    assert_eq!(view.current_tool(), ToolKind::Selection);
}

#[test]
fn emptied_selection_returns_to_selection_tool() {
    let (mut view, a) = single("empty", |model, a| {
        model.set_selected_nodes(vec![a]);
    });
    assert!(view.change_tool(ToolRequest::Anchor));
    view.handle_event(&InputEvent::key_down(Key::Escape));
    assert_eq!(view.current_tool(), ToolKind::Selection);
    view.handle_event(&InputEvent::key_down(Key::Escape));
    assert!(view.model().selected_nodes().is_empty());
}
