//! Geometry manipulators.
//!
//! Each manipulator turns a sequence of pointer positions into model
//! writes, bracketed by `begin` and `end`. Begin snapshots are immutable
//! for the gesture so deltas never accumulate drift. Every write happens
//! inside a transaction the manipulator opened; `clear` always commits it.

pub mod anchor;
pub mod move_manipulator;
pub mod resize;
pub mod rotation;
pub mod rubber_band;

pub use anchor::{AnchorManipulator, possible_anchor_lines};
pub use move_manipulator::MoveManipulator;
pub use resize::{ResizeHandle, ResizeManipulator};
pub use rotation::{RotationHandle, RotationManipulator};
pub use rubber_band::{RubberBandSelectionManipulator, SelectionMode};

use qfe_core::{AnchorLineKind, Axis, DesignModel, NodeId, PropertyValue, TransactionId};

/// Which state a geometry write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFlag {
    /// Anchored axes edit anchor margins, free axes edit the position.
    #[default]
    UseCurrentState,
    /// Write the plain position and leave anchors alone.
    BaseStateOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReparentFlag {
    /// Prefer the nearest layout or stacked container above the target.
    #[default]
    FindLayoutAncestor,
    /// Reparent into exactly the given target.
    EnforceReparent,
}

/// Margins of all six lines, in `AnchorLineKind::ALL` order.
pub(crate) fn margins_of(model: &dyn DesignModel, node: NodeId) -> [f64; 6] {
    AnchorLineKind::ALL.map(|line| model.instance_margin(node, line))
}

pub(crate) fn margin_slot(line: AnchorLineKind) -> usize {
    AnchorLineKind::ALL
        .iter()
        .position(|l| *l == line)
        .unwrap_or_default()
}

pub(crate) fn anchored_on(model: &dyn DesignModel, node: NodeId, axis: Axis) -> bool {
    axis.lines().iter().any(|line| model.has_anchor(node, *line))
}

pub(crate) fn number(model: &dyn DesignModel, node: NodeId, name: &str) -> f64 {
    model
        .instance_value(node, name)
        .as_ref()
        .and_then(PropertyValue::as_f64)
        .unwrap_or(0.0)
}

pub(crate) fn set_number(model: &mut dyn DesignModel, node: NodeId, name: &str, value: f64) {
    model.set_variant_property(node, name, PropertyValue::Number(value));
}

/// Commit `transaction` if one is open. A failed commit is a programming
/// error on the caller's side; it is logged and dropped.
pub(crate) fn commit(model: &mut dyn DesignModel, transaction: &mut Option<TransactionId>) {
    if let Some(id) = transaction.take()
        && let Err(err) = model.commit(id)
    {
        log::warn!("dangling transaction {}: {err}", id.0);
    }
}
