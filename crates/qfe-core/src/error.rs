use crate::anchors::AnchorLineKind;
use crate::id::NodeId;
use thiserror::Error;

/// Errors reported by structural model operations.
///
/// Geometry writes never fail; they are silently ignored for stale nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} cannot contain children")]
    NotAContainer(NodeId),
    #[error("reparenting {child} under {parent} would create a cycle")]
    ReparentCycle { child: NodeId, parent: NodeId },
    #[error("the root node cannot be {0}")]
    RootNode(&'static str),
    #[error("anchoring {node}.{} would create a cycle", .line.qml_name())]
    AnchorCycle { node: NodeId, line: AnchorLineKind },
    #[error("{node} cannot anchor to {target}")]
    NotAnchorable { node: NodeId, target: NodeId },
    #[error("transaction {0} is not the open transaction")]
    TransactionMismatch(u64),
    #[error("no transaction is open")]
    NoOpenTransaction,
}
