pub mod anchors;
pub mod design_model;
pub mod error;
pub mod geometry;
pub mod id;
pub mod instance;
pub mod model;
pub mod scene_model;
pub mod transaction;

pub use anchors::{AnchorLineKind, AnchorTarget, Axis, NodeAnchors};
pub use design_model::{
    DesignModel, InstanceInfo, ModelNotification, NodeCapabilities, PropertyValue, RenderImage,
    TransactionId,
};
pub use error::ModelError;
pub use geometry::{Affine, Line, Point, Rect, Size, TransformOrigin, Vec2};
pub use id::NodeId;
pub use instance::resolve_instances;
pub use model::{ModelNode, NodeTree};
pub use scene_model::SceneModel;
pub use transaction::{TransactionStack, TransactionStats};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
