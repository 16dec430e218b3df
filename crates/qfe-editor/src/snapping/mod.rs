//! Snap lines and the snapping engine.

pub mod lines;
pub mod snapper;

pub use lines::{LineMap, SnapLine, SnapLineIndex};
pub use snapper::{NO_SNAP, Snapper};

use crate::input::Modifiers;
use serde::{Deserialize, Serialize};

/// How a gesture uses snap lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Snapping {
    NoSnapping,
    /// Snap while dragging, leave anchors alone.
    UseSnapping,
    /// Snap while dragging and infer anchors when the gesture ends.
    #[default]
    UseSnappingAndAnchoring,
}

impl Snapping {
    pub fn snaps(self) -> bool {
        !matches!(self, Snapping::NoSnapping)
    }

    pub fn anchors(self) -> bool {
        matches!(self, Snapping::UseSnappingAndAnchoring)
    }

    /// Ctrl/⌘ suspends snapping for the current pointer event.
    pub fn for_modifiers(self, modifiers: Modifiers) -> Self {
        if modifiers.command() {
            Snapping::NoSnapping
        } else {
            self
        }
    }
}
