//! Frames around the selected items.

use super::OverlayItem;
use crate::scene::FormEditorScene;
use qfe_core::NodeId;

#[derive(Debug, Default)]
pub struct SelectionIndicator {
    items: Vec<NodeId>,
}

impl SelectionIndicator {
    pub fn set_items(&mut self, items: &[NodeId]) {
        self.items = items.to_vec();
    }

    pub fn update_items(&mut self, scene: &FormEditorScene) {
        self.items.retain(|n| scene.has_item(*n));
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn collect_overlay(&self, scene: &FormEditorScene, out: &mut Vec<OverlayItem>) {
        for node in &self.items {
            if let Some(item) = scene.item(*node) {
                out.push(OverlayItem::SelectionFrame {
                    node: *node,
                    corners: item.scene_corners(),
                });
            }
        }
    }
}
