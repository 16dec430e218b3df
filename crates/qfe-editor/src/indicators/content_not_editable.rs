//! Hatched frames over component instances whose content is read-only.

use super::OverlayItem;
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId};

#[derive(Debug, Default)]
pub struct ContentNotEditableIndicator {
    items: Vec<NodeId>,
}

impl ContentNotEditableIndicator {
    pub fn set_items(&mut self, model: &dyn DesignModel, items: &[NodeId]) {
        self.items = items
            .iter()
            .copied()
            .filter(|n| model.is_valid(*n) && !model.capabilities(*n).content_editable)
            .collect();
    }

    pub fn update_items(&mut self, model: &dyn DesignModel, items: &[NodeId]) {
        self.set_items(model, items);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn collect_overlay(&self, scene: &FormEditorScene, out: &mut Vec<OverlayItem>) {
        for node in &self.items {
            if let Some(item) = scene.item(*node) {
                out.push(OverlayItem::ContentNotEditable {
                    node: *node,
                    corners: item.scene_corners(),
                });
            }
        }
    }
}
