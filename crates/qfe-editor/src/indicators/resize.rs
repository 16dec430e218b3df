//! Resize handles of the selected items.

use super::{ControllerId, OverlayItem};
use crate::manipulators::ResizeHandle;
use crate::scene::{FormEditorItem, FormEditorScene};
use qfe_core::{DesignModel, NodeId, Point, Rect, Size};

/// Eight handles around one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeController {
    pub node: NodeId,
}

impl ResizeController {
    /// Scene rect of `handle`, `extent` wide and centered on the handle
    /// position.
    pub fn handle_rect(item: &FormEditorItem, extent: f64, handle: ResizeHandle) -> Rect {
        let center = item.scene_transform * handle.position_in(item.bounding_rect);
        Rect::from_center_size(center, Size::new(extent, extent))
    }

    pub fn handle_at(
        &self,
        item: &FormEditorItem,
        extent: f64,
        pos: Point,
    ) -> Option<ResizeHandle> {
        ResizeHandle::ALL
            .into_iter()
            .find(|h| Self::handle_rect(item, extent, *h).contains(pos))
    }
}

/// Items eligible for resize (or rotation) handles. Children of layouts
/// get none.
pub(crate) fn wants_handles(model: &dyn DesignModel, node: NodeId, resize: bool) -> bool {
    if !model.is_valid(node) || node == model.root() {
        return false;
    }
    let caps = model.capabilities(node);
    let allowed = if resize { caps.resizable } else { caps.rotatable };
    allowed
        && !model
            .instance_parent(node)
            .is_some_and(|p| model.capabilities(p).layout)
}

#[derive(Debug, Default)]
pub struct ResizeIndicator {
    controllers: Vec<ControllerId>,
}

impl ResizeIndicator {
    pub fn set_items(&mut self, model: &dyn DesignModel, scene: &mut FormEditorScene, items: &[NodeId]) {
        self.clear(scene);
        for node in items {
            if scene.has_item(*node) && wants_handles(model, *node, true) {
                let id = scene
                    .resize_controllers
                    .insert(ResizeController { node: *node });
                self.controllers.push(id);
            }
        }
    }

    /// Handles follow their items' live geometry; only controllers whose
    /// item went away need dropping.
    pub fn update_items(&mut self, scene: &mut FormEditorScene) {
        self.controllers.retain(|id| {
            let live = scene
                .resize_controllers
                .get(*id)
                .is_some_and(|c| scene.has_item(c.node));
            if !live {
                scene.resize_controllers.remove(*id);
            }
            live
        });
    }

    pub fn clear(&mut self, scene: &mut FormEditorScene) {
        for id in self.controllers.drain(..) {
            scene.resize_controllers.remove(id);
        }
    }

    pub fn collect_overlay(&self, scene: &FormEditorScene, out: &mut Vec<OverlayItem>) {
        let extent = scene.handle_extent();
        for id in &self.controllers {
            let Some(controller) = scene.resize_controllers.get(*id) else {
                continue;
            };
            let Some(item) = scene.item(controller.node) else {
                continue;
            };
            out.extend(ResizeHandle::ALL.into_iter().map(|handle| OverlayItem::ResizeHandle {
                controller: *id,
                node: controller.node,
                handle,
                rect: ResizeController::handle_rect(item, extent, handle),
            }));
        }
    }
}
