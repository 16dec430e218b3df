//! Rotation handles, placed just outside each corner.

use super::resize::wants_handles;
use super::{ControllerId, OverlayItem};
use crate::manipulators::RotationHandle;
use crate::scene::{FormEditorItem, FormEditorScene};
use qfe_core::{DesignModel, NodeId, Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationController {
    pub node: NodeId,
}

impl RotationController {
    /// Scene center of `handle`: its corner pushed `offset` further out
    /// along the center→corner direction.
    pub fn handle_center(item: &FormEditorItem, offset: f64, handle: RotationHandle) -> Point {
        let corner = item.scene_transform * handle.position_in(item.bounding_rect);
        let center = item.scene_transform * item.bounding_rect.center();
        let direction = corner - center;
        let length = direction.hypot();
        if length > 0.0 {
            corner + direction * (offset / length)
        } else {
            corner
        }
    }

    pub fn handle_rect(
        item: &FormEditorItem,
        extent: f64,
        offset: f64,
        handle: RotationHandle,
    ) -> Rect {
        Rect::from_center_size(
            Self::handle_center(item, offset, handle),
            Size::new(extent * 2.0, extent * 2.0),
        )
    }

    pub fn handle_at(
        &self,
        item: &FormEditorItem,
        extent: f64,
        offset: f64,
        pos: Point,
    ) -> Option<RotationHandle> {
        RotationHandle::ALL
            .into_iter()
            .find(|h| Self::handle_rect(item, extent, offset, *h).contains(pos))
    }
}

#[derive(Debug, Default)]
pub struct RotationIndicator {
    controllers: Vec<ControllerId>,
}

impl RotationIndicator {
    pub fn set_items(&mut self, model: &dyn DesignModel, scene: &mut FormEditorScene, items: &[NodeId]) {
        self.clear(scene);
        for node in items {
            if scene.has_item(*node) && wants_handles(model, *node, false) {
                let id = scene
                    .rotation_controllers
                    .insert(RotationController { node: *node });
                self.controllers.push(id);
            }
        }
    }

    pub fn update_items(&mut self, scene: &mut FormEditorScene) {
        self.controllers.retain(|id| {
            let live = scene
                .rotation_controllers
                .get(*id)
                .is_some_and(|c| scene.has_item(c.node));
            if !live {
                scene.rotation_controllers.remove(*id);
            }
            live
        });
    }

    pub fn clear(&mut self, scene: &mut FormEditorScene) {
        for id in self.controllers.drain(..) {
            scene.rotation_controllers.remove(id);
        }
    }

    pub fn collect_overlay(&self, scene: &FormEditorScene, out: &mut Vec<OverlayItem>) {
        let extent = scene.handle_extent();
        let offset = scene.rotation_offset();
        for id in &self.controllers {
            let Some(controller) = scene.rotation_controllers.get(*id) else {
                continue;
            };
            let Some(item) = scene.item(controller.node) else {
                continue;
            };
            out.extend(RotationHandle::ALL.into_iter().map(|handle| {
                OverlayItem::RotationHandle {
                    controller: *id,
                    node: controller.node,
                    handle,
                    rect: RotationController::handle_rect(item, extent, offset, handle),
                }
            }));
        }
    }
}
