//! Draws a new item of a chosen type with a press-drag-release. A plain
//! click creates an item of the default size.

use super::{Tool, ToolContext, ToolKind, ToolRequest};
use crate::indicators::OverlayItem;
use crate::input::{InputEvent, Key};
use crate::manipulators::commit;
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId, Point, Rect};

#[derive(Debug, Default)]
pub struct ItemCreatorTool {
    type_name: String,
    begin: Option<Point>,
    current: Point,
}

impl ItemCreatorTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }

    /// The rectangle drawn so far, in scene space.
    pub fn rect(&self) -> Option<Rect> {
        self.begin.map(|b| Rect::from_points(b, self.current))
    }

    fn create(&mut self, ctx: &mut ToolContext<'_>) -> Option<NodeId> {
        let begin = self.begin.take()?;
        if self.type_name.is_empty() {
            log::warn!("item creator has no type");
            return None;
        }
        let mut rect = Rect::from_points(begin, self.current);
        if rect.width() < 1.0 || rect.height() < 1.0 {
            let (w, h) = ctx.config.default_item_size;
            rect = Rect::from_origin_size(begin, (w, h));
        }
        let parent = ctx.container_at(begin, &[])?;
        let origin = ctx
            .scene
            .item(parent)
            .and_then(|item| item.map_from_scene(rect.origin()))
            .unwrap_or(rect.origin());
        let properties = vec![
            ("x".to_string(), origin.x.into()),
            ("y".to_string(), origin.y.into()),
            ("width".to_string(), rect.width().into()),
            ("height".to_string(), rect.height().into()),
        ];
        let mut transaction = Some(ctx.model.begin_transaction("create item"));
        let created = ctx.model.create_node(&self.type_name, parent, properties);
        commit(ctx.model, &mut transaction);
        match created {
            Ok(node) => {
                log::debug!("created {} {node} in {parent}", self.type_name);
                Some(node)
            }
            Err(err) => {
                log::warn!("cannot create {}: {err}", self.type_name);
                None
            }
        }
    }
}

impl Tool for ItemCreatorTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ItemCreator
    }

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { pos, .. } => {
                self.begin = Some(*pos);
                self.current = *pos;
            }
            InputEvent::PointerMove { pos, .. } => self.current = *pos,
            InputEvent::PointerUp { pos, .. } => {
                self.current = *pos;
                if let Some(node) = self.create(ctx) {
                    ctx.scene.add_item(&*ctx.model, node);
                    ctx.model.set_selected_nodes(vec![node]);
                }
                ctx.change_tool(ToolRequest::Selection);
            }
            InputEvent::KeyDown {
                key: Key::Escape, ..
            } => {
                self.begin = None;
                ctx.change_tool(ToolRequest::Selection);
            }
            _ => {}
        }
    }

    fn set_items(&mut self, _ctx: &mut ToolContext<'_>, _items: &[NodeId]) {}

    fn clear(&mut self, _ctx: &mut ToolContext<'_>) {
        self.begin = None;
    }

    fn collect_overlay(
        &self,
        _model: &dyn DesignModel,
        _scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        if let Some(rect) = self.rect() {
            out.push(OverlayItem::RubberBand(rect));
        }
    }
}
