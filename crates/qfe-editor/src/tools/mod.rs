//! Tool system for canvas interactions.
//!
//! Each tool interprets input events for one interaction mode and drives
//! manipulators, which write through the [`DesignModel`]. Tools never switch
//! themselves; they ask for a switch through [`ToolContext::change_tool`]
//! and the [`ToolBox`](crate::toolbox::ToolBox) performs it after the
//! current event, replaying any events the request carries.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Selection | Move | Rotate |
//! |----------|-----------|------|--------|
//! | **Shift** | Add to selection | Reparent into item under cursor; 10 px arrow step | 5° steps |
//! | **Ctrl/⌘** | Toggle selection | Suspend snapping | — |
//! | **Alt** | Select topmost and move at once | With Shift: reparent into exactly that item | 45° steps |

pub mod anchor_tool;
pub mod annotation;
pub mod color;
pub mod custom;
pub mod drag_tool;
pub mod item_creator;
pub mod move_tool;
pub mod resize_tool;
pub mod rotation_tool;
pub mod selection;
pub mod source;
pub mod text;

pub use anchor_tool::AnchorTool;
pub use annotation::AnnotationTool;
pub use color::ColorTool;
pub use custom::CustomTool;
pub use drag_tool::DragTool;
pub use item_creator::ItemCreatorTool;
pub use move_tool::MoveTool;
pub use resize_tool::ResizeTool;
pub use rotation_tool::RotationTool;
pub use selection::SelectionTool;
pub use source::SourceTool;
pub use text::TextTool;

use crate::config::EditorConfig;
use crate::indicators::OverlayItem;
use crate::input::InputEvent;
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId, Point};

/// The interaction mode a tool implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Selection,
    Move,
    Resize,
    Rotate,
    Drag,
    ItemCreator,
    Anchor,
    Custom,
}

/// Which tool to switch to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    Selection,
    Move,
    Resize,
    Rotate,
    Drag,
    /// Draw a new item of the given QML type.
    ItemCreator(String),
    Anchor,
    /// A registered custom tool by name, or the one that most wants the
    /// current selection.
    Custom { name: Option<String> },
}

/// A pending switch plus the events the incoming tool should see again.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSwitch {
    pub request: ToolRequest,
    pub replay: Vec<InputEvent>,
}

/// Everything a tool may touch while handling one event.
pub struct ToolContext<'a> {
    pub model: &'a mut dyn DesignModel,
    pub scene: &'a mut FormEditorScene,
    pub config: &'a EditorConfig,
    switch: Option<ToolSwitch>,
}

impl<'a> ToolContext<'a> {
    pub fn new(
        model: &'a mut dyn DesignModel,
        scene: &'a mut FormEditorScene,
        config: &'a EditorConfig,
    ) -> Self {
        Self {
            model,
            scene,
            config,
            switch: None,
        }
    }

    /// Ask for a tool switch once the current event is handled. A later
    /// request replaces an earlier one.
    pub fn change_tool(&mut self, request: ToolRequest) {
        self.change_tool_with_replay(request, Vec::new());
    }

    pub fn change_tool_with_replay(&mut self, request: ToolRequest, replay: Vec<InputEvent>) {
        log::debug!("tool switch requested: {request:?}");
        self.switch = Some(ToolSwitch { request, replay });
    }

    pub fn pending_switch(&self) -> Option<&ToolSwitch> {
        self.switch.as_ref()
    }

    pub fn take_switch(&mut self) -> Option<ToolSwitch> {
        self.switch.take()
    }

    pub fn selection(&self) -> Vec<NodeId> {
        self.model.selected_nodes()
    }

    /// The topmost item under `pos` other than the root.
    pub fn top_item_at(&self, pos: Point) -> Option<NodeId> {
        let root = self.model.root();
        self.scene.items_at(pos).into_iter().find(|n| *n != root)
    }

    /// The topmost container under `pos` that is not in `excluded` or
    /// inside one of them. Falls back to the root.
    pub fn container_at(&self, pos: Point, excluded: &[NodeId]) -> Option<NodeId> {
        self.scene
            .items_at(pos)
            .into_iter()
            .find(|n| {
                self.model.capabilities(*n).container
                    && !excluded
                        .iter()
                        .any(|e| e == n || self.scene.is_ancestor_item(*e, *n))
            })
            .or_else(|| self.scene.root())
    }
}

/// A tool of the form editor.
///
/// `set_items` seeds the tool from the selection when it becomes current;
/// `clear` drops all per-gesture state and commits open transactions.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn handle(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent);

    fn set_items(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]);

    fn start(&mut self, _ctx: &mut ToolContext<'_>) {}

    fn clear(&mut self, ctx: &mut ToolContext<'_>);

    fn selected_items_changed(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        self.set_items(ctx, items);
    }

    fn instances_completed(&mut self, ctx: &mut ToolContext<'_>, _nodes: &[NodeId]) {
        self.update_indicators(ctx);
    }

    fn instance_information_changed(&mut self, ctx: &mut ToolContext<'_>, _nodes: &[NodeId]) {
        self.update_indicators(ctx);
    }

    /// Bring indicators in line with the scene after geometry changed.
    fn update_indicators(&mut self, _ctx: &mut ToolContext<'_>) {}

    fn collect_overlay(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    );
}
