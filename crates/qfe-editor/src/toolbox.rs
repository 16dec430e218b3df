//! The tool state machine.
//!
//! Built-in tools live for the whole editor session and keep their
//! configuration; custom tools are registered by the host. Exactly one tool
//! is current. Switches requested while handling an event are performed
//! here, after the event, and may carry events to replay on the new tool.

use crate::config::EditorConfig;
use crate::indicators::OverlayItem;
use crate::input::InputEvent;
use crate::scene::FormEditorScene;
use crate::tools::{
    AnchorTool, CustomTool, DragTool, ItemCreatorTool, MoveTool, ResizeTool, RotationTool,
    SelectionTool, Tool, ToolContext, ToolKind, ToolRequest,
};
use qfe_core::{DesignModel, NodeId};
use std::collections::VecDeque;

/// Upper bound on switches per event, so tools that bounce an event back
/// and forth cannot spin forever.
const MAX_SWITCHES_PER_EVENT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Builtin(ToolKind),
    Custom(usize),
}

pub struct ToolBox {
    selection: SelectionTool,
    move_tool: MoveTool,
    resize: ResizeTool,
    rotation: RotationTool,
    drag: DragTool,
    item_creator: ItemCreatorTool,
    anchor: AnchorTool,
    custom: Vec<Box<dyn CustomTool>>,
    current: Slot,
}

impl ToolBox {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            selection: SelectionTool::new(),
            move_tool: MoveTool::new(config),
            resize: ResizeTool::new(config),
            rotation: RotationTool::new(),
            drag: DragTool::new(config),
            item_creator: ItemCreatorTool::new(),
            anchor: AnchorTool::new(),
            custom: Vec::new(),
            current: Slot::Builtin(ToolKind::Selection),
        }
    }

    /// Add a custom tool. Earlier registrations win priority ties.
    pub fn register_custom_tool(&mut self, tool: Box<dyn CustomTool>) {
        log::debug!("registered custom tool {:?}", tool.name());
        self.custom.push(tool);
    }

    pub fn custom_tool_names(&self) -> Vec<&str> {
        self.custom.iter().map(|t| t.name()).collect()
    }

    pub fn current_kind(&self) -> ToolKind {
        self.current_tool().kind()
    }

    /// Name of the current tool if it is a custom one.
    pub fn current_custom_name(&self) -> Option<&str> {
        match self.current {
            Slot::Custom(index) => self.custom.get(index).map(|t| t.name()),
            Slot::Builtin(_) => None,
        }
    }

    /// The type the item creator will draw.
    pub fn item_creator_type(&self) -> &str {
        self.item_creator.type_name()
    }

    fn tool(&self, slot: Slot) -> &dyn Tool {
        match slot {
            Slot::Builtin(ToolKind::Move) => &self.move_tool,
            Slot::Builtin(ToolKind::Resize) => &self.resize,
            Slot::Builtin(ToolKind::Rotate) => &self.rotation,
            Slot::Builtin(ToolKind::Drag) => &self.drag,
            Slot::Builtin(ToolKind::ItemCreator) => &self.item_creator,
            Slot::Builtin(ToolKind::Anchor) => &self.anchor,
            Slot::Custom(index) => match self.custom.get(index) {
                Some(tool) => tool.as_ref() as &dyn Tool,
                None => &self.selection,
            },
            Slot::Builtin(ToolKind::Selection | ToolKind::Custom) => &self.selection,
        }
    }

    fn tool_mut(&mut self, slot: Slot) -> &mut dyn Tool {
        match slot {
            Slot::Builtin(ToolKind::Move) => &mut self.move_tool,
            Slot::Builtin(ToolKind::Resize) => &mut self.resize,
            Slot::Builtin(ToolKind::Rotate) => &mut self.rotation,
            Slot::Builtin(ToolKind::Drag) => &mut self.drag,
            Slot::Builtin(ToolKind::ItemCreator) => &mut self.item_creator,
            Slot::Builtin(ToolKind::Anchor) => &mut self.anchor,
            Slot::Custom(index) => match self.custom.get_mut(index) {
                Some(tool) => tool.as_mut() as &mut dyn Tool,
                None => &mut self.selection,
            },
            Slot::Builtin(ToolKind::Selection | ToolKind::Custom) => &mut self.selection,
        }
    }

    fn current_tool(&self) -> &dyn Tool {
        self.tool(self.current)
    }

    // ─── Dispatch ─────────────────────────────────────────────────────────

    /// Hand `event` to the current tool and carry out any switches it asks
    /// for, replaying events on the incoming tool.
    pub fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &InputEvent) {
        let mut queue = VecDeque::from([event.clone()]);
        let mut switches = 0;
        while let Some(event) = queue.pop_front() {
            self.tool_mut(self.current).handle(ctx, &event);
            while let Some(switch) = ctx.take_switch() {
                switches += 1;
                if switches > MAX_SWITCHES_PER_EVENT {
                    log::warn!("tool switch limit reached; dropping {:?}", switch.request);
                    return;
                }
                if self.change_tool(ctx, switch.request) {
                    for replayed in switch.replay.into_iter().rev() {
                        queue.push_front(replayed);
                    }
                }
            }
        }
    }

    fn resolve(&mut self, ctx: &ToolContext<'_>, request: ToolRequest) -> Option<Slot> {
        let slot = match request {
            ToolRequest::Selection => Slot::Builtin(ToolKind::Selection),
            ToolRequest::Move => Slot::Builtin(ToolKind::Move),
            ToolRequest::Resize => Slot::Builtin(ToolKind::Resize),
            ToolRequest::Rotate => Slot::Builtin(ToolKind::Rotate),
            ToolRequest::Drag => Slot::Builtin(ToolKind::Drag),
            ToolRequest::Anchor => Slot::Builtin(ToolKind::Anchor),
            ToolRequest::ItemCreator(type_name) => {
                self.item_creator.set_type_name(type_name);
                Slot::Builtin(ToolKind::ItemCreator)
            }
            ToolRequest::Custom { name: Some(name) } => {
                let Some(index) = self.custom.iter().position(|t| t.name() == name) else {
                    log::warn!("no custom tool named {name:?}");
                    return None;
                };
                Slot::Custom(index)
            }
            ToolRequest::Custom { name: None } => {
                let node = ctx.selection().first().copied()?;
                Slot::Custom(self.best_custom_tool(&*ctx.model, node)?)
            }
        };
        Some(slot)
    }

    /// The registered tool rating `node` highest. A rating must beat zero;
    /// on equal ratings the earlier registration wins.
    fn best_custom_tool(&self, model: &dyn DesignModel, node: NodeId) -> Option<usize> {
        let mut best = None;
        let mut rank = 0;
        for (index, tool) in self.custom.iter().enumerate() {
            let wanted = tool.want_handle_item(model, node);
            if wanted > rank {
                rank = wanted;
                best = Some(index);
            }
        }
        best
    }

    /// Switch tools. Returns false when the request names no usable tool or
    /// the tool is already current.
    pub fn change_tool(&mut self, ctx: &mut ToolContext<'_>, request: ToolRequest) -> bool {
        let Some(next) = self.resolve(ctx, request) else {
            return false;
        };
        if next == self.current {
            return false;
        }
        log::debug!("tool {:?} -> {:?}", self.current, next);
        let previous = self.current;
        let outgoing = self.tool_mut(previous);
        outgoing.update_indicators(ctx);
        outgoing.clear(ctx);

        self.current = next;
        let items = ctx.selection();
        let incoming = self.tool_mut(next);
        incoming.clear(ctx);
        incoming.set_items(ctx, &items);
        incoming.start(ctx);
        true
    }

    // ─── Model notifications ──────────────────────────────────────────────

    /// Tools that only make sense with a selection fall back to the
    /// selection tool when it empties.
    pub fn selected_items_changed(&mut self, ctx: &mut ToolContext<'_>, items: &[NodeId]) {
        let needs_selection = matches!(
            self.current_kind(),
            ToolKind::Move
                | ToolKind::Resize
                | ToolKind::Rotate
                | ToolKind::Anchor
                | ToolKind::Custom
        );
        if items.is_empty() && needs_selection {
            self.change_tool(ctx, ToolRequest::Selection);
            return;
        }
        self.tool_mut(self.current).selected_items_changed(ctx, items);
        self.finish_switches(ctx);
    }

    pub fn instances_completed(&mut self, ctx: &mut ToolContext<'_>, nodes: &[NodeId]) {
        self.tool_mut(self.current).instances_completed(ctx, nodes);
        self.finish_switches(ctx);
    }

    pub fn instance_information_changed(&mut self, ctx: &mut ToolContext<'_>, nodes: &[NodeId]) {
        self.tool_mut(self.current)
            .instance_information_changed(ctx, nodes);
        self.finish_switches(ctx);
    }

    /// Notification handlers have no event to replay onto; any pending
    /// switch is performed without one.
    fn finish_switches(&mut self, ctx: &mut ToolContext<'_>) {
        for _ in 0..MAX_SWITCHES_PER_EVENT {
            let Some(switch) = ctx.take_switch() else {
                return;
            };
            self.change_tool(ctx, switch.request);
        }
    }

    pub fn collect_overlay(
        &self,
        model: &dyn DesignModel,
        scene: &FormEditorScene,
        out: &mut Vec<OverlayItem>,
    ) {
        self.current_tool().collect_overlay(model, scene, out);
    }
}
