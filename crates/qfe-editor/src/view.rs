//! The form editor view: model, scene and tools wired together.
//!
//! The host feeds input events in and reads overlay items out. Model
//! notifications are drained after every event, in order, and mirrored into
//! the scene before the current tool hears about them.

use crate::config::{ConfigError, EditorConfig};
use crate::indicators::OverlayItem;
use crate::input::InputEvent;
use crate::scene::FormEditorScene;
use crate::toolbox::ToolBox;
use crate::tools::{
    AnnotationTool, ColorTool, CustomTool, SourceTool, TextTool, ToolContext, ToolKind,
    ToolRequest,
};
use crate::zoom::ZoomLevels;
use qfe_core::{DesignModel, ModelNotification, NodeId};

/// Notification handlers may write to the model again; stop after this
/// many rounds.
const MAX_NOTIFICATION_ROUNDS: usize = 16;

pub struct FormEditorView<M: DesignModel> {
    model: M,
    scene: FormEditorScene,
    toolbox: ToolBox,
    config: EditorConfig,
    zoom_levels: ZoomLevels,
}

impl<M: DesignModel> FormEditorView<M> {
    /// Build the scene from `model` and register the bundled custom tools.
    /// Starts with the selection tool.
    pub fn new(model: M, config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut scene = FormEditorScene::new(&config);
        scene.sync_from_model(&model);
        let mut toolbox = ToolBox::new(&config);
        toolbox.register_custom_tool(Box::new(AnnotationTool::new()));
        toolbox.register_custom_tool(Box::new(ColorTool::new()));
        toolbox.register_custom_tool(Box::new(TextTool::new()));
        toolbox.register_custom_tool(Box::new(SourceTool::new()));
        let zoom_levels = ZoomLevels::new(&config.zoom_levels);
        let mut view = Self {
            model,
            scene,
            toolbox,
            config,
            zoom_levels,
        };
        // The scene was just built from scratch.
        view.model.take_notifications();
        let selection = view.model.selected_nodes();
        view.with_tools(|toolbox, ctx| toolbox.selected_items_changed(ctx, &selection));
        log::info!("form editor ready with {} items", view.scene.len());
        Ok(view)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Direct model access for host-side edits. Call
    /// [`process_notifications`](Self::process_notifications) afterwards.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn scene(&self) -> &FormEditorScene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn current_tool(&self) -> ToolKind {
        self.toolbox.current_kind()
    }

    pub fn current_custom_tool(&self) -> Option<&str> {
        self.toolbox.current_custom_name()
    }

    pub fn register_custom_tool(&mut self, tool: Box<dyn CustomTool>) {
        self.toolbox.register_custom_tool(tool);
    }

    fn with_tools<R>(&mut self, f: impl FnOnce(&mut ToolBox, &mut ToolContext<'_>) -> R) -> R {
        let mut ctx = ToolContext::new(&mut self.model, &mut self.scene, &self.config);
        f(&mut self.toolbox, &mut ctx)
    }

    // ─── Events ───────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) {
        log::trace!("event {event:?}");
        self.with_tools(|toolbox, ctx| toolbox.handle_event(ctx, event));
        self.process_notifications();
    }

    /// Switch tools on behalf of the host (toolbar, shortcuts).
    pub fn change_tool(&mut self, request: ToolRequest) -> bool {
        let changed = self.with_tools(|toolbox, ctx| toolbox.change_tool(ctx, request));
        self.process_notifications();
        changed
    }

    /// Mirror queued model changes into the scene and the current tool.
    pub fn process_notifications(&mut self) {
        for _ in 0..MAX_NOTIFICATION_ROUNDS {
            let batch = self.model.take_notifications();
            if batch.is_empty() {
                return;
            }
            for notification in batch {
                self.apply(notification);
            }
        }
        log::warn!("model notifications did not settle");
    }

    fn apply(&mut self, notification: ModelNotification) {
        match notification {
            ModelNotification::SelectionChanged { selected, .. } => {
                self.with_tools(|toolbox, ctx| toolbox.selected_items_changed(ctx, &selected));
            }
            ModelNotification::NodeAdded { node, .. } => {
                self.scene.add_item(&self.model, node);
            }
            ModelNotification::NodeRemoved { node, .. } => {
                self.scene.remove_item(node);
                self.scene.prune(&self.model);
            }
            ModelNotification::NodeReparented { node, .. } => {
                self.scene.reparent_item(&self.model, node);
            }
            ModelNotification::InstancesCompleted(nodes) => {
                self.scene.update_geometry(&self.model, &nodes);
                self.with_tools(|toolbox, ctx| toolbox.instances_completed(ctx, &nodes));
            }
            ModelNotification::InstanceInformationsChanged(nodes) => {
                self.scene.update_geometry(&self.model, &nodes);
                self.with_tools(|toolbox, ctx| toolbox.instance_information_changed(ctx, &nodes));
            }
            ModelNotification::InstancesRenderImageChanged(nodes) => {
                self.scene.update_render_images(&self.model, &nodes);
            }
            ModelNotification::InstancePropertyChanged(changes) => {
                let mut nodes: Vec<NodeId> = changes.into_iter().map(|(node, _)| node).collect();
                nodes.dedup();
                for node in nodes {
                    self.scene.sync_node(&self.model, node);
                }
            }
        }
    }

    // ─── Overlay & zoom ───────────────────────────────────────────────────

    /// Everything the host should draw above the scene, back to front.
    pub fn overlay(&self) -> Vec<OverlayItem> {
        let mut out = Vec::new();
        self.toolbox.collect_overlay(&self.model, &self.scene, &mut out);
        out
    }

    pub fn zoom(&self) -> f64 {
        self.scene.zoom()
    }

    pub fn zoom_levels(&self) -> &ZoomLevels {
        &self.zoom_levels
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.scene.set_zoom(self.zoom_levels.clamp(zoom));
    }

    pub fn zoom_in(&mut self) {
        let next = self.zoom_levels.zoom_in(self.scene.zoom());
        self.scene.set_zoom(next);
    }

    pub fn zoom_out(&mut self) {
        let next = self.zoom_levels.zoom_out(self.scene.zoom());
        self.scene.set_zoom(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use pretty_assertions::assert_eq;
    use qfe_core::model::ModelNode;
    use qfe_core::{PropertyValue, SceneModel};

    fn view() -> (FormEditorView<SceneModel>, NodeId) {
        let mut model = SceneModel::new("vw_root", "Item", 400.0, 300.0);
        let root = model.root();
        let a = model
            .add_node(
                root,
                ModelNode::new(NodeId::intern("vw_a"), "Rectangle")
                    .with_geometry(100.0, 100.0, 50.0, 50.0),
            )
            .unwrap();
        let view = FormEditorView::new(model, EditorConfig::default()).unwrap();
        (view, a)
    }

    #[test]
    fn click_selects_and_escape_clears() {
        let (mut view, a) = view();
        view.handle_event(&InputEvent::pointer_down(120.0, 120.0, 0));
        view.handle_event(&InputEvent::pointer_up(120.0, 120.0, 10));
        assert_eq!(view.model().selected_nodes(), vec![a]);
        view.handle_event(&InputEvent::key_down(Key::Escape));
        assert!(view.model().selected_nodes().is_empty());
        assert_eq!(view.current_tool(), ToolKind::Selection);
    }

    #[test]
    fn delete_removes_the_scene_item() {
        let (mut view, a) = view();
        view.model_mut().set_selected_nodes(vec![a]);
        view.process_notifications();
        view.handle_event(&InputEvent::key_down(Key::Delete));
        assert!(!view.model().is_valid(a));
        assert!(!view.scene().has_item(a));
    }

    #[test]
    fn zoom_steps_through_levels() {
        let (mut view, _) = view();
        view.zoom_in();
        assert_eq!(view.zoom(), 1.1);
        view.zoom_out();
        view.zoom_out();
        assert_eq!(view.zoom(), 0.9);
    }

    #[test]
    fn nan_zoom_keeps_the_scene_usable() {
        let (mut view, a) = view();
        view.set_zoom(f64::NAN);
        assert_eq!(view.zoom(), 1.0);
        assert!(view.scene().handle_extent().is_finite());
        view.handle_event(&InputEvent::pointer_down(120.0, 120.0, 0));
        view.handle_event(&InputEvent::pointer_up(120.0, 120.0, 10));
        assert_eq!(view.model().selected_nodes(), vec![a]);
    }

    #[test]
    fn item_creator_draws_and_returns_to_selection() {
        let (mut view, _) = view();
        assert!(view.change_tool(ToolRequest::ItemCreator("Rectangle".into())));
        view.handle_event(&InputEvent::pointer_down(200.0, 200.0, 0));
        view.handle_event(&InputEvent::pointer_move(260.0, 240.0, 10));
        view.handle_event(&InputEvent::pointer_up(260.0, 240.0, 20));
        let selected = view.model().selected_nodes();
        assert_eq!(selected.len(), 1);
        let node = selected[0];
        assert_eq!(view.model().type_name(node).as_deref(), Some("Rectangle"));
        assert_eq!(
            view.model().property(node, "width"),
            Some(&PropertyValue::Number(60.0))
        );
        assert_eq!(
            view.model().property(node, "height"),
            Some(&PropertyValue::Number(40.0))
        );
        assert!(view.scene().has_item(node));
        assert_eq!(view.current_tool(), ToolKind::Selection);
    }
}
