//! Rubber-band selection.
//!
//! The band is anchored at the press point. Only direct children of the
//! item under the press (or of the root) are candidates, so a band drawn
//! inside a container selects inside that container.

use crate::input::Modifiers;
use crate::scene::FormEditorScene;
use qfe_core::{DesignModel, NodeId, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Replace,
    Add,
    Toggle,
}

impl SelectionMode {
    /// Shift adds, Ctrl/⌘ toggles.
    pub fn for_modifiers(modifiers: Modifiers) -> Self {
        if modifiers.shift {
            SelectionMode::Add
        } else if modifiers.command() {
            SelectionMode::Toggle
        } else {
            SelectionMode::Replace
        }
    }
}

#[derive(Debug, Default)]
pub struct RubberBandSelectionManipulator {
    begin_point: Option<Point>,
    update_point: Point,
    container: Option<NodeId>,
    old_selection: Vec<NodeId>,
}

impl RubberBandSelectionManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.begin_point.is_some()
    }

    pub fn begin(&mut self, model: &dyn DesignModel, scene: &FormEditorScene, point: Point) {
        self.container = scene.items_at(point).first().copied().or(scene.root());
        self.begin_point = Some(point);
        self.update_point = point;
        self.old_selection = model.selected_nodes();
    }

    /// Band rect in scene space.
    pub fn rect(&self) -> Option<Rect> {
        self.begin_point
            .map(|begin| Rect::from_points(begin, self.update_point))
    }

    pub fn update(&mut self, point: Point) {
        if self.is_active() {
            self.update_point = point;
        }
    }

    /// Apply the band to the model selection.
    pub fn select(&self, model: &mut dyn DesignModel, scene: &FormEditorScene, mode: SelectionMode) {
        let (Some(rect), Some(container)) = (self.rect(), self.container) else {
            return;
        };
        let hits: Vec<NodeId> = scene
            .children_in_rect(container, rect)
            .into_iter()
            .filter(|n| {
                model.is_valid(*n)
                    && model.capabilities(*n).movable
                    && !model
                        .instance_parent(*n)
                        .is_some_and(|p| model.capabilities(p).layout)
            })
            .collect();
        let selection = match mode {
            SelectionMode::Replace => hits,
            SelectionMode::Add => {
                let mut nodes = self.old_selection.clone();
                nodes.extend(hits.into_iter().filter(|n| !self.old_selection.contains(n)));
                nodes
            }
            SelectionMode::Toggle => {
                let mut nodes: Vec<NodeId> = self
                    .old_selection
                    .iter()
                    .copied()
                    .filter(|n| !hits.contains(n))
                    .collect();
                nodes.extend(hits.into_iter().filter(|n| !self.old_selection.contains(n)));
                nodes
            }
        };
        log::trace!("rubber band selects {} nodes", selection.len());
        model.set_selected_nodes(selection);
    }

    pub fn end(&mut self) {
        self.begin_point = None;
        self.container = None;
        self.old_selection.clear();
    }
}
