pub mod config;
pub mod indicators;
pub mod input;
pub mod manipulators;
pub mod scene;
pub mod snapping;
pub mod toolbox;
pub mod tools;
pub mod view;
pub mod zoom;

pub use config::{ConfigError, EditorConfig};
pub use indicators::OverlayItem;
pub use input::{DialogResult, DragPayload, InputEvent, Key, Modifiers};
pub use scene::{FormEditorItem, FormEditorScene};
pub use snapping::{Snapper, Snapping};
pub use toolbox::ToolBox;
pub use tools::{CustomTool, Tool, ToolContext, ToolKind, ToolRequest};
pub use view::FormEditorView;
pub use zoom::ZoomLevels;
