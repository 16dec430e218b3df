//! Input abstraction layer.
//!
//! Normalizes pointer, keyboard, drag-and-drop and dialog events from the
//! host into a unified `InputEvent` enum consumed by tools. Positions are
//! in scene coordinates; timestamps are host milliseconds.

use qfe_core::{Point, PropertyValue, Size};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl on Linux/Windows, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Delete,
    Backspace,
    Enter,
    Tab,
    Char(char),
}

impl Key {
    /// Unit direction of an arrow key.
    pub fn arrow_direction(self) -> Option<(f64, f64)> {
        match self {
            Key::ArrowLeft => Some((-1.0, 0.0)),
            Key::ArrowRight => Some((1.0, 0.0)),
            Key::ArrowUp => Some((0.0, -1.0)),
            Key::ArrowDown => Some((0.0, 1.0)),
            _ => None,
        }
    }

    pub fn is_arrow(self) -> bool {
        self.arrow_direction().is_some()
    }
}

/// Content carried by a drag from outside the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    /// An entry of the item library: a QML type plus its initial properties.
    LibraryItem {
        type_name: String,
        properties: Vec<(String, PropertyValue)>,
        size: Option<Size>,
    },
    /// An image file from the asset library.
    ImageAsset(String),
    /// A font file from the asset library; the string is the family name.
    FontAsset(String),
}

pub const ITEM_LIBRARY_MIME: &str = "application/vnd.qtdesignstudio.itemlibraryinfo";
pub const ASSETS_MIME: &str = "application/vnd.qtdesignstudio.assets";

const IMAGE_SUFFIXES: [&str; 6] = [".png", ".jpg", ".jpeg", ".svg", ".gif", ".webp"];
const FONT_SUFFIXES: [&str; 3] = [".ttf", ".otf", ".woff"];

impl DragPayload {
    /// Recognize a drag by MIME type. Library entries carry the QML type
    /// name; asset drags carry a file path whose suffix selects the kind.
    pub fn from_mime(mime: &str, data: &str) -> Option<Self> {
        match mime {
            ITEM_LIBRARY_MIME if !data.trim().is_empty() => Some(DragPayload::LibraryItem {
                type_name: data.trim().to_string(),
                properties: Vec::new(),
                size: None,
            }),
            ASSETS_MIME => {
                let path = data.trim();
                let lower = path.to_ascii_lowercase();
                if IMAGE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
                    Some(DragPayload::ImageAsset(path.to_string()))
                } else if FONT_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
                    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
                    let family = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
                    Some(DragPayload::FontAsset(family.to_string()))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Outcome of a host-side dialog opened by a custom tool.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogResult {
    /// Live value while the dialog is still open (e.g. color picker hover).
    Preview(PropertyValue),
    Accepted(PropertyValue),
    Rejected,
}

/// A normalized input event from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: Point,
        modifiers: Modifiers,
        time_ms: u64,
    },

    /// Pointer moved with a button held.
    PointerMove {
        pos: Point,
        modifiers: Modifiers,
        time_ms: u64,
    },

    PointerUp {
        pos: Point,
        modifiers: Modifiers,
        time_ms: u64,
    },

    DoubleClick {
        pos: Point,
        modifiers: Modifiers,
    },

    /// Pointer moved with no button held.
    HoverMove {
        pos: Point,
        modifiers: Modifiers,
    },

    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },

    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },

    DragEnter {
        pos: Point,
        payload: DragPayload,
    },

    DragMove {
        pos: Point,
        modifiers: Modifiers,
    },

    DragLeave,

    Drop {
        pos: Point,
        modifiers: Modifiers,
    },

    Dialog(DialogResult),
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, time_ms: u64) -> Self {
        Self::PointerDown {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
            time_ms,
        }
    }

    pub fn pointer_move(x: f64, y: f64, time_ms: u64) -> Self {
        Self::PointerMove {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
            time_ms,
        }
    }

    pub fn pointer_up(x: f64, y: f64, time_ms: u64) -> Self {
        Self::PointerUp {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
            time_ms,
        }
    }

    pub fn hover(x: f64, y: f64) -> Self {
        Self::HoverMove {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_down(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_up(key: Key) -> Self {
        Self::KeyUp {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the modifier state of events that carry one.
    pub fn with_modifiers(mut self, new: Modifiers) -> Self {
        match &mut self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::DoubleClick { modifiers, .. }
            | Self::HoverMove { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::DragMove { modifiers, .. }
            | Self::Drop { modifiers, .. } => *modifiers = new,
            Self::DragEnter { .. } | Self::DragLeave | Self::Dialog(_) => {}
        }
        self
    }

    /// Extract position if this is a pointer or drag event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerUp { pos, .. }
            | Self::DoubleClick { pos, .. }
            | Self::HoverMove { pos, .. }
            | Self::DragEnter { pos, .. }
            | Self::DragMove { pos, .. }
            | Self::Drop { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::DoubleClick { modifiers, .. }
            | Self::HoverMove { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::DragMove { modifiers, .. }
            | Self::Drop { modifiers, .. } => *modifiers,
            _ => Modifiers::NONE,
        }
    }
}
