use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geometry::Rect;
use crate::input_handler::{KeyEvent, PointerButton};
use crate::render::Renderer;

/// Height of the draggable title bar at the top of every window
pub const TITLE_BAR_HEIGHT: f64 = 24.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell windows apart in logs
        let s = self.0.simple().to_string();
        f.write_str(&s[..8])
    }
}

/// What a window's content asks the window manager to do after handling input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowAction {
    None,
    /// Application is tearing the window down
    Close,
}

/// Application-supplied window content: draws itself and reacts to input
pub trait WindowContent {
    /// Draw into `area` (the window body, below the title bar)
    fn draw(&self, renderer: &mut dyn Renderer, area: Rect);

    fn on_key(&mut self, _event: &KeyEvent) -> WindowAction {
        WindowAction::None
    }

    /// Pointer press inside the body; coordinates are relative to the body's top-left
    fn on_pointer(&mut self, _x: f64, _y: f64, _button: PointerButton) -> WindowAction {
        WindowAction::None
    }
}

pub struct WindowSurface {
    pub id: WindowId,
    pub title: String,
    pub bounds: Rect,           // Position and size, screen pixels
    pub z_order: u32,           // 1 = bottom; assigned by the store
    content: Box<dyn WindowContent>,
}

impl WindowSurface {
    pub fn new(title: impl Into<String>, bounds: Rect, content: Box<dyn WindowContent>) -> Self {
        Self {
            id: WindowId::new(),
            title: title.into(),
            bounds,
            z_order: 0,
            content,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.bounds.x, self.bounds.y)
    }

    pub fn size(&self) -> (f64, f64) {
        (self.bounds.width, self.bounds.height)
    }

    pub fn title_bar(&self) -> Rect {
        self.bounds.split_top(TITLE_BAR_HEIGHT).0
    }

    pub fn body(&self) -> Rect {
        self.bounds.split_top(TITLE_BAR_HEIGHT).1
    }

    pub fn content(&self) -> &dyn WindowContent {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> &mut dyn WindowContent {
        self.content.as_mut()
    }

    pub fn info(&self, focused: bool) -> WindowInfo {
        WindowInfo {
            id: self.id,
            title: self.title.clone(),
            bounds: self.bounds,
            z_order: self.z_order,
            focused,
        }
    }
}

impl fmt::Debug for WindowSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSurface")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("bounds", &self.bounds)
            .field("z_order", &self.z_order)
            .finish_non_exhaustive()
    }
}

/// Serializable snapshot of a window, for logs and inspection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub bounds: Rect,
    pub z_order: u32,
    pub focused: bool,
}
