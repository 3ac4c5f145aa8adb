use std::collections::HashMap;
use tracing::debug;

use self::window::{WindowId, WindowInfo, WindowSurface};

pub mod window;

/// Open windows, their stacking order and keyboard focus.
///
/// `window_stack` is the z-order, bottom first. `focus` is either `None` (only
/// when the store is empty) or the id of a window in the store.
#[derive(Default)]
pub struct WindowStore {
    windows: HashMap<WindowId, WindowSurface>,
    window_stack: Vec<WindowId>,
    focus: Option<WindowId>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a window on top of the stack and focus it
    pub fn add(&mut self, window: WindowSurface) -> WindowId {
        let id = window.id;
        debug!(%id, title = %window.title, "window added");

        if self.windows.insert(id, window).is_some() {
            // Same id re-added: keep one stack entry
            self.window_stack.retain(|w| *w != id);
        }
        self.window_stack.push(id);
        self.focus = Some(id);
        self.normalize_stack();
        id
    }

    /// Close a window. Removing an unknown id is a no-op.
    /// Returns the window that was removed.
    pub fn remove(&mut self, id: &WindowId) -> Option<WindowSurface> {
        let removed = self.windows.remove(id)?;
        self.window_stack.retain(|w| w != id);

        if self.focus.as_ref() == Some(id) {
            // Focus falls to the next-highest window
            self.focus = self.window_stack.last().copied();
        }

        self.normalize_stack();
        debug!(%id, focus = ?self.focus, "window removed");
        Some(removed)
    }

    /// Move a window to the top and focus it. Returns false if the id is unknown.
    pub fn raise_to_top(&mut self, id: &WindowId) -> bool {
        let Some(index) = self.window_stack.iter().position(|w| w == id) else {
            return false;
        };

        if index + 1 != self.window_stack.len() {
            let id = self.window_stack.remove(index);
            self.window_stack.push(id);
            self.normalize_stack();
        }
        self.focus = Some(*id);
        true
    }

    /// Render order: lowest z-order first
    pub fn iter_back_to_front(&self) -> impl Iterator<Item = &WindowSurface> + '_ {
        self.window_stack
            .iter()
            .filter_map(|id| self.windows.get(id))
    }

    /// Topmost window containing the point
    pub fn window_at(&self, x: f64, y: f64) -> Option<WindowId> {
        self.window_stack
            .iter()
            .rev()
            .find(|id| {
                self.windows
                    .get(id)
                    .is_some_and(|w| w.bounds.contains(x, y))
            })
            .copied()
    }

    pub fn title_bar_contains(&self, id: &WindowId, x: f64, y: f64) -> bool {
        self.windows
            .get(id)
            .is_some_and(|w| w.title_bar().contains(x, y))
    }

    pub fn move_by(&mut self, id: &WindowId, dx: f64, dy: f64) {
        if let Some(window) = self.windows.get_mut(id) {
            window.bounds.translate(dx, dy);
        }
    }

    pub fn focus(&self) -> Option<WindowId> {
        self.focus
    }

    pub fn focused_mut(&mut self) -> Option<&mut WindowSurface> {
        let id = self.focus?;
        self.windows.get_mut(&id)
    }

    pub fn get(&self, id: &WindowId) -> Option<&WindowSurface> {
        self.windows.get(id)
    }

    pub fn get_mut(&mut self, id: &WindowId) -> Option<&mut WindowSurface> {
        self.windows.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.window_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window_stack.is_empty()
    }

    /// Ids bottom to top
    pub fn stack(&self) -> &[WindowId] {
        &self.window_stack
    }

    pub fn snapshot(&self) -> Vec<WindowInfo> {
        self.iter_back_to_front()
            .map(|w| w.info(self.focus == Some(w.id)))
            .collect()
    }

    fn normalize_stack(&mut self) {
        for (i, win_id) in self.window_stack.iter().enumerate() {
            if let Some(win) = self.windows.get_mut(win_id) {
                win.z_order = (i as u32) + 1;
            }
        }
    }
}
