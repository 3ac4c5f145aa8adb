// Input routing: every raw event goes to exactly one of
// hotkeys, launcher menu, paint overlay or the window layer.

use tracing::{debug, trace};

use super::types::{Hotkey, InputState, Key, KeyEvent, PointerButton, PointerEvent};
use crate::compositor::Desktop;
use crate::config::HotkeyConfig;
use crate::error::ConfigError;
use crate::launcher::{MenuNav, MenuOutcome};
use crate::state::window::{WindowAction, WindowId};

#[derive(Debug, Clone)]
pub struct Hotkeys {
    pub menu: Hotkey,
    pub paint: Hotkey,
    pub clear_paint: Hotkey,
    pub quit: Hotkey,
}

impl Hotkeys {
    pub fn from_config(config: &HotkeyConfig) -> Result<Self, ConfigError> {
        let parse = |name: &'static str, value: &str| {
            Hotkey::parse(value).ok_or_else(|| ConfigError::InvalidHotkey {
                name,
                value: value.to_string(),
            })
        };
        Ok(Self {
            menu: parse("menu", &config.menu)?,
            paint: parse("paint", &config.paint)?,
            clear_paint: parse("clear_paint", &config.clear_paint)?,
            quit: parse("quit", &config.quit)?,
        })
    }
}

/// Where an event ended up
#[derive(Debug)]
pub enum Routed {
    Quit,
    Menu(MenuOutcome),
    PaintToggled { active: bool },
    Paint,
    Window(WindowId),
    /// The window's content asked to close and was removed
    WindowClosed(WindowId),
    /// Pointer press on the bare background
    Background,
    Ignored,
}

/// Pointer gesture in progress on the window layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Move(WindowId),
}

pub struct Dispatcher {
    hotkeys: Hotkeys,
    state: InputState,
    gesture: Option<Gesture>,
}

impl Dispatcher {
    pub fn new(hotkeys: Hotkeys) -> Self {
        Self {
            hotkeys,
            state: InputState::default(),
            gesture: None,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn hotkeys(&self) -> &Hotkeys {
        &self.hotkeys
    }

    pub fn dispatch_key(&mut self, event: KeyEvent, desktop: &mut Desktop) -> Routed {
        self.state.apply_key(&event);

        let routed = if self.hotkeys.quit.matches(&event, &self.state) {
            Routed::Quit
        } else if self.hotkeys.menu.matches(&event, &self.state) {
            self.gesture = None;
            // The release of a held brush would land in the modal menu
            desktop.paint.end_stroke();
            Routed::Menu(desktop.menu.toggle())
        } else if self.hotkeys.paint.matches(&event, &self.state) {
            self.gesture = None;
            Routed::PaintToggled {
                active: desktop.paint.toggle(),
            }
        } else if desktop.menu.is_open() {
            self.menu_key(event, desktop)
        } else if desktop.paint.is_active() {
            if self.hotkeys.clear_paint.matches(&event, &self.state) {
                desktop.paint.clear_canvas();
                Routed::Paint
            } else {
                Routed::Ignored
            }
        } else if event.key.modifier().is_some() {
            Routed::Ignored
        } else {
            self.window_key(event, desktop)
        };

        trace!(?event, ?routed, "key dispatched");
        routed
    }

    pub fn dispatch_pointer(&mut self, event: PointerEvent, desktop: &mut Desktop) -> Routed {
        let (dx, dy) = self.state.apply_pointer(&event);
        let (x, y) = self.state.pointer;

        let routed = if desktop.menu.is_open() {
            self.menu_pointer(event, x, y, desktop)
        } else if desktop.paint.is_active() {
            self.paint_pointer(event, x, y, desktop)
        } else {
            self.window_pointer(event, x, y, dx, dy, desktop)
        };

        trace!(?event, ?routed, "pointer dispatched");
        routed
    }

    // ===== Launcher menu =====

    fn menu_key(&mut self, event: KeyEvent, desktop: &mut Desktop) -> Routed {
        if !event.is_down() {
            return Routed::Ignored;
        }
        let nav = match event.key {
            Key::Up => MenuNav::Up,
            Key::Down => MenuNav::Down,
            Key::Right => MenuNav::Into,
            Key::Left | Key::Backspace => MenuNav::Back,
            Key::Enter => {
                return Routed::Menu(desktop.menu.select(&desktop.registry, &mut desktop.windows, None));
            }
            Key::Escape => return Routed::Menu(desktop.menu.close()),
            // Menu is modal: everything else is swallowed
            _ => return Routed::Ignored,
        };
        Routed::Menu(desktop.menu.navigate(desktop.registry.tree(), nav, &desktop.menu_layout))
    }

    fn menu_pointer(&mut self, event: PointerEvent, x: f64, y: f64, desktop: &mut Desktop) -> Routed {
        let PointerEvent::Button {
            button: PointerButton::Left,
            pressed: true,
        } = event
        else {
            return Routed::Ignored;
        };

        let rows = desktop
            .menu
            .items(desktop.registry.tree(), &desktop.menu_layout)
            .len();
        match desktop.menu_layout.row_at(x, y, rows) {
            Some(row) => Routed::Menu(desktop.menu.select_row(row, &desktop.registry, &mut desktop.windows)),
            None => Routed::Ignored,
        }
    }

    // ===== Paint overlay =====

    fn paint_pointer(&mut self, event: PointerEvent, x: f64, y: f64, desktop: &mut Desktop) -> Routed {
        let paint = &mut desktop.paint;
        match event {
            PointerEvent::Button { button, pressed } => match (button, pressed) {
                (PointerButton::Left, true) => paint.begin_stroke(x, y),
                (PointerButton::Left, false) => paint.end_stroke(),
                (PointerButton::Right, true) => paint.cycle_color(),
                (PointerButton::Middle, true) => paint.cycle_shape(),
                _ => {}
            },
            PointerEvent::MovedTo { .. } | PointerEvent::MovedBy { .. } => {
                if self.state.is_held(PointerButton::Left) {
                    paint.extend_stroke(x, y);
                }
            }
            PointerEvent::Scroll { delta } => paint.adjust_radius(delta as f64),
        }
        Routed::Paint
    }

    // ===== Window layer =====

    fn window_key(&mut self, event: KeyEvent, desktop: &mut Desktop) -> Routed {
        let Some(window) = desktop.windows.focused_mut() else {
            return Routed::Ignored;
        };
        let id = window.id;
        let action = window.content_mut().on_key(&event);
        match action {
            WindowAction::Close => self.close_window(id, desktop),
            WindowAction::None => Routed::Window(id),
        }
    }

    fn window_pointer(
        &mut self,
        event: PointerEvent,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        desktop: &mut Desktop,
    ) -> Routed {
        match event {
            PointerEvent::Button {
                button,
                pressed: true,
            } => {
                let Some(id) = desktop.windows.window_at(x, y) else {
                    self.gesture = None;
                    return Routed::Background;
                };
                desktop.windows.raise_to_top(&id);

                if button == PointerButton::Left && desktop.windows.title_bar_contains(&id, x, y) {
                    debug!(%id, "move gesture started");
                    self.gesture = Some(Gesture::Move(id));
                    return Routed::Window(id);
                }

                let Some(window) = desktop.windows.get_mut(&id) else {
                    return Routed::Ignored;
                };
                let body = window.body();
                let action = window.content_mut().on_pointer(x - body.x, y - body.y, button);
                match action {
                    WindowAction::Close => self.close_window(id, desktop),
                    WindowAction::None => Routed::Window(id),
                }
            }
            PointerEvent::Button {
                button: PointerButton::Left,
                pressed: false,
            } => match self.gesture.take() {
                Some(Gesture::Move(id)) => Routed::Window(id),
                None => Routed::Ignored,
            },
            PointerEvent::MovedTo { .. } | PointerEvent::MovedBy { .. } => match self.gesture {
                Some(Gesture::Move(id)) if self.state.is_held(PointerButton::Left) => {
                    desktop.windows.move_by(&id, dx, dy);
                    Routed::Window(id)
                }
                _ => Routed::Ignored,
            },
            _ => Routed::Ignored,
        }
    }

    fn close_window(&mut self, id: WindowId, desktop: &mut Desktop) -> Routed {
        if self.gesture == Some(Gesture::Move(id)) {
            self.gesture = None;
        }
        desktop.windows.remove(&id);
        Routed::WindowClosed(id)
    }
}
