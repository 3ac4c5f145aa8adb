// Core data structures for raw input events and dispatcher state

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Device-independent key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    F(u8),
    Shift,
    Control,
    Alt,
    Super,
    Other,
}

impl Key {
    /// Parse from string (case-insensitive names, single characters taken literally)
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Key::Char(c.to_ascii_lowercase()));
        }

        let upper = s.to_uppercase();
        if let Some(n) = upper.strip_prefix('F') {
            if let Ok(n) = n.parse::<u8>() {
                return (1..=24).contains(&n).then_some(Key::F(n));
            }
        }

        match upper.as_str() {
            "ENTER" | "RETURN" => Some(Key::Enter),
            "ESC" | "ESCAPE" => Some(Key::Escape),
            "BACKSPACE" => Some(Key::Backspace),
            "TAB" => Some(Key::Tab),
            "SPACE" => Some(Key::Char(' ')),
            "UP" => Some(Key::Up),
            "DOWN" => Some(Key::Down),
            "LEFT" => Some(Key::Left),
            "RIGHT" => Some(Key::Right),
            "HOME" => Some(Key::Home),
            "END" => Some(Key::End),
            "PAGEUP" => Some(Key::PageUp),
            "PAGEDOWN" => Some(Key::PageDown),
            "DELETE" | "DEL" => Some(Key::Delete),
            "SHIFT" => Some(Key::Shift),
            "CTRL" | "CONTROL" => Some(Key::Control),
            "ALT" => Some(Key::Alt),
            "SUPER" | "META" | "WIN" => Some(Key::Super),
            _ => None,
        }
    }

    /// The modifier this key represents, if it is one
    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            Key::Shift => Some(Modifier::Shift),
            Key::Control => Some(Modifier::Control),
            Key::Alt => Some(Modifier::Alt),
            Key::Super => Some(Modifier::Super),
            _ => None,
        }
    }

    /// Letters compare case-insensitively so Shift does not defeat hotkeys
    fn matches(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
        }
    }

    /// Press or auto-repeat
    pub fn is_down(&self) -> bool {
        matches!(self.state, KeyState::Pressed | KeyState::Repeat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Raw pointer event. Positions are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Absolute motion (tablets, touch, terminal mice)
    MovedTo { x: f64, y: f64 },
    /// Relative motion (classic mice)
    MovedBy { dx: f64, dy: f64 },
    Button { button: PointerButton, pressed: bool },
    /// Wheel; positive is away from the user
    Scroll { delta: i32 },
}

/// A key plus the modifiers that must be held with it, e.g. "Ctrl+Q"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    pub key: Key,
    pub modifiers: Vec<Modifier>,
}

impl Hotkey {
    /// Parse "F1", "Super", "Ctrl+Q", "Ctrl+Alt+Delete"
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = Key::from_str(parts.pop()?)?;
        let modifiers = parts
            .into_iter()
            .map(|p| Key::from_str(p).and_then(|k| k.modifier()))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { key, modifiers })
    }

    /// True for a key-down of this hotkey with all its modifiers held
    pub fn matches(&self, event: &KeyEvent, state: &InputState) -> bool {
        event.state == KeyState::Pressed
            && self.key.matches(&event.key)
            && self.modifiers.iter().all(|m| state.modifiers.contains(m))
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{:?}+", m)?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Pointer position, held modifiers and buttons, rebuilt continuously from events
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub pointer: (f64, f64),
    pub modifiers: HashSet<Modifier>,
    pub buttons: HashSet<PointerButton>,
    pub last_key_down: Option<KeyEvent>,
}

impl InputState {
    /// Track modifier and key-down state
    pub fn apply_key(&mut self, event: &KeyEvent) {
        if let Some(modifier) = event.key.modifier() {
            match event.state {
                KeyState::Released => {
                    self.modifiers.remove(&modifier);
                }
                _ => {
                    self.modifiers.insert(modifier);
                }
            }
        }
        if event.state == KeyState::Pressed {
            self.last_key_down = Some(*event);
        }
    }

    /// Track pointer position and buttons. Returns the motion delta.
    pub fn apply_pointer(&mut self, event: &PointerEvent) -> (f64, f64) {
        match *event {
            PointerEvent::MovedTo { x, y } => {
                let delta = (x - self.pointer.0, y - self.pointer.1);
                self.pointer = (x, y);
                delta
            }
            PointerEvent::MovedBy { dx, dy } => {
                self.pointer = (self.pointer.0 + dx, self.pointer.1 + dy);
                (dx, dy)
            }
            PointerEvent::Button { button, pressed } => {
                if pressed {
                    self.buttons.insert(button);
                } else {
                    self.buttons.remove(&button);
                }
                (0.0, 0.0)
            }
            PointerEvent::Scroll { .. } => (0.0, 0.0),
        }
    }

    pub fn is_held(&self, button: PointerButton) -> bool {
        self.buttons.contains(&button)
    }
}
