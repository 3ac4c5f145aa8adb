// Input sources: two independently polled event streams (keyboard, pointer)

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::info;

use super::types::{Key, KeyEvent, KeyState, PointerButton, PointerEvent};
use crate::error::{Device, DeviceReadError};

/// Non-blocking event streams. Each poll returns everything pending right now,
/// or an empty list; it never waits.
pub trait InputSource {
    fn poll_keyboard(&mut self) -> Result<Vec<KeyEvent>, DeviceReadError>;
    fn poll_pointer(&mut self) -> Result<Vec<PointerEvent>, DeviceReadError>;
}

// ===== Scripted input =====

/// Pre-recorded input, one batch per poll. Empty queues yield no events.
#[derive(Default)]
pub struct ScriptedInput {
    keyboard: VecDeque<Result<Vec<KeyEvent>, DeviceReadError>>,
    pointer: VecDeque<Result<Vec<PointerEvent>, DeviceReadError>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_keys(&mut self, events: Vec<KeyEvent>) -> &mut Self {
        self.keyboard.push_back(Ok(events));
        self
    }

    pub fn push_pointer(&mut self, events: Vec<PointerEvent>) -> &mut Self {
        self.pointer.push_back(Ok(events));
        self
    }

    /// Queue a read failure on one stream
    pub fn push_failure(&mut self, device: Device) -> &mut Self {
        let err = DeviceReadError::new(device, io::Error::other("device unavailable"));
        match device {
            Device::Keyboard => self.keyboard.push_back(Err(err)),
            Device::Pointer => self.pointer.push_back(Err(err)),
        }
        self
    }

    pub fn is_drained(&self) -> bool {
        self.keyboard.is_empty() && self.pointer.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll_keyboard(&mut self) -> Result<Vec<KeyEvent>, DeviceReadError> {
        self.keyboard.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn poll_pointer(&mut self) -> Result<Vec<PointerEvent>, DeviceReadError> {
        self.pointer.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ===== Terminal input =====

/// Keyboard and mouse read from the controlling terminal via crossterm.
///
/// The terminal delivers both on one channel; events are split into per-device
/// queues as they are read. Raw mode and mouse capture are released on drop.
pub struct TerminalInput {
    keys: VecDeque<KeyEvent>,
    pointer: VecDeque<PointerEvent>,
    held: KeyModifiers,
    cell_width: f64,
    cell_height: f64,
}

impl TerminalInput {
    pub fn open(cell_width: f64, cell_height: f64) -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        info!("terminal input opened");
        Ok(Self {
            keys: VecDeque::new(),
            pointer: VecDeque::new(),
            held: KeyModifiers::NONE,
            cell_width,
            cell_height,
        })
    }

    /// Read every pending terminal event without blocking
    fn pump(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => self.push_key(key),
                Event::Mouse(mouse) => self.push_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    /// Terminals report modifiers as flags on each key; turn flag changes
    /// into modifier press/release events.
    fn sync_modifiers(&mut self, now: KeyModifiers) {
        for (flag, key) in [
            (KeyModifiers::SHIFT, Key::Shift),
            (KeyModifiers::CONTROL, Key::Control),
            (KeyModifiers::ALT, Key::Alt),
            (KeyModifiers::SUPER, Key::Super),
        ] {
            match (self.held.contains(flag), now.contains(flag)) {
                (false, true) => self.keys.push_back(KeyEvent::press(key)),
                (true, false) => self.keys.push_back(KeyEvent::release(key)),
                _ => {}
            }
        }
        self.held = now;
    }

    fn push_key(&mut self, key: event::KeyEvent) {
        self.sync_modifiers(key.modifiers);
        let state = match key.kind {
            KeyEventKind::Press => KeyState::Pressed,
            KeyEventKind::Repeat => KeyState::Repeat,
            KeyEventKind::Release => KeyState::Released,
        };
        let mapped = match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab | KeyCode::BackTab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Delete => Key::Delete,
            KeyCode::F(n) => Key::F(n),
            // Already reported through the modifier flags
            KeyCode::Modifier(_) => return,
            _ => Key::Other,
        };
        self.keys.push_back(KeyEvent { key: mapped, state });
    }

    fn push_mouse(&mut self, mouse: MouseEvent) {
        // Report the centre of the cell under the pointer
        let x = (mouse.column as f64 + 0.5) * self.cell_width;
        let y = (mouse.row as f64 + 0.5) * self.cell_height;
        self.pointer.push_back(PointerEvent::MovedTo { x, y });

        let button = |b: MouseButton| match b {
            MouseButton::Left => PointerButton::Left,
            MouseButton::Right => PointerButton::Right,
            MouseButton::Middle => PointerButton::Middle,
        };
        match mouse.kind {
            MouseEventKind::Down(b) => self.pointer.push_back(PointerEvent::Button {
                button: button(b),
                pressed: true,
            }),
            MouseEventKind::Up(b) => self.pointer.push_back(PointerEvent::Button {
                button: button(b),
                pressed: false,
            }),
            MouseEventKind::ScrollUp => self.pointer.push_back(PointerEvent::Scroll { delta: 1 }),
            MouseEventKind::ScrollDown => {
                self.pointer.push_back(PointerEvent::Scroll { delta: -1 })
            }
            _ => {}
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_keyboard(&mut self) -> Result<Vec<KeyEvent>, DeviceReadError> {
        self.pump()
            .map_err(|e| DeviceReadError::new(Device::Keyboard, e))?;
        Ok(self.keys.drain(..).collect())
    }

    fn poll_pointer(&mut self) -> Result<Vec<PointerEvent>, DeviceReadError> {
        self.pump()
            .map_err(|e| DeviceReadError::new(Device::Pointer, e))?;
        Ok(self.pointer.drain(..).collect())
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture);
        let _ = disable_raw_mode();
        info!("terminal input closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_replays_batches() {
        let mut input = ScriptedInput::new();
        input
            .push_keys(vec![KeyEvent::press(Key::F(1))])
            .push_failure(Device::Pointer)
            .push_pointer(vec![PointerEvent::Scroll { delta: 1 }]);

        assert_eq!(input.poll_keyboard().unwrap().len(), 1);
        assert!(input.poll_keyboard().unwrap().is_empty());

        let err = input.poll_pointer().unwrap_err();
        assert_eq!(err.device, Device::Pointer);
        assert_eq!(input.poll_pointer().unwrap().len(), 1);
        assert!(input.is_drained());
    }
}
