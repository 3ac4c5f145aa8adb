// Applications shipped with the window manager

use serde::Deserialize;

use super::catalog::{Application, LoadParams};
use crate::error::AppError;
use crate::geometry::Rect;
use crate::input_handler::{Key, KeyEvent};
use crate::render::{Fill, Renderer, Rgb};
use crate::state::window::{WindowAction, WindowContent, WindowSurface};

const TEXT_COLOR: Rgb = Rgb(0.1, 0.1, 0.1);
const BODY_COLOR: Rgb = Rgb(0.92, 0.92, 0.9);
const LINE_HEIGHT: f64 = 18.0;
const PADDING: f64 = 8.0;

/// Optional geometry/title overrides accepted by every built-in
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WindowParams {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    title: Option<String>,
    text: Option<String>,
}

impl WindowParams {
    fn parse(params: Option<&LoadParams>) -> Result<Self, AppError> {
        match params {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AppError::new(format!("invalid parameters: {}", e))),
        }
    }

    fn bounds(&self, default: Rect) -> Rect {
        Rect::new(
            self.x.unwrap_or(default.x),
            self.y.unwrap_or(default.y),
            self.width.unwrap_or(default.width).max(1.0),
            self.height.unwrap_or(default.height).max(1.0),
        )
    }
}

fn draw_lines<'a>(renderer: &mut dyn Renderer, area: Rect, lines: impl Iterator<Item = &'a str>) {
    renderer.draw_quad(area, Fill::Solid(BODY_COLOR));
    let mut y = area.y + PADDING;
    for line in lines {
        if y + LINE_HEIGHT > area.bottom() {
            break;
        }
        renderer.draw_text(line, (area.x + PADDING, y), TEXT_COLOR);
        y += LINE_HEIGHT;
    }
}

// ===== About =====

pub struct About;

struct AboutContent {
    lines: Vec<String>,
}

impl WindowContent for AboutContent {
    fn draw(&self, renderer: &mut dyn Renderer, area: Rect) {
        draw_lines(renderer, area, self.lines.iter().map(String::as_str));
    }

    fn on_key(&mut self, event: &KeyEvent) -> WindowAction {
        if event.key == Key::Escape {
            WindowAction::Close
        } else {
            WindowAction::None
        }
    }
}

impl Application for About {
    fn load(&self, params: Option<&LoadParams>) -> Result<WindowSurface, AppError> {
        let params = WindowParams::parse(params)?;
        let text = params.text.clone().unwrap_or_else(|| {
            format!(
                "snakewm {}\nF1: applications  F2: paint\nCtrl+Q: quit  Esc: close",
                env!("CARGO_PKG_VERSION")
            )
        });
        let content = AboutContent {
            lines: text.lines().map(str::to_string).collect(),
        };
        Ok(WindowSurface::new(
            params.title.clone().unwrap_or_else(|| "About".to_string()),
            params.bounds(Rect::new(160.0, 120.0, 420.0, 160.0)),
            Box::new(content),
        ))
    }
}

// ===== Notes =====

/// Scratch text editor: type to append, Backspace deletes, Esc closes
pub struct Notes;

#[derive(Default)]
struct NotesContent {
    text: String,
}

impl WindowContent for NotesContent {
    fn draw(&self, renderer: &mut dyn Renderer, area: Rect) {
        let cursor = format!("{}_", self.text);
        draw_lines(renderer, area, cursor.split('\n'));
    }

    fn on_key(&mut self, event: &KeyEvent) -> WindowAction {
        if !event.is_down() {
            return WindowAction::None;
        }
        match event.key {
            Key::Char(c) => self.text.push(c),
            Key::Enter => self.text.push('\n'),
            Key::Tab => self.text.push_str("    "),
            Key::Backspace => {
                self.text.pop();
            }
            Key::Escape => return WindowAction::Close,
            _ => {}
        }
        WindowAction::None
    }
}

impl Application for Notes {
    fn load(&self, params: Option<&LoadParams>) -> Result<WindowSurface, AppError> {
        let params = WindowParams::parse(params)?;
        let content = NotesContent {
            text: params.text.clone().unwrap_or_default(),
        };
        Ok(WindowSurface::new(
            params.title.clone().unwrap_or_else(|| "Notes".to_string()),
            params.bounds(Rect::new(240.0, 200.0, 480.0, 320.0)),
            Box::new(content),
        ))
    }
}
