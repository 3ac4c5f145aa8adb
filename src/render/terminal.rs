// Terminal renderer backed by ratatui.
// Each character cell stands in for a `cell_width` x `cell_height` block of pixels;
// a cell is painted when its centre falls inside the primitive being drawn.

use std::io::{self, Stdout};
use std::ops::Range;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Style};
use ratatui::Terminal;
use tracing::{debug, info};

use super::{Fill, Renderer, Rgb, Shape, Texture, TextureId};
use crate::error::{InitError, RenderError};
use crate::geometry::Rect;

pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    buffer: Buffer,
    textures: Vec<Texture>,
    cell_width: f64,
    cell_height: f64,
}

fn to_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_u8();
    Color::Rgb(r, g, b)
}

impl TerminalRenderer {
    /// Switch the terminal to the alternate screen and take it over for drawing.
    /// The screen is restored when the renderer is dropped.
    pub fn open(cell_width: f64, cell_height: f64) -> Result<Self, InitError> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide).map_err(InitError::Terminal)?;

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
                return Err(InitError::Terminal(e));
            }
        };

        let size = match terminal.size() {
            Ok(size) => size,
            Err(e) => {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
                return Err(InitError::Terminal(e));
            }
        };

        info!(
            cols = size.width,
            rows = size.height,
            "terminal renderer opened"
        );

        Ok(Self {
            terminal,
            buffer: Buffer::empty(CellRect::new(0, 0, size.width, size.height)),
            textures: Vec::new(),
            cell_width: cell_width.max(1.0),
            cell_height: cell_height.max(1.0),
        })
    }

    /// Cell index range whose centres lie in [start, end) along one axis
    fn span(start: f64, end: f64, cell: f64, limit: u16) -> Range<u16> {
        let first = (start / cell - 0.5).ceil().max(0.0);
        let last = (end / cell - 0.5).ceil().max(0.0);
        let clamp = |v: f64| (v as u32).min(limit as u32) as u16;
        clamp(first)..clamp(last)
    }

    /// Visit every cell covered by `rect`, passing normalized (u, v) of the cell centre
    fn for_each_cell(&mut self, rect: Rect, mut paint: impl FnMut(&mut ratatui::buffer::Cell, f32, f32)) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let area = self.buffer.area;
        let cols = Self::span(rect.x, rect.right(), self.cell_width, area.width);
        let rows = Self::span(rect.y, rect.bottom(), self.cell_height, area.height);

        for row in rows {
            let cy = (row as f64 + 0.5) * self.cell_height;
            let v = ((cy - rect.y) / rect.height) as f32;
            for col in cols.clone() {
                let cx = (col as f64 + 0.5) * self.cell_width;
                let u = ((cx - rect.x) / rect.width) as f32;
                if let Some(cell) = self.buffer.cell_mut((col, row)) {
                    paint(cell, u, v);
                }
            }
        }
    }
}

impl Renderer for TerminalRenderer {
    fn screen_size(&self) -> (f64, f64) {
        (
            self.buffer.area.width as f64 * self.cell_width,
            self.buffer.area.height as f64 * self.cell_height,
        )
    }

    fn clear(&mut self, color: Rgb) {
        if let Ok(size) = self.terminal.size() {
            let area = CellRect::new(0, 0, size.width, size.height);
            if area != self.buffer.area {
                debug!(cols = size.width, rows = size.height, "terminal resized");
                self.buffer.resize(area);
            }
        }

        let bg = to_color(color);
        for cell in self.buffer.content.iter_mut() {
            cell.reset();
            cell.set_bg(bg);
        }
    }

    fn draw_quad(&mut self, transform: Rect, fill: Fill) {
        if let Fill::Texture(id) = fill {
            if id.0 as usize >= self.textures.len() {
                debug!(?id, "unknown texture, quad skipped");
                return;
            }
        }

        // Moved out for the draw so the cell walk can borrow the buffer
        let textures = std::mem::take(&mut self.textures);
        let texture = match fill {
            Fill::Texture(id) => textures.get(id.0 as usize),
            _ => None,
        };

        self.for_each_cell(transform, |cell, u, v| {
            let (u, v) = (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
            let color = match (fill, texture) {
                (Fill::Solid(color), _) => color,
                (Fill::Gradient(gradient), _) => gradient.sample(u, v),
                (Fill::Texture(_), Some(texture)) => texture.sample(u, v),
                (Fill::Texture(_), None) => return,
            };
            cell.set_char(' ');
            cell.set_bg(to_color(color));
        });
        self.textures = textures;
    }

    fn draw_shape(&mut self, shape: Shape, transform: Rect, color: Rgb) {
        let bg = to_color(color);
        self.for_each_cell(transform, |cell, u, v| {
            let inside = match shape {
                Shape::Square => true,
                Shape::Circle => {
                    let (dx, dy) = (u * 2.0 - 1.0, v * 2.0 - 1.0);
                    dx * dx + dy * dy <= 1.0
                }
                // Apex at top centre, base along the bottom edge
                Shape::Triangle => (u - 0.5).abs() <= v / 2.0,
            };
            if inside {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        });
    }

    fn draw_text(&mut self, text: &str, position: (f64, f64), color: Rgb) {
        if position.0 < 0.0 || position.1 < 0.0 {
            return;
        }
        let area = self.buffer.area;
        let col = (position.0 / self.cell_width) as u32;
        let row = (position.1 / self.cell_height) as u32;
        if col >= area.width as u32 || row >= area.height as u32 {
            return;
        }
        self.buffer
            .set_string(col as u16, row as u16, text, Style::default().fg(to_color(color)));
    }

    fn upload_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        let (width, height) = texture.size();
        debug!(?id, width, height, "texture uploaded");
        self.textures.push(texture);
        id
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let buffer = &self.buffer;
        self.terminal.draw(|frame| {
            // A resize between clear and present leaves the areas mismatched;
            // skip this frame and let the next clear pick up the new size.
            if frame.area() == buffer.area {
                frame.buffer_mut().merge(buffer);
            }
        })?;
        Ok(())
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        info!("terminal renderer closed");
    }
}
