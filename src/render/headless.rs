// Headless renderer: records draw calls instead of drawing.
// Used when no display can be opened, and by tests to check composition order.

use super::{Fill, Renderer, Rgb, Shape, Texture, TextureId};
use crate::error::RenderError;
use crate::geometry::Rect;

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rgb),
    Quad { transform: Rect, fill: Fill },
    Shape { shape: Shape, transform: Rect, color: Rgb },
    Text { text: String, position: (f64, f64), color: Rgb },
    Present,
}

pub struct HeadlessRenderer {
    width: f64,
    height: f64,
    /// Calls since the last `clear`, i.e. the frame being built or just presented
    ops: Vec<DrawOp>,
    frames_presented: u64,
    textures: Vec<Texture>,
}

impl HeadlessRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            frames_presented: 0,
            textures: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0 as usize)
    }

    /// All text drawn in the current frame, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for HeadlessRenderer {
    fn screen_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn draw_quad(&mut self, transform: Rect, fill: Fill) {
        self.ops.push(DrawOp::Quad { transform, fill });
    }

    fn draw_shape(&mut self, shape: Shape, transform: Rect, color: Rgb) {
        self.ops.push(DrawOp::Shape {
            shape,
            transform,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: (f64, f64), color: Rgb) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            position,
            color,
        });
    }

    fn upload_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        id
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Present);
        self.frames_presented += 1;
        Ok(())
    }
}
