// Renderer port: the only drawing surface the compositor talks to

pub mod headless;
pub mod terminal;

use crate::error::RenderError;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

pub use headless::{DrawOp, HeadlessRenderer};
pub use terminal::TerminalRenderer;

/// Linear RGB colour, each channel in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// Convert to 8-bit channels, clamping out-of-range values
    pub fn to_u8(self) -> (u8, u8, u8) {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (c(self.0), c(self.1), c(self.2))
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb(
            self.0 + (other.0 - self.0) * t,
            self.1 + (other.1 - self.1) * t,
            self.2 + (other.2 - self.2) * t,
        )
    }
}

/// Four-corner gradient, interpolated bilinearly across a quad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub top_left: Rgb,
    pub top_right: Rgb,
    pub bottom_left: Rgb,
    pub bottom_right: Rgb,
}

impl Gradient {
    /// Colour at normalized coordinates (u, v) in 0..=1, v growing downward
    pub fn sample(&self, u: f32, v: f32) -> Rgb {
        let top = self.top_left.lerp(self.top_right, u);
        let bottom = self.bottom_left.lerp(self.bottom_right, u);
        top.lerp(bottom, v)
    }
}

/// Handle to pixel data uploaded with [`Renderer::upload_texture`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// RGB pixel data, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Texture {
    /// `None` unless `pixels` holds exactly `width * height` entries and the size is non-zero
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Nearest texel at normalized (u, v); coordinates outside 0..=1 clamp to the edge
    pub fn sample(&self, u: f32, v: f32) -> Rgb {
        let pick = |t: f32, len: usize| ((t.clamp(0.0, 1.0) * len as f32) as usize).min(len - 1);
        self.pixels[pick(v, self.height) * self.width + pick(u, self.width)]
    }
}

/// What a quad is filled with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Rgb),
    Gradient(Gradient),
    /// Previously uploaded texture stretched over the quad
    Texture(TextureId),
}

/// Brush primitive for paint strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

/// Drawing capability consumed by the compositor.
///
/// All coordinates are screen pixels; implementations own any conversion to
/// device coordinates.
pub trait Renderer {
    /// Drawable area in pixels (width, height)
    fn screen_size(&self) -> (f64, f64);

    fn clear(&mut self, color: Rgb);

    fn draw_quad(&mut self, transform: Rect, fill: Fill);

    /// Draw a brush shape inscribed in `transform`. Backends without shape
    /// support fall back to a solid quad.
    fn draw_shape(&mut self, shape: Shape, transform: Rect, color: Rgb) {
        let _ = shape;
        self.draw_quad(transform, Fill::Solid(color));
    }

    fn draw_text(&mut self, text: &str, position: (f64, f64), color: Rgb);

    /// Hand pixel data to the backend; the returned id stays valid for the renderer's lifetime
    fn upload_texture(&mut self, texture: Texture) -> TextureId;

    fn present(&mut self) -> Result<(), RenderError>;
}
