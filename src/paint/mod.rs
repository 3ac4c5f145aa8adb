// Freehand paint overlay

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::render::{Rgb, Shape};

pub const PALETTE: [Rgb; 16] = [
    Rgb(1.0, 1.0, 1.0),
    Rgb(0.75, 0.75, 0.75),
    Rgb(0.5, 0.5, 0.5),
    Rgb(0.0, 0.0, 0.0),
    Rgb(0.0, 1.0, 0.0),
    Rgb(0.0, 0.5, 0.0),
    Rgb(0.5, 0.5, 0.0),
    Rgb(0.0, 0.5, 0.5),
    Rgb(1.0, 0.0, 0.0),
    Rgb(0.5, 0.0, 0.0),
    Rgb(0.5, 0.0, 0.5),
    Rgb(1.0, 0.0, 1.0),
    Rgb(0.0, 0.0, 1.0),
    Rgb(0.0, 0.0, 0.5),
    Rgb(0.0, 1.0, 1.0),
    Rgb(1.0, 1.0, 0.0),
];

pub const SHAPES: [Shape; 3] = [Shape::Circle, Shape::Square, Shape::Triangle];

pub const DEFAULT_RADIUS: f64 = 10.0;
pub const MIN_RADIUS: f64 = 1.0;

/// One pointer-down-to-up gesture. Brush settings are fixed when it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub shape: Shape,
    pub color_index: usize,
    pub radius: f64,
    pub points: Vec<(f64, f64)>,
}

impl Stroke {
    pub fn color(&self) -> Rgb {
        PALETTE[self.color_index % PALETTE.len()]
    }
}

/// Paint mode state.
///
/// Brush changes (colour, shape, radius) only take effect while the overlay
/// is active. Finished strokes stay on the canvas across toggles but are only
/// drawn while active.
#[derive(Debug, Clone)]
pub struct PaintOverlay {
    active: bool,
    radius: f64,
    color_index: usize,
    shape_index: usize,
    current: Option<Stroke>,
    strokes: Vec<Stroke>,
}

impl Default for PaintOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl PaintOverlay {
    pub fn new(radius: f64) -> Self {
        Self {
            active: false,
            radius: radius.max(MIN_RADIUS),
            color_index: 0,
            shape_index: 0,
            current: None,
            strokes: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flip paint mode. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        if self.active {
            // Drop a stroke left over from a button still held at the last toggle
            self.current = None;
        }
        debug!(active = self.active, "paint overlay toggled");
        self.active
    }

    pub fn begin_stroke(&mut self, x: f64, y: f64) {
        if !self.active {
            return;
        }
        self.end_stroke();
        self.current = Some(Stroke {
            shape: self.shape(),
            color_index: self.color_index,
            radius: self.radius,
            points: vec![(x, y)],
        });
    }

    pub fn extend_stroke(&mut self, x: f64, y: f64) {
        if !self.active {
            return;
        }
        if let Some(stroke) = self.current.as_mut() {
            stroke.points.push((x, y));
        }
    }

    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.current.take() {
            debug!(points = stroke.points.len(), "stroke finished");
            self.strokes.push(stroke);
        }
    }

    pub fn cycle_color(&mut self) {
        if self.active {
            self.color_index = (self.color_index + 1) % PALETTE.len();
        }
    }

    pub fn cycle_shape(&mut self) {
        if self.active {
            self.shape_index = (self.shape_index + 1) % SHAPES.len();
        }
    }

    /// Grow or shrink the brush, never below [`MIN_RADIUS`]
    pub fn adjust_radius(&mut self, delta: f64) {
        if self.active {
            self.radius = (self.radius + delta).max(MIN_RADIUS);
        }
    }

    pub fn clear_canvas(&mut self) {
        self.current = None;
        self.strokes.clear();
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn color(&self) -> Rgb {
        PALETTE[self.color_index]
    }

    pub fn shape_index(&self) -> usize {
        self.shape_index
    }

    pub fn shape(&self) -> Shape {
        SHAPES[self.shape_index]
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    /// Finished strokes followed by the one in progress, in paint order
    pub fn all_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().chain(self.current.iter())
    }
}
