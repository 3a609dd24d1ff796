//! Pan/zoom transform between canvas and screen space.
//!
//! `screen = canvas * zoom + pan`

use serde::{Deserialize, Serialize};

use crate::model::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    /// Screen-space offset of the canvas origin.
    pub pan: Point,
    /// Screen size of the visible area; empty until the host reports it.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::ZERO, size: Size::default() }
    }
}

impl Viewport {
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        (screen - self.pan) / self.zoom
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas * self.zoom + self.pan
    }

    /// Set the zoom to `zoom` (clamped) keeping the canvas point under
    /// `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: Point, zoom: f64, min: f64, max: f64) {
        let fixed = self.screen_to_canvas(anchor);
        self.zoom = zoom.clamp(min, max);
        self.pan = anchor - fixed * self.zoom;
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.pan += delta;
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ZERO;
    }

    pub fn screen_center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// The canvas-space area currently on screen.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(
            self.screen_to_canvas(Point::ZERO),
            self.screen_to_canvas(Point::new(self.size.width, self.size.height)),
        )
    }
}
