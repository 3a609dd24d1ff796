//! Canvas-space geometry primitives.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point in canvas (or screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector from the origin.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Round both coordinates to the nearest multiple of `pitch`.
    ///
    /// A non-positive pitch leaves the point untouched.
    pub fn snap(self, pitch: f64) -> Point {
        if pitch <= 0.0 {
            return self;
        }
        Point::new((self.x / pitch).round() * pitch, (self.y / pitch).round() * pitch)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle given by its min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Rectangle of `size` centered on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        let half = Point::new(size.width / 2.0, size.height / 2.0);
        Self { min: center - half, max: center + half }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }

    /// Grow every side by `amount`.
    pub fn expand(&self, amount: f64) -> Rect {
        let pad = Point::new(amount, amount);
        Rect { min: self.min - pad, max: self.max + pad }
    }

    /// True when `other` lies entirely inside `self` (within `eps`).
    pub fn contains_rect(&self, other: &Rect, eps: f64) -> bool {
        other.min.x >= self.min.x - eps
            && other.min.y >= self.min.y - eps
            && other.max.x <= self.max.x + eps
            && other.max.y <= self.max.y + eps
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_pitch() {
        assert_eq!(Point::new(31.0, -9.0).snap(20.0), Point::new(40.0, 0.0));
        assert_eq!(Point::new(29.9, 10.1).snap(20.0), Point::new(20.0, 20.0));
        assert_eq!(Point::new(7.3, 1.0).snap(0.0), Point::new(7.3, 1.0));
    }

    #[test]
    fn test_rect_centered() {
        let r = Rect::centered(Point::new(100.0, 50.0), Size::new(150.0, 180.0));
        assert_eq!(r.min, Point::new(25.0, -40.0));
        assert_eq!(r.max, Point::new(175.0, 140.0));
        assert_eq!(r.center(), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_rect_intersects_is_strict() {
        let a = Rect::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Rect::new(Point::new(10.0, 0.0), Point::new(20.0, 10.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&a.expand(1.0)));
    }
}
