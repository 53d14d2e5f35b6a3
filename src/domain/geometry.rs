//! Screen geometry primitives.
//!
//! All coordinates are absolute desktop coordinates in points, with the origin
//! at the top-left of the main display and `y` growing downward.

use serde::{Deserialize, Serialize};

/// An absolute position on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned rectangle: origin (top-left corner) plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Finite origin and a finite, strictly positive size.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Geometric center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the left/top edges are inside, the right/bottom
    /// edges belong to the neighbouring rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.max_x().max(other.max_x()) - x,
            self.max_y().max(other.max_y()) - y,
        )
    }

    /// Clamps `point` into the rectangle independently on each axis.
    ///
    /// The right and bottom edges are exclusive, so the result is pulled back to
    /// the last addressable pixel.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        let max_x = (self.max_x() - 1.0).max(self.x);
        let max_y = (self.max_y() - 1.0).max(self.y);
        Point::new(point.x.clamp(self.x, max_x), point.y.clamp(self.y, max_y))
    }
}

/// The set of active displays.
///
/// The first display is the main screen: the primary grid is laid over it.
/// Movement is clamped against the bounding rectangle of all displays.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayout {
    displays: Vec<Bounds>,
    desktop: Bounds,
}

impl DisplayLayout {
    /// Builds a layout from display bounds, main display first.
    ///
    /// Returns `None` if `displays` is empty or any display is not
    /// [usable](Bounds::is_usable).
    #[must_use]
    pub fn new(displays: Vec<Bounds>) -> Option<Self> {
        let first = *displays.first()?;
        if !displays.iter().all(Bounds::is_usable) {
            return None;
        }
        let desktop = displays.iter().skip(1).fold(first, |acc, d| acc.union(d));
        Some(Self { displays, desktop })
    }

    /// Bounds of the main display.
    #[must_use]
    pub fn main(&self) -> Bounds {
        self.displays[0]
    }

    /// Bounding rectangle of every display combined.
    #[must_use]
    pub const fn desktop(&self) -> Bounds {
        self.desktop
    }

    #[must_use]
    pub fn displays(&self) -> &[Bounds] {
        &self.displays
    }

    /// Clamps a point to the combined desktop area.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        self.desktop.clamp(point)
    }
}
