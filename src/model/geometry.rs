use serde::{Deserialize, Serialize};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle in abstract canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Coordinates {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `point` falls inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Same size, origin moved to `origin`.
    pub fn moved_to(&self, origin: Point) -> Self {
        Coordinates {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Coordinates {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Pan and zoom of the editor canvas.
///
/// Pointer events arrive in screen space; a screen delta of `d` moves an
/// entity by `d / zoom` canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

impl Viewport {
    /// Convert a screen-space delta to a canvas-space delta.
    pub fn to_canvas_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.zoom, dy / self.zoom)
    }

    /// Multiply the zoom level by `factor`, clamped to `[min, max]`.
    pub fn zoom_by(&mut self, factor: f64, min: f64, max: f64) -> f64 {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(min, max);
        }
        self.zoom
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }
}
