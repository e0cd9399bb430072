//! Integer Geometry
//!
//! Exact point-in-polygon containment over integer coordinates.
//! No floating point, no division: crossings are compared by
//! cross-multiplication in 64-bit space.

use serde::{Serialize, Deserialize};

/// A point in arena space (pixel-equivalent units, y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left corner and extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Horizontal extent
    pub width: i32,
    /// Vertical extent
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, width, height }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    /// The four corners, clockwise from top-left.
    #[inline]
    pub fn corners(&self) -> [Point; 4] {
        polygon_from_rect(self)
    }
}

/// Build the clockwise corner polygon of a rectangle:
/// top-left, top-right, bottom-right, bottom-left.
pub fn polygon_from_rect(rect: &Rect) -> [Point; 4] {
    let (right, bottom) = (rect.right(), rect.bottom());
    [
        Point::new(rect.left, rect.top),
        Point::new(right, rect.top),
        Point::new(right, bottom),
        Point::new(rect.left, bottom),
    ]
}

/// Even-odd crossing-number containment test.
///
/// Casts a ray from `point` toward +x and counts edge crossings. Edge
/// points are not special-cased; the half-open comparisons make an
/// axis-aligned rectangle cover exactly `[left, right) × [top, bottom)`.
///
/// A corner point of a rectangle lies on its `right` / `bottom` line, so a
/// rectangle touching a neighbour along its own right or bottom side has
/// corners inside that neighbour. Touching on the left or top side does
/// not.
///
/// Polygons with fewer than three vertices, or with zero area, contain
/// nothing.
pub fn is_inside(polygon: &[Point], point: Point) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let px = point.x as i64;
    let py = point.y as i64;
    let mut inside = false;

    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].x as i64, polygon[i].y as i64);
        let (xj, yj) = (polygon[j].x as i64, polygon[j].y as i64);

        if (yi > py) != (yj > py) {
            // px < xi + (xj - xi) * (py - yi) / (yj - yi), without the division
            let lhs = (px - xi) * (yj - yi);
            let rhs = (xj - xi) * (py - yi);
            let crosses = if yj > yi { lhs < rhs } else { lhs > rhs };
            if crosses {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}
