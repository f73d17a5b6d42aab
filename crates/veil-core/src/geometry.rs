#![forbid(unsafe_code)]

//! Geometric primitives.

/// A point in pixel space (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise addition.
    #[inline]
    pub const fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// A size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// The center of a box of this size placed at the origin, rounded up.
    #[inline]
    pub const fn center(&self) -> Point {
        Point::new(div_ceil_2(self.width), div_ceil_2(self.height))
    }
}

/// Halve a pixel length, rounding away from zero for positive values.
#[inline]
pub(crate) const fn div_ceil_2(v: i32) -> i32 {
    if v >= 0 { (v + 1) / 2 } else { v / 2 }
}
