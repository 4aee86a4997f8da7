#![forbid(unsafe_code)]

//! Pixel geometry primitives used by the surface and by overlay placement.
//!
//! Coordinates are CSS pixels relative to the viewport origin (top-left).

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero-sized.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Whether either dimension is zero (or negative).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `origin` with `size`.
    #[must_use]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    #[inline]
    #[must_use]
    pub fn left(self) -> f64 {
        self.x
    }

    #[inline]
    #[must_use]
    pub fn top(self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.size().is_empty()
    }

    /// Whether `other` lies completely inside `self`.
    #[must_use]
    pub fn contains_rect(self, other: Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Clamp `v` into `[min, max]` the forgiving way: when `max < min` the
/// result is `min` instead of panicking like [`f64::clamp`].
#[inline]
#[must_use]
pub fn clamp_lenient(v: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.size(), Size::new(30.0, 40.0));
    }

    #[test]
    fn contains_rect_is_inclusive_of_edges() {
        let outer = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(outer.contains_rect(Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert!(!outer.contains_rect(Rect::new(1.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn lenient_clamp_prefers_min_when_range_inverted() {
        assert_eq!(clamp_lenient(5.0, 8.0, 2.0), 8.0);
        assert_eq!(clamp_lenient(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_lenient(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_lenient(30.0, 0.0, 10.0), 10.0);
    }
}
