#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// A pointer position in the shared layout coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle described by its corners.
///
/// `x1`/`y1` are inclusive, `x2`/`y2` are exclusive, so adjacent areas that
/// share an edge never both contain the same point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    /// Create a new area from its corners.
    #[inline]
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create an area from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Width (never negative).
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        let w = self.x2.saturating_sub(self.x1);
        if w < 0 { 0 } else { w }
    }

    /// Height (never negative).
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        let h = self.y2.saturating_sub(self.y1);
        if h < 0 { 0 } else { h }
    }

    /// Surface used to rank overlapping candidate areas.
    #[inline]
    #[must_use]
    pub const fn surface(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Check if the area has zero surface.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Check if a point is inside the area.
    #[inline]
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x < self.x2 && point.y >= self.y1 && point.y < self.y2
    }

    /// Clamp a point so it lies inside the area.
    ///
    /// Empty areas return their origin.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        if self.is_empty() {
            return Point::new(self.x1, self.y1);
        }
        Point::new(
            point.x.clamp(self.x1, self.x2 - 1),
            point.y.clamp(self.y1, self.y2 - 1),
        )
    }

    /// Compute the intersection with another area, returning `None` if no overlap.
    #[must_use]
    pub fn intersection(&self, other: &Area) -> Option<Area> {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);
        if x1 < x2 && y1 < y2 {
            Some(Area::new(x1, y1, x2, y2))
        } else {
            None
        }
    }

    /// Take a strip of `extent` from the top edge, returning `(strip, rest)`.
    #[must_use]
    pub fn split_top(&self, extent: i32) -> (Area, Area) {
        let cut = (self.y1 + extent.max(0)).min(self.y2);
        (
            Area::new(self.x1, self.y1, self.x2, cut),
            Area::new(self.x1, cut, self.x2, self.y2),
        )
    }

    /// Take a strip of `extent` from the bottom edge, returning `(strip, rest)`.
    #[must_use]
    pub fn split_bottom(&self, extent: i32) -> (Area, Area) {
        let cut = (self.y2 - extent.max(0)).max(self.y1);
        (
            Area::new(self.x1, cut, self.x2, self.y2),
            Area::new(self.x1, self.y1, self.x2, cut),
        )
    }

    /// Take a strip of `extent` from the left edge, returning `(strip, rest)`.
    #[must_use]
    pub fn split_left(&self, extent: i32) -> (Area, Area) {
        let cut = (self.x1 + extent.max(0)).min(self.x2);
        (
            Area::new(self.x1, self.y1, cut, self.y2),
            Area::new(cut, self.y1, self.x2, self.y2),
        )
    }

    /// Take a strip of `extent` from the right edge, returning `(strip, rest)`.
    #[must_use]
    pub fn split_right(&self, extent: i32) -> (Area, Area) {
        let cut = (self.x2 - extent.max(0)).max(self.x1);
        (
            Area::new(cut, self.y1, self.x2, self.y2),
            Area::new(self.x1, self.y1, cut, self.y2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let area = Area::new(0, 0, 10, 10);
        assert!(area.contains(Point::new(0, 0)));
        assert!(area.contains(Point::new(9, 9)));
        assert!(!area.contains(Point::new(10, 5)));
        assert!(!area.contains(Point::new(5, 10)));
    }

    #[test]
    fn inverted_area_has_no_extent() {
        let area = Area::new(10, 10, 5, 5);
        assert_eq!(area.width(), 0);
        assert_eq!(area.height(), 0);
        assert!(area.is_empty());
        assert_eq!(area.surface(), 0);
    }

    #[test]
    fn intersection_of_disjoint_areas_is_none() {
        let a = Area::new(0, 0, 10, 10);
        let b = Area::new(10, 0, 20, 10);
        assert_eq!(a.intersection(&b), None);
        assert_eq!(
            a.intersection(&Area::new(5, 5, 15, 15)),
            Some(Area::new(5, 5, 10, 10))
        );
    }

    #[test]
    fn split_strips_are_clamped() {
        let area = Area::new(0, 0, 100, 40);
        let (header, body) = area.split_top(20);
        assert_eq!(header, Area::new(0, 0, 100, 20));
        assert_eq!(body, Area::new(0, 20, 100, 40));

        let (strip, rest) = area.split_right(500);
        assert_eq!(strip, Area::new(0, 0, 100, 40));
        assert!(rest.is_empty());
    }

    #[test]
    fn clamp_pulls_point_inside() {
        let area = Area::new(10, 10, 20, 20);
        assert_eq!(area.clamp(Point::new(0, 50)), Point::new(10, 19));
        assert_eq!(area.clamp(Point::new(15, 15)), Point::new(15, 15));
    }
}
