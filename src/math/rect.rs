use super::{LineSegment2d, Point2d, Vector2d};
use cgmath::prelude::*;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Region code of a point relative to a [Rectangle].
///
/// Each bit records one side of the rectangle the point lies beyond.
/// Points on the boundary are [OutCode::INSIDE].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutCode(u8);

impl OutCode {
    pub const INSIDE: OutCode = OutCode(0);
    pub const LEFT: OutCode = OutCode(1);
    pub const RIGHT: OutCode = OutCode(2);
    pub const TOP: OutCode = OutCode(4);
    pub const BOTTOM: OutCode = OutCode(8);

    /// Whether the code is [OutCode::INSIDE].
    pub fn is_inside(self) -> bool {
        self.0 == 0
    }

    /// Whether all bits of `other` are set in this code.
    pub fn contains(self, other: OutCode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitAnd for OutCode {
    type Output = OutCode;

    fn bitand(self, rhs: Self) -> Self::Output {
        OutCode(self.0 & rhs.0)
    }
}

impl BitOr for OutCode {
    type Output = OutCode;

    fn bitor(self, rhs: Self) -> Self::Output {
        OutCode(self.0 | rhs.0)
    }
}

impl BitOrAssign for OutCode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// An axis-aligned rectangle. The y-axis points down, so `left_top` holds
/// the smallest coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    pub left_top: Point2d,
    pub right_bottom: Point2d,
}

impl Rectangle {
    /// Creates a rectangle spanning the two corners, in any order.
    pub fn new(a: Point2d, b: Point2d) -> Self {
        Self {
            left_top: Point2d::new(a.x.min(b.x), a.y.min(b.y)),
            right_bottom: Point2d::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.right_bottom.x - self.left_top.x
    }

    pub fn height(&self) -> f64 {
        self.right_bottom.y - self.left_top.y
    }

    pub fn centre(&self) -> Point2d {
        self.left_top + Vector2d::new(0.5 * self.width(), 0.5 * self.height())
    }

    /// Computes the region code of `point`. The boundary counts as inside.
    pub fn point_code(&self, point: Point2d) -> OutCode {
        let mut code = OutCode::INSIDE;
        if point.x < self.left_top.x {
            code |= OutCode::LEFT;
        } else if point.x > self.right_bottom.x {
            code |= OutCode::RIGHT;
        }
        if point.y < self.left_top.y {
            code |= OutCode::TOP;
        } else if point.y > self.right_bottom.y {
            code |= OutCode::BOTTOM;
        }
        code
    }

    /// Whether `point` lies inside or on the rectangle.
    pub fn contains(&self, point: Point2d) -> bool {
        self.point_code(point).is_inside()
    }

    /// The four corners, clockwise from the top left.
    pub fn corners(&self) -> [Point2d; 4] {
        let (lt, rb) = (self.left_top, self.right_bottom);
        [lt, Point2d::new(rb.x, lt.y), rb, Point2d::new(lt.x, rb.y)]
    }

    /// Whether a disc of `radius` at `position` overlaps the rectangle.
    ///
    /// Touching counts as overlapping.
    pub fn overlaps_disc(&self, position: Point2d, radius: f64) -> bool {
        let nearest = Point2d::new(
            position.x.clamp(self.left_top.x, self.right_bottom.x),
            position.y.clamp(self.left_top.y, self.right_bottom.y),
        );
        nearest.distance2(position) <= radius * radius
    }

    /// Clips `line` to the rectangle using region codes.
    ///
    /// Returns `None` if no part of the line lies inside the rectangle.
    pub fn clip(&self, line: &LineSegment2d) -> Option<LineSegment2d> {
        let mut begin = line.begin;
        let mut end = line.end;
        let mut begin_code = self.point_code(begin);
        let mut end_code = self.point_code(end);

        // Each pass pins one coordinate to an edge, so four passes always suffice.
        for _ in 0..8 {
            if (begin_code | end_code).is_inside() {
                return Some(LineSegment2d::from_ends(begin, end));
            }
            if !(begin_code & end_code).is_inside() {
                return None;
            }
            let outside = if begin_code.is_inside() { end_code } else { begin_code };
            let (x0, y0, x1, y1) = (begin.x, begin.y, end.x, end.y);
            let point = if outside.contains(OutCode::BOTTOM) {
                let y = self.right_bottom.y;
                Point2d::new(x0 + (x1 - x0) * (y - y0) / (y1 - y0), y)
            } else if outside.contains(OutCode::TOP) {
                let y = self.left_top.y;
                Point2d::new(x0 + (x1 - x0) * (y - y0) / (y1 - y0), y)
            } else if outside.contains(OutCode::RIGHT) {
                let x = self.right_bottom.x;
                Point2d::new(x, y0 + (y1 - y0) * (x - x0) / (x1 - x0))
            } else {
                let x = self.left_top.x;
                Point2d::new(x, y0 + (y1 - y0) * (x - x0) / (x1 - x0))
            };
            if outside == begin_code {
                begin = point;
                begin_code = self.point_code(begin);
            } else {
                end = point;
                end_code = self.point_code(end);
            }
        }
        None
    }

    /// Clips `line` to the rectangle, returning it unchanged if it never
    /// enters the rectangle.
    pub fn clip_line(&self, line: &LineSegment2d) -> LineSegment2d {
        self.clip(line).unwrap_or(*line)
    }

    /// Whether any part of `line` lies inside or on the rectangle.
    pub fn touches_line(&self, line: &LineSegment2d) -> bool {
        self.clip(line).is_some()
    }
}
