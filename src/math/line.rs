use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// A straight line segment, parameterised over `[0, 1]` from `begin` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment2d {
    pub begin: Point2d,
    pub end: Point2d,
}

impl LineSegment2d {
    /// Creates a line segment from its two end points.
    pub const fn from_ends(begin: Point2d, end: Point2d) -> Self {
        Self { begin, end }
    }

    /// Creates a line segment starting at `begin` and spanning `vec`.
    pub fn from_vector(begin: Point2d, vec: Vector2d) -> Self {
        Self {
            begin,
            end: begin + vec,
        }
    }

    /// The vector from `begin` to `end`.
    pub fn vector(&self) -> Vector2d {
        self.end - self.begin
    }

    /// The length of the segment.
    pub fn length(&self) -> f64 {
        self.vector().magnitude()
    }

    /// Evaluates the segment at parameter `t`; `t` is not clamped.
    pub fn at(&self, t: f64) -> Point2d {
        self.begin + self.vector() * t
    }

    /// The parameter of the projection of `point` onto the infinite line
    /// through this segment. Zero for a degenerate segment.
    pub fn project(&self, point: Point2d) -> f64 {
        let vec = self.vector();
        let len2 = vec.magnitude2();
        if len2 == 0.0 {
            0.0
        } else {
            (point - self.begin).dot(vec) / len2
        }
    }

    /// The point on the infinite line through this segment nearest to `point`.
    pub fn nearest(&self, point: Point2d) -> Point2d {
        self.at(self.project(point))
    }

    /// The point on the segment itself nearest to `point`.
    pub fn nearest_on_segment(&self, point: Point2d) -> Point2d {
        self.at(self.project(point).clamp(0.0, 1.0))
    }

    /// The distance from `point` to the nearest point of the segment.
    pub fn distance_to(&self, point: Point2d) -> f64 {
        point.distance(self.nearest_on_segment(point))
    }
}
