use super::{LineSegment2d, Point2d};
use cgmath::prelude::*;
use itertools::Itertools;

/// A chain of line segments, parameterised by arc length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Point2d>,
    length: f64,
}

impl Polyline {
    /// Creates a polyline through the given points.
    pub fn new(points: Vec<Point2d>) -> Self {
        let length = points
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.distance(*b))
            .sum();
        Self { points, length }
    }

    /// The points of the polyline.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// The total length of the polyline.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The point `distance` along the polyline from its first point.
    ///
    /// Distances beyond either end are clamped to that end.
    /// Returns `None` for a polyline without points.
    pub fn at(&self, distance: f64) -> Option<Point2d> {
        let first = *self.points.first()?;
        if distance <= 0.0 {
            return Some(first);
        }
        let mut left = distance;
        for (a, b) in self.points.iter().tuple_windows() {
            let segment = LineSegment2d::from_ends(*a, *b);
            let length = segment.length();
            if left <= length && length > 0.0 {
                return Some(segment.at(left / length));
            }
            left -= length;
        }
        self.points.last().copied()
    }

    /// The point of the polyline nearest to `point`.
    pub fn nearest_point(&self, point: Point2d) -> Option<Point2d> {
        if self.points.len() == 1 {
            return self.points.first().copied();
        }
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| LineSegment2d::from_ends(*a, *b).nearest_on_segment(point))
            .min_by(|a, b| a.distance2(point).total_cmp(&b.distance2(point)))
    }
}
