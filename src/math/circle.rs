use super::{bisect, LineSegment2d, Point2d};
use cgmath::prelude::*;
use smallvec::SmallVec;

/// Convergence tolerance of the crossing-point bisection, in segment parameter units.
const CROSSING_TOLERANCE: f64 = 1e-8;

/// A circle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub centre: Point2d,
    pub radius: f64,
}

impl Circle {
    /// Creates a circle. Negative radii are clamped to zero.
    pub fn new(centre: Point2d, radius: f64) -> Self {
        Self {
            centre,
            radius: radius.max(0.0),
        }
    }

    /// Whether `point` lies inside or on the circle.
    pub fn contains(&self, point: Point2d) -> bool {
        self.centre.distance(point) <= self.radius
    }

    /// Whether any point of `line` lies inside or on the circle.
    pub fn touches_line(&self, line: &LineSegment2d) -> bool {
        line.distance_to(self.centre) <= self.radius
    }

    /// Finds the points where `line` crosses the circle boundary.
    ///
    /// Returns nothing if the line's nearest point to the centre is outside the
    /// circle or outside the segment, one point on tangency, and otherwise the
    /// crossings found on the halves of the segment either side of the nearest
    /// point, ordered from the `begin` half to the `end` half.
    pub fn intersection_with_line(&self, line: &LineSegment2d) -> SmallVec<[Point2d; 2]> {
        let mut result = SmallVec::new();
        if line.length() == 0.0 {
            return result;
        }

        let nearest = line.nearest(self.centre);
        let distance = self.centre.distance(nearest);
        if distance > self.radius || (line.begin - nearest).dot(line.end - nearest) > 0.0 {
            return result;
        }
        if distance == self.radius {
            result.push(nearest);
            return result;
        }

        for end in [line.begin, line.end] {
            let half = LineSegment2d::from_ends(nearest, end);
            if half.length() == 0.0 {
                continue;
            }
            let f = |t: f64| self.centre.distance(half.at(t)) - self.radius;
            if sign(f(0.0)) != sign(f(1.0)) {
                result.push(half.at(bisect(f, 0.0, 1.0, CROSSING_TOLERANCE)));
            }
        }
        result
    }
}

/// Sign of a value, with zero mapping to zero.
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    fn unit() -> Circle {
        Circle::new(Point2d::new(0.0, 0.0), 1.0)
    }

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment2d {
        LineSegment2d::from_ends(Point2d::new(x1, y1), Point2d::new(x2, y2))
    }

    #[test]
    fn line_from_centre() {
        let points = unit().intersection_with_line(&line(0.0, 0.0, 2.0, 0.0));
        assert_eq!(points.len(), 1);
        assert_approx_eq!(points[0].x, 1.0, 1e-6);
        assert_approx_eq!(points[0].y, 0.0, 1e-6);
    }

    #[test]
    fn line_through_circle() {
        let points = unit().intersection_with_line(&line(-2.0, 0.0, 2.0, 0.0));
        assert_eq!(points.len(), 2);
        assert_approx_eq!(points[0].x, -1.0, 1e-6);
        assert_approx_eq!(points[1].x, 1.0, 1e-6);
    }

    #[test]
    fn tangent_line() {
        let points = unit().intersection_with_line(&line(-2.0, 1.0, 2.0, 1.0));
        assert_eq!(points.as_slice(), &[Point2d::new(0.0, 1.0)]);
    }

    #[test]
    fn line_inside_circle() {
        let points = unit().intersection_with_line(&line(-0.5, 0.1, 0.5, -0.1));
        assert!(points.is_empty());
    }

    #[test]
    fn line_outside_circle() {
        assert!(unit().intersection_with_line(&line(-2.0, 3.0, 2.0, 3.0)).is_empty());
        assert!(unit().intersection_with_line(&line(2.0, -1.0, 2.0, 1.0)).is_empty());
    }

    #[test]
    fn degenerate_inputs() {
        assert!(unit().intersection_with_line(&line(1.0, 0.0, 1.0, 0.0)).is_empty());
        let point = Circle::new(Point2d::new(1.0, 0.0), 0.0);
        let points = point.intersection_with_line(&line(0.0, 0.0, 2.0, 0.0));
        assert_eq!(points.as_slice(), &[Point2d::new(1.0, 0.0)]);
    }

    #[test]
    fn crossings_lie_on_circle_and_segment() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _ in 0..500 {
            let circle = Circle::new(
                Point2d::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)),
                rng.gen_range(0.1..4.0),
            );
            let segment = line(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            for point in circle.intersection_with_line(&segment) {
                assert_approx_eq!(circle.centre.distance(point), circle.radius, 1e-6);
                let t = segment.project(point);
                assert!((-1e-9..=1.0 + 1e-9).contains(&t));
            }
        }
    }
}
