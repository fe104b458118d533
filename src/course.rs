//! Choosing the direction to travel in for a single tick.

use crate::barrier::{Barrier, Lane, TileBarrierCache};
use crate::debug::{debug_circle, debug_line, debug_ray};
use crate::math::{rotate, rotation, Point2d, Polyline, Vector2d};
use crate::tile::{TileGrid, TilePos};
use crate::util::Interval;
use cgmath::prelude::*;
use log::{debug, warn};
use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_4, PI, TAU};

/// Half width of the angular windows searched around the course (rad).
const WINDOW_RADIUS: f64 = FRAC_PI_4;

/// Intervals narrower than this end the angular search (rad).
const MIN_ROTATION_INTERVAL: f64 = 0.125;

/// Rotations whose deviations differ by less than this are tied (rad).
const TIE_TOLERANCE: f64 = 1e-8;

/// Bisects `window` for values at which `is_true` is false.
///
/// Intervals are split breadth first while the predicate holds at their
/// midpoints. Once a false value is found on one side of the window's
/// centre, the search keeps narrowing towards the centre on that side.
/// The search stops as soon as an interval narrower than `min_interval`
/// comes up.
///
/// Returns the false values nearest the centre below and above it.
pub fn find_false(
    window: Interval<f64>,
    mut is_true: impl FnMut(f64) -> bool,
    min_interval: f64,
) -> (Option<f64>, Option<f64>) {
    let centre = window.midpoint();
    let mut left: Option<f64> = None;
    let mut right: Option<f64> = None;
    let mut queue = VecDeque::from([window]);

    while let Some(interval) = queue.pop_front() {
        if interval.length() < min_interval {
            break;
        }
        let middle = interval.midpoint();
        if is_true(middle) {
            queue.extend(interval.halves());
        } else if middle < centre {
            if left.map_or(true, |l| centre - middle < centre - l) {
                left = Some(middle);
            }
            queue.push_front(Interval::new(middle, interval.max));
        } else {
            if right.map_or(true, |r| middle - centre < r - centre) {
                right = Some(middle);
            }
            queue.push_front(Interval::new(interval.min, middle));
        }
    }

    (left, right)
}

/// Unsigned difference between two angles, in `[0, pi]`.
fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(TAU);
    diff.min(TAU - diff)
}

/// Finds the rotation in `window` nearest its centre at which the course
/// is not blocked.
///
/// The centre itself is tried first. Between equally deviating rotations
/// either side of the centre, the one nearer `heading` (the heading's
/// angle relative to the course) wins.
pub fn adjust_course_rotation(
    mut is_blocked: impl FnMut(f64) -> bool,
    window: Interval<f64>,
    heading: f64,
) -> Option<f64> {
    let centre = window.midpoint();
    if !is_blocked(centre) {
        return Some(centre);
    }
    match find_false(window, is_blocked, MIN_ROTATION_INTERVAL) {
        (Some(left), Some(right)) => {
            let (dl, dr) = (centre - left, right - centre);
            if (dl - dr).abs() < TIE_TOLERANCE {
                if angular_distance(heading, left) < angular_distance(heading, right) {
                    Some(left)
                } else {
                    Some(right)
                }
            } else if dl < dr {
                Some(left)
            } else {
                Some(right)
            }
        }
        (left, None) => left,
        (None, right) => right,
    }
}

/// Rotations within 45 degrees of the course.
pub fn forward_window() -> Interval<f64> {
    Interval::disc(0.0, WINDOW_RADIUS)
}

/// Rotations within 45 degrees of the reversed course.
pub fn backward_window() -> Interval<f64> {
    forward_window() - PI
}

/// Which obstacles and directions the chosen course was cleared against,
/// in order of preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseTier {
    /// Near the course, clear of static and dynamic barriers.
    Forward,
    /// Near the course, clear of static barriers.
    ForwardStatic,
    /// Near the reversed course, clear of static and dynamic barriers.
    Backward,
    /// Near the reversed course, clear of static barriers.
    BackwardStatic,
    /// The naive course, cleared against nothing.
    Naive,
}

/// The course chosen for a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Course {
    /// Desired travel vector from the vehicle's position.
    pub vector: Vector2d,
    /// The path point the naive course heads for.
    pub target: Point2d,
    pub tier: CourseTier,
}

/// Everything the course planner looks at in a tick.
#[derive(Clone, Copy, Debug)]
pub struct CourseInput<'a> {
    pub position: Point2d,
    /// Direction the vehicle faces.
    pub heading: Vector2d,
    /// Width of the lane which must be clear.
    pub lane_width: f64,
    /// The next few points of the path, nearest first.
    pub path: &'a [Point2d],
    pub tiles: &'a TileGrid,
    pub tile_size: f64,
    pub tile_margin: f64,
    /// Barriers of relevant dynamic entities.
    pub dynamic: &'a [Barrier],
}

/// Deflects the course towards the path around obstacles.
#[derive(Clone, Debug, Default)]
pub struct CoursePlanner {
    barriers: TileBarrierCache,
}

impl CoursePlanner {
    pub fn new() -> Self {
        Default::default()
    }

    /// The static barriers of the last planned track.
    pub fn barriers(&self) -> &TileBarrierCache {
        &self.barriers
    }

    /// Plans the course for a tick.
    ///
    /// The naive course heads for the point one tile along the path, or for
    /// the first path point if that is farther. It is then rotated by the
    /// smallest angle which leaves a clear lane, trying in turn: near the
    /// course against all barriers, near the course against static barriers,
    /// then the same two near the reversed course. If all of those fail the
    /// naive course is used.
    pub fn plan(&mut self, input: &CourseInput) -> Course {
        let position = input.position;
        let first = match input.path.first() {
            Some(first) => *first,
            None => {
                return Course {
                    vector: Vector2d::zero(),
                    target: position,
                    tier: CourseTier::Naive,
                }
            }
        };

        let polyline = Polyline::new(
            std::iter::once(position)
                .chain(input.path.iter().copied())
                .collect(),
        );
        let ahead = polyline.at(input.tile_size).unwrap_or(first);
        let target = if ahead.distance2(position) >= first.distance2(position) {
            ahead
        } else {
            first
        };
        let course = target - position;

        self.barriers
            .update(input.tiles, input.tile_margin, input.tile_size);
        let current_tile = TilePos::containing(position, input.tile_size);
        let target_tile = TilePos::containing(target, input.tile_size);
        let target_tile = TilePos::new(
            target_tile.x.clamp(0, (input.tiles.width() as i32 - 1).max(0)),
            target_tile.y.clamp(0, (input.tiles.height() as i32 - 1).max(0)),
        );
        let static_barriers = self.barriers.collect_box(current_tile, target_tile);
        let all_barriers: Vec<Barrier> = static_barriers
            .iter()
            .chain(input.dynamic)
            .copied()
            .collect();

        let heading = rotation(course, input.heading);
        let lane = Lane::new(position, course, input.lane_width);
        let tiers = [
            (CourseTier::Forward, forward_window(), all_barriers.as_slice()),
            (CourseTier::ForwardStatic, forward_window(), static_barriers.as_slice()),
            (CourseTier::Backward, backward_window(), all_barriers.as_slice()),
            (CourseTier::BackwardStatic, backward_window(), static_barriers.as_slice()),
        ];
        let found = tiers.iter().find_map(|&(tier, window, barriers)| {
            let is_blocked = |angle| lane.rotated(angle).is_blocked_by(barriers);
            adjust_course_rotation(is_blocked, window, heading).map(|angle| (tier, angle))
        });

        debug_line("target", position, target);
        for barrier in input.dynamic {
            if let Barrier::Movable(circle) = barrier {
                debug_circle("obstacle", circle.centre, circle.radius);
            }
        }
        match found {
            Some((tier, angle)) => {
                if tier != CourseTier::Forward {
                    debug!("Course cleared at {:?} by {:.3} rad", tier, angle);
                }
                let vector = rotate(course, angle);
                debug_ray("course", position, vector);
                Course {
                    vector,
                    target,
                    tier,
                }
            }
            None => {
                warn!(
                    "No clear course from {:?} towards {:?}, keeping the naive course",
                    position, target
                );
                Course {
                    vector: course,
                    target,
                    tier: CourseTier::Naive,
                }
            }
        }
    }
}
