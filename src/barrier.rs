//! Passability-bearing shapes built from track tiles and dynamic entities.

use crate::math::{normalize_or, rot90, rotate, Circle, LineSegment2d, Point2d, Rectangle, Vector2d};
use crate::tile::{TileGrid, TilePos, TileType};
use cgmath::prelude::*;
use smallvec::{smallvec, SmallVec};
use std::collections::HashSet;

/// The barriers of a single tile.
pub type TileBarriers = SmallVec<[Barrier; 4]>;

/// An obstacle a moving disc must avoid.
///
/// Passability is expressed in `[0, 1]`, where 0 is freely passable and
/// 1 is fully blocked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Barrier {
    /// An immovable circular post.
    Circle(Circle),
    /// An immovable wall.
    Rectangle(Rectangle),
    /// A movable disc, such as another vehicle.
    Movable(Circle),
}

impl Barrier {
    /// How blocked a disc of `radius` at `position` is by this barrier.
    ///
    /// Immovable shapes are either passable or not. A movable disc blocks
    /// fully on contact and otherwise falls off with the square of the
    /// distance between centres.
    ///
    /// The velocity of the moving disc is accepted for symmetry between
    /// callers but does not currently affect any shape.
    pub fn passability(&self, position: Point2d, radius: f64, _velocity: Vector2d) -> f64 {
        match self {
            Barrier::Circle(circle) => {
                let blocked = circle.centre.distance(position) <= circle.radius + radius;
                if blocked {
                    1.0
                } else {
                    0.0
                }
            }
            Barrier::Rectangle(rect) => {
                if rect.overlaps_disc(position, radius) {
                    1.0
                } else {
                    0.0
                }
            }
            Barrier::Movable(circle) => {
                let distance = circle.centre.distance(position);
                let reach = circle.radius + radius;
                if distance <= reach {
                    1.0
                } else {
                    (reach / distance).powi(2)
                }
            }
        }
    }

    /// The points where `line` crosses the boundary of the barrier.
    pub fn intersection_with_line(&self, line: &LineSegment2d) -> SmallVec<[Point2d; 2]> {
        match self {
            Barrier::Circle(circle) | Barrier::Movable(circle) => {
                circle.intersection_with_line(line)
            }
            Barrier::Rectangle(rect) => {
                let mut result = SmallVec::new();
                if let Some(clipped) = rect.clip(line) {
                    if clipped.begin != line.begin {
                        result.push(clipped.begin);
                    }
                    if clipped.end != line.end && clipped.end != clipped.begin {
                        result.push(clipped.end);
                    }
                }
                result
            }
        }
    }

    /// Whether any part of `line` lies within the barrier.
    pub fn touches_line(&self, line: &LineSegment2d) -> bool {
        match self {
            Barrier::Circle(circle) | Barrier::Movable(circle) => circle.touches_line(line),
            Barrier::Rectangle(rect) => rect.touches_line(line),
        }
    }
}

/// Builds the walls and corner posts of a tile.
///
/// Walls are `margin` thick rectangles along the closed edges of the tile;
/// posts are `margin` radius circles on the corners between two open edges.
/// Empty and unknown tiles are blocked entirely.
pub fn make_tile_barriers(tile: TileType, pos: TilePos, margin: f64, size: f64) -> TileBarriers {
    let origin = Point2d::new(pos.x as f64 * size, pos.y as f64 * size);
    let point = |x: f64, y: f64| origin + Vector2d::new(x, y);
    let rect = |x1, y1, x2, y2| Barrier::Rectangle(Rectangle::new(point(x1, y1), point(x2, y2)));
    let post = |x, y| Barrier::Circle(Circle::new(point(x, y), margin));

    let left = rect(0.0, 0.0, margin, size);
    let right = rect(size - margin, 0.0, size, size);
    let top = rect(0.0, 0.0, size, margin);
    let bottom = rect(0.0, size - margin, size, size);
    let left_top = post(0.0, 0.0);
    let left_bottom = post(0.0, size);
    let right_top = post(size, 0.0);
    let right_bottom = post(size, size);

    use TileType::*;
    match tile {
        Vertical => smallvec![left, right],
        Horizontal => smallvec![top, bottom],
        LeftTopCorner => smallvec![left, top, right_bottom],
        RightTopCorner => smallvec![right, top, left_bottom],
        LeftBottomCorner => smallvec![left, bottom, right_top],
        RightBottomCorner => smallvec![right, bottom, left_top],
        LeftHeadedT => smallvec![left_top, left_bottom, right],
        RightHeadedT => smallvec![right_top, right_bottom, left],
        TopHeadedT => smallvec![left_top, right_top, bottom],
        BottomHeadedT => smallvec![left_bottom, right_bottom, top],
        Crossroads => smallvec![left_top, left_bottom, right_top, right_bottom],
        Empty | Unknown => smallvec![rect(0.0, 0.0, size, size)],
    }
}

/// Builds the barriers of every tile in the grid, in flat index order.
pub fn make_tiles_barriers(tiles: &TileGrid, margin: f64, size: f64) -> Vec<TileBarriers> {
    tiles
        .iter()
        .map(|(pos, tile)| make_tile_barriers(tile, pos, margin, size))
        .collect()
}

/// The static barriers of the last seen tile grid.
///
/// The barriers are rebuilt whenever the grid or its dimensions change.
#[derive(Clone, Debug, Default)]
pub struct TileBarrierCache {
    tiles: TileGrid,
    margin: f64,
    size: f64,
    barriers: Vec<TileBarriers>,
}

impl TileBarrierCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// Rebuilds the barriers if the grid differs from the cached one.
    /// Returns true if a rebuild happened.
    pub fn update(&mut self, tiles: &TileGrid, margin: f64, size: f64) -> bool {
        let stale = self.barriers.len() != tiles.len()
            || self.margin != margin
            || self.size != size
            || self.tiles != *tiles;
        if stale {
            self.tiles = tiles.clone();
            self.margin = margin;
            self.size = size;
            self.barriers = make_tiles_barriers(tiles, margin, size);
        }
        stale
    }

    /// The barriers of a tile; empty for tiles outside the cached grid.
    pub fn get(&self, pos: TilePos) -> &[Barrier] {
        self.tiles
            .index(pos)
            .and_then(|idx| self.barriers.get(idx))
            .map_or(&[], |b| b.as_slice())
    }

    /// Collects the barriers of every tile in the inclusive box spanned by two tiles.
    pub fn collect_box(&self, a: TilePos, b: TilePos) -> Vec<Barrier> {
        let xs = a.x.min(b.x)..=a.x.max(b.x);
        let ys = a.y.min(b.y)..=a.y.max(b.y);
        itertools::iproduct!(xs, ys)
            .flat_map(|(x, y)| self.get(TilePos::new(x, y)).iter().copied())
            .collect()
    }
}

/// The rectangle swept by a segment `width` wide moving along `course`
/// from `position`, square to the course at both ends. A lane of zero
/// width is a single line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lane {
    pub position: Point2d,
    pub course: Vector2d,
    pub width: f64,
}

impl Lane {
    pub fn new(position: Point2d, course: Vector2d, width: f64) -> Self {
        Self {
            position,
            course,
            width,
        }
    }

    /// A copy of the lane with its course rotated by `angle`.
    pub fn rotated(&self, angle: f64) -> Self {
        Self {
            course: rotate(self.course, angle),
            ..*self
        }
    }

    /// Unit vectors along and across the lane.
    fn axes(&self) -> (Vector2d, Vector2d) {
        let along = normalize_or(self.course, Vector2d::unit_x());
        (along, rot90(along))
    }

    fn half_width(&self) -> f64 {
        0.5 * self.width.max(0.0)
    }

    /// The corners of the lane, starting beside `position`.
    pub fn corners(&self) -> [Point2d; 4] {
        let (_, across) = self.axes();
        let half = across * self.half_width();
        let end = self.position + self.course;
        [self.position + half, end + half, end - half, self.position - half]
    }

    /// Distance from `point` to the nearest point of the lane; zero inside.
    pub fn distance_to(&self, point: Point2d) -> f64 {
        let (along, across) = self.axes();
        let offset = point - self.position;
        let (u, v) = (offset.dot(along), offset.dot(across));
        let half = self.half_width();
        Vector2d::new(
            u - u.clamp(0.0, self.course.magnitude()),
            v - v.clamp(-half, half),
        )
        .magnitude()
    }

    /// Whether `rect` overlaps or touches the lane, by separating axes.
    fn overlaps(&self, rect: &Rectangle) -> bool {
        let (along, across) = self.axes();
        let lane = self.corners();
        let rect = rect.corners();
        [Vector2d::unit_x(), Vector2d::unit_y(), along, across]
            .iter()
            .all(|axis| {
                let (a0, a1) = project(&lane, *axis);
                let (b0, b1) = project(&rect, *axis);
                a0 <= b1 && b0 <= a1
            })
    }

    /// Whether the barrier overlaps or touches the lane.
    pub fn meets(&self, barrier: &Barrier) -> bool {
        match barrier {
            Barrier::Circle(circle) | Barrier::Movable(circle) => {
                self.distance_to(circle.centre) <= circle.radius
            }
            Barrier::Rectangle(rect) => self.overlaps(rect),
        }
    }

    /// Whether any of the barriers lies on the lane.
    pub fn is_blocked_by(&self, barriers: &[Barrier]) -> bool {
        barriers.iter().any(|barrier| self.meets(barrier))
    }
}

/// The extent of points projected onto an axis.
fn project(points: &[Point2d], axis: Vector2d) -> (f64, f64) {
    points
        .iter()
        .map(|p| p.to_vec().dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        })
}

/// Whether the course rotated by `angle` from `position` meets any of the barriers.
pub fn has_intersection_with_line(
    position: Point2d,
    course: Vector2d,
    barriers: &[Barrier],
    angle: f64,
) -> bool {
    Lane::new(position, course, 0.0)
        .rotated(angle)
        .is_blocked_by(barriers)
}

/// Whether a `width` wide lane along the course rotated by `angle` from
/// `position` meets any of the barriers.
pub fn has_intersection_with_lane(
    position: Point2d,
    course: Vector2d,
    barriers: &[Barrier],
    width: f64,
    angle: f64,
) -> bool {
    Lane::new(position, course, width)
        .rotated(angle)
        .is_blocked_by(barriers)
}

/// Samples how blocked a moving disc would be at any point near the route.
pub struct PassabilityField<'a> {
    barriers: &'a [Barrier],
    radius: f64,
    velocity: Vector2d,
    tiles: HashSet<TilePos>,
    tile_size: f64,
}

impl<'a> PassabilityField<'a> {
    /// Creates a field over the given tiles. Points outside them are fully blocked.
    pub fn new(
        barriers: &'a [Barrier],
        radius: f64,
        velocity: Vector2d,
        tiles: impl IntoIterator<Item = TilePos>,
        tile_size: f64,
    ) -> Self {
        Self {
            barriers,
            radius,
            velocity,
            tiles: tiles.into_iter().collect(),
            tile_size,
        }
    }

    /// The blockage of the most restrictive barrier at `point`.
    pub fn at(&self, point: Point2d) -> f64 {
        if !self.tiles.contains(&TilePos::containing(point, self.tile_size)) {
            return 1.0;
        }
        self.barriers
            .iter()
            .map(|b| b.passability(point, self.radius, self.velocity))
            .fold(0.0, f64::max)
    }
}
