use crate::course::{CourseInput, CoursePlanner, CourseTier};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::debug_path;
use crate::graph::TileGraph;
use crate::math::{cos_between, normalize_or, LineSegment2d, Point2d, Rectangle, Vector2d};
use crate::obstacle::{entity_barriers, DynamicEntity};
use crate::route::{adjust_path, shift_on_direct, tiles_path};
use crate::tile::{TileGrid, TilePos, TileType};
use crate::util::wrap_index;
use cgmath::prelude::*;
use log::{debug, warn};

/// The path is rebuilt when its head is farther than this from the vehicle.
const DESYNC_DISTANCE: f64 = 2.0; // tiles

/// Path points nearer than this may be dropped once they fall to the side.
const PASSING_DISTANCE: f64 = 0.75; // tiles

/// Cosine of the angle from the heading beyond which a near path point has been passed.
const PASSING_COS: f64 = 0.25;

/// Length of the straight unstuck manoeuvres.
const UNSTUCK_DISTANCE: f64 = 2.0; // tiles

/// Unstuck manoeuvres which would leave the world stop this fraction of the
/// way to its edge.
const UNSTUCK_EDGE_FRACTION: f64 = 0.99;

/// Below this speed a backward path starts from behind the vehicle.
const STANDSTILL_SPEED: f64 = 1.0; // per tick

/// The attributes of a planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerAttributes {
    /// The number of laps of waypoints to route ahead.
    pub laps: usize,
    /// The number of path points the course is chosen along.
    pub course_path_size: usize,
}

impl Default for PlannerAttributes {
    fn default() -> Self {
        Self {
            laps: 1,
            course_path_size: 3,
        }
    }
}

/// The track as seen in the current tick.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    /// The tile types, which may be revealed over time.
    pub tiles: TileGrid,
    /// The tiles which must be visited in order, forming a lap.
    pub waypoints: Vec<TilePos>,
    /// The side length of a tile in world units.
    pub tile_size: f64,
    /// The thickness of the walls along closed tile edges.
    pub tile_margin: f64,
}

impl Track {
    /// The tile containing a world space point.
    pub fn tile_of(&self, point: Point2d) -> TilePos {
        TilePos::containing(point, self.tile_size)
    }

    /// The world space extent of the track.
    pub fn world_rectangle(&self) -> Rectangle {
        let origin = Point2d::new(0.0, 0.0);
        Rectangle::new(origin, origin + self.tiles.world_size(self.tile_size))
    }

    /// Counts the points of a path lying on tiles of the given type.
    pub fn count_tiles(&self, path: &[Point2d], tile: TileType) -> usize {
        path.iter()
            .filter(|p| self.tiles.get(self.tile_of(**p)) == Some(tile))
            .count()
    }
}

/// The state of the planned vehicle in the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleState {
    /// The ID of the vehicle among the [DynamicEntity] vehicles.
    pub id: u64,
    /// The world space coordinates of the vehicle's centre.
    pub position: Point2d,
    /// The direction the vehicle faces.
    pub heading: Vector2d,
    /// The velocity of the vehicle per tick.
    pub velocity: Vector2d,
    /// The length of the vehicle.
    pub width: f64,
    /// The breadth of the vehicle.
    pub height: f64,
    /// The index of the next waypoint to visit.
    pub next_waypoint: usize,
}

impl VehicleState {
    /// The width of the lane the vehicle needs, whichever way it turns.
    pub fn lane_width(&self) -> f64 {
        f64::max(self.width, self.height)
    }

    fn min_size(&self) -> f64 {
        f64::min(self.width, self.height)
    }
}

/// How the planner builds its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Along the next waypoints.
    Forward,
    /// Back along the previous waypoints.
    Backward,
    /// Straight back from the current position.
    UnstuckBackward,
    /// Straight ahead from the current position.
    UnstuckForward,
}

impl Strategy {
    /// The strategy to switch to when the vehicle is stuck following this one.
    pub fn on_stuck(self) -> Strategy {
        match self {
            Strategy::Forward => Strategy::UnstuckBackward,
            Strategy::Backward => Strategy::UnstuckForward,
            Strategy::UnstuckBackward => Strategy::UnstuckForward,
            Strategy::UnstuckForward => Strategy::UnstuckBackward,
        }
    }
}

/// Why a path was rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildReason {
    /// Every point has been passed.
    EmptyPath,
    /// The next point lies on an empty tile.
    EmptyTile,
    /// Unknown tiles along the path have been revealed.
    TrackRevealed,
    /// The vehicle is far from the next point.
    Desync,
}

/// The result of planning a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    /// The direction to travel in.
    pub course: Vector2d,
    /// The path point the course was aimed at before avoiding obstacles.
    pub target: Point2d,
    pub tier: CourseTier,
    /// The path ahead, nearest point first.
    pub path: Vec<Point2d>,
    pub strategy: Strategy,
}

/// The tile graph of the last seen tile grid.
#[derive(Clone, Debug, Default)]
struct GraphCache {
    tiles: Option<TileGrid>,
    graph: TileGraph,
}

impl GraphCache {
    fn get(&mut self, tiles: &TileGrid) -> &TileGraph {
        if self.tiles.as_ref() != Some(tiles) {
            debug!("Building graph of {}x{} tiles", tiles.width(), tiles.height());
            self.graph = TileGraph::new(tiles);
            self.tiles = Some(tiles.clone());
        }
        &self.graph
    }
}

/// Plans the course of a single vehicle, tick by tick.
///
/// The planner keeps a path of world space points across ticks. Points are
/// dropped as the vehicle passes them, and the whole path is rebuilt with
/// the current [Strategy] when it runs out or stops matching the track.
#[derive(Clone, Debug)]
pub struct Planner {
    attribs: PlannerAttributes,
    strategy: Strategy,
    path: Vec<Point2d>,
    /// Unknown tiles crossed by the path when it was built.
    unknown_count: usize,
    /// The tile the vehicle was on in the previous tick.
    start_tile: Option<TilePos>,
    /// The waypoint the backward path was last anchored at.
    backward_begin: Option<usize>,
    graph: GraphCache,
    course: CoursePlanner,
    /// Debugging information from the previously planned tick.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Planner {
    /// Creates a planner which starts out following the waypoints forward.
    pub fn new(attribs: PlannerAttributes) -> Self {
        Self {
            attribs,
            strategy: Strategy::Forward,
            path: vec![],
            unknown_count: 0,
            start_tile: None,
            backward_begin: None,
            graph: Default::default(),
            course: CoursePlanner::new(),
            #[cfg(feature = "debug")]
            debug: Default::default(),
        }
    }

    pub fn attributes(&self) -> &PlannerAttributes {
        &self.attribs
    }

    /// The current path building strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_forward(&self) -> bool {
        self.strategy == Strategy::Forward
    }

    /// The path as of the last tick.
    pub fn path(&self) -> &[Point2d] {
        &self.path
    }

    /// Reports that the vehicle is stuck, advancing the strategy.
    pub fn on_stuck(&mut self) {
        self.set_strategy(self.strategy.on_stuck());
    }

    /// Reports that the vehicle is moving freely, restoring the forward strategy.
    pub fn on_unstuck(&mut self) {
        if !self.is_forward() {
            self.set_strategy(Strategy::Forward);
        }
    }

    /// Starts following the waypoints backward.
    pub fn use_backward(&mut self) {
        self.set_strategy(Strategy::Backward);
    }

    fn set_strategy(&mut self, strategy: Strategy) {
        debug!("Strategy {:?} -> {:?}", self.strategy, strategy);
        self.strategy = strategy;
        self.path.clear();
    }

    /// Plans a tick: updates the path and chooses a course along it around
    /// the given entities.
    pub fn tick(
        &mut self,
        vehicle: &VehicleState,
        track: &Track,
        entities: &[DynamicEntity],
    ) -> Plan {
        let tile = track.tile_of(vehicle.position);
        self.start_tile.get_or_insert(tile);
        self.update_path(vehicle, track);
        self.start_tile = Some(tile);

        let lookahead = &self.path[..self.path.len().min(self.attribs.course_path_size)];
        let dynamic = entity_barriers(entities, vehicle.id, vehicle.velocity);
        let course = self.course.plan(&CourseInput {
            position: vehicle.position,
            heading: vehicle.heading,
            lane_width: vehicle.lane_width(),
            path: lookahead,
            tiles: &track.tiles,
            tile_size: track.tile_size,
            tile_margin: track.tile_margin,
            dynamic: &dynamic,
        });
        debug_path("path", &self.path);

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }

        Plan {
            course: course.vector,
            target: course.target,
            tier: course.tier,
            path: self.path.clone(),
            strategy: self.strategy,
        }
    }

    /// Gets the debugging information for the previously planned tick as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Drops passed points, then rebuilds the path if needed.
    fn update_path(&mut self, vehicle: &VehicleState, track: &Track) {
        let passed = self
            .path
            .iter()
            .take_while(|p| is_passed(vehicle, track, **p))
            .count();
        self.path.drain(..passed);

        if let Some(reason) = self.rebuild_reason(vehicle, track) {
            debug!("Rebuilding {:?} path: {:?}", self.strategy, reason);
            self.path = self.build_path(vehicle, track);
            self.unknown_count = track.count_tiles(&self.path, TileType::Unknown);
        }
    }

    /// Checks whether the path must be rebuilt.
    pub fn rebuild_reason(&self, vehicle: &VehicleState, track: &Track) -> Option<RebuildReason> {
        let head = match self.path.first() {
            Some(head) => *head,
            None => return Some(RebuildReason::EmptyPath),
        };
        if track.tiles.get(track.tile_of(head)) == Some(TileType::Empty) {
            return Some(RebuildReason::EmptyTile);
        }
        if track.count_tiles(&self.path, TileType::Unknown) != self.unknown_count {
            return Some(RebuildReason::TrackRevealed);
        }
        if head.distance(vehicle.position) > DESYNC_DISTANCE * track.tile_size {
            return Some(RebuildReason::Desync);
        }
        None
    }

    fn build_path(&mut self, vehicle: &VehicleState, track: &Track) -> Vec<Point2d> {
        let path = match self.strategy {
            Strategy::Forward => {
                let waypoints = forward_waypoints(track, vehicle.next_waypoint, self.attribs.laps);
                self.waypoints_path(vehicle, track, &waypoints)
            }
            Strategy::Backward => {
                let waypoints = self.backward_waypoints(vehicle, track);
                let mut path = self.waypoints_path(vehicle, track, &waypoints);
                if !path.is_empty() {
                    path.remove(0);
                }
                if vehicle.velocity.magnitude() < STANDSTILL_SPEED {
                    let back = normalize_or(vehicle.heading, Vector2d::zero()) * track.tile_size;
                    path.insert(0, vehicle.position - back);
                }
                path
            }
            Strategy::UnstuckBackward => unstuck_path(vehicle, track, -UNSTUCK_DISTANCE),
            Strategy::UnstuckForward => unstuck_path(vehicle, track, UNSTUCK_DISTANCE),
        };
        if path.is_empty() {
            warn!("Empty {:?} path, holding position", self.strategy);
            vec![vehicle.position]
        } else {
            path
        }
    }

    /// Builds a world space path through the waypoints, starting from the
    /// tile the vehicle was on.
    fn waypoints_path(
        &mut self,
        vehicle: &VehicleState,
        track: &Track,
        waypoints: &[TilePos],
    ) -> Vec<Point2d> {
        let tile = track.tile_of(vehicle.position);
        let start = self.start_tile.unwrap_or(tile);
        let graph = self.graph.get(&track.tiles);

        let mut tiles = tiles_path(graph, tile, waypoints, vehicle.heading);
        if tiles.first() != Some(&start) {
            tiles.insert(0, start);
        }
        let points: Vec<Point2d> = tiles.iter().map(|t| t.centre(track.tile_size)).collect();
        let shift = 0.5 * track.tile_size - track.tile_margin - 0.5 * vehicle.lane_width();
        shift_on_direct(&adjust_path(&points, shift, track.tile_size))
    }

    /// The previous waypoints, most recent first, counting back from the
    /// waypoint the vehicle last stood on.
    fn backward_waypoints(&mut self, vehicle: &VehicleState, track: &Track) -> Vec<TilePos> {
        let waypoints = &track.waypoints;
        if waypoints.is_empty() {
            return vec![];
        }
        let len = waypoints.len();
        let fallback = *self
            .backward_begin
            .get_or_insert_with(|| wrap_index(vehicle.next_waypoint as isize - 1, len));
        let begin = self
            .start_tile
            .and_then(|start| waypoints.iter().position(|w| *w == start))
            .unwrap_or(fallback);
        self.backward_begin = Some(begin);

        (1..=len * self.attribs.laps)
            .map(|k| waypoints[wrap_index(begin as isize - k as isize, len)])
            .collect()
    }
}

/// Whether the vehicle has passed a path point: it is very near, or near
/// and off to the side.
fn is_passed(vehicle: &VehicleState, track: &Track, point: Point2d) -> bool {
    let offset = point - vehicle.position;
    let distance = offset.magnitude();
    distance < vehicle.min_size()
        || (distance < PASSING_DISTANCE * track.tile_size
            && cos_between(vehicle.heading, offset) < PASSING_COS)
}

/// The next waypoints, for the given number of laps.
fn forward_waypoints(track: &Track, next: usize, laps: usize) -> Vec<TilePos> {
    let waypoints = &track.waypoints;
    if waypoints.is_empty() {
        return vec![];
    }
    (0..waypoints.len() * laps)
        .map(|k| waypoints[(next + k) % waypoints.len()])
        .collect()
}

/// A single point `factor` tiles along the heading, kept inside the world.
fn unstuck_path(vehicle: &VehicleState, track: &Track, factor: f64) -> Vec<Point2d> {
    let heading = normalize_or(vehicle.heading, Vector2d::zero());
    let line = LineSegment2d::from_vector(vehicle.position, heading * factor * track.tile_size);
    match track.world_rectangle().clip(&line) {
        Some(clipped) if clipped != line => {
            vec![clipped.begin + (clipped.end - clipped.begin) * UNSTUCK_EDGE_FRACTION]
        }
        _ => vec![line.end],
    }
}
