//! Tests that choose courses along a single straight.

use assert_approx_eq::assert_approx_eq;
use std::f64::consts::{FRAC_PI_4, PI};
use track_planner::{
    math::{rotation, Circle, Point2d, Vector2d},
    Barrier, CourseInput, CoursePlanner, CourseTier, DynamicEntity, EntityKind, Footprint, Lane,
    Planner, Strategy, TileGrid, TilePos, Track, VehicleState,
};

const TILE_SIZE: f64 = 800.0;
const TILE_MARGIN: f64 = 80.0;
const LANE_WIDTH: f64 = 210.0;

fn straight() -> TileGrid {
    TileGrid::from_rows(&["│", "│", "│"]).unwrap()
}

fn position() -> Point2d {
    Point2d::new(400.0, 2000.0)
}

fn plan(tiles: &TileGrid, dynamic: &[Barrier]) -> (CoursePlanner, track_planner::Course) {
    let path = [Point2d::new(400.0, 1200.0), Point2d::new(400.0, 400.0)];
    let mut planner = CoursePlanner::new();
    let course = planner.plan(&CourseInput {
        position: position(),
        heading: Vector2d::new(0.0, -1.0),
        lane_width: LANE_WIDTH,
        path: &path,
        tiles,
        tile_size: TILE_SIZE,
        tile_margin: TILE_MARGIN,
        dynamic,
    });
    (planner, course)
}

/// Test that an empty straight is driven straight up.
#[test]
fn clear_straight_keeps_naive_course() {
    let tiles = straight();
    let (_, course) = plan(&tiles, &[]);
    assert_eq!(course.tier, CourseTier::Forward);
    assert_eq!(course.target, Point2d::new(400.0, 1200.0));
    assert_eq!(course.vector, Vector2d::new(0.0, -800.0));
}

/// Test that an obstacle just right of the middle deflects the course left
/// by the smallest rotation the search can resolve.
#[test]
fn obstacle_ahead_deflects_course() {
    let tiles = straight();
    let car = [Barrier::Movable(Circle::new(Point2d::new(470.0, 1600.0), 30.0))];
    let (planner, course) = plan(&tiles, &car);

    assert_eq!(course.tier, CourseTier::Forward);
    let angle = rotation(Vector2d::new(0.0, -800.0), course.vector);
    assert_approx_eq!(angle, -PI / 16.0);
    assert!(angle.abs() <= FRAC_PI_4);
    assert_approx_eq!(course.vector.x.hypot(course.vector.y), 800.0);

    let mut barriers = planner
        .barriers()
        .collect_box(TilePos::new(0, 0), TilePos::new(0, 2));
    barriers.extend(car);
    assert!(!Lane::new(position(), course.vector, LANE_WIDTH).is_blocked_by(&barriers));
    assert!(Lane::new(position(), Vector2d::new(0.0, -800.0), LANE_WIDTH).is_blocked_by(&barriers));
}

/// Test that the whole planner routes up the straight and around a hazard.
#[test]
fn planner_steers_around_hazard() {
    let track = Track {
        tiles: straight(),
        waypoints: vec![TilePos::new(0, 0)],
        tile_size: TILE_SIZE,
        tile_margin: TILE_MARGIN,
    };
    let vehicle = VehicleState {
        id: 7,
        position: position(),
        heading: Vector2d::new(0.0, -1.0),
        velocity: Vector2d::new(0.0, -10.0),
        width: LANE_WIDTH,
        height: 140.0,
        next_waypoint: 0,
    };
    let hazard = DynamicEntity {
        kind: EntityKind::Hazard,
        position: Point2d::new(470.0, 1600.0),
        velocity: Vector2d::new(0.0, 0.0),
        footprint: Footprint::Circle { radius: 30.0 },
    };
    // Our own vehicle never counts as an obstacle.
    let own = DynamicEntity {
        kind: EntityKind::Vehicle { id: 7 },
        position: position(),
        velocity: vehicle.velocity,
        footprint: Footprint::Rectangle {
            width: LANE_WIDTH,
            height: 140.0,
        },
    };

    let mut planner = Planner::new(Default::default());
    let plan = planner.tick(&vehicle, &track, &[own]);
    assert_eq!(plan.strategy, Strategy::Forward);
    assert_eq!(
        plan.path,
        vec![
            Point2d::new(400.0, 2000.0),
            Point2d::new(400.0, 1200.0),
            Point2d::new(400.0, 400.0),
        ]
    );
    assert_eq!(plan.course, Vector2d::new(0.0, -800.0));

    let plan = planner.tick(&vehicle, &track, &[own, hazard]);
    assert_eq!(plan.tier, CourseTier::Forward);
    assert_approx_eq!(rotation(Vector2d::new(0.0, -800.0), plan.course), -PI / 16.0);
}

/// Test that a route with nowhere to go holds the vehicle where it is.
#[test]
fn empty_route_holds_position() {
    let track = Track {
        tiles: straight(),
        waypoints: vec![],
        tile_size: TILE_SIZE,
        tile_margin: TILE_MARGIN,
    };
    let vehicle = VehicleState {
        id: 1,
        position: position(),
        heading: Vector2d::new(0.0, -1.0),
        velocity: Vector2d::new(0.0, -10.0),
        width: LANE_WIDTH,
        height: 140.0,
        next_waypoint: 0,
    };

    let mut planner = Planner::new(Default::default());
    planner.use_backward();
    let plan = planner.tick(&vehicle, &track, &[]);
    assert_eq!(plan.strategy, Strategy::Backward);
    assert_eq!(plan.path, vec![vehicle.position]);
}
