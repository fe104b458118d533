//! Tests that drive the planner around a ring of tiles.

use assert_approx_eq::assert_approx_eq;
use track_planner::{
    cgmath::InnerSpace,
    math::{Point2d, Vector2d},
    Planner, PlannerAttributes, RebuildReason, Strategy, TileGrid, TilePos, TileType, Track,
    VehicleState,
};

fn ring(rows: &[&str]) -> Track {
    Track {
        tiles: TileGrid::from_rows(rows).unwrap(),
        waypoints: vec![
            TilePos::new(3, 0),
            TilePos::new(3, 2),
            TilePos::new(0, 2),
            TilePos::new(0, 0),
        ],
        tile_size: 800.0,
        tile_margin: 80.0,
    }
}

fn vehicle(width: f64, height: f64) -> VehicleState {
    VehicleState {
        id: 1,
        position: Point2d::new(1200.0, 400.0),
        heading: Vector2d::new(1.0, 0.0),
        velocity: Vector2d::new(0.0, 0.0),
        width,
        height,
        next_waypoint: 0,
    }
}

/// Moves the vehicle along the planned course, facing it unless the
/// course points backwards.
fn drive(vehicle: &mut VehicleState, course: Vector2d, speed: f64) {
    if course.magnitude2() == 0.0 {
        return;
    }
    let direction = course.normalize();
    if direction.dot(vehicle.heading) > 0.0 {
        vehicle.heading = direction;
    }
    vehicle.velocity = direction * speed;
    vehicle.position += vehicle.velocity;
}

/// Test that a small vehicle following the planned courses completes a lap
/// without leaving the track.
#[test]
fn vehicle_completes_a_lap() {
    let track = ring(&["┌──┐", "│..│", "└──┘"]);
    let mut vehicle = vehicle(60.0, 40.0);
    let mut planner = Planner::new(Default::default());
    let mut reached = 0;

    for _ in 0..400 {
        let plan = planner.tick(&vehicle, &track, &[]);
        assert_eq!(plan.strategy, Strategy::Forward);
        drive(&mut vehicle, plan.course, 30.0);

        let tile = track.tile_of(vehicle.position);
        let tile_type = track.tiles.get(tile);
        assert!(
            tile_type.is_some() && tile_type != Some(TileType::Empty),
            "left the track at {:?}",
            vehicle.position
        );
        if tile == track.waypoints[vehicle.next_waypoint] {
            vehicle.next_waypoint = (vehicle.next_waypoint + 1) % track.waypoints.len();
            reached += 1;
        }
    }

    assert!(reached >= track.waypoints.len(), "reached {} waypoints", reached);
}

/// Test that a stuck vehicle backs out and pulls forward in straight lines.
#[test]
fn stuck_vehicle_alternates_unstuck_moves() {
    let track = ring(&["┌──┐", "│..│", "└──┘"]);
    let vehicle = vehicle(210.0, 140.0);
    let mut planner = Planner::new(Default::default());
    let forward = planner.tick(&vehicle, &track, &[]);
    assert!(forward.path.len() > 1);

    planner.on_stuck();
    let plan = planner.tick(&vehicle, &track, &[]);
    assert_eq!(plan.strategy, Strategy::UnstuckBackward);
    assert_eq!(plan.path.len(), 1);
    // Two tiles back would leave the world, so it stops just short of the edge.
    assert_approx_eq!(plan.path[0].x, 12.0);
    assert_approx_eq!(plan.path[0].y, 400.0);

    planner.on_stuck();
    let plan = planner.tick(&vehicle, &track, &[]);
    assert_eq!(plan.strategy, Strategy::UnstuckForward);
    assert_eq!(plan.path, vec![Point2d::new(2800.0, 400.0)]);

    planner.on_unstuck();
    let plan = planner.tick(&vehicle, &track, &[]);
    assert_eq!(plan.strategy, Strategy::Forward);
    assert_eq!(plan.path, forward.path);
}

/// Test that the backward strategy heads back towards the last waypoint.
#[test]
fn backward_path_leads_to_previous_waypoints() {
    let track = ring(&["┌──┐", "│..│", "└──┘"]);
    // Facing back the way it came.
    let mut vehicle = vehicle(210.0, 140.0);
    vehicle.heading = Vector2d::new(-1.0, 0.0);
    vehicle.velocity = Vector2d::new(-10.0, 0.0);
    let mut planner = Planner::new(PlannerAttributes {
        laps: 1,
        course_path_size: 3,
    });
    planner.use_backward();
    let plan = planner.tick(&vehicle, &track, &[]);
    assert_eq!(plan.strategy, Strategy::Backward);
    assert!(!plan.path.is_empty());
    assert!(plan.path[0].x < vehicle.position.x);
    let last = plan.path[plan.path.len() - 1];
    assert_eq!(track.tile_of(last), TilePos::new(0, 0));

    planner.on_stuck();
    assert_eq!(planner.strategy(), Strategy::UnstuckForward);
}

/// Test that revealing an unknown tile on the path forces a rebuild.
#[test]
fn revealed_tiles_rebuild_the_path() {
    let mut track = ring(&["┌──┐", "│..?", "└──┘"]);
    let vehicle = vehicle(210.0, 140.0);
    let mut planner = Planner::new(Default::default());
    let plan = planner.tick(&vehicle, &track, &[]);
    assert!(plan
        .path
        .iter()
        .any(|p| track.tile_of(*p) == TilePos::new(3, 1)));
    assert_eq!(planner.rebuild_reason(&vehicle, &track), None);

    track.tiles.set(TilePos::new(3, 1), TileType::Vertical);
    assert_eq!(
        planner.rebuild_reason(&vehicle, &track),
        Some(RebuildReason::TrackRevealed)
    );
    planner.tick(&vehicle, &track, &[]);
    assert_eq!(planner.rebuild_reason(&vehicle, &track), None);
}
