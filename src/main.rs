use std::time::Instant;

use track_planner::cgmath::{InnerSpace, Point2, Vector2};
use track_planner::{Planner, TileGrid, TilePos, Track, VehicleState};

const RING: [&str; 5] = ["┌───┬──┐", "│...│..│", "├───┼──┤", "│...│..│", "└───┴──┘"];

fn main() {
    let tiles = match TileGrid::from_rows(&RING) {
        Some(tiles) => tiles,
        None => return eprintln!("Malformed track"),
    };
    let track = Track {
        tiles,
        waypoints: vec![
            TilePos::new(7, 0),
            TilePos::new(7, 4),
            TilePos::new(4, 2),
            TilePos::new(0, 4),
            TilePos::new(0, 0),
        ],
        tile_size: 800.0,
        tile_margin: 80.0,
    };
    let mut vehicle = VehicleState {
        id: 0,
        position: Point2::new(1200.0, 400.0),
        heading: Vector2::new(1.0, 0.0),
        velocity: Vector2::new(0.0, 0.0),
        width: 210.0,
        height: 140.0,
        next_waypoint: 0,
    };
    let mut planner = Planner::new(Default::default());

    println!("Planning...");
    let num_frames = 1000;
    for _ in 0..5 {
        let start = Instant::now();
        for _ in 0..num_frames {
            let plan = planner.tick(&vehicle, &track, &[]);
            let heading = plan.course.normalize();
            if heading.x.is_finite() && heading.y.is_finite() {
                vehicle.heading = heading;
            }
            vehicle.velocity = vehicle.heading * 20.0;
            vehicle.position += vehicle.velocity;
            if track.tile_of(vehicle.position) == track.waypoints[vehicle.next_waypoint] {
                vehicle.next_waypoint = (vehicle.next_waypoint + 1) % track.waypoints.len();
            }
        }
        let frame = start.elapsed() / num_frames;
        println!(
            "Avg. tick: {:?} ({:.0} ticks/s, next waypoint {})",
            frame,
            1.0 / frame.as_secs_f64(),
            vehicle.next_waypoint,
        );
    }
}
