//! Chaining path searches into routes through a list of waypoints, and
//! shaping the resulting tile routes into drivable world space paths.

use crate::graph::{shortest_path_with_direction, NodeId, TileGraph};
use crate::math::{Point2d, Vector2d};
use crate::tile::{Side, TilePos};
use cgmath::prelude::*;
use itertools::Itertools;
use log::{debug, warn};
use std::collections::HashSet;

/// Chains path searches through consecutive waypoints.
///
/// Each leg starts from where the previous leg ended and leaves in the
/// direction it arrived. The neighbours of the waypoints still ahead are
/// forbidden so that a leg does not run through a later waypoint early;
/// if that makes a leg impossible it is searched again unconstrained.
/// Waypoints outside the graph are skipped.
///
/// Returns the route from the first waypoint, or an empty route for fewer
/// than two waypoints.
pub fn multi_path(graph: &TileGraph, waypoints: &[NodeId], direction: Vector2d) -> Vec<NodeId> {
    if waypoints.len() < 2 {
        return vec![];
    }
    let mut path = vec![waypoints[0]];
    let mut direction = direction;

    for (i, (&from, &to)) in waypoints.iter().tuple_windows().enumerate() {
        if graph.contains(from) && graph.contains(to) {
            let src = path[path.len() - 1];
            let forbidden: HashSet<NodeId> = waypoints[i + 2..]
                .iter()
                .take_while(|w| **w != from)
                .filter_map(|w| graph.node(*w))
                .flat_map(|node| node.arcs.iter().map(|arc| arc.dst))
                .collect();

            let mut leg = shortest_path_with_direction(graph, src, to, direction, &forbidden);
            if leg.is_empty() && src != to {
                debug!("No route from {:?} to {:?} around later waypoints", src, to);
                leg = shortest_path_with_direction(graph, src, to, direction, &HashSet::new());
                if leg.is_empty() {
                    warn!("No route from {:?} to {:?}", src, to);
                }
            }
            if i + 2 < waypoints.len() {
                leg.pop();
            }
            path.extend(leg);
        }
        if path.len() > 2 {
            let last = &path[path.len() - 2..];
            if let (Some(a), Some(b)) = (graph.position(last[0]), graph.position(last[1])) {
                direction = b - a;
            }
        }
    }

    path
}

/// Routes through the waypoint tiles from `start`, returning the tiles crossed.
///
/// The start tile is prepended unless it is already the first waypoint.
pub fn tiles_path(
    graph: &TileGraph,
    start: TilePos,
    waypoints: &[TilePos],
    direction: Vector2d,
) -> Vec<TilePos> {
    let mut nodes: Vec<NodeId> = waypoints
        .iter()
        .filter_map(|w| graph.tile_node(*w))
        .collect();
    if let Some(start) = graph.tile_node(start) {
        if nodes.first() != Some(&start) {
            nodes.insert(0, start);
        }
    }
    let points: Vec<Point2d> = multi_path(graph, &nodes, direction)
        .into_iter()
        .filter_map(|id| graph.position(id))
        .map(|p| p + Vector2d::new(0.5, 0.5))
        .collect();
    remove_split(&points)
}

/// Collapses a route through tile centres and edge midpoints, given in tile
/// units offset to the tile centres, into the sequence of tiles it crosses.
pub fn remove_split(points: &[Point2d]) -> Vec<TilePos> {
    points
        .iter()
        .tuple_windows()
        .map(|(a, b)| TilePos::containing(a.midpoint(*b), 1.0))
        .dedup()
        .collect()
}

/// The edges a route point is entered and left through, where they are
/// axis aligned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PointType {
    input: Option<Side>,
    output: Option<Side>,
}

fn input_side(prev: Point2d, cur: Point2d) -> Option<Side> {
    if prev.y == cur.y {
        Some(if prev.x < cur.x { Side::Left } else { Side::Right })
    } else if prev.x == cur.x {
        Some(if prev.y < cur.y { Side::Top } else { Side::Bottom })
    } else {
        None
    }
}

fn output_side(cur: Point2d, next: Point2d) -> Option<Side> {
    if cur.y == next.y {
        Some(if cur.x < next.x { Side::Right } else { Side::Left })
    } else if cur.x == next.x {
        Some(if cur.y < next.y { Side::Bottom } else { Side::Top })
    } else {
        None
    }
}

/// The direction of the inner corner of a turn through two perpendicular sides.
fn corner_direction(a: Side, b: Side) -> Option<Vector2d> {
    let x = |s| match s {
        Side::Left => Some(-1.0),
        Side::Right => Some(1.0),
        _ => None,
    };
    let y = |s| match s {
        Side::Top => Some(-1.0),
        Side::Bottom => Some(1.0),
        _ => None,
    };
    match (x(a), y(b), x(b), y(a)) {
        (Some(dx), Some(dy), _, _) | (_, _, Some(dx), Some(dy)) => Some(Vector2d::new(dx, dy)),
        _ => None,
    }
}

fn point_shift(
    prev: Option<PointType>,
    cur: PointType,
    next: Option<PointType>,
    shift: f64,
    tile_size: f64,
) -> Vector2d {
    let (input, output) = match (cur.input, cur.output) {
        (Some(input), Some(output)) => (input, output),
        _ => return Vector2d::zero(),
    };

    if let Some(corner) = corner_direction(input, output) {
        let s_bend = match (prev, next) {
            (Some(prev), Some(next)) => {
                prev.input != cur.input && prev.output != cur.output && next == prev
            }
            _ => false,
        };
        return corner * if s_bend { 0.25 * tile_size } else { shift };
    }

    // Straight through: move to the outside of the coming turn. U-turns stay.
    let next_output = next.and_then(|n| n.output);
    match (input, output, next_output) {
        _ if input == output => Vector2d::zero(),
        (Side::Left | Side::Right, Side::Left | Side::Right, Some(Side::Top)) => {
            Vector2d::new(0.0, shift)
        }
        (Side::Left | Side::Right, Side::Left | Side::Right, Some(Side::Bottom)) => {
            Vector2d::new(0.0, -shift)
        }
        (Side::Top | Side::Bottom, Side::Top | Side::Bottom, Some(Side::Left)) => {
            Vector2d::new(shift, 0.0)
        }
        (Side::Top | Side::Bottom, Side::Top | Side::Bottom, Some(Side::Right)) => {
            Vector2d::new(-shift, 0.0)
        }
        _ => Vector2d::zero(),
    }
}

/// Shifts the points of a route through tile centres so that turns cut
/// their corners.
///
/// Corner points move `shift` towards the inside of the turn along both
/// axes, or a quarter tile on the middle corner of an S-bend. A straight
/// point just before a turn moves `shift` to the outside of the turn.
pub fn adjust_path(path: &[Point2d], shift: f64, tile_size: f64) -> Vec<Point2d> {
    if path.len() < 2 {
        return path.to_vec();
    }
    let last = path.len() - 1;
    let types: Vec<PointType> = (0..path.len())
        .map(|i| PointType {
            input: (i > 0).then(|| input_side(path[i - 1], path[i])).flatten(),
            output: (i < last).then(|| output_side(path[i], path[i + 1])).flatten(),
        })
        .collect();

    (0..path.len())
        .map(|i| {
            let prev = i.checked_sub(1).map(|j| types[j]);
            let next = types.get(i + 1).copied();
            path[i] + point_shift(prev, types[i], next, shift, tile_size)
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn get(self, p: Point2d) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    fn set(self, p: &mut Point2d, value: f64) {
        match self {
            Axis::X => p.x = value,
            Axis::Y => p.y = value,
        }
    }
}

/// Straightens runs of points sharing an x (or y) coordinate so that the
/// whole run leads directly onto the point which ends it.
pub fn shift_on_direct(path: &[Point2d]) -> Vec<Point2d> {
    let mut result = path.to_vec();
    let mut i = 1;
    while i + 1 < path.len() {
        let (a, b, c) = (path[i - 1], path[i], path[i + 1]);
        let axis = if a.x == b.x && b.x == c.x {
            Axis::X
        } else if a.y == b.y && b.y == c.y {
            Axis::Y
        } else {
            i += 1;
            continue;
        };

        let end = (i + 1..path.len())
            .find(|&j| axis.get(path[j]) != axis.get(path[j - 1]))
            .unwrap_or(path.len() - 1);
        let target = axis.get(path[end]);
        if target != axis.get(path[i]) {
            for p in &mut result[i + 1..end] {
                axis.set(p, target);
            }
        }
        i = end + 1;
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tile::TileGrid;
    use assert_approx_eq::assert_approx_eq;

    fn pt(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    fn ring() -> (TileGrid, TileGraph) {
        let tiles = TileGrid::from_rows(&["┌──┐", "│..│", "└──┘"]).unwrap();
        let graph = TileGraph::new(&tiles);
        (tiles, graph)
    }

    #[test]
    fn remove_split_gives_crossed_tiles() {
        let points = [pt(0.5, 0.5), pt(1.0, 0.5), pt(1.5, 0.5), pt(1.5, 1.0), pt(1.5, 1.5)];
        assert_eq!(
            remove_split(&points),
            vec![TilePos::new(0, 0), TilePos::new(1, 0), TilePos::new(1, 1)]
        );
        assert!(remove_split(&points[..1]).is_empty());
    }

    #[test]
    fn multi_path_visits_waypoints_in_order() {
        let (_, graph) = ring();
        let node = |x, y| graph.tile_node(TilePos::new(x, y)).unwrap();
        let waypoints = [node(1, 0), node(3, 2), node(0, 2)];
        let path = multi_path(&graph, &waypoints, Vector2d::new(1.0, 0.0));
        assert_eq!(path[0], node(1, 0));
        assert_eq!(path.last(), Some(&node(0, 2)));
        let at = |id| path.iter().position(|n| *n == id);
        // The intermediate waypoint's centre is cut by a diagonal, but the
        // route still passes the tiles around it in order.
        assert!(at(node(3, 1)).unwrap() < at(node(1, 2)).unwrap());
        assert!(at(node(2, 0)).is_some());
        assert!(at(node(0, 1)).is_none());
    }

    #[test]
    fn multi_path_needs_two_waypoints() {
        let (_, graph) = ring();
        let start = graph.tile_node(TilePos::new(1, 0)).unwrap();
        assert!(multi_path(&graph, &[start], Vector2d::new(1.0, 0.0)).is_empty());
    }

    #[test]
    fn forbidden_waypoints_are_retried_without() {
        // Going back towards the first waypoint, the only way passes next to
        // the waypoint after it.
        let tiles = TileGrid::from_rows(&["───"]).unwrap();
        let graph = TileGraph::new(&tiles);
        let node = |x| graph.tile_node(TilePos::new(x, 0)).unwrap();
        let path = multi_path(&graph, &[node(0), node(2), node(1)], Vector2d::new(1.0, 0.0));
        // The first leg may only run next to the last waypoint once
        // unconstrained, and stops one short of its own waypoint.
        let (m01, m12) = (NodeId(3), NodeId(4));
        assert_eq!(path, vec![node(0), m01, node(1), m12, node(1)]);
    }

    #[test]
    fn tiles_path_prepends_start() {
        let (_, graph) = ring();
        let path = tiles_path(
            &graph,
            TilePos::new(0, 1),
            &[TilePos::new(2, 0), TilePos::new(3, 1)],
            Vector2d::new(0.0, -1.0),
        );
        assert_eq!(
            path,
            vec![
                TilePos::new(0, 1),
                TilePos::new(0, 0),
                TilePos::new(1, 0),
                TilePos::new(2, 0),
                TilePos::new(3, 0),
                TilePos::new(3, 1),
            ]
        );
    }

    #[test]
    fn corners_are_cut() {
        let path = [pt(100.0, 300.0), pt(100.0, 100.0), pt(300.0, 100.0)];
        let adjusted = adjust_path(&path, 20.0, 200.0);
        // Entered from the bottom and left to the right: inner corner is down-right.
        assert_eq!(adjusted[0], pt(100.0, 300.0));
        assert_eq!(adjusted[1], pt(120.0, 120.0));
        assert_eq!(adjusted[2], pt(300.0, 100.0));
    }

    #[test]
    fn straights_swing_wide_before_a_turn() {
        let path = [pt(100.0, 100.0), pt(300.0, 100.0), pt(500.0, 100.0), pt(500.0, 300.0)];
        let adjusted = adjust_path(&path, 20.0, 200.0);
        assert_eq!(adjusted[1], pt(300.0, 80.0));
        assert_eq!(adjusted[2], pt(480.0, 120.0));
    }

    #[test]
    fn s_bends_shift_a_quarter_tile() {
        let path = [
            pt(100.0, 100.0),
            pt(300.0, 100.0),
            pt(300.0, 300.0),
            pt(500.0, 300.0),
            pt(500.0, 500.0),
        ];
        let adjusted = adjust_path(&path, 20.0, 200.0);
        assert_approx_eq!(adjusted[2].x, 350.0);
        assert_approx_eq!(adjusted[2].y, 250.0);
        assert_eq!(adjusted[1], pt(280.0, 120.0));
    }

    #[test]
    fn u_turns_are_not_shifted() {
        let path = [pt(100.0, 100.0), pt(300.0, 100.0), pt(100.0, 100.0), pt(100.0, 300.0)];
        let adjusted = adjust_path(&path, 20.0, 200.0);
        assert_eq!(adjusted[1], pt(300.0, 100.0));
    }

    #[test]
    fn direct_runs_lead_onto_the_turn() {
        let path = [
            pt(100.0, 700.0),
            pt(100.0, 500.0),
            pt(100.0, 300.0),
            pt(120.0, 120.0),
            pt(300.0, 100.0),
        ];
        assert_eq!(
            shift_on_direct(&path),
            vec![path[0], path[1], pt(120.0, 300.0), path[3], path[4]]
        );
    }

    #[test]
    fn straight_paths_are_not_straightened() {
        let path = [pt(100.0, 700.0), pt(100.0, 500.0), pt(100.0, 300.0)];
        assert_eq!(shift_on_direct(&path), path.to_vec());
    }

    #[test]
    fn run_into_final_turn_moves_onto_its_end() {
        let path = [pt(100.0, 100.0), pt(300.0, 100.0), pt(500.0, 100.0), pt(500.0, 300.0)];
        let shifted = shift_on_direct(&path);
        assert_eq!(
            shifted,
            vec![pt(100.0, 100.0), pt(300.0, 100.0), pt(500.0, 300.0), pt(500.0, 300.0)]
        );
        assert_eq!(shifted.last(), path.last());
    }

    #[test]
    fn short_paths_are_unchanged() {
        assert!(adjust_path(&[], 10.0, 100.0).is_empty());
        assert_eq!(shift_on_direct(&[pt(1.0, 2.0)]), vec![pt(1.0, 2.0)]);
        assert_eq!(adjust_path(&[pt(1.0, 2.0)], 10.0, 100.0), vec![pt(1.0, 2.0)]);
    }
}
