use super::{NodeId, TileGraph};
use crate::math::{cos_between, normalize_or, Vector2d};
use cgmath::prelude::*;
use smallvec::SmallVec;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

/// The cost added to an arc which turns away from the current direction.
///
/// Zero when going straight on, rising steeply for sharp turns and reversals.
pub fn turn_penalty(cos: f64) -> f64 {
    (1.0 - cos) * f64::min(10.0, 2f64.powf(3.0 - 2.0 * cos))
}

/// An entry in the search queue.
#[derive(Clone, Copy, Debug)]
struct Visit {
    cost: f64,
    /// Straight line distance from the node to the destination.
    remaining: f64,
    node: NodeId,
    direction: Vector2d,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.remaining.total_cmp(&other.remaining))
            .then(self.node.cmp(&other.node))
    }
}

/// Finds the cheapest route from `src` to `dst` for a vehicle currently
/// moving along `initial_direction`.
///
/// The cost of a route is the sum of its arc weights plus a [turn_penalty]
/// for every change of direction. Arcs into `forbidden` nodes are never
/// taken. Ties in cost go to the node nearer to the destination.
///
/// Returns the nodes of the route after `src`, ending with `dst`, or an
/// empty route if `dst` cannot be reached.
pub fn shortest_path_with_direction(
    graph: &TileGraph,
    src: NodeId,
    dst: NodeId,
    initial_direction: Vector2d,
    forbidden: &HashSet<NodeId>,
) -> Vec<NodeId> {
    let (src_pos, dst_pos) = match (graph.position(src), graph.position(dst)) {
        (Some(src_pos), Some(dst_pos)) => (src_pos, dst_pos),
        _ => return vec![],
    };

    let mut distances = vec![f64::INFINITY; graph.len()];
    let mut previous: Vec<Option<NodeId>> = vec![None; graph.len()];
    let mut visited: Vec<SmallVec<[Vector2d; 4]>> = vec![SmallVec::new(); graph.len()];
    let mut queue = BinaryHeap::new();

    distances[src.index()] = 0.0;
    queue.push(Reverse(Visit {
        cost: 0.0,
        remaining: src_pos.distance(dst_pos),
        node: src,
        direction: normalize_or(initial_direction, Vector2d::zero()),
    }));

    while let Some(Reverse(visit)) = queue.pop() {
        if !settle(&mut visited[visit.node.index()], visit.direction) {
            continue;
        }
        let node = match graph.node(visit.node) {
            Some(node) => node,
            None => continue,
        };

        for arc in &node.arcs {
            if forbidden.contains(&arc.dst) {
                continue;
            }
            let next_pos = graph.nodes[arc.dst.index()].position;
            let direction = next_pos - node.position;
            if direction.is_zero() || visited[arc.dst.index()].contains(&direction) {
                continue;
            }
            let current = distances[arc.dst.index()];
            if visit.cost + arc.weight >= current {
                continue;
            }
            let cost = visit.cost
                + arc.weight
                + turn_penalty(cos_between(visit.direction, direction));
            if cost < current {
                distances[arc.dst.index()] = cost;
                previous[arc.dst.index()] = Some(visit.node);
                queue.push(Reverse(Visit {
                    cost,
                    remaining: next_pos.distance(dst_pos),
                    node: arc.dst,
                    direction,
                }));
            }
        }
    }

    build_path(src, dst, &previous)
}

/// Marks a node as reached from `direction`. False if it already was.
fn settle(seen: &mut SmallVec<[Vector2d; 4]>, direction: Vector2d) -> bool {
    if seen.contains(&direction) {
        return false;
    }
    seen.push(direction);
    true
}

/// Walks the predecessor links back from `dst`.
fn build_path(src: NodeId, dst: NodeId, previous: &[Option<NodeId>]) -> Vec<NodeId> {
    let mut path = vec![dst];
    let mut node = dst;
    while let Some(prev) = previous[node.index()] {
        if path.len() > previous.len() {
            return vec![];
        }
        path.push(prev);
        node = prev;
    }
    if node != src {
        return vec![];
    }
    path.pop();
    path.reverse();
    path
}
