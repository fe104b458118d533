//! The graph of traversable connections between track tiles.
//!
//! Built in three passes: one node per tile linked through its open edges,
//! then every arc split by a midpoint node so routes may start and end at
//! tile edges, then diagonal arcs between the midpoints around a tile corner
//! so routes may cut corners.

use crate::math::{cos_between, Point2d};
use crate::tile::{Side, TileGrid, TilePos, TileType};
use arrayvec::ArrayVec;
use cgmath::prelude::*;
use itertools::Itertools;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::f64::consts::FRAC_PI_2;

pub use search::{shortest_path_with_direction, turn_penalty};

mod search;

/// Unique ID of a graph [Node].
///
/// The first `width * height` IDs belong to the tile nodes, in the flat
/// index order of the [TileGrid].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A weighted, directed connection to another node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arc {
    pub dst: NodeId,
    pub weight: f64,
}

/// A graph node, positioned in tile units with tile `(x, y)` at `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub position: Point2d,
    pub arcs: SmallVec<[Arc; 4]>,
}

impl Node {
    fn new(position: Point2d) -> Self {
        Self {
            position,
            arcs: SmallVec::new(),
        }
    }

    /// Whether the node has an arc to `dst`.
    pub fn has_arc_to(&self, dst: NodeId) -> bool {
        self.arcs.iter().any(|arc| arc.dst == dst)
    }
}

/// The graph searched by the route planner. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileGraph {
    nodes: Vec<Node>,
    height: usize,
    width: usize,
}

impl TileGraph {
    /// Builds the complete graph for a tile grid.
    pub fn new(tiles: &TileGrid) -> Self {
        let nodes = make_graph(tiles);
        let nodes = split_arcs(nodes);
        let nodes = add_diagonal_arcs(nodes, tiles.len());
        Self {
            nodes,
            height: tiles.height(),
            width: tiles.width(),
        }
    }

    /// Gets a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// The position of a node, in tile units.
    pub fn position(&self, id: NodeId) -> Option<Point2d> {
        self.node(id).map(|n| n.position)
    }

    /// Iterates over all nodes in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(idx, n)| (NodeId(idx), n))
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the graph contains a node with the given ID.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// The node at the centre of a tile.
    pub fn tile_node(&self, pos: TilePos) -> Option<NodeId> {
        let in_bounds = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height;
        in_bounds.then(|| NodeId(pos.x as usize * self.height + pos.y as usize))
    }

    /// Builds a graph directly from nodes, as a single column of tiles.
    #[cfg(test)]
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            height: nodes.len(),
            width: 1,
            nodes,
        }
    }
}

/// The tiles a tile connects to.
///
/// Concrete tiles connect through their open sides. An unknown tile only
/// connects to the neighbours which accept a connection on the shared edge.
fn tile_neighbours(tiles: &TileGrid, pos: TilePos, tile: TileType) -> ArrayVec<TilePos, 4> {
    const ALL_SIDES: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];
    let in_grid = |p: &TilePos| tiles.index(*p).is_some();

    if tile == TileType::Unknown {
        ALL_SIDES
            .iter()
            .filter(|side| {
                tiles
                    .get(pos.neighbour(**side))
                    .map_or(false, |t| t.has_input(side.opposite()))
            })
            .map(|side| pos.neighbour(*side))
            .collect()
    } else {
        tile.open_sides()
            .iter()
            .map(|side| pos.neighbour(*side))
            .filter(in_grid)
            .collect()
    }
}

/// Builds one node per tile with arcs to the tiles it connects to.
pub(crate) fn make_graph(tiles: &TileGrid) -> Vec<Node> {
    tiles
        .iter()
        .map(|(pos, tile)| {
            let mut node = Node::new(pos.as_point());
            for neighbour in tile_neighbours(tiles, pos, tile) {
                if let Some(idx) = tiles.index(neighbour) {
                    let weight = pos.as_point().distance(neighbour.as_point());
                    node.arcs.push(Arc {
                        dst: NodeId(idx),
                        weight,
                    });
                }
            }
            node
        })
        .collect()
}

/// Replaces every arc by a midpoint node joined to both ends with half the weight.
///
/// Two tiles share one midpoint however many arcs join them, and the halves
/// are traversable in both directions.
pub(crate) fn split_arcs(nodes: Vec<Node>) -> Vec<Node> {
    let mut result: Vec<Node> = nodes.iter().map(|n| Node::new(n.position)).collect();
    let mut middles = HashMap::new();

    for (idx, node) in nodes.iter().enumerate() {
        for arc in &node.arcs {
            let dst = arc.dst.0;
            let key = (idx.min(dst), idx.max(dst));
            if middles.contains_key(&key) {
                continue;
            }
            let middle = NodeId(result.len());
            middles.insert(key, middle);

            let half = 0.5 * arc.weight;
            let position = node.position.midpoint(nodes[dst].position);
            result[idx].arcs.push(Arc { dst: middle, weight: half });
            result[dst].arcs.push(Arc { dst: middle, weight: half });
            let mut mid_node = Node::new(position);
            mid_node.arcs.push(Arc { dst: NodeId(idx), weight: half });
            mid_node.arcs.push(Arc { dst: arc.dst, weight: half });
            result.push(mid_node);
        }
    }

    result
}

/// Joins each pair of midpoints around a tile whose directions from the tile
/// centre are at most 90 degrees apart, weighted by the length of a quarter
/// circle through both.
pub(crate) fn add_diagonal_arcs(mut nodes: Vec<Node>, tile_count: usize) -> Vec<Node> {
    let mut added = HashSet::new();
    let mut new_arcs = vec![];

    for node in nodes.iter().take(tile_count) {
        for (first, second) in node.arcs.iter().tuple_combinations() {
            let (a, b) = (first.dst, second.dst);
            let key = (a.min(b), a.max(b));
            if added.contains(&key) || nodes[a.0].has_arc_to(b) {
                continue;
            }
            let (pa, pb) = (nodes[a.0].position, nodes[b.0].position);
            if cos_between(pa - node.position, pb - node.position) >= 0.0 {
                let weight = (pa.distance2(pb) / 2.0).sqrt() * FRAC_PI_2;
                added.insert(key);
                new_arcs.push((a, b, weight));
            }
        }
    }

    for (a, b, weight) in new_arcs {
        nodes[a.0].arcs.push(Arc { dst: b, weight });
        nodes[b.0].arcs.push(Arc { dst: a, weight });
    }
    nodes
}
