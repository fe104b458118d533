//! Track tiles and their connectivity catalogue.

use crate::math::{Point2d, Vector2d};

/// The connectivity type of a track tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileType {
    Empty,
    Vertical,
    Horizontal,
    LeftTopCorner,
    RightTopCorner,
    LeftBottomCorner,
    RightBottomCorner,
    LeftHeadedT,
    RightHeadedT,
    TopHeadedT,
    BottomHeadedT,
    Crossroads,
    #[default]
    Unknown,
}

/// One of the four edges of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

use Side::*;

/// The open edges of each tile type, indexed by `TileType as usize`.
///
/// The order of the sides fixes the order of the graph arcs built from them.
/// [TileType::Unknown] has no fixed sides; its connectivity is inferred
/// from its neighbours.
const OPEN_SIDES: [&[Side]; 13] = [
    /* Empty */ &[],
    /* Vertical */ &[Top, Bottom],
    /* Horizontal */ &[Left, Right],
    /* LeftTopCorner */ &[Right, Bottom],
    /* RightTopCorner */ &[Left, Bottom],
    /* LeftBottomCorner */ &[Right, Top],
    /* RightBottomCorner */ &[Left, Top],
    /* LeftHeadedT */ &[Left, Top, Bottom],
    /* RightHeadedT */ &[Right, Top, Bottom],
    /* TopHeadedT */ &[Top, Left, Right],
    /* BottomHeadedT */ &[Bottom, Left, Right],
    /* Crossroads */ &[Left, Right, Top, Bottom],
    /* Unknown */ &[],
];

/// Characters used by [TileGrid::from_rows], indexed by `TileType as usize`.
const TILE_CHARS: [char; 13] = [
    '.', '│', '─', '┌', '┐', '└', '┘', '┤', '├', '┴', '┬', '┼', '?',
];

const ALL_TYPES: [TileType; 13] = [
    TileType::Empty,
    TileType::Vertical,
    TileType::Horizontal,
    TileType::LeftTopCorner,
    TileType::RightTopCorner,
    TileType::LeftBottomCorner,
    TileType::RightBottomCorner,
    TileType::LeftHeadedT,
    TileType::RightHeadedT,
    TileType::TopHeadedT,
    TileType::BottomHeadedT,
    TileType::Crossroads,
    TileType::Unknown,
];

impl TileType {
    /// The edges of the tile which connect to its neighbours.
    pub fn open_sides(self) -> &'static [Side] {
        OPEN_SIDES[self as usize]
    }

    /// Whether a vehicle may enter or leave the tile through `side`.
    ///
    /// Unknown tiles are assumed to accept every side.
    pub fn has_input(self, side: Side) -> bool {
        self == TileType::Unknown || self.open_sides().contains(&side)
    }

    /// Parses a box-drawing character.
    pub fn from_char(c: char) -> Option<Self> {
        TILE_CHARS
            .iter()
            .position(|x| *x == c)
            .map(|idx| ALL_TYPES[idx])
    }
}

impl Side {
    /// The tile offset of the neighbour across this side.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Left => (-1, 0),
            Right => (1, 0),
            Top => (0, -1),
            Bottom => (0, 1),
        }
    }

    /// The same edge seen from the neighbouring tile.
    pub fn opposite(self) -> Side {
        match self {
            Left => Right,
            Right => Left,
            Top => Bottom,
            Bottom => Top,
        }
    }
}

/// The column and row of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile containing a world space point.
    pub fn containing(point: Point2d, tile_size: f64) -> Self {
        Self {
            x: (point.x / tile_size).floor() as i32,
            y: (point.y / tile_size).floor() as i32,
        }
    }

    /// The neighbouring tile across `side`.
    pub fn neighbour(self, side: Side) -> Self {
        let (dx, dy) = side.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The world space centre of the tile.
    pub fn centre(self, tile_size: f64) -> Point2d {
        Point2d::new(
            (self.x as f64 + 0.5) * tile_size,
            (self.y as f64 + 0.5) * tile_size,
        )
    }

    /// The tile position as a point in tile units.
    pub fn as_point(self) -> Point2d {
        Point2d::new(self.x as f64, self.y as f64)
    }
}

/// A rectangular grid of tile types, stored column by column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// Creates a grid filled with a single tile type.
    pub fn new(width: usize, height: usize, fill: TileType) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    /// Creates a grid from columns of tiles, such that `columns[x][y]` is the
    /// tile at column `x` and row `y`. Returns `None` if the columns are ragged.
    pub fn from_columns(columns: Vec<Vec<TileType>>) -> Option<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, |c| c.len());
        if columns.iter().any(|c| c.len() != height) {
            return None;
        }
        Some(Self {
            width,
            height,
            tiles: columns.into_iter().flatten().collect(),
        })
    }

    /// Parses rows of box-drawing characters (see [TileType::from_char]).
    /// Returns `None` on unknown characters or ragged rows.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let rows = rows
            .iter()
            .map(|row| row.chars().map(TileType::from_char).collect::<Option<Vec<_>>>())
            .collect::<Option<Vec<_>>>()?;
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let columns = (0..width)
            .map(|x| (0..height).map(|y| rows[y][x]).collect())
            .collect();
        Self::from_columns(columns)
    }

    /// The number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The flat index of a tile, if it lies within the grid.
    pub fn index(&self, pos: TilePos) -> Option<usize> {
        let in_bounds = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height;
        in_bounds.then(|| pos.x as usize * self.height + pos.y as usize)
    }

    /// The position of the tile with the given flat index.
    pub fn pos(&self, index: usize) -> TilePos {
        let height = self.height.max(1);
        TilePos::new((index / height) as i32, (index % height) as i32)
    }

    /// The type of a tile, if it lies within the grid.
    pub fn get(&self, pos: TilePos) -> Option<TileType> {
        self.index(pos).and_then(|idx| self.tiles.get(idx).copied())
    }

    /// Changes the type of a tile. Does nothing outside the grid.
    pub fn set(&mut self, pos: TilePos, tile: TileType) {
        if let Some(slot) = self.index(pos).and_then(|idx| self.tiles.get_mut(idx)) {
            *slot = tile;
        }
    }

    /// Iterates over all tiles in flat index order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, TileType)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(idx, tile)| (self.pos(idx), *tile))
    }

    /// The world space size of the grid.
    pub fn world_size(&self, tile_size: f64) -> Vector2d {
        Vector2d::new(self.width as f64, self.height as f64) * tile_size
    }
}
