use rand::Rng;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use super::ops;
use serde::{Deserialize, Serialize};

/// One grid position: `None` when empty, otherwise a power of two (2, 4, 8, ...).
pub type Cell = Option<u32>;

/// Raised when rows do not form an N by M rectangle of valid cells.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no rows or no columns")]
    Empty,
    #[error("grid is not N by M: row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({row}, {col}) holds {value}, not a power of two of at least 2")]
    BadTile { row: usize, col: usize, value: u32 },
}

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Counter-clockwise quarter turns that bring this edge onto the left.
    #[inline]
    pub fn quarter_turns(self) -> u8 {
        match self {
            Direction::Left => 0,
            Direction::Up => 1,
            Direction::Right => 2,
            Direction::Down => 3,
        }
    }

    /// Quarter turns that undo [`Direction::quarter_turns`].
    #[inline]
    pub fn revert_turns(self) -> u8 {
        (4 - self.quarter_turns()) % 4
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction `{0}`")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

/// Result of collapsing a single row toward its left edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCollapse {
    pub row: Vec<Cell>,
    /// True iff `row` differs from the input at any position.
    pub moved: bool,
    /// Value produced by each merge, in emit order.
    pub merged: Vec<u32>,
}

/// Result of sliding a whole grid in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    pub moved: bool,
    pub merged: Vec<u32>,
}

impl MoveOutcome {
    /// Points earned by this move: the sum of every merged tile.
    pub fn score_gained(&self) -> u64 {
        self.merged.iter().map(|&v| u64::from(v)).sum()
    }
}

/// Rectangular, non-empty matrix of cells.
///
/// Construction and deserialization both validate the shape, so every
/// `Grid` value is N by M with N, M >= 1. All methods return new grids;
/// nothing mutates a grid in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Validate `rows` and wrap them. Rows must form a rectangle and every
    /// occupied cell must hold a power of two no smaller than 2.
    ///
    /// ```
    /// use tile_engine::engine::{Grid, GridError};
    /// let err = Grid::new(vec![vec![Some(2), Some(4)], vec![None, None, None]]).unwrap_err();
    /// assert!(matches!(err, GridError::Ragged { row: 1, .. }));
    /// let err = Grid::new(vec![vec![Some(2), Some(3)]]).unwrap_err();
    /// assert_eq!(err, GridError::BadTile { row: 0, col: 1, value: 3 });
    /// ```
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        ops::check_shape(&rows)?;
        ops::check_tiles(&rows)?;
        Ok(Grid { rows })
    }

    /// A grid with every cell empty.
    pub fn empty(rows: NonZeroUsize, cols: NonZeroUsize) -> Self {
        Grid {
            rows: vec![vec![None; cols.get()]; rows.get()],
        }
    }

    /// Caller guarantees `rows` is rectangular and non-empty.
    pub(crate) fn from_rows_unchecked(rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(ops::validate(&rows));
        Grid { rows }
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn col_count(&self) -> usize {
        self.rows[0].len()
    }

    /// Same row and column counts as `other`.
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.row_count() == other.row_count() && self.col_count() == other.col_count()
    }

    /// Cell at (`row`, `col`); out-of-range positions read as empty.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Iterate over cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().flat_map(|row| row.iter().copied())
    }

    /// Copy of this grid with one cell replaced. Out-of-range positions
    /// leave the grid unchanged.
    pub fn with_cell(&self, row: usize, col: usize, cell: Cell) -> Self {
        let mut rows = self.rows.clone();
        if let Some(slot) = rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
        Grid { rows }
    }

    /// Rotate counter-clockwise by `quarter_turns` x 90 degrees.
    pub fn rotate(&self, quarter_turns: u8) -> Self {
        Grid::from_rows_unchecked(ops::rotate_rows(&self.rows, quarter_turns))
    }

    /// Return the grid resulting from sliding/merging tiles in `direction`
    /// (no random insert).
    pub fn shift(&self, direction: Direction) -> MoveOutcome {
        ops::shift(self, direction)
    }

    /// True if sliding in `direction` would change at least one cell.
    pub fn can_move(&self, direction: Direction) -> bool {
        self.shift(direction).moved
    }

    /// Directions that would change the grid.
    pub fn movable_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.can_move(d))
            .collect()
    }

    /// Coordinates of empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_none())
                    .map(move |(c, _)| (r, c))
            })
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells().all(|cell| cell.is_some())
    }

    pub fn contains(&self, value: u32) -> bool {
        self.cells().any(|cell| cell == Some(value))
    }

    /// Highest tile on the grid, `None` if the grid is empty.
    pub fn highest_tile(&self) -> Option<u32> {
        self.cells().flatten().max()
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty
    /// cell, using the provided RNG. A full grid is returned unchanged.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use std::num::NonZeroUsize;
    /// use tile_engine::engine::Grid;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let two = NonZeroUsize::new(2).unwrap();
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let g = Grid::empty(two, two).with_random_tile(&mut rng);
    /// assert_eq!(g.empty_cells().len(), 3);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return self.clone();
        }
        let (row, col) = empty[rng.gen_range(0..empty.len())];
        let value = ops::generate_random_tile(rng);
        self.with_cell(row, col, Some(value))
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Grid::new(rows)
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.col_count() * 8 - 1);
        for (idx, row) in self.rows.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{rule}")?;
            }
            let cells: Vec<String> = row.iter().map(ops::format_val).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}
