use rand::Rng;

use super::state::{Cell, Direction, Grid, GridError, MoveOutcome, RowCollapse};

/// True iff `rows` is non-empty and every row is as long as the first.
pub fn validate(rows: &[Vec<Cell>]) -> bool {
    check_shape(rows).is_ok()
}

pub(crate) fn check_shape(rows: &[Vec<Cell>]) -> Result<(), GridError> {
    let Some(first) = rows.first() else {
        return Err(GridError::Empty);
    };
    if first.is_empty() {
        return Err(GridError::Empty);
    }
    let expected = first.len();
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(GridError::Ragged {
            row,
            expected,
            found: rows[row].len(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_tiles(rows: &[Vec<Cell>]) -> Result<(), GridError> {
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            match *cell {
                Some(value) if !is_tile_value(value) => {
                    return Err(GridError::BadTile { row, col, value });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Spawned tiles are 2 or 4 and merges double, so 0, 1 and odd values never
/// occur in play.
fn is_tile_value(value: u32) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// Rotate raw rows counter-clockwise by `quarter_turns` x 90 degrees.
/// Row and column counts swap for odd turn counts.
pub fn rotate(rows: &[Vec<Cell>], quarter_turns: u8) -> Result<Vec<Vec<Cell>>, GridError> {
    check_shape(rows)?;
    Ok(rotate_rows(rows, quarter_turns))
}

pub(crate) fn rotate_rows(rows: &[Vec<Cell>], quarter_turns: u8) -> Vec<Vec<Cell>> {
    let n = rows.len();
    let m = rows.first().map_or(0, Vec::len);
    match quarter_turns % 4 {
        0 => rows.to_vec(),
        1 => (0..m)
            .map(|c| (0..n).map(|r| rows[r][m - 1 - c]).collect())
            .collect(),
        2 => (0..n)
            .map(|r| (0..m).map(|c| rows[n - 1 - r][m - 1 - c]).collect())
            .collect(),
        _ => (0..m)
            .map(|c| (0..n).map(|r| rows[n - 1 - r][c]).collect())
            .collect(),
    }
}

/// Largest tile a `u32` cell can hold. A pair of these does not merge.
pub const MAX_TILE: u32 = 1 << 31;

/// Slide and merge one row toward its left edge.
///
/// Single left-to-right pass holding at most one pending tile. A tile
/// produced by a merge is emitted immediately and never seen again, so each
/// tile merges at most once per call.
///
/// ```
/// use tile_engine::engine::collapse_row_left;
/// let out = collapse_row_left(&[Some(2), Some(2), Some(4), Some(4)]);
/// assert_eq!(out.row, vec![Some(4), Some(8), None, None]);
/// assert_eq!(out.merged, vec![4, 8]);
/// assert!(out.moved);
/// ```
pub fn collapse_row_left(row: &[Cell]) -> RowCollapse {
    let mut collapsed: Vec<Cell> = Vec::with_capacity(row.len());
    let mut merged = Vec::new();
    let mut pending: Option<u32> = None;

    for value in row.iter().flatten().copied() {
        match pending {
            None => pending = Some(value),
            Some(held) if held == value && held < MAX_TILE => {
                let doubled = held * 2;
                collapsed.push(Some(doubled));
                merged.push(doubled);
                pending = None;
            }
            Some(held) => {
                collapsed.push(Some(held));
                pending = Some(value);
            }
        }
    }
    if pending.is_some() {
        collapsed.push(pending);
    }
    collapsed.resize(row.len(), None);

    let moved = collapsed.as_slice() != row;
    RowCollapse {
        row: collapsed,
        moved,
        merged,
    }
}

/// Slide/merge raw rows in `direction`. No randomness.
///
/// Fails fast on non-rectangular input; no partial result is produced.
pub fn move_in_direction(
    rows: &[Vec<Cell>],
    direction: Direction,
) -> Result<MoveOutcome, GridError> {
    check_shape(rows)?;
    Ok(shift(&Grid::from_rows_unchecked(rows.to_vec()), direction))
}

pub(crate) fn shift(grid: &Grid, direction: Direction) -> MoveOutcome {
    let rotated = rotate_rows(grid.rows(), direction.quarter_turns());

    let mut moved = false;
    let mut merged = Vec::new();
    let collapsed: Vec<Vec<Cell>> = rotated
        .iter()
        .map(|row| {
            let out = collapse_row_left(row);
            moved |= out.moved;
            merged.extend(out.merged);
            out.row
        })
        .collect();

    MoveOutcome {
        grid: Grid::from_rows_unchecked(rotate_rows(&collapsed, direction.revert_turns())),
        moved,
        merged,
    }
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

pub(crate) fn format_val(cell: &Cell) -> String {
    match cell {
        None => String::from("       "),
        Some(v) => format!("{v:^7}"),
    }
}
