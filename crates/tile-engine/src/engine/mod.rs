//! Engine module: rectangular 2048 grid, rotation and collapse ops.
//! Public API stays small and ergonomic.
//!
//! - `Grid` is the validated cell matrix with useful methods.
//! - Free functions mirror the methods for raw, unvalidated rows
//!   (e.g., `move_in_direction`).
//! - The hot ops live in `ops` to keep things tidy.

mod ops;
pub mod state;

pub use state::{Cell, Direction, Grid, GridError, MoveOutcome, ParseDirectionError, RowCollapse};

pub use ops::{MAX_TILE, collapse_row_left, move_in_direction, rotate, validate};
