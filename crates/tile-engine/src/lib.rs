//! tile-engine: pure grid transforms for the 2048 sliding-tile rule.
//!
//! This crate provides:
//! - A rectangular `Grid` of optional power-of-two cells with ergonomic
//!   methods (`shift`, `rotate`, `with_random_tile`, ...)
//! - Free functions over raw rows (`validate`, `rotate`, `collapse_row_left`,
//!   `move_in_direction`) for callers holding untrusted input
//!
//! Every direction is reduced to a single leftward collapse: the grid is
//! rotated so the requested edge sits on the left, each row is collapsed,
//! and the result is rotated back.
//!
//! Quick start:
//! ```
//! use tile_engine::engine::{Direction, Grid};
//!
//! let grid = Grid::new(vec![
//!     vec![Some(2), None, Some(2), None],
//!     vec![None, None, None, None],
//! ])
//! .unwrap();
//! let outcome = grid.shift(Direction::Left);
//! assert!(outcome.moved);
//! assert_eq!(outcome.grid.get(0, 0), Some(4));
//! assert_eq!(outcome.score_gained(), 4);
//! ```
//!
//! Tile spawning is the only randomness and takes the caller's RNG, so a
//! seeded generator gives reproducible games:
//! ```
//! use std::num::NonZeroUsize;
//! use tile_engine::engine::Grid;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let four = NonZeroUsize::new(4).unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//! let g = Grid::empty(four, four).with_random_tile(&mut rng).with_random_tile(&mut rng);
//! assert_eq!(g.empty_cells().len(), 14);
//! ```

pub mod engine;
