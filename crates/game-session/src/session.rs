use std::num::NonZeroUsize;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tile_engine::engine::{Direction, Grid};

use crate::history::UndoHistory;

/// Side length of a fresh board.
pub const BOARD_SIZE: NonZeroUsize = NonZeroUsize::new(4).unwrap();
/// Tiles placed on a fresh board.
pub const INITIAL_TILES: usize = 2;
/// Snapshots kept for undo, and undos allowed per session.
pub const MAX_UNDO_DEPTH: usize = 2;
/// Reaching this tile wins the game.
pub const WIN_TILE: u32 = 2048;

/// Game status. `Won` and `Lost` are terminal until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "win", alias = "won")]
    Won,
    #[serde(rename = "game-over", alias = "lost")]
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Playing
    }
}

/// Immutable recorded game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    grid: Grid,
    score: u64,
    status: Status,
}

impl Snapshot {
    pub fn new(grid: Grid, score: u64, status: Status) -> Self {
        Self {
            grid,
            score,
            status,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Status a freshly committed grid ends up in.
///
/// Won beats lost; lost needs a full grid that no direction can change.
pub fn evaluate_status(grid: &Grid) -> Status {
    if grid.contains(WIN_TILE) {
        Status::Won
    } else if grid.is_full() && grid.movable_directions().is_empty() {
        Status::Lost
    } else {
        Status::Playing
    }
}

/// One game: the current snapshot, bounded undo history, and how many
/// undos have been spent.
///
/// Operations never mutate a session. Accepted transitions return a new
/// `Session`; rejected ones return `None` and the caller keeps the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    current: Snapshot,
    history: UndoHistory,
    undos_used: usize,
}

impl Session {
    /// Empty board with [`INITIAL_TILES`] random tiles, score 0, playing.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut grid = Grid::empty(BOARD_SIZE, BOARD_SIZE);
        for _ in 0..INITIAL_TILES {
            grid = grid.with_random_tile(rng);
        }
        Self::from_parts(
            Snapshot::new(grid, 0, Status::Playing),
            UndoHistory::new(),
            0,
        )
    }

    /// Assemble a session from stored parts. `undos_used` is clamped to
    /// [`MAX_UNDO_DEPTH`].
    pub fn from_parts(current: Snapshot, history: UndoHistory, undos_used: usize) -> Self {
        Self {
            current,
            history,
            undos_used: undos_used.min(MAX_UNDO_DEPTH),
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn grid(&self) -> &Grid {
        &self.current.grid
    }

    pub fn score(&self) -> u64 {
        self.current.score
    }

    pub fn status(&self) -> Status {
        self.current.status
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn undos_used(&self) -> usize {
        self.undos_used
    }

    /// Undos still available, ignoring whether history holds anything.
    pub fn undos_remaining(&self) -> usize {
        MAX_UNDO_DEPTH - self.undos_used
    }

    /// Slide in `direction`, spawn one tile, score the merges and settle
    /// the new status.
    ///
    /// Rejected (`None`) when the game is over or the slide changes nothing.
    /// The undo budget is left alone.
    pub fn apply_move<R: Rng + ?Sized>(&self, direction: Direction, rng: &mut R) -> Option<Self> {
        if self.status() != Status::Playing {
            return None;
        }
        let outcome = self.current.grid.shift(direction);
        if !outcome.moved {
            return None;
        }

        let mut history = self.history.clone();
        history.push(self.current.with_status(Status::Playing));

        let grid = outcome.grid.with_random_tile(rng);
        let score = self.current.score.saturating_add(outcome.score_gained());
        let status = evaluate_status(&grid);
        debug!(
            "move {direction}: +{} -> score {score}, status {status:?}",
            outcome.score_gained()
        );

        Some(Self {
            current: Snapshot::new(grid, score, status),
            history,
            undos_used: self.undos_used,
        })
    }

    /// Step back to the most recent snapshot, forcing status to playing.
    ///
    /// Rejected once [`MAX_UNDO_DEPTH`] undos are spent or history is empty.
    pub fn undo(&self) -> Option<Self> {
        if self.undos_used >= MAX_UNDO_DEPTH {
            return None;
        }
        let mut history = self.history.clone();
        let previous = history.pop()?;
        debug!("undo -> score {}", previous.score);
        Some(Self {
            current: previous.with_status(Status::Playing),
            history,
            undos_used: self.undos_used + 1,
        })
    }

    /// Discard this session and start a fresh one.
    pub fn reset<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        debug!("reset at score {}", self.score());
        Self::new(rng)
    }
}
