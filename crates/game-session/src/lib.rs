//! game-session: the 2048 game-state controller and its plumbing.
//!
//! - `session`: immutable `Session` values with pure `apply_move`, `undo`
//!   and `reset` transitions
//! - `history`: the bounded undo ring
//! - `persist` / `store`: the saved-record codec and key-value stores
//! - `host`: owns the live session and saves every accepted transition
//! - `input` / `config`: front-end helpers for the `twenty48` binary
//!
//! ```
//! use game_session::{GameHost, MemoryStore, Status, persist::DEFAULT_STATE_KEY};
//! use rand::{SeedableRng, rngs::StdRng};
//! use tile_engine::engine::Direction;
//!
//! let mut host = GameHost::open(MemoryStore::new(), StdRng::seed_from_u64(1), DEFAULT_STATE_KEY);
//! let moved = Direction::ALL.into_iter().any(|d| host.apply_move(d));
//! assert!(moved);
//! assert_eq!(host.session().status(), Status::Playing);
//! assert_eq!(host.session().history().len(), 1);
//! ```

pub mod config;
pub mod history;
pub mod host;
pub mod input;
pub mod persist;
pub mod session;
pub mod store;

pub use history::UndoHistory;
pub use host::GameHost;
pub use input::Input;
pub use persist::PersistError;
pub use session::{MAX_UNDO_DEPTH, Session, Snapshot, Status, WIN_TILE};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
