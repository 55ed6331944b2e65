use log::{error, info};
use rand::Rng;
use tile_engine::engine::Direction;

use crate::input::Input;
use crate::persist;
use crate::session::Session;
use crate::store::KeyValueStore;

/// Owns the single live session and writes every accepted transition to
/// the store.
///
/// Writes are fire-and-forget: a failed write is logged and counted, the
/// in-memory session stays authoritative, and nothing is retried.
pub struct GameHost<S, R> {
    store: S,
    rng: R,
    key: String,
    session: Session,
    write_failures: u64,
}

impl<S: KeyValueStore, R: Rng> GameHost<S, R> {
    /// Rehydrate the session under `key`, or start and save a fresh one.
    pub fn open(store: S, mut rng: R, key: impl Into<String>) -> Self {
        let key = key.into();
        let restored = persist::restore_session(&store, &key);
        let is_fresh = restored.is_none();
        let session = restored.unwrap_or_else(|| Session::new(&mut rng));
        let mut host = Self {
            store,
            rng,
            key,
            session,
            write_failures: 0,
        };
        if is_fresh {
            info!("starting a new game under `{}`", host.key);
            host.persist();
        } else {
            info!(
                "resuming game under `{}` at score {}",
                host.key,
                host.session.score()
            );
        }
        host
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Failed writes since this host was opened.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Returns true if the move was accepted.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        let next = self.session.apply_move(direction, &mut self.rng);
        self.commit(next)
    }

    /// Returns true if a snapshot was restored.
    pub fn undo(&mut self) -> bool {
        let next = self.session.undo();
        self.commit(next)
    }

    pub fn reset(&mut self) {
        let next = self.session.reset(&mut self.rng);
        self.commit(Some(next));
    }

    /// Dispatch one input event. `Quit` is left to the caller.
    pub fn handle(&mut self, input: Input) -> bool {
        match input {
            Input::Move(direction) => self.apply_move(direction),
            Input::Undo => self.undo(),
            Input::Reset => {
                self.reset();
                true
            }
            Input::Quit => false,
        }
    }

    fn commit(&mut self, next: Option<Session>) -> bool {
        let Some(next) = next else {
            return false;
        };
        self.session = next;
        self.persist();
        true
    }

    fn persist(&mut self) {
        if let Err(e) = persist::save_session(&mut self.store, &self.key, &self.session) {
            self.write_failures += 1;
            error!("failed to save game under `{}`: {e}", self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{DEFAULT_STATE_KEY, decode, encode};
    use crate::session::Status;
    use crate::store::{MemoryStore, SqliteStore, StoreError};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts writes and can be told to fail them.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        writes: Rc<Cell<usize>>,
        fail: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes.set(self.writes.get() + 1);
            if self.fail {
                return Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery));
            }
            self.inner.set(key, value)
        }
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn saved(host: &GameHost<FlakyStore, StdRng>) -> Session {
        let raw = host.store().get(DEFAULT_STATE_KEY).unwrap().unwrap();
        decode(&raw).unwrap()
    }

    fn move_any(host: &mut GameHost<FlakyStore, StdRng>) {
        assert!(Direction::ALL.into_iter().any(|d| host.apply_move(d)));
    }

    #[test]
    fn fresh_game_is_saved_on_open() {
        let host = GameHost::open(FlakyStore::default(), rng(1), DEFAULT_STATE_KEY);
        assert_eq!(host.store().writes.get(), 1);
        assert_eq!(&saved(&host), host.session());
    }

    #[test]
    fn resumes_saved_game_without_writing() {
        let mut store = FlakyStore::default();
        let mut seed_rng = rng(2);
        let session = Session::new(&mut seed_rng);
        store
            .inner
            .set(DEFAULT_STATE_KEY, &encode(&session).unwrap())
            .unwrap();

        let host = GameHost::open(store, rng(3), DEFAULT_STATE_KEY);
        assert_eq!(host.session(), &session);
        assert_eq!(host.store().writes.get(), 0);
    }

    #[test]
    fn corrupt_save_starts_fresh() {
        let mut store = FlakyStore::default();
        store.inner.set(DEFAULT_STATE_KEY, "{{{").unwrap();
        let host = GameHost::open(store, rng(4), DEFAULT_STATE_KEY);
        assert_eq!(host.session().score(), 0);
        assert_eq!(host.store().writes.get(), 1);
        assert_eq!(&saved(&host), host.session());
    }

    #[test]
    fn accepted_transitions_are_saved_rejected_are_not() {
        let mut host = GameHost::open(FlakyStore::default(), rng(5), DEFAULT_STATE_KEY);
        assert!(!host.undo());
        assert_eq!(host.store().writes.get(), 1);

        move_any(&mut host);
        assert_eq!(host.store().writes.get(), 2);
        assert_eq!(&saved(&host), host.session());

        assert!(host.handle(Input::Undo));
        assert_eq!(host.session().undos_used(), 1);
        assert_eq!(&saved(&host), host.session());
        assert_eq!(host.store().writes.get(), 3);

        assert!(!host.handle(Input::Quit));
        assert_eq!(host.store().writes.get(), 3);
    }

    #[test]
    fn reset_replaces_session() {
        let mut host = GameHost::open(FlakyStore::default(), rng(6), DEFAULT_STATE_KEY);
        move_any(&mut host);
        move_any(&mut host);
        assert!(host.handle(Input::Reset));
        assert_eq!(host.session().score(), 0);
        assert!(host.session().history().is_empty());
        assert_eq!(host.session().status(), Status::Playing);
        assert_eq!(&saved(&host), host.session());
    }

    #[test]
    fn failed_writes_do_not_roll_back() {
        let store = FlakyStore {
            fail: true,
            ..FlakyStore::default()
        };
        let writes = Rc::clone(&store.writes);
        let mut host = GameHost::open(store, rng(7), DEFAULT_STATE_KEY);
        assert_eq!(host.write_failures(), 1);

        let before = host.session().clone();
        move_any(&mut host);
        assert_ne!(host.session(), &before);
        assert_eq!(host.session().history().latest(), Some(before.current()));
        assert_eq!(host.write_failures(), 2);
        assert_eq!(writes.get(), 2);
    }

    #[test]
    fn sqlite_backed_game_resumes() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("2048.db");
        let played = {
            let store = SqliteStore::open(&path).unwrap();
            let mut host = GameHost::open(store, rng(8), DEFAULT_STATE_KEY);
            for _ in 0..5 {
                assert!(Direction::ALL.into_iter().any(|d| host.apply_move(d)));
            }
            host.session().clone()
        };
        let store = SqliteStore::open(&path).unwrap();
        let host = GameHost::open(store, rng(9), DEFAULT_STATE_KEY);
        assert_eq!(host.session(), &played);
    }
}
