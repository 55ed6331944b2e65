//! Session codec and load/save against a [`KeyValueStore`].
//!
//! The stored record is JSON:
//! `{map, score, status, undoStack: [{map, score}], undoCount}`.
//! `map` is rows of integer-or-null. Older saves may lack `undoStack` and
//! `undoCount`; both default to empty/zero.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tile_engine::engine::Grid;

use crate::history::UndoHistory;
use crate::session::{Session, Snapshot, Status};
use crate::store::{KeyValueStore, StoreError};

/// Key the session is stored under unless configured otherwise.
pub const DEFAULT_STATE_KEY: &str = "2048_game_state";

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("saved state is not a valid session record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("undo entry {index} is {found_rows}x{found_cols}, board is {rows}x{cols}")]
    ShapeMismatch {
        index: usize,
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedSession {
    map: Grid,
    score: u64,
    status: Status,
    #[serde(default)]
    undo_stack: Option<Vec<SavedSnapshot>>,
    #[serde(default)]
    undo_count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedSnapshot {
    map: Grid,
    score: u64,
}

/// Serialize `session` into the stored record format.
pub fn encode(session: &Session) -> Result<String, PersistError> {
    let record = SavedSession {
        map: session.grid().clone(),
        score: session.score(),
        status: session.status(),
        undo_stack: Some(
            session
                .history()
                .iter()
                .map(|snap| SavedSnapshot {
                    map: snap.grid().clone(),
                    score: snap.score(),
                })
                .collect(),
        ),
        undo_count: Some(session.undos_used()),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Parse a stored record back into a session.
///
/// Undo entries restore as playing. An over-long undo stack keeps its newest
/// entries and an over-large undo count is clamped.
pub fn decode(raw: &str) -> Result<Session, PersistError> {
    let record: SavedSession = serde_json::from_str(raw)?;
    let entries = record.undo_stack.unwrap_or_default();

    if let Some((index, entry)) = entries
        .iter()
        .enumerate()
        .find(|(_, entry)| !entry.map.same_shape(&record.map))
    {
        return Err(PersistError::ShapeMismatch {
            index,
            rows: record.map.row_count(),
            cols: record.map.col_count(),
            found_rows: entry.map.row_count(),
            found_cols: entry.map.col_count(),
        });
    }

    let history: UndoHistory = entries
        .into_iter()
        .map(|entry| Snapshot::new(entry.map, entry.score, Status::Playing))
        .collect();
    Ok(Session::from_parts(
        Snapshot::new(record.map, record.score, record.status),
        history,
        record.undo_count.unwrap_or(0),
    ))
}

/// Read the session stored under `key`.
///
/// Missing, unreadable, or corrupt state is logged and reported as `None`;
/// it is never an error for the caller.
pub fn restore_session<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<Session> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no saved state under `{key}`");
            return None;
        }
        Err(e) => {
            warn!("failed to read saved state under `{key}`: {e}");
            return None;
        }
    };
    match decode(&raw) {
        Ok(session) => {
            debug!("restored session under `{key}` at score {}", session.score());
            Some(session)
        }
        Err(e) => {
            warn!("discarding saved state under `{key}`: {e}");
            None
        }
    }
}

/// Restore the session under `key`, or start a fresh one.
pub fn load_session<S, R>(store: &S, key: &str, rng: &mut R) -> Session
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    restore_session(store, key).unwrap_or_else(|| Session::new(rng))
}

/// Write `session` under `key`.
pub fn save_session<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    session: &Session,
) -> Result<(), PersistError> {
    let raw = encode(session)?;
    store.set(key, &raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MAX_UNDO_DEPTH;
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tile_engine::engine::Direction;

    const LEGACY: &str = r#"{
        "map": [[2,null,null,null],[null,null,null,null],[null,null,4,null],[null,null,null,null]],
        "score": 12,
        "status": "playing"
    }"#;

    fn played_session(seed: u64, moves: usize) -> Session {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = Session::new(&mut rng);
        for _ in 0..moves {
            session = Direction::ALL
                .into_iter()
                .find_map(|d| session.apply_move(d, &mut rng))
                .unwrap();
        }
        session
    }

    #[test]
    fn encode_then_decode_keeps_session() {
        let session = played_session(8, 3).undo().unwrap();
        let raw = encode(&session).unwrap();
        assert_eq!(decode(&raw).unwrap(), session);
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let session = played_session(2, 1);
        let value: serde_json::Value = serde_json::from_str(&encode(&session).unwrap()).unwrap();
        assert!(value["map"].is_array());
        assert_eq!(value["status"], "playing");
        assert_eq!(value["undoCount"], 0);
        assert_eq!(value["undoStack"].as_array().map(Vec::len), Some(1));
        assert!(value["undoStack"][0]["score"].is_u64());
        assert!(value["undoStack"][0].get("status").is_none());
    }

    #[test]
    fn legacy_record_without_undo_fields() {
        let session = decode(LEGACY).unwrap();
        assert_eq!(session.score(), 12);
        assert_eq!(session.grid().get(2, 2), Some(4));
        assert!(session.history().is_empty());
        assert_eq!(session.undos_used(), 0);
    }

    #[test]
    fn null_undo_fields_default() {
        let raw = r#"{"map":[[2,null]],"score":0,"status":"win","undoStack":null,"undoCount":null}"#;
        let session = decode(raw).unwrap();
        assert_eq!(session.status(), Status::Won);
        assert!(session.history().is_empty());
    }

    #[test]
    fn oversized_undo_fields_are_trimmed() {
        let raw = r#"{"map":[[8]],"score":8,"status":"game-over",
            "undoStack":[{"map":[[2]],"score":1},{"map":[[4]],"score":2},{"map":[[null]],"score":3}],
            "undoCount":7}"#;
        let session = decode(raw).unwrap();
        assert_eq!(session.status(), Status::Lost);
        assert_eq!(session.undos_used(), MAX_UNDO_DEPTH);
        let scores: Vec<u64> = session.history().iter().map(Snapshot::score).collect();
        assert_eq!(scores, vec![2, 3]);
    }

    #[test]
    fn corrupt_records_are_rejected() {
        assert!(matches!(decode("not json"), Err(PersistError::Json(_))));
        assert!(matches!(
            decode(r#"{"map":[[2],[2,4]],"score":0,"status":"playing"}"#),
            Err(PersistError::Json(_))
        ));
        assert!(matches!(
            decode(r#"{"map":[[2]],"score":0,"status":"paused"}"#),
            Err(PersistError::Json(_))
        ));
        assert!(matches!(
            decode(r#"{"map":[[2]],"score":0,"status":"playing","undoStack":[{"map":[[2,2]],"score":0}]}"#),
            Err(PersistError::ShapeMismatch { index: 0, .. })
        ));
        assert!(matches!(
            decode(r#"{"map":[[0,3],[0,0]],"score":0,"status":"playing"}"#),
            Err(PersistError::Json(_))
        ));
        assert!(matches!(
            decode(r#"{"map":[[2]],"score":0,"status":"playing","undoStack":[{"map":[[5]],"score":0}]}"#),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn huge_saved_score_keeps_playing() {
        let raw = r#"{"map":[[2,2],[null,null]],"score":18446744073709551615,"status":"playing"}"#;
        let session = decode(raw).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let next = session.apply_move(Direction::Left, &mut rng).unwrap();
        assert_eq!(next.score(), u64::MAX);
        assert_eq!(next.grid().get(0, 0), Some(4));
    }

    #[test]
    fn bad_tiles_in_store_start_fresh() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut store = MemoryStore::new();
        store
            .set(DEFAULT_STATE_KEY, r#"{"map":[[0,3],[0,0]],"score":40,"status":"playing"}"#)
            .unwrap();
        assert!(restore_session(&store, DEFAULT_STATE_KEY).is_none());
        let fresh = load_session(&store, DEFAULT_STATE_KEY, &mut rng);
        assert_eq!(fresh.score(), 0);
        assert!(fresh.grid().cells().flatten().all(|v| v == 2 || v == 4));
    }

    #[test]
    fn load_falls_back_to_fresh_session() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut store = MemoryStore::new();
        let fresh = load_session(&store, DEFAULT_STATE_KEY, &mut rng);
        assert_eq!(fresh.score(), 0);
        assert_eq!(fresh.grid().cells().flatten().count(), 2);

        store.set(DEFAULT_STATE_KEY, "{\"map\": [").unwrap();
        assert!(restore_session(&store, DEFAULT_STATE_KEY).is_none());
        let fresh = load_session(&store, DEFAULT_STATE_KEY, &mut rng);
        assert!(fresh.history().is_empty());
    }

    #[test]
    fn save_then_load() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut store = MemoryStore::new();
        let session = played_session(6, 4);
        save_session(&mut store, "slot", &session).unwrap();
        assert_eq!(load_session(&store, "slot", &mut rng), session);
        assert!(restore_session(&store, DEFAULT_STATE_KEY).is_none());
    }
}
