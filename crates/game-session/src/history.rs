use std::collections::VecDeque;

use crate::session::{MAX_UNDO_DEPTH, Snapshot};

/// Fixed-capacity FIFO of prior snapshots, oldest first.
///
/// Pushing onto a full ring evicts the oldest entry; popping takes the
/// newest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoHistory {
    entries: VecDeque<Snapshot>,
}

impl UndoHistory {
    pub const CAPACITY: usize = MAX_UNDO_DEPTH;

    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// Record `snapshot` as the newest entry, returning the evicted one.
    pub fn push(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        let evicted = if self.entries.len() == Self::CAPACITY {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(snapshot);
        evicted
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.entries.iter()
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect oldest-first snapshots; only the newest [`UndoHistory::CAPACITY`]
/// survive.
impl FromIterator<Snapshot> for UndoHistory {
    fn from_iter<I: IntoIterator<Item = Snapshot>>(iter: I) -> Self {
        let mut history = Self::new();
        for snapshot in iter {
            history.push(snapshot);
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Status;
    use tile_engine::engine::Grid;

    fn snap(score: u64) -> Snapshot {
        let grid = Grid::new(vec![vec![Some(2), None]]).unwrap();
        Snapshot::new(grid, score, Status::Playing)
    }

    fn scores(history: &UndoHistory) -> Vec<u64> {
        history.iter().map(Snapshot::score).collect()
    }

    #[test]
    fn push_evicts_oldest_when_full() {
        let mut h = UndoHistory::new();
        assert_eq!(h.push(snap(1)), None);
        assert_eq!(h.push(snap(2)), None);
        assert_eq!(h.push(snap(3)), Some(snap(1)));
        assert_eq!(scores(&h), vec![2, 3]);
        assert_eq!(h.len(), UndoHistory::CAPACITY);
    }

    #[test]
    fn pop_takes_newest() {
        let mut h: UndoHistory = (1..=2).map(snap).collect();
        assert_eq!(h.latest().map(Snapshot::score), Some(2));
        assert_eq!(h.pop().map(|s| s.score()), Some(2));
        assert_eq!(h.pop().map(|s| s.score()), Some(1));
        assert_eq!(h.pop(), None);
        assert!(h.is_empty());
    }

    #[test]
    fn collecting_keeps_newest() {
        let h: UndoHistory = (1..=5).map(snap).collect();
        assert_eq!(scores(&h), vec![4, 5]);
    }
}
