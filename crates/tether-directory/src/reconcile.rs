//! Incremental directory merge

use std::collections::HashMap;

use tether_core::DirectoryDelta;

/// One joinable session in the directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub max_players: u8,
    pub is_open: bool,
    pub is_visible: bool,
    pub player_count: u8,
}

impl DirectoryEntry {
    fn from_delta(delta: &DirectoryDelta) -> Self {
        DirectoryEntry {
            name: delta.name.clone(),
            max_players: delta.max_players,
            is_open: delta.is_open,
            is_visible: delta.is_visible,
            player_count: delta.player_count,
        }
    }
}

/// Merges successive partial update batches into a stable listing
///
/// The mapping is keyed by session name and mutated one delta at a time;
/// it is never rebuilt wholesale except at teardown (`clear`).
#[derive(Debug, Default)]
pub struct DirectoryReconciler {
    sessions: HashMap<String, DirectoryEntry>,
}

impl DirectoryReconciler {
    pub fn new() -> Self {
        DirectoryReconciler::default()
    }

    /// Whether a delta disqualifies its entry from the listing
    ///
    /// Explicit removal, a closed or hidden session, or an empty one all
    /// erase the mapping.
    fn retires(delta: &DirectoryDelta) -> bool {
        delta.removed || !delta.is_open || !delta.is_visible || delta.player_count == 0
    }

    /// Merge one batch of deltas, in order
    pub fn apply_batch(&mut self, deltas: &[DirectoryDelta]) {
        for delta in deltas {
            if Self::retires(delta) {
                self.sessions.remove(&delta.name);
            } else {
                self.sessions
                    .insert(delta.name.clone(), DirectoryEntry::from_delta(delta));
            }
        }
        tracing::debug!(
            changed = deltas.len(),
            total = self.sessions.len(),
            "directory batch merged"
        );
    }

    /// The current full listing; order is not significant
    pub fn listing(&self) -> Vec<DirectoryEntry> {
        self.sessions.values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&DirectoryEntry> {
        self.sessions.get(name)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session teardown - the only wholesale reset
    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn delta(name: &str, players: u8, removed: bool) -> DirectoryDelta {
        DirectoryDelta {
            name: name.to_owned(),
            max_players: 4,
            is_open: true,
            is_visible: true,
            player_count: players,
            removed,
        }
    }

    #[test]
    fn test_insert_then_update() {
        let mut dir = DirectoryReconciler::new();
        dir.apply_batch(&[delta("A", 1, false)]);
        dir.apply_batch(&[delta("A", 3, false)]);

        assert_eq!(dir.len(), 1);
        assert_eq!(dir.get("A").unwrap().player_count, 3);
    }

    #[test]
    fn test_unmentioned_entries_survive() {
        let mut dir = DirectoryReconciler::new();
        dir.apply_batch(&[delta("A", 2, false)]);
        dir.apply_batch(&[delta("B", 1, false)]);

        // A was not in the second batch but must persist
        assert_eq!(dir.len(), 2);
        assert!(dir.get("A").is_some());
    }

    #[test]
    fn test_spec_merge_sequence() {
        let mut dir = DirectoryReconciler::new();
        dir.apply_batch(&[delta("A", 2, false)]);
        dir.apply_batch(&[delta("B", 0, false)]);
        dir.apply_batch(&[delta("A", 2, true)]);

        // A removed explicitly, B excluded by zero players
        assert!(dir.is_empty());
    }

    #[test]
    fn test_closed_and_hidden_are_retired() {
        let mut dir = DirectoryReconciler::new();

        let mut closed = delta("A", 2, false);
        closed.is_open = false;
        let mut hidden = delta("B", 2, false);
        hidden.is_visible = false;

        dir.apply_batch(&[delta("A", 2, false), delta("B", 2, false)]);
        assert_eq!(dir.len(), 2);

        dir.apply_batch(&[closed, hidden]);
        assert!(dir.is_empty());
    }

    #[test]
    fn test_removal_of_unknown_entry_is_harmless() {
        let mut dir = DirectoryReconciler::new();
        dir.apply_batch(&[delta("ghost", 0, true)]);
        assert!(dir.is_empty());
    }

    #[test]
    fn test_clear_resets() {
        let mut dir = DirectoryReconciler::new();
        dir.apply_batch(&[delta("A", 2, false)]);
        dir.clear();
        assert!(dir.is_empty());
    }

    proptest! {
        /// The listing never contains an entry whose latest delta retired it
        #[test]
        fn prop_no_retired_entries(
            batches in prop::collection::vec(
                prop::collection::vec(
                    ("[abc]", 0u8..4, any::<bool>(), any::<bool>(), any::<bool>()),
                    0..4,
                ),
                0..8,
            )
        ) {
            let mut dir = DirectoryReconciler::new();
            let mut latest: HashMap<String, DirectoryDelta> = HashMap::new();

            for batch in &batches {
                let deltas: Vec<DirectoryDelta> = batch
                    .iter()
                    .map(|(name, players, open, visible, removed)| DirectoryDelta {
                        name: name.clone(),
                        max_players: 4,
                        is_open: *open,
                        is_visible: *visible,
                        player_count: *players,
                        removed: *removed,
                    })
                    .collect();
                for d in &deltas {
                    latest.insert(d.name.clone(), d.clone());
                }
                dir.apply_batch(&deltas);
            }

            for entry in dir.listing() {
                let last = &latest[&entry.name];
                prop_assert!(!DirectoryReconciler::retires(last));
            }
        }
    }
}
