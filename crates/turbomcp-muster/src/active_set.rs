//! Tracks which exposed ids are currently published to downstream clients.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

/// A kind-tagged set of currently-published exposed ids.
///
/// An id belongs to the set iff a corresponding handler is currently
/// registered with the outbound MCP server — membership here and handler
/// registration are kept in lockstep by the reconciler.
#[derive(Clone, Default)]
pub struct ActiveItemSet {
    members: Arc<RwLock<HashSet<String>>>,
}

impl ActiveItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is currently published.
    pub fn is_active(&self, id: &str) -> bool {
        self.members.read().contains(id)
    }

    /// Mark `id` active or inactive.
    pub fn set_active(&self, id: &str, active: bool) {
        let mut members = self.members.write();
        if active {
            members.insert(id.to_string());
        } else {
            members.remove(id);
        }
    }

    /// Ids currently active but absent from `new_ids` — a snapshot set
    /// difference. Callers must tolerate concurrent modification between
    /// reading this and acting on it; it is not a point-in-time view under
    /// a held lock.
    pub fn inactive_since(&self, new_ids: &HashSet<String>) -> Vec<String> {
        self.members
            .read()
            .iter()
            .filter(|id| !new_ids.contains(*id))
            .cloned()
            .collect()
    }

    /// Remove a batch of ids atomically with respect to other set operations.
    pub fn remove_many(&self, ids: &[String]) {
        let mut members = self.members.write();
        for id in ids {
            members.remove(id);
        }
    }

    /// Snapshot of all currently active ids.
    pub fn snapshot(&self) -> HashSet<String> {
        self.members.read().clone()
    }

    /// Number of currently active ids.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_check_active() {
        let set = ActiveItemSet::new();
        assert!(!set.is_active("a"));
        set.set_active("a", true);
        assert!(set.is_active("a"));
        set.set_active("a", false);
        assert!(!set.is_active("a"));
    }

    #[test]
    fn inactive_since_is_set_difference() {
        let set = ActiveItemSet::new();
        set.set_active("a", true);
        set.set_active("b", true);
        set.set_active("c", true);

        let new_ids: HashSet<String> = ["a".to_string(), "c".to_string()].into_iter().collect();
        let mut stale = set.inactive_since(&new_ids);
        stale.sort();
        assert_eq!(stale, vec!["b".to_string()]);
    }

    #[test]
    fn remove_many_clears_membership() {
        let set = ActiveItemSet::new();
        set.set_active("a", true);
        set.set_active("b", true);
        set.remove_many(&["a".to_string()]);
        assert!(!set.is_active("a"));
        assert!(set.is_active("b"));
    }
}
