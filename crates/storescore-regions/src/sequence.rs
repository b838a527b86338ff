//! Per-entity request sequencing.
//!
//! Every mutation takes a ticket for the entity it touches. When its response
//! arrives, only the holder of the newest ticket for that entity may change
//! local state; older responses are dropped regardless of arrival order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use storescore_core::{RegionId, StoreId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Store(StoreId),
    Region(RegionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    key: EntityKey,
    seq: u64,
}

impl Ticket {
    #[must_use]
    pub fn key(&self) -> EntityKey {
        self.key
    }
}

#[derive(Debug, Default)]
pub struct Sequencer {
    next: u64,
    latest: HashMap<EntityKey, u64>,
}

impl Sequencer {
    pub fn issue(&mut self, key: EntityKey) -> Ticket {
        self.next += 1;
        self.latest.insert(key, self.next);
        Ticket {
            key,
            seq: self.next,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.seq)
    }
}

/// Teardown flag: once cancelled, in-flight loads stop being applied. The
/// underlying HTTP request is not aborted.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older_for_same_entity() {
        let mut seq = Sequencer::default();
        let first = seq.issue(EntityKey::Region(RegionId(1)));
        let second = seq.issue(EntityKey::Region(RegionId(1)));
        assert!(!seq.is_current(&first));
        assert!(seq.is_current(&second));
    }

    #[test]
    fn tickets_for_different_entities_are_independent() {
        let mut seq = Sequencer::default();
        let region = seq.issue(EntityKey::Region(RegionId(1)));
        let store = seq.issue(EntityKey::Store(StoreId(1)));
        assert!(seq.is_current(&region));
        assert!(seq.is_current(&store));
        assert_eq!(store.key(), EntityKey::Store(StoreId(1)));
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let handle = CancelHandle::default();
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
    }
}
