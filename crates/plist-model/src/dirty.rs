//! Dirty/clean state of a document.
//!
//! The tracker counts mutations. A save records the generation it wrote in a
//! [`SaveLedger`] shared with background save tasks, so a save that finishes
//! after the caller moved on can still mark its snapshot clean without
//! touching the store. The document is dirty while the latest generation is
//! ahead of the latest saved one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct DirtyTracker {
    generation: u64,
    ledger: Arc<SaveLedger>,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    /// A clean tracker: nothing has been mutated since the document was
    /// loaded.
    pub fn new() -> Self {
        Self {
            generation: 0,
            ledger: Arc::new(SaveLedger::default()),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.ledger.saved() < self.generation
    }

    /// Record one mutation.
    pub fn mark(&mut self) {
        self.generation += 1;
    }

    /// Generation of the current document contents.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn ledger(&self) -> Arc<SaveLedger> {
        Arc::clone(&self.ledger)
    }
}

/// Saved generation plus the lock that orders writes of one document.
#[derive(Debug, Default)]
pub(crate) struct SaveLedger {
    saved: AtomicU64,
    write_lock: Mutex<()>,
}

impl SaveLedger {
    pub(crate) fn saved(&self) -> u64 {
        self.saved.load(Ordering::Acquire)
    }

    /// Never moves backwards: a late save of an old snapshot cannot make a
    /// newer write look unsaved.
    pub(crate) fn mark_saved(&self, generation: u64) {
        self.saved.fetch_max(generation, Ordering::AcqRel);
    }

    pub(crate) fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        assert_eq!(tracker.generation(), 0);
    }

    #[test]
    fn mark_then_save_cycle() {
        let mut tracker = DirtyTracker::new();
        tracker.mark();
        tracker.mark();
        assert!(tracker.is_dirty());

        let ledger = tracker.ledger();
        ledger.mark_saved(1);
        assert!(tracker.is_dirty(), "older snapshot must not clean newer edits");

        ledger.mark_saved(2);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn saved_generation_is_monotonic() {
        let tracker = DirtyTracker::new();
        let ledger = tracker.ledger();
        ledger.mark_saved(5);
        ledger.mark_saved(3);
        assert_eq!(ledger.saved(), 5);
    }
}
