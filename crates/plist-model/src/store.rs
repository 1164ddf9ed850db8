//! Ordered backing store.
//!
//! [`DocumentStore`] is the single source of truth for a model's contents.
//! Every mutation goes through [`DocumentStore::set`] or
//! [`DocumentStore::remove`], which report to the [`DirtyTracker`]. There is
//! no `get_mut`; stored values are only replaced through `set`.

use std::ops::ControlFlow;

use plist_model_value::{Dictionary, Value};

use crate::dirty::DirtyTracker;

/// Order in which [`DocumentStore::for_each_with`] visits entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumerationOrder {
    #[default]
    Forward,
    Reverse,
    /// The caller doesn't care about order; the store is free to pick one.
    Unordered,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    map: Dictionary,
    tracker: DirtyTracker,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a decoded document. The result is clean.
    pub fn from_document(map: Dictionary) -> Self {
        Self {
            map,
            tracker: DirtyTracker::new(),
        }
    }

    pub fn document(&self) -> &Dictionary {
        &self.map
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.map.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Value> + ExactSizeIterator {
        self.map.values()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Value)> + ExactSizeIterator {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn all_keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    pub fn all_values(&self) -> Vec<Value> {
        self.map.values().cloned().collect()
    }

    /// Visit entries in insertion order until the visitor breaks.
    pub fn for_each<F>(&self, visitor: F)
    where
        F: FnMut(&str, &Value) -> ControlFlow<()>,
    {
        self.for_each_with(EnumerationOrder::Forward, visitor);
    }

    pub fn for_each_with<F>(&self, order: EnumerationOrder, mut visitor: F)
    where
        F: FnMut(&str, &Value) -> ControlFlow<()>,
    {
        match order {
            EnumerationOrder::Forward | EnumerationOrder::Unordered => {
                for (key, value) in self.iter() {
                    if visitor(key, value).is_break() {
                        return;
                    }
                }
            }
            EnumerationOrder::Reverse => {
                for (key, value) in self.iter().rev() {
                    if visitor(key, value).is_break() {
                        return;
                    }
                }
            }
        }
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Insert or overwrite `key`. New keys go to the end of the order;
    /// existing keys keep their position.
    ///
    /// Returns `true` when the stored value changed. Writing a value equal to
    /// the current one (same kind, same contents) is not a mutation. Empty
    /// keys are not valid document keys and are ignored.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if key.is_empty() {
            tracing::warn!("ignoring write to an empty document key");
            return false;
        }
        let value = value.into();
        if self.map.get(&key) == Some(&value) {
            return false;
        }
        self.map.insert(key, value);
        self.tracker.mark();
        true
    }

    /// Remove `key` if present. Removing a missing key is a no-op.
    ///
    /// Uses `shift_remove` so the remaining keys keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.map.shift_remove(key);
        if removed.is_some() {
            self.tracker.mark();
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.map.is_empty() {
            self.map.clear();
            self.tracker.mark();
        }
    }

    /// [`set`](Self::set) each pair in order; returns how many changed the
    /// store.
    pub fn extend<I, K, V>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut changed = 0;
        for (key, value) in entries {
            if self.set(key, value) {
                changed += 1;
            }
        }
        changed
    }
}
