//! Condition-variable mailbox coordinating the reader, the searcher, and
//! the renderer.
//!
//! Each event kind keeps only its latest value; setting an event overwrites
//! the previous value and wakes waiters, unless the kind is in the ignore
//! set (used to coalesce notification bursts). `wait` hands the whole
//! mailbox to a callback under the lock so the callback can read and clear
//! entries atomically.

use std::sync::{Condvar, Mutex};

use indexmap::{IndexMap, IndexSet};

/// The event kinds flowing between the engine's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// The reader appended new items.
    ReadNew,
    /// The query changed; the current search pass is stale.
    SearchNew,
    /// A search pass reported progress.
    SearchProgress,
    /// A search pass finished and published a snapshot.
    SearchFin,
    /// Shut the engine down.
    Close,
}

/// The mailbox contents: latest value per event kind.
pub type Events<V> = IndexMap<Event, V>;

struct Inner<V> {
    events: Events<V>,
    ignore: IndexSet<Event>,
}

/// A mailbox with one slot per event kind, a mutex, and a condvar.
pub struct EventBox<V> {
    inner: Mutex<Inner<V>>,
    cond: Condvar,
}

impl<V> Default for EventBox<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EventBox<V> {
    pub fn new() -> Self {
        EventBox {
            inner: Mutex::new(Inner {
                events: IndexMap::new(),
                ignore: IndexSet::new(),
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `value` for `event`, overwriting any previous value, and wake
    /// waiters unless the event is ignored.
    pub fn set(&self, event: Event, value: V) {
        let mut inner = self.lock();
        inner.events.insert(event, value);
        if !inner.ignore.contains(&event) {
            self.cond.notify_all();
        }
    }

    /// Block until at least one event is present, then pass the mailbox to
    /// `callback` under the lock. The callback may read and clear entries.
    pub fn wait<F: FnOnce(&mut Events<V>)>(&self, callback: F) {
        let mut inner = self.lock();
        while inner.events.is_empty() {
            inner = self.cond.wait(inner).unwrap_or_else(|e| e.into_inner());
        }
        callback(&mut inner.events);
    }

    /// Non-blocking presence check; the value stays in the mailbox.
    pub fn peek(&self, event: Event) -> bool {
        self.lock().events.contains_key(&event)
    }

    /// Add event kinds to the ignore set. Setting an ignored event still
    /// stores its value but does not wake waiters.
    pub fn watch(&self, events: &[Event]) {
        let mut inner = self.lock();
        for &e in events {
            inner.ignore.insert(e);
        }
    }

    /// Remove event kinds from the ignore set.
    pub fn unwatch(&self, events: &[Event]) {
        let mut inner = self.lock();
        for &e in events {
            inner.ignore.shift_remove(&e);
        }
    }

    /// Block until `event` is set, consuming it and leaving other entries
    /// untouched. Intended for test harnesses with a single event flow.
    pub fn wait_for(&self, event: Event) -> V {
        let mut inner = self.lock();
        loop {
            if let Some(value) = inner.events.shift_remove(&event) {
                return value;
            }
            inner = self.cond.wait(inner).unwrap_or_else(|e| e.into_inner());
        }
    }
}
