//! The engine facade the enclosing program drives.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crate::chars::Chars;
use crate::eventbox::{Event, EventBox};
use crate::item::ItemPool;
use crate::matcher::{Matcher, SearchSnapshot, Value};
use crate::{EngineError, Query, QueryFlags};

/// Configures and builds a [`Sift`] engine.
#[derive(Debug, Clone, Copy)]
pub struct SiftBuilder {
    with_pos: bool,
    slab_caps: (usize, usize),
}

impl Default for SiftBuilder {
    fn default() -> Self {
        SiftBuilder {
            with_pos: true,
            slab_caps: (crate::slab::SLAB_16_SIZE, crate::slab::SLAB_32_SIZE),
        }
    }
}

impl SiftBuilder {
    /// Whether matchers should report per-code-point match positions for
    /// highlighting. On by default; turn it off for filter-only use.
    pub fn with_positions(mut self, with_pos: bool) -> Self {
        self.with_pos = with_pos;
        self
    }

    /// Capacity of each worker's scratch pools. The 16-bit capacity also
    /// bounds the score matrix the optimal fuzzy matcher will fill before
    /// falling back to the greedy scan.
    pub fn slab_capacity(mut self, cap16: usize, cap32: usize) -> Self {
        self.slab_caps = (cap16, cap32);
        self
    }

    /// Build the engine and start its searcher thread.
    pub fn build(self) -> Sift {
        let pool = Arc::new(ItemPool::new());
        let req_box = Arc::new(EventBox::new());
        let out_box = Arc::new(EventBox::new());
        let matcher = Arc::new(Matcher::new(
            pool.clone(),
            req_box.clone(),
            out_box.clone(),
            self.with_pos,
            self.slab_caps,
        ));

        let searcher = matcher.clone();
        let handle = std::thread::spawn(move || searcher.run());

        Sift {
            pool,
            matcher,
            req_box,
            out_box,
            handle: Some(handle),
            closed: AtomicBool::new(false),
        }
    }
}

/// The match-and-rank engine.
///
/// The reader pushes lines in with [`append`](Sift::append), the query
/// owner swaps patterns with [`set_query`](Sift::set_query), and the
/// renderer follows `SearchFin` events on [`events`](Sift::events) or polls
/// [`latest`](Sift::latest).
///
/// # Examples
///
/// ```
/// use sift::prelude::*;
///
/// let sift = Sift::builder().build();
/// sift.set_query("sr", QueryFlags::default()).unwrap();
/// for line in ["src/main.rs", "src/item.rs", "README.md"] {
///     sift.append(line).unwrap();
/// }
///
/// let snapshot = loop {
///     let Value::Snapshot(snapshot) = sift.events().wait_for(Event::SearchFin) else {
///         continue;
///     };
///     if snapshot.watermark == 3 {
///         break snapshot;
///     }
/// };
/// assert_eq!(snapshot.items.len(), 2);
/// ```
pub struct Sift {
    pool: Arc<ItemPool>,
    matcher: Arc<Matcher>,
    req_box: Arc<EventBox<Value>>,
    out_box: Arc<EventBox<Value>>,
    handle: Option<JoinHandle<()>>,
    closed: AtomicBool,
}

impl Default for Sift {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Sift {
    /// A builder with default settings.
    pub fn builder() -> SiftBuilder {
        SiftBuilder::default()
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }

    /// Append one line to the item store and wake the searcher. Returns the
    /// store length after the append.
    pub fn append(&self, line: impl Into<Chars>) -> Result<usize, EngineError> {
        self.ensure_open()?;
        let len = self.pool.append(line.into());
        self.req_box.set(Event::ReadNew, Value::Count(len));
        Ok(len)
    }

    /// Append a batch of lines with a single wake-up.
    pub fn append_batch(
        &self,
        lines: impl IntoIterator<Item = Chars>,
    ) -> Result<usize, EngineError> {
        self.ensure_open()?;
        let len = self.pool.append_batch(lines);
        self.req_box.set(Event::ReadNew, Value::Count(len));
        Ok(len)
    }

    /// Replace the query. The pattern is lowercased unless the flags ask
    /// for case sensitivity and accent-folded when normalisation is on, so
    /// the matcher preconditions always hold.
    pub fn set_query(&self, pattern: &str, flags: QueryFlags) -> Result<(), EngineError> {
        self.ensure_open()?;
        debug!("query: {pattern:?} {flags:?}");
        self.matcher.set_query(Query::new(pattern, flags));
        self.req_box.set(Event::SearchNew, Value::Empty);
        Ok(())
    }

    /// The consumer-facing mailbox carrying `SearchProgress`, `SearchFin`,
    /// and `Close`.
    pub fn events(&self) -> &Arc<EventBox<Value>> {
        &self.out_box
    }

    /// The most recently published snapshot, if any search pass finished.
    pub fn latest(&self) -> Option<Arc<SearchSnapshot>> {
        self.matcher.latest()
    }

    /// Number of items appended so far.
    pub fn num_items(&self) -> usize {
        self.pool.len()
    }

    /// Stop the searcher thread and reject further calls.
    pub fn close(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.req_box.set(Event::Close, Value::Empty);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for Sift {
    fn drop(&mut self) {
        self.close();
    }
}
